//! Resolved build description of a single config file
use crate::globals::Globals;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// File name of every generated build script that is placed beside its config file
pub const SCRIPT_NAME: &str = "Makefile";

/// One fully loaded, validated and expanded config file
///
/// Built in one pass by [crate::loader::Loader] and never mutated afterwards.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConfigDocument {
    /// Source path as it was given, not canonicalized
    pub path: PathBuf,
    pub globals: Globals,
    pub toolchain: Toolchain,
    pub settings: Settings,
    /// Executable or archive name, depending on [Settings::out_type]
    pub output_name: String,
    pub source_files: Vec<String>,
    pub libraries: Vec<String>,
    pub include_directories: Vec<String>,
    pub library_directories: Vec<String>,
    pub directories_to_create: Vec<String>,
    /// Keyed by the dependency path exactly as spelled by this document
    pub dependencies: IndexMap<String, ConfigDocument>,
}

/// The `cxx` section
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Toolchain {
    pub standard: String,
    pub compiler: String,
    pub release_flags: String,
    pub debug_flags: String,
    pub build_dir: String,
    /// Space joined
    pub flags: String,
}

/// The `settings` section
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    pub src_c_dir: String,
    pub src_cpp_dir: String,
    pub out_type: OutType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libraries_dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutType {
    Executable,
    Archive,
}

impl OutType {
    /// Name of the section (and global prefix) holding the output name
    pub fn key(self) -> &'static str {
        match self {
            OutType::Executable => "executable",
            OutType::Archive => "archive",
        }
    }
}

impl std::str::FromStr for OutType {
    type Err = UnknownOutType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "executable" => Ok(OutType::Executable),
            "archive" => Ok(OutType::Archive),
            other => Err(UnknownOutType(other.to_string())),
        }
    }
}

impl std::fmt::Display for OutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("unknown out-type `{0}`, expected `executable` or `archive`")]
pub struct UnknownOutType(pub String);

impl ConfigDocument {
    pub fn out_type(&self) -> OutType {
        self.settings.out_type
    }

    /// Where the build script for this document is generated when it is a dependency
    pub fn script_path(&self) -> PathBuf {
        self.path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(SCRIPT_NAME)
    }

    /// `lib<name>.a`, using only the last component of the archive name
    pub fn archive_file_name(&self) -> String {
        format!("lib{}.a", file_name(&self.output_name))
    }

    /// The archive as produced by this document's own script
    pub fn archive_path(&self) -> PathBuf {
        Path::new(&self.output_name)
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(self.archive_file_name())
    }
}

/// Last path component of `path`, or `path` itself if there is none
pub(crate) fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Minimal document with a `build/` build dir and `src/` source dirs
    pub(crate) fn document(path: &str, out_type: OutType, output_name: &str) -> ConfigDocument {
        ConfigDocument {
            path: path.into(),
            globals: Globals::default(),
            toolchain: Toolchain {
                standard: "20".into(),
                compiler: "g++".into(),
                release_flags: "-O2".into(),
                debug_flags: "-g".into(),
                build_dir: "build/".into(),
                flags: "-Wall".into(),
            },
            settings: Settings {
                src_c_dir: "src/".into(),
                src_cpp_dir: "src/".into(),
                out_type,
                libraries_dir: None,
            },
            output_name: output_name.into(),
            source_files: vec!["main.cpp".into()],
            libraries: vec![],
            include_directories: vec![],
            library_directories: vec![],
            directories_to_create: vec![],
            dependencies: IndexMap::new(),
        }
    }

    #[test]
    fn out_type_parsing() {
        assert_eq!("executable".parse::<OutType>(), Ok(OutType::Executable));
        assert_eq!("archive".parse::<OutType>(), Ok(OutType::Archive));
        assert_eq!(
            "shared".parse::<OutType>(),
            Err(UnknownOutType("shared".into()))
        );
    }

    #[test]
    fn script_path_is_beside_the_document() {
        let doc = document("deps/engine/cfg.json", OutType::Archive, "engine");
        assert_eq!(doc.script_path(), PathBuf::from("deps/engine/Makefile"));

        let doc = document("cfg.json", OutType::Archive, "engine");
        assert_eq!(doc.script_path(), PathBuf::from("Makefile"));
    }

    #[test]
    fn archive_paths() {
        let doc = document("cfg.json", OutType::Archive, "lib/engine");
        assert_eq!(doc.archive_file_name(), "libengine.a");
        assert_eq!(doc.archive_path(), PathBuf::from("lib/libengine.a"));

        let doc = document("cfg.json", OutType::Archive, "engine");
        assert_eq!(doc.archive_path(), PathBuf::from("libengine.a"));
    }
}

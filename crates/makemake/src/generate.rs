//! Writing and removing the generated Makefiles of a document tree
//!
//! Only an executable links its dependencies, so only an executable root gets a Makefile
//! generated beside each of its direct dependencies. An archive root never recurses.
use crate::document::{ConfigDocument, OutType};
use crate::globals::Globals;
use crate::loader::{LoadError, Loader};
use crate::makefile;
use std::path::{Path, PathBuf};

/// A rendered Makefile and where it goes
#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct Script {
    pub path: PathBuf,
    pub contents: String,
}

/// Documents that get a Makefile, paired with the Makefile's location
fn targets<'d>(root: &'d ConfigDocument, root_script: &Path) -> Vec<(&'d ConfigDocument, PathBuf)> {
    let mut targets = vec![(root, root_script.to_path_buf())];

    if root.out_type() == OutType::Executable {
        targets.extend(
            root.dependencies
                .values()
                .map(|dependency| (dependency, dependency.script_path())),
        );
    }

    targets
}

/// Renders every Makefile for `root` without touching the filesystem
pub fn plan(root: &ConfigDocument, root_script: &Path) -> Vec<Script> {
    targets(root, root_script)
        .into_iter()
        .map(|(document, path)| Script::new(path, makefile::render(document)))
        .collect()
}

/// Loads `config` with all its dependencies, then renders and writes every Makefile
///
/// Nothing is written unless the whole tree loaded.
pub fn make(config: &Path, root_script: &Path) -> Result<(), GenerateError> {
    let root = Loader::load(config, Globals::default())?;
    write(&plan(&root, root_script))
}

/// Writes the scripts in order
///
/// The writes are not atomic: an io error stops at the failing script and leaves the ones
/// before it on disk.
pub fn write(scripts: &[Script]) -> Result<(), GenerateError> {
    for script in scripts {
        tracing::info!(path = %script.path.display(), "writing Makefile");
        std::fs::write(&script.path, &script.contents).map_err(|source| GenerateError::Write {
            path: script.path.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Removes the Makefiles [plan] would produce and every declared directory of their documents
///
/// Anything already missing is skipped.
pub fn clean(root: &ConfigDocument, root_script: &Path) -> Result<(), GenerateError> {
    for (document, script) in targets(root, root_script) {
        tracing::info!(path = %script.display(), "attempting to remove Makefile...");
        remove(&script, |path| std::fs::remove_file(path))?;

        for directory in &document.directories_to_create {
            let directory = Path::new(directory);
            tracing::info!(path = %directory.display(), "attempting to remove directory...");
            remove(directory, |path| std::fs::remove_dir_all(path))?;
        }
    }
    Ok(())
}

fn remove(path: &Path, op: fn(&Path) -> std::io::Result<()>) -> Result<(), GenerateError> {
    match op(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "not found");
            Ok(())
        }
        Err(source) => Err(GenerateError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("unable to write `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to remove `{}`", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::test::document;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn with_dependency(out_type: OutType) -> ConfigDocument {
        let mut root = document("cfg.json", out_type, "app");
        root.settings.libraries_dir = Some("lib/".into());
        root.dependencies.insert(
            "engine/cfg.json".into(),
            document("engine/cfg.json", OutType::Archive, "lib/engine"),
        );
        root
    }

    #[test]
    fn executable_root_plans_dependency_scripts() {
        let root = with_dependency(OutType::Executable);

        let paths: Vec<_> = plan(&root, Path::new("Makefile"))
            .into_iter()
            .map(|script| script.path)
            .collect();

        assert_eq!(
            paths,
            [PathBuf::from("Makefile"), PathBuf::from("engine/Makefile")]
        );
    }

    #[test]
    fn archive_root_does_not_recurse() {
        let root = with_dependency(OutType::Archive);

        let scripts = plan(&root, Path::new("out/Makefile"));

        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].path, PathBuf::from("out/Makefile"));
    }

    #[test]
    fn write_then_clean() {
        let dir = TempDir::new().unwrap();
        let build = dir.path().join("build");
        std::fs::create_dir(&build).unwrap();
        std::fs::write(build.join("main.cpp.o"), "").unwrap();

        let mut root = document("cfg.json", OutType::Executable, "app");
        root.directories_to_create = vec![
            build.display().to_string(),
            dir.path().join("never-created").display().to_string(),
        ];
        let script = dir.path().join("Makefile");

        write(&plan(&root, &script)).unwrap();
        assert!(std::fs::read_to_string(&script)
            .unwrap()
            .starts_with("# AUTO GENERATED FILE DO NOT EDIT"));

        clean(&root, &script).unwrap();
        assert!(!script.exists());
        assert!(!build.exists());

        // already clean
        clean(&root, &script).unwrap();
    }

    fn makefiles(dir: &Path) -> Vec<PathBuf> {
        let mut found = vec![];
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                found.extend(makefiles(&path));
            } else if path.file_name() == Some(std::ffi::OsStr::new("Makefile")) {
                found.push(path);
            }
        }
        found
    }

    fn archive(name: &str, source_files: serde_json::Value) -> serde_json::Value {
        json!({
            "settings": { "src-c-dir": "src/", "src-cpp-dir": "src/", "out-type": "archive" },
            "archive": { "name": name },
            "cxx": {
                "standard": "17",
                "compiler": "g++",
                "release-flags": "-O2",
                "debug-flags": "-g",
                "build-dir": "build/",
                "flags": []
            },
            "source-files": source_files
        })
    }

    /// Root executable depending on a valid `good` archive and on `bad`
    fn tree(dir: &TempDir, bad: serde_json::Value) -> PathBuf {
        let mut dependencies = serde_json::Map::new();
        for (name, json) in [("good", archive("good", json!(["good.cpp"]))), ("bad", bad)] {
            let path = dir.path().join(name).join("cfg.json");
            std::fs::create_dir(path.parent().unwrap()).unwrap();
            std::fs::write(&path, json.to_string()).unwrap();
            dependencies.insert(path.display().to_string(), json!({ "globals": {} }));
        }

        let config = dir.path().join("cfg.json");
        let root = json!({
            "settings": {
                "src-c-dir": "src/",
                "src-cpp-dir": "src/",
                "out-type": "executable",
                "libraries-dir": "lib/"
            },
            "executable": { "name": "app" },
            "cxx": {
                "standard": "20",
                "compiler": "g++",
                "release-flags": "-O2",
                "debug-flags": "-g",
                "build-dir": "build/",
                "flags": ["-Wall"]
            },
            "source-files": ["main.cpp"],
            "dependencies": dependencies
        });
        std::fs::write(&config, root.to_string()).unwrap();
        config
    }

    #[test]
    fn make_writes_every_script() {
        let dir = TempDir::new().unwrap();
        let config = tree(&dir, archive("bad", json!(["bad.cpp"])));

        make(&config, &dir.path().join("Makefile")).unwrap();

        let mut found = makefiles(dir.path());
        found.sort();
        let mut expected = vec![
            dir.path().join("Makefile"),
            dir.path().join("bad/Makefile"),
            dir.path().join("good/Makefile"),
        ];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[test]
    fn broken_dependency_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = tree(&dir, archive("bad", json!("bad.cpp")));

        let err = make(&config, &dir.path().join("Makefile")).unwrap_err();

        assert!(matches!(
            err,
            GenerateError::Load(LoadError::WrongType { ref field, .. }) if field == "source-files"
        ));
        assert_eq!(makefiles(dir.path()), Vec::<PathBuf>::new());
    }
}

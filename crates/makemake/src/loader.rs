//! Loading and validating config files
//!
//! [Loader::load] reads one JSON document, validates it section by section and expands every
//! section as soon as it is valid, so that later sections can reference globals produced by
//! earlier ones. The section order is fixed:
//!
//! 1. `globals`
//! 2. `settings` (registered as `settings.<field>`)
//! 3. `executable` or `archive`, picked by `settings.out-type` (registered as `<out-type>.name`)
//! 4. `cxx` (registered as `cxx.<field>`)
//! 5. `include-dirs`, `library-dirs`, `libraries`, `source-files`, `directories-to-create`
//! 6. `dependencies`, each loaded recursively with only the globals forwarded to it
//!
//! The first problem found aborts the whole load.
use crate::document::{ConfigDocument, OutType, Settings, Toolchain};
use crate::globals::Globals;
use crate::value::Value;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

const TOOLCHAIN_FIELDS: [&str; 6] = [
    "standard",
    "compiler",
    "release-flags",
    "debug-flags",
    "build-dir",
    "flags",
];

/// Recursive config file loader
///
/// Tracks the chain of documents currently being loaded so that a dependency cycle is reported
/// instead of recursing forever.
#[derive(Debug, Default, derive_new::new)]
pub struct Loader {
    #[new(default)]
    loading: Vec<PathBuf>,
}

impl Loader {
    /// Loads the document at `path` and all of its dependencies
    ///
    /// `seed` is registered before the document's own `globals` section. It is empty for a root
    /// document and holds the forwarded globals for a dependency.
    pub fn load(path: impl AsRef<Path>, seed: Globals) -> Result<ConfigDocument, LoadError> {
        Self::new().load_document(path.as_ref(), seed)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    fn load_document(&mut self, path: &Path, seed: Globals) -> Result<ConfigDocument, LoadError> {
        let canonical = path.canonicalize().map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(start) = self.loading.iter().position(|p| p == &canonical) {
            let chain = self.loading[start..]
                .iter()
                .chain(std::iter::once(&canonical))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(LoadError::DependencyCycle {
                path: path.to_path_buf(),
                chain,
            });
        }

        self.loading.push(canonical);
        let document = self.parse(path, seed);
        self.loading.pop();

        document
    }

    fn parse(&mut self, path: &Path, mut globals: Globals) -> Result<ConfigDocument, LoadError> {
        tracing::info!(path = %path.display(), "loading config file");
        let mut raw = RawDocument::read(path)?;

        raw.globals(&mut globals)?;
        let settings = raw.settings(&mut globals)?;
        let output_name = raw.output_name(settings.out_type, &mut globals)?;
        let toolchain = raw.toolchain(&mut globals)?;
        let include_directories = raw.optional_list("include-dirs", &globals)?;
        let library_directories = raw.optional_list("library-dirs", &globals)?;
        let libraries = raw.optional_list("libraries", &globals)?;
        let source_files = raw.list("source-files", &globals)?;
        let directories_to_create = raw.optional_list("directories-to-create", &globals)?;
        let dependencies = self.dependencies(&mut raw, &settings, &globals)?;

        if settings.out_type == OutType::Archive && !dependencies.is_empty() {
            tracing::warn!(
                path = %path.display(),
                "archives do not link their dependencies, they are only validated"
            );
        }

        Ok(ConfigDocument {
            path: path.to_path_buf(),
            globals,
            toolchain,
            settings,
            output_name,
            source_files,
            libraries,
            include_directories,
            library_directories,
            directories_to_create,
            dependencies,
        })
    }

    fn dependencies(
        &mut self,
        raw: &mut RawDocument,
        settings: &Settings,
        globals: &Globals,
    ) -> Result<IndexMap<String, ConfigDocument>, LoadError> {
        let mut dependencies = IndexMap::new();

        let Some(section) = raw.take("dependencies") else {
            tracing::info!(path = %raw.path.display(), "no `dependencies` section was specified, skipping...");
            return Ok(dependencies);
        };
        let section = raw.object(section, "dependencies")?;

        if settings.libraries_dir.is_none() {
            return Err(LoadError::LibrariesDirRequired {
                path: raw.path.clone(),
            });
        }

        for (dependency, data) in section {
            let dependency_path = PathBuf::from(&dependency);
            if !dependency_path.exists() {
                return Err(LoadError::DependencyNotFound {
                    path: raw.path.clone(),
                    dependency: dependency_path,
                });
            }

            let field = format!("dependencies.{dependency}");
            let mut data = raw.object(data, &field)?;
            let overrides = match data.shift_remove("globals") {
                Some(overrides) if !overrides.is_null() => {
                    raw.object(overrides, &format!("{field}.globals"))?
                }
                _ => {
                    return Err(LoadError::MissingField {
                        path: raw.path.clone(),
                        section: field,
                        field: "globals".into(),
                    })
                }
            };

            // expanded against this document, registered into the dependency's own table
            let mut seed = Globals::default();
            for (name, value) in overrides {
                let value = raw.string(value, &format!("{field}.globals.{name}"))?;
                seed.add(name, &globals.expand(&value));
            }
            tracing::debug!(dependency = %dependency_path.display(), forwarded = seed.len(), "loading dependency");

            let document = self
                .load_document(&dependency_path, seed)
                .inspect_err(|e| {
                    tracing::debug!(
                        dependency = %dependency_path.display(),
                        failed = %e.path().display(),
                        "dependency failed to load"
                    )
                })?;
            if document.out_type() != OutType::Archive {
                return Err(LoadError::DependencyNotArchive {
                    path: raw.path.clone(),
                    dependency: dependency_path,
                });
            }

            // not normalized, `a/./b.json` and `a/b.json` are two entries
            dependencies.insert(dependency, document);
        }

        Ok(dependencies)
    }
}

/// Sections of a parsed document that were not consumed yet
struct RawDocument {
    path: PathBuf,
    sections: IndexMap<String, Value>,
}

impl RawDocument {
    fn read(path: &Path) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let json: serde_json::Value =
            serde_json::from_str(&contents).map_err(|source| LoadError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let Value::Object(sections) = Value::from(json) else {
            return Err(LoadError::NotAnObject {
                path: path.to_path_buf(),
            });
        };

        Ok(Self {
            path: path.to_path_buf(),
            sections,
        })
    }

    /// Removes a section, `null` counts as absent
    fn take(&mut self, section: &str) -> Option<Value> {
        self.sections
            .shift_remove(section)
            .filter(|value| !value.is_null())
    }

    fn require(&mut self, section: &str) -> Result<Value, LoadError> {
        self.take(section).ok_or_else(|| LoadError::MissingSection {
            path: self.path.clone(),
            section: section.into(),
        })
    }

    fn wrong_type(&self, field: &str, expected: &'static str, found: &Value) -> LoadError {
        LoadError::WrongType {
            path: self.path.clone(),
            field: field.into(),
            expected,
            found: found.kind(),
        }
    }

    fn object(&self, value: Value, field: &str) -> Result<IndexMap<String, Value>, LoadError> {
        match value {
            Value::Object(object) => Ok(object),
            other => Err(self.wrong_type(field, "an object", &other)),
        }
    }

    fn string(&self, value: Value, field: &str) -> Result<String, LoadError> {
        match value {
            Value::String(string) => Ok(string),
            other => Err(self.wrong_type(field, "a string", &other)),
        }
    }

    fn string_list(&self, value: Value, field: &str) -> Result<Vec<String>, LoadError> {
        let elements = match value {
            Value::Array(elements) => elements,
            other => return Err(self.wrong_type(field, "an array of strings", &other)),
        };

        elements
            .into_iter()
            .map(|element| match element {
                Value::String(string) => Ok(string),
                other => Err(self.wrong_type(field, "an array of strings", &other)),
            })
            .collect()
    }

    /// Removes a required string field from a section
    fn field(
        &self,
        object: &mut IndexMap<String, Value>,
        section: &str,
        field: &str,
    ) -> Result<String, LoadError> {
        match object.shift_remove(field).filter(|value| !value.is_null()) {
            Some(value) => self.string(value, &format!("{section}.{field}")),
            None => Err(LoadError::MissingField {
                path: self.path.clone(),
                section: section.into(),
                field: field.into(),
            }),
        }
    }

    fn globals(&mut self, globals: &mut Globals) -> Result<(), LoadError> {
        let Some(section) = self.take("globals") else {
            return Ok(());
        };

        for (name, value) in self.object(section, "globals")? {
            let value = self.string(value, &format!("globals.{name}"))?;
            globals.add(name, &value);
        }

        Ok(())
    }

    fn settings(&mut self, globals: &mut Globals) -> Result<Settings, LoadError> {
        let section = self.require("settings")?;
        let mut section = self.object(section, "settings")?;

        let mut fields: IndexMap<String, Value> = IndexMap::new();
        for field in ["src-c-dir", "src-cpp-dir", "out-type"] {
            let value = self.field(&mut section, "settings", field)?;
            fields.insert(field.to_string(), Value::String(value));
        }
        if let Some(value) = section
            .shift_remove("libraries-dir")
            .filter(|value| !value.is_null())
        {
            let value = self.string(value, "settings.libraries-dir")?;
            fields.insert("libraries-dir".to_string(), Value::String(value));
        }

        globals.apply_section(&mut fields, "settings");

        let src_c_dir = self.field(&mut fields, "settings", "src-c-dir")?;
        let src_cpp_dir = self.field(&mut fields, "settings", "src-cpp-dir")?;
        let out_type = self.field(&mut fields, "settings", "out-type")?;
        let out_type = out_type
            .parse::<OutType>()
            .map_err(|source| LoadError::UnknownOutType {
                path: self.path.clone(),
                source,
            })?;
        let libraries_dir = match fields.shift_remove("libraries-dir") {
            Some(value) => Some(self.string(value, "settings.libraries-dir")?),
            None => None,
        };

        Ok(Settings {
            src_c_dir,
            src_cpp_dir,
            out_type,
            libraries_dir,
        })
    }

    fn output_name(&mut self, out_type: OutType, globals: &mut Globals) -> Result<String, LoadError> {
        let key = out_type.key();
        let section = self.require(key)?;
        let mut section = self.object(section, key)?;

        let name = globals.expand(&self.field(&mut section, key, "name")?);
        globals.add(format!("{key}.name"), &name);

        Ok(name)
    }

    fn toolchain(&mut self, globals: &mut Globals) -> Result<Toolchain, LoadError> {
        let section = self.require("cxx")?;
        let section = self.object(section, "cxx")?;

        for field in TOOLCHAIN_FIELDS {
            if section.get(field).map_or(true, Value::is_null) {
                return Err(LoadError::MissingField {
                    path: self.path.clone(),
                    section: "cxx".into(),
                    field: field.into(),
                });
            }
        }

        // declared order is kept so fields can reference earlier ones
        let mut fields: IndexMap<String, Value> = IndexMap::new();
        for (key, value) in section {
            let field = format!("cxx.{key}");
            let value = if key == "flags" {
                self.string_list(value, &field)?.join(" ")
            } else {
                self.string(value, &field)?
            };
            fields.insert(key, Value::String(value));
        }

        globals.apply_section(&mut fields, "cxx");

        Ok(Toolchain {
            standard: self.field(&mut fields, "cxx", "standard")?,
            compiler: self.field(&mut fields, "cxx", "compiler")?,
            release_flags: self.field(&mut fields, "cxx", "release-flags")?,
            debug_flags: self.field(&mut fields, "cxx", "debug-flags")?,
            build_dir: self.field(&mut fields, "cxx", "build-dir")?,
            flags: self.field(&mut fields, "cxx", "flags")?,
        })
    }

    fn list(&mut self, section: &str, globals: &Globals) -> Result<Vec<String>, LoadError> {
        let value = self.require(section)?;
        let mut list = self.string_list(value, section)?;
        globals.expand_in_place(&mut list);
        Ok(list)
    }

    fn optional_list(&mut self, section: &str, globals: &Globals) -> Result<Vec<String>, LoadError> {
        if !self.sections.get(section).is_some_and(|value| !value.is_null()) {
            tracing::info!(path = %self.path.display(), "no `{section}` section was specified, skipping...");
            return Ok(vec![]);
        }
        self.list(section, globals)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("from file `{}`: unable to read file", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("from file `{}`: unable to parse json", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("from file `{}`: config file must be an object", path.display())]
    NotAnObject { path: PathBuf },
    #[error("from file `{}`: no `{section}` section in config file", path.display())]
    MissingSection { path: PathBuf, section: String },
    #[error("from file `{}`: no `{field}` found in `{section}` section", path.display())]
    MissingField {
        path: PathBuf,
        section: String,
        field: String,
    },
    #[error("from file `{}`: `{field}` must be {expected}, found {found}", path.display())]
    WrongType {
        path: PathBuf,
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("from file `{}`: invalid `settings.out-type`", path.display())]
    UnknownOutType {
        path: PathBuf,
        #[source]
        source: crate::document::UnknownOutType,
    },
    #[error(
        "from file `{}`: `libraries-dir` must be specified in section `settings` in order to use dependencies",
        path.display()
    )]
    LibrariesDirRequired { path: PathBuf },
    #[error("from file `{}`: dependency `{}` does not exist", path.display(), dependency.display())]
    DependencyNotFound { path: PathBuf, dependency: PathBuf },
    #[error(
        "from file `{}`: dependency `{}` must have out-type `archive`",
        path.display(),
        dependency.display()
    )]
    DependencyNotArchive { path: PathBuf, dependency: PathBuf },
    #[error("from file `{}`: dependency cycle detected: {chain}", path.display())]
    DependencyCycle { path: PathBuf, chain: String },
}

impl LoadError {
    /// The document the problem was found in
    pub(crate) fn path(&self) -> &Path {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Json { path, .. }
            | LoadError::NotAnObject { path }
            | LoadError::MissingSection { path, .. }
            | LoadError::MissingField { path, .. }
            | LoadError::WrongType { path, .. }
            | LoadError::UnknownOutType { path, .. }
            | LoadError::LibrariesDirRequired { path }
            | LoadError::DependencyNotFound { path, .. }
            | LoadError::DependencyNotArchive { path, .. }
            | LoadError::DependencyCycle { path, .. } => path,
        }
    }
}

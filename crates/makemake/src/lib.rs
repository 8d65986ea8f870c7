//! # makemake - Makefiles from json build descriptions
//!
//! For CLI usage run `makemake --help`.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `makemake` works internally.
//!
//! ### Config files
//!
//! A project is described by a JSON config file (`cfg.json` by default):
//!
//! ```json
//! {
//!   "globals": { "libs": "lib/" },
//!   "executable": { "name": "game" },
//!   "cxx": {
//!     "standard": "20", "compiler": "g++", "release-flags": "-O2", "debug-flags": "-g",
//!     "build-dir": "build/", "flags": ["-Wall"]
//!   },
//!   "include-dirs": ["engine/include"],
//!   "source-files": ["main.cpp"],
//!   "directories-to-create": ["$(cxx.build-dir)", "$(libs)"],
//!   "settings": {
//!     "src-c-dir": "src/", "src-cpp-dir": "src/", "out-type": "executable",
//!     "libraries-dir": "$(libs)"
//!   },
//!   "dependencies": {
//!     "engine/cfg.json": { "globals": { "out": "$(libs)" } }
//!   }
//! }
//! ```
//!
//! `out-type` is either `executable` or `archive` and picks the `executable` or `archive` section
//! for the output name. A dependency is another config file with `out-type` `archive`.
//!
//! ### Globals
//!
//! see [globals::Globals]
//!
//! Any string may contain placeholders like `$(libs)`. Each document owns a table of globals:
//!
//! - the entries of its `globals` section
//! - one entry per field of `settings` and `cxx`, named `settings.<field>` and `cxx.<field>`
//! - `executable.name` or `archive.name`
//!
//! Values are expanded when they are registered, in a single pass over the globals registered so
//! far. There are no forward references and unknown placeholders are left untouched.
//!
//! A dependency does **not** see the globals of the document that declared it. It only gets the
//! globals listed in its `dependencies.<path>.globals` entry, expanded against the declaring
//! document.
//!
//! ### Loading
//!
//! see [loader::Loader::load]
//!
//! JSON is parsed into a loosely-typed [value::Value] first. The loader then validates one
//! section at a time, expands it with [globals::Globals::apply] and only then binds it to the typed
//! [document::ConfigDocument]. Since later sections reference earlier ones the order is fixed, see
//! the [loader] module.
//!
//! Dependencies are loaded recursively, each into its own [document::ConfigDocument] owned by the
//! declaring document. A dependency that (indirectly) depends on itself is reported as an error.
//!
//! ### Generating
//!
//! see [makefile::render] and [generate::plan]
//!
//! [makefile::render] turns a single document into a Makefile. For every dependency, the
//! Makefile of an executable contains a rule that builds the dependency's archive by running the
//! dependency's own Makefile, which [generate::plan] places beside the dependency's config file.
//!
pub mod document;
pub mod generate;
pub mod globals;
pub mod loader;
pub mod makefile;
pub mod value;
pub mod visit;

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG: &str = "cfg.json";

//! Makefile rendering for a single [ConfigDocument]
//!
//! Rendering only looks at the given document. Dependencies contribute their archive name and
//! the location of their own Makefile, which the rendered rules invoke recursively.
use crate::document::{file_name, ConfigDocument, OutType};
use std::path::Path;

const HEADER: &str = "# AUTO GENERATED FILE DO NOT EDIT";

/// Renders the complete Makefile for `document`
pub fn render(document: &ConfigDocument) -> String {
    match document.out_type() {
        OutType::Executable => render_executable(document),
        OutType::Archive => render_archive(document),
    }
}

fn render_executable(document: &ConfigDocument) -> String {
    let mut makefile = Makefile::new();

    makefile.flags("INCLUDE_DIRS", "-I", &document.include_directories);
    makefile.flags("LIBRARY_DIRS", "-L", &document.library_directories);
    makefile.flags("LIBRARIES", "-l", &document.libraries);
    common_variables(&mut makefile, document);

    let archives: Vec<String> = document
        .dependencies
        .values()
        .map(|dependency| dependency_archive(document, dependency))
        .collect();
    for archive in &archives {
        makefile.line(format!("EXTRA_LABELS += {archive}"));
    }

    let mut link = format!("$(BASE_CMD) -o {} $(OBJECT_FILES)", document.output_name);
    for archive in &archives {
        link.push(' ');
        link.push_str(archive);
    }
    if !document.library_directories.is_empty() {
        link.push_str(" $(LIBRARY_DIRS)");
    }
    if !document.libraries.is_empty() {
        link.push_str(" $(LIBRARIES)");
    }
    makefile.rule(
        &document.output_name,
        "$(EXTRA_LABELS) $(OBJECT_FILES)",
        [link],
    );

    common_rules(&mut makefile, document);

    for (archive, dependency) in archives.iter().zip(document.dependencies.values()) {
        let script = dependency.script_path();
        makefile.rule(archive, "", [format!("make -f {}", script.display())]);
    }

    let mut clean = clean_directories(document);
    clean.push(format!("rm -f {}", document.output_name));
    for dependency in document.dependencies.values() {
        clean.push(format!("make -f {} clean", dependency.script_path().display()));
    }
    makefile.phony("clean", clean);

    makefile.finish()
}

fn render_archive(document: &ConfigDocument) -> String {
    let mut makefile = Makefile::new();

    makefile.flags("INCLUDE_DIRS", "-I", &document.include_directories);
    common_variables(&mut makefile, document);

    let archive = document.archive_path().display().to_string();
    makefile.rule(
        &archive,
        "$(EXTRA_LABELS) $(OBJECT_FILES)",
        [format!("ar rcs {archive} $(OBJECT_FILES)")],
    );

    common_rules(&mut makefile, document);

    let mut clean = clean_directories(document);
    clean.push(format!("rm -f {archive}"));
    makefile.phony("clean", clean);

    makefile.finish()
}

/// `BASE_CMD`, `OBJECT_FILES` and `EXTRA_LABELS` with one guard per directory to create
fn common_variables(makefile: &mut Makefile, document: &ConfigDocument) {
    let toolchain = &document.toolchain;
    makefile.variable(
        "BASE_CMD",
        &format!(
            "{} --std=c++{} {} $(INCLUDE_DIRS)",
            toolchain.compiler, toolchain.standard, toolchain.flags
        ),
    );
    makefile.variable(
        "OBJECT_FILES",
        &object_files(&toolchain.build_dir, &document.source_files).join(" "),
    );
    makefile.variable("EXTRA_LABELS", "");

    for directory in &document.directories_to_create {
        makefile.line(format!(r#"ifeq ("$(wildcard {directory})", "")"#));
        makefile.line(format!("EXTRA_LABELS += {directory}"));
        makefile.line("endif");
    }
}

/// Pattern rules for both languages and one rule per directory to create
fn common_rules(makefile: &mut Makefile, document: &ConfigDocument) {
    let build_dir = dir_prefix(&document.toolchain.build_dir);
    let sources = [
        ("cpp", dir_prefix(&document.settings.src_cpp_dir)),
        ("c", dir_prefix(&document.settings.src_c_dir)),
    ];
    for (extension, source_dir) in sources {
        makefile.rule(
            &format!("{build_dir}%.{extension}.o"),
            &format!("{source_dir}%.{extension}"),
            ["$(BASE_CMD) -c -o $@ $<".to_string()],
        );
    }

    for directory in &document.directories_to_create {
        makefile.rule(directory, "", [format!("mkdir -p {directory}")]);
    }
}

fn clean_directories(document: &ConfigDocument) -> Vec<String> {
    if document.directories_to_create.is_empty() {
        return vec![];
    }
    vec![format!("rm -rf {}", document.directories_to_create.join(" "))]
}

/// Where `document` expects the archive of `dependency`
fn dependency_archive(document: &ConfigDocument, dependency: &ConfigDocument) -> String {
    let libraries_dir = document.settings.libraries_dir.as_deref().unwrap_or_default();
    Path::new(libraries_dir)
        .join(dependency.archive_file_name())
        .display()
        .to_string()
}

/// `<build-dir>/<file name>.o` for every source file
///
/// Only the file name of a source is used, so `a/foo.cpp` and `b/foo.cpp` share an object file.
pub fn object_files(build_dir: &str, source_files: &[String]) -> Vec<String> {
    source_files
        .iter()
        .map(|source| format!("{}.o", Path::new(build_dir).join(file_name(source)).display()))
        .collect()
}

/// `dir` with a trailing `/`, so it can prefix a pattern
fn dir_prefix(dir: &str) -> String {
    if dir.is_empty() || dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}

/// Line oriented Makefile builder
#[derive(Debug)]
struct Makefile {
    contents: String,
}

impl Makefile {
    fn new() -> Self {
        Self {
            contents: format!("{HEADER}\n\n"),
        }
    }

    fn line(&mut self, line: impl AsRef<str>) {
        self.contents.push_str(line.as_ref());
        self.contents.push('\n');
    }

    fn variable(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            self.line(format!("{name} ="));
        } else {
            self.line(format!("{name} = {value}"));
        }
    }

    /// `NAME = <prefix>a <prefix>b`, skipped when there are no values
    fn flags(&mut self, name: &str, prefix: &str, values: &[String]) {
        if values.is_empty() {
            return;
        }
        let flags: Vec<_> = values.iter().map(|value| format!("{prefix}{value}")).collect();
        self.variable(name, &flags.join(" "));
    }

    fn rule(&mut self, target: &str, prerequisites: &str, recipe: impl IntoIterator<Item = String>) {
        if prerequisites.is_empty() {
            self.line(format!("{target}:"));
        } else {
            self.line(format!("{target}: {prerequisites}"));
        }
        for command in recipe {
            self.line(format!("\t{command}"));
        }
    }

    fn phony(&mut self, target: &str, recipe: impl IntoIterator<Item = String>) {
        self.line(format!(".PHONY: {target}"));
        self.rule(target, "", recipe);
    }

    fn finish(self) -> String {
        self.contents
    }
}

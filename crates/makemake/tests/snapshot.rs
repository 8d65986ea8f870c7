//! Snapshot tests
//!
//! Loads the projects in /tests/fixtures/ and compares the generated Makefiles. Dependency
//! paths in the fixtures are relative to the crate root, where cargo runs tests.
use makemake::globals::Globals;
use makemake::loader::Loader;
use makemake::makefile;
use std::path::Path;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("MAKEMAKE_LOG"))
        .with_writer(std::io::stderr)
        .try_init();
}

#[test]
fn minimal_executable() {
    init_logging();
    let document = Loader::load("tests/fixtures/minimal/cfg.json", Globals::default())
        .expect("must be a valid config file");

    let makefile = makefile::render(&document);

    insta::assert_snapshot!(makefile);
}

#[test]
fn chain() {
    init_logging();
    let document = Loader::load("tests/fixtures/chain/app/cfg.json", Globals::default())
        .expect("must be a valid config file");

    let scripts = makemake::generate::plan(&document, Path::new("Makefile"));
    assert_eq!(scripts.len(), 2);
    assert_eq!(
        scripts[1].path,
        Path::new("tests/fixtures/chain/engine/Makefile")
    );

    insta::assert_snapshot!("chain_app", scripts[0].contents.as_str());
    insta::assert_snapshot!("chain_engine", scripts[1].contents.as_str());
}

mod cli;

use makemake::document::ConfigDocument;
use makemake::globals::Globals;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    let filter = if cli.silent {
        tracing_subscriber::EnvFilter::new("error")
    } else {
        tracing_subscriber::EnvFilter::try_from_env("MAKEMAKE_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    if let Err(e) = run(&cli) {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

fn run(cli: &cli::Cli) -> anyhow::Result<()> {
    let config = cli.config_path();
    if cli.config.is_none() && cli.file.is_none() {
        tracing::info!("No config file specified, using default");
        anyhow::ensure!(
            config.exists(),
            "no configuration file given nor the default one (`{}`) was found",
            config.display()
        );
    }
    anyhow::ensure!(config.exists(), "config file `{}` not found", config.display());
    tracing::info!(path=%config.display(), "Using config file");

    if cli.print_config {
        let root = makemake::loader::Loader::load(&config, Globals::default())?;
        return output(&cli.format, &root);
    }

    if cli.clean {
        let root = makemake::loader::Loader::load(&config, Globals::default())?;
        tracing::info!("cleaning up...");
        makemake::generate::clean(&root, &cli.output)?;
        tracing::info!("done");
        return Ok(());
    }

    makemake::generate::make(&config, &cli.output)?;
    Ok(())
}

fn output(format: &cli::OutputFormat, document: &ConfigDocument) -> anyhow::Result<()> {
    match format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), document)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), document)?,
    };

    Ok(())
}

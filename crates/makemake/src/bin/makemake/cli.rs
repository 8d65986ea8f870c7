//! makemake cli interface

use clap::{Parser, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use
    ///
    /// Defaults to `cfg.json` in the work directory.
    #[arg(conflicts_with = "file")]
    pub config: Option<PathBuf>,

    /// Config file to use (same as the positional argument)
    #[arg(short = 'f', long = "file", value_name = "CONFIG")]
    pub file: Option<PathBuf>,

    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; makemake ... }
    #[arg(short = 'C', long = "directory")]
    pub directory: Vec<PathBuf>,

    /// Where to write the Makefile of the root config file
    #[arg(short = 'o', long = "output", default_value = "Makefile")]
    pub output: PathBuf,

    /// Silence info and warnings
    #[arg(long)]
    pub silent: bool,

    /// Remove ALL files generated by makemake and every directory the Makefiles create
    #[arg(long, conflicts_with = "print_config")]
    pub clean: bool,

    /// Print the resolved config tree instead of generating Makefiles
    #[arg(long)]
    pub print_config: bool,

    /// Output format of --print-config
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .or_else(|| self.file.clone())
            .unwrap_or_else(|| makemake::DEFAULT_CONFIG.into())
    }
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_path() {
        let cli = Cli::parse_from(["makemake"]);
        assert_eq!(cli.config_path(), PathBuf::from("cfg.json"));

        let cli = Cli::parse_from(["makemake", "project.json"]);
        assert_eq!(cli.config_path(), PathBuf::from("project.json"));

        let cli = Cli::parse_from(["makemake", "--file", "other.json", "--silent"]);
        assert_eq!(cli.config_path(), PathBuf::from("other.json"));
        assert!(cli.silent);

        assert!(Cli::try_parse_from(["makemake", "a.json", "-f", "b.json"]).is_err());
    }
}

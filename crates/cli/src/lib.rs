mod check;
mod scan;

use clap::{Parser, Subcommand};
use genero_core::Config;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "genero",
    version,
    about = "Language server and structural scanner for Genero 4GL",
    long_about = "Scans Genero 4GL sources in a single pass to extract functions, variables, records, \
                  call sites and formatting diagnostics, and serves them to editors over the \
                  Language Server Protocol."
)]
pub struct Cli {
    /// Mirror log output to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the Language Server Protocol (LSP) server on stdio
    #[command(
        long_about = "Starts the language server on stdin/stdout. Without --config, genero.json is \
                            read from the workspace root sent by the client."
    )]
    Lsp {
        /// Path to a JSON configuration file
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the structural model of a source file
    #[command(
        long_about = "Scans one file and prints its functions, variables, records and call sites. \
                            Line numbers in tables are 1-based; --json prints the raw model with \
                            0-based lines."
    )]
    Scan {
        /// Source file to scan
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Print the model as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report style and compiler diagnostics for a source file
    #[command(
        long_about = "Prints style diagnostics and, unless disabled, the compiler's own diagnostics. \
                            Exits with an error when the compiler reports errors."
    )]
    Check {
        /// Source file to check
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Path to a JSON configuration file (defaults to ./genero.json when present)
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
        /// Skip the compiler
        #[arg(long)]
        no_compile: bool,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::discover(&std::env::current_dir()?)?,
    };
    Ok(config)
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let component = match &cli.command {
        Commands::Lsp { .. } => "lsp",
        _ => "cli",
    };
    let _guard = genero_core::logging::init_logging(component, cli.verbose);

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Lsp { config } => {
            let config = config.as_deref().map(Config::load).transpose()?;
            rt.block_on(genero_lsp::run_server(config))
        }
        Commands::Scan { path, json } => scan::run(&path, json),
        Commands::Check {
            path,
            config,
            no_compile,
        } => {
            let mut config = load_config(config.as_deref())?;
            if no_compile {
                config.compiler.enabled = false;
            }
            rt.block_on(check::run(&path, &config))
        }
    }
}

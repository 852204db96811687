//! tablebind CLI — generate MicroPython bindings for native table operations.

mod commands;

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use env_logger::Env;

#[derive(Parser)]
#[command(
    name = "tablebind",
    version,
    about = "Binding generator for native multi-index table operations"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a C binding module from a manifest
    Generate {
        /// Binding manifest (.bind.toml)
        manifest: String,
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<String>,
        /// Key-type variant to generate; repeat to override the manifest list
        #[arg(long = "variant")]
        variants: Vec<String>,
        /// Write the successful bindings even if some declarations fail
        #[arg(long)]
        keep_going: bool,
    },
    /// Show how a single declaration is marshaled
    Inspect {
        /// Declaration text, e.g. "void db_{0}_remove(int iterator)"
        declaration: String,
        /// Key-type variant substituted into the name
        #[arg(long, default_value = "idx64")]
        variant: String,
        /// Output format (text, json)
        #[arg(long)]
        export: Option<String>,
    },
    /// Write a starter binding manifest
    Init {
        /// Manifest path
        #[arg(long, default_value = "db.bind.toml")]
        path: String,
        /// Runtime module name
        #[arg(long, default_value = "db")]
        module: String,
    },
}

fn main() {
    let cli = Cli::parse();

    logger(Env::default().default_filter_or("info"), cli.verbose).init();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// `env` (normally `RUST_LOG`) sets the filter; `-v` forces debug.
fn logger(env: Env<'_>, verbose: bool) -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            manifest,
            output,
            variants,
            keep_going,
        } => commands::generate::run(Path::new(&manifest), output.as_deref(), &variants, keep_going),

        Commands::Inspect {
            declaration,
            variant,
            export,
        } => commands::inspect::run(&declaration, &variant, export.as_deref()),

        Commands::Init { path, module } => commands::init::run(Path::new(&path), &module),
    }
}

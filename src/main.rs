//! Sections configuration checker.
//!
//! Loads a TOML sections file, compiles it and either reports conflicts
//! (`check`) or prints the resolved export map as JSON (`export`). Meant to
//! run at build/deploy time so conflicting section configuration never
//! reaches application bootstrap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app_sectioning::config::loader::load_sections;
use app_sectioning::SectionCompiler;

#[derive(Parser)]
#[command(name = "app-sectioning")]
#[command(about = "Compile and validate application section configuration", long_about = None)]
struct Cli {
    /// Path to the sections file.
    #[arg(short, long, default_value = "sections.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the sections and report conflicts
    Check,
    /// Print the resolved section map as JSON
    Export,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "app_sectioning=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let file = load_sections(&cli.config)?;
    tracing::info!(
        config = %cli.config.display(),
        sections = file.sections.len(),
        "sections configuration loaded"
    );

    let mut compiler = SectionCompiler::new();
    for decl in &file.sections {
        match &decl.pattern {
            Some(pattern) => compiler.register_pattern(&decl.name, pattern)?,
            None => compiler.register_config(&decl.name, &decl.config)?,
        };
    }

    if let Err(conflicts) = compiler.process() {
        eprintln!("{conflicts}");
        std::process::exit(1);
    }

    match cli.command {
        Commands::Check => {
            println!("OK: {} section(s), no conflicts", file.sections.len());
        }
        Commands::Export => {
            let resolved = compiler.export()?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
    }

    Ok(())
}

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use pot_harvester::{HarvestPipeline, HarvesterExecutor, SnapshotProvider};
use tracing_subscriber::EnvFilter;

/// Generate a gettext POT template for a Modelica package.
#[derive(Debug, Parser)]
#[command(name = "pot-harvester", version, about)]
struct Arguments {
    /// Package to harvest (dotted names select nested packages)
    #[arg(default_value = "TranslationTest")]
    package: String,

    /// Model tree snapshot (JSON)
    #[arg(short, long)]
    source: PathBuf,

    /// Omit the gettext header block
    #[arg(long)]
    no_header: bool,

    /// Directory receiving <package>.pot
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Arguments::parse();

    let provider = Arc::new(SnapshotProvider::new(args.source));
    let pipeline = HarvestPipeline::new()
        .with_header(!args.no_header)
        .with_output_dir(args.output_dir);

    match HarvesterExecutor::new(1)
        .execute(provider, pipeline, args.package)
        .await
    {
        Ok(result) => {
            println!("{}", result.output_path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

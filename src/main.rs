use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use edutagger::{ClassifyPipeline, Config, PipelineConfig, Taxonomy};

#[derive(Parser, Debug)]
#[command(name = "edutagger")]
#[command(version = "0.1.0")]
#[command(about = "Classify educational content against the tag taxonomy and annotate it")]
struct Args {
    /// Directory tree of content documents to classify
    input_dir: PathBuf,

    /// Taxonomy definition file (defaults to the bundled rule set)
    #[arg(long)]
    taxonomy: Option<PathBuf>,

    /// Classify and report without writing sidecars or annotations
    #[arg(long)]
    dry_run: bool,

    /// Maximum documents processed concurrently
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("edutagger=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(path) = args.taxonomy {
        config.taxonomy_path = Some(path);
    }
    if let Some(limit) = args.concurrency {
        config.concurrency_limit = limit;
    }
    config.dry_run = args.dry_run;

    // Taxonomy load failure is the one condition that aborts before any
    // document is touched.
    let taxonomy = match &config.taxonomy_path {
        Some(path) => {
            tracing::info!("Loading taxonomy from {}", path.display());
            Arc::new(Taxonomy::load(path)?)
        }
        None => Taxonomy::bundled()?,
    };

    let pipeline = ClassifyPipeline::new(taxonomy, PipelineConfig::from(&config));

    tracing::info!("Classifying documents under {}", args.input_dir.display());
    let report = pipeline.run(&args.input_dir).await?;

    println!(
        "Processed {} document(s), {} skipped, {} failed",
        report.processed,
        report.skipped,
        report.failures.len()
    );
    for (path, cause) in &report.failures {
        println!("  failed: {}: {}", path.display(), cause);
    }

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

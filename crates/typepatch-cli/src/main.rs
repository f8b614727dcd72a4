mod config;
mod report;
mod scan;
mod walk;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;
use typepatch_ai::{HttpGenerator, PatchRequestor, SamplingConfig};
use typepatch_core::CheckRegistry;

use crate::config::Settings;
use crate::scan::Scanner;

#[derive(Parser)]
#[command(
    name = "typepatch",
    version,
    about = "Find type-annotated Python functions without runtime checks and ask a local model to patch them",
    long_about = "Scans ROOT for .py files, reports every function whose annotated parameters are never \
                  checked with isinstance(), and includes a model-proposed patch for each.\n\n\
                  The report is written to ./patches.txt. The inference server is read from \
                  TYPEPATCH_ENDPOINT (default http://127.0.0.1:8080)."
)]
struct Cli {
    /// Directory (or single .py file) to scan
    root: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(root) = cli.root else {
        eprintln!("{}", Cli::command().render_usage());
        std::process::exit(1);
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    info!("typepatch v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::from_env();
    let root = std::fs::canonicalize(&root)
        .with_context(|| format!("resolving scan root {}", root.display()))?;

    let generator = HttpGenerator::new(settings.endpoint.clone(), SamplingConfig::default());
    info!(endpoint = generator.base_url(), root = %root.display(), "starting scan");
    let mut scanner = Scanner::new(PatchRequestor::new(generator), CheckRegistry::builtin())?;

    let file = File::create(&settings.report_path)
        .with_context(|| format!("creating {}", settings.report_path.display()))?;
    let mut out = BufWriter::new(file);
    let summary = scanner.scan_root(&root, &mut out).await?;
    out.flush().context("flushing report")?;

    info!(
        files = summary.files,
        functions = summary.functions,
        suspects = summary.suspects,
        "scan complete"
    );
    println!("Done. Results saved to {}", settings.report_path.display());
    Ok(())
}

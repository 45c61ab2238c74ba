use anyhow::bail;
use clap::Parser;
use kobo_common::{Exporter, Renderer};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Export Kobo highlights to one markdown note per book")]
struct Cli {
    /// The e-reader database, usually `.kobo/KoboReader.sqlite` on the device
    source: PathBuf,

    /// Directory the notes and the import ledger are written to
    #[arg(long, short, env = "KOBO_EXPORT_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Directory holding `book.md.tera` and `annotations.md.tera` to use instead
    /// of the built-in templates
    #[arg(long, env = "KOBO_EXPORT_TEMPLATE_DIR")]
    template_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let renderer = match &cli.template_dir {
        Some(dir) => Renderer::from_dir(dir)?,
        None => Renderer::new()?,
    };

    let exporter = Exporter::new(&cli.output_dir, renderer);
    let summary = exporter.run(&cli.source).await?;

    info!(
        "Imported {} new annotations into {} books",
        summary.total_imported(),
        summary.books.len()
    );

    if !summary.is_successful() {
        let skipped: Vec<_> = summary.failures.iter().map(|f| f.book.as_str()).collect();
        warn!("Skipped {}, re-run once fixed", skipped.join(", "));
    }

    if summary.all_failed() {
        bail!("Every book failed to export ({} skipped)", summary.failures.len());
    }

    Ok(())
}

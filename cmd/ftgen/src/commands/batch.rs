//! Batch command implementation.

use super::{render, OutputFormat, ParamArgs};
use anyhow::{Context, Result};
use ft_generator::{generate_batch, BatchOptions};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// One line of `manifest.csv`.
#[derive(Serialize)]
struct ManifestRow {
    index: usize,
    seed: u64,
    status: &'static str,
    fingerprint: Option<String>,
    gates: Option<usize>,
    basic_events: Option<usize>,
    house_events: Option<usize>,
    ccf_groups: Option<usize>,
    error: Option<String>,
}

/// Runs the batch command.
pub async fn run(
    args: &ParamArgs,
    count: usize,
    out_dir: &str,
    prefix: &str,
    parallelism: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let params = args.resolve()?;
    let factors = Arc::new(
        params
            .to_factors()
            .with_context(|| "Invalid generation parameters")?,
    );

    let out_dir = Path::new(out_dir);
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let cancel = Arc::new(AtomicBool::new(false));
    let mut options = BatchOptions::default()
        .with_count(count)
        .with_base_seed(params.seed)
        .with_name_prefix(prefix)
        .with_timeout(params.timeout())
        .with_cancel_flag(Arc::clone(&cancel));
    if let Some(parallelism) = parallelism {
        options = options.with_parallelism(parallelism);
    }

    // Handle Ctrl+C
    let signal = {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received shutdown signal, cancelling unfinished trees");
                cancel.store(true, Ordering::SeqCst);
            }
        })
    };

    info!("Generating {} trees into {}", count, out_dir.display());
    let items = generate_batch(Arc::clone(&factors), options).await;
    signal.abort();

    let mut manifest = csv::Writer::from_path(out_dir.join("manifest.csv"))
        .with_context(|| "Failed to create manifest.csv")?;
    let mut failed = 0;
    for item in &items {
        let row = match &item.outcome {
            Ok(tree) => {
                let path = out_dir.join(format!("{}.{}", tree.name(), format.extension()));
                let text = render(tree, &factors, item.seed, format)?;
                fs::write(&path, text)
                    .with_context(|| format!("Failed to write tree file: {}", path.display()))?;
                let size = tree.size_summary();
                ManifestRow {
                    index: item.index,
                    seed: item.seed,
                    status: "ok",
                    fingerprint: Some(format!("{:016x}", tree.fingerprint())),
                    gates: Some(size.total_gates),
                    basic_events: Some(size.basic_events),
                    house_events: Some(size.house_events),
                    ccf_groups: Some(size.ccf_groups),
                    error: None,
                }
            }
            Err(e) => {
                failed += 1;
                error!("Tree {} (seed {}) failed: {}", item.index, item.seed, e);
                ManifestRow {
                    index: item.index,
                    seed: item.seed,
                    status: if e.is_recoverable() { "failed" } else { "error" },
                    fingerprint: None,
                    gates: None,
                    basic_events: None,
                    house_events: None,
                    ccf_groups: None,
                    error: Some(e.to_string()),
                }
            }
        };
        manifest
            .serialize(row)
            .with_context(|| "Failed to write manifest row")?;
    }
    manifest.flush().with_context(|| "Failed to flush manifest.csv")?;

    info!(
        "Wrote {} of {} trees to {}",
        items.len() - failed,
        count,
        out_dir.display()
    );
    if failed > 0 {
        anyhow::bail!("{failed} of {count} trees failed; see manifest.csv");
    }
    Ok(())
}

//! Generate command implementation.

use super::{render, OutputFormat, ParamArgs};
use anyhow::{Context, Result};
use ft_generator::generate;
use std::fs;
use tracing::info;

/// Runs the generate command.
pub fn run(
    args: &ParamArgs,
    name: &str,
    root: &str,
    out: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let params = args.resolve()?;
    let factors = params
        .to_factors()
        .with_context(|| "Invalid generation parameters")?;

    info!(
        "Generating '{}' with {} basic events (seed {})",
        name, params.num_basic, params.seed
    );
    let options = params.build_options(name).with_top_gate_name(root);
    let tree = generate(&factors, &options).with_context(|| "Fault tree generation failed")?;

    let text = render(&tree, &factors, params.seed, format)?;
    match out {
        Some(path) => {
            fs::write(path, &text)
                .with_context(|| format!("Failed to write output file: {path}"))?;
            info!("Fault tree written to: {}", path);
        }
        None => println!("{text}"),
    }

    Ok(())
}

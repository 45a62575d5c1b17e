//! Command implementations and the flags they share.

pub mod batch;
pub mod generate;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, ValueEnum};
use ft_generator::{CalculatedFactors, GenerationParams};
use ft_model::{CcfModel, FaultTree, Summary};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Rendering of a generated tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Document with header, summary and tree as JSON.
    Json,
    /// Same document as YAML.
    Yaml,
    /// Boolean formulas, one gate per line.
    Formula,
    /// Size and complexity report.
    Summary,
}

impl OutputFormat {
    /// File extension used by batch output.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Formula => "txt",
            Self::Summary => "summary.txt",
        }
    }
}

/// Generation parameters: an optional file plus per-field overrides.
#[derive(Debug, Args)]
pub struct ParamArgs {
    /// Parameter file (YAML or JSON, by extension)
    #[arg(long)]
    pub config: Option<String>,

    /// Average number of arguments per gate
    #[arg(short = 'a', long)]
    pub num_args: Option<f64>,

    /// Number of basic events
    #[arg(short = 'b', long)]
    pub num_basic: Option<usize>,

    /// Number of house events
    #[arg(long)]
    pub num_house: Option<usize>,

    /// Number of CCF groups
    #[arg(long)]
    pub num_ccf: Option<usize>,

    /// CCF model (MGL or alpha-factor)
    #[arg(long)]
    pub ccf_model: Option<CcfModel>,

    /// Maximum members per CCF group
    #[arg(long)]
    pub ccf_size: Option<usize>,

    /// Gate weights for and, or, atleast, not, xor
    #[arg(short, long, value_delimiter = ',')]
    pub weights: Option<Vec<f64>>,

    /// Fraction of common basic events
    #[arg(long)]
    pub common_b: Option<f64>,

    /// Fraction of common gates
    #[arg(long)]
    pub common_g: Option<f64>,

    /// Average parents of common basic events
    #[arg(long)]
    pub parents_b: Option<f64>,

    /// Average parents of common gates
    #[arg(long)]
    pub parents_g: Option<f64>,

    /// Minimum basic event probability
    #[arg(long)]
    pub min_prob: Option<f64>,

    /// Maximum basic event probability
    #[arg(long)]
    pub max_prob: Option<f64>,

    /// Seed of the random stream
    #[arg(short, long, env = "FTGEN_SEED")]
    pub seed: Option<u64>,

    /// Fix the total number of gates
    #[arg(long)]
    pub num_gate: Option<usize>,

    /// Time budget per tree in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl ParamArgs {
    /// Loads the parameter file, if any, and applies the flag overrides.
    pub fn resolve(&self) -> Result<GenerationParams> {
        let mut params = match &self.config {
            Some(path) => load_params(Path::new(path))?,
            None => GenerationParams::default(),
        };

        macro_rules! override_with {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    params.$field = value;
                })*
            };
        }
        override_with!(
            num_args, num_basic, num_house, num_ccf, ccf_model, ccf_size, common_b, common_g,
            parents_b, parents_g, min_prob, max_prob, seed
        );
        if let Some(weights) = &self.weights {
            params.weights.clone_from(weights);
        }
        if self.num_gate.is_some() {
            params.num_gate = self.num_gate;
        }
        if self.timeout_ms.is_some() {
            params.timeout_ms = self.timeout_ms;
        }

        debug!(?params, "resolved generation parameters");
        Ok(params)
    }
}

fn load_params(path: &Path) -> Result<GenerationParams> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameter file: {}", path.display()))?;
    let params = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON parameters: {}", path.display()))?,
        Some("yaml" | "yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML parameters: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unknown parameter file type: {}. Use .yaml, .yml or .json.",
            path.display()
        ),
    };
    Ok(params)
}

/// Header and payload written for every generated tree.
#[derive(Serialize)]
struct TreeDocument<'a> {
    generated_at: String,
    seed: u64,
    fingerprint: String,
    factors: &'a CalculatedFactors,
    summary: Summary,
    tree: &'a FaultTree,
}

/// Renders `tree` in the requested format.
pub fn render(
    tree: &FaultTree,
    factors: &CalculatedFactors,
    seed: u64,
    format: OutputFormat,
) -> Result<String> {
    let document = || TreeDocument {
        generated_at: Utc::now().to_rfc3339(),
        seed,
        fingerprint: format!("{:016x}", tree.fingerprint()),
        factors,
        summary: tree.summary(),
        tree,
    };
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&document())?,
        OutputFormat::Yaml => serde_yaml::to_string(&document())?,
        OutputFormat::Formula => tree
            .to_formula_text()
            .with_context(|| "Failed to render formulas")?,
        OutputFormat::Summary => summary_report(tree),
    };
    Ok(text)
}

fn summary_report(tree: &FaultTree) -> String {
    let Summary { size, complexity } = tree.summary();
    let mut out = String::new();
    let _ = writeln!(out, "Fault tree: {}", tree.name());
    let _ = writeln!(out, "Fingerprint: {:016x}", tree.fingerprint());
    let _ = writeln!(out);
    let _ = writeln!(out, "Size");
    let _ = writeln!(out, "  basic events:  {}", size.basic_events);
    let _ = writeln!(out, "  house events:  {}", size.house_events);
    let _ = writeln!(out, "  CCF groups:    {}", size.ccf_groups);
    let _ = writeln!(out, "  gates:         {}", size.total_gates);
    let types = size.gate_types;
    let _ = writeln!(
        out,
        "    and {} / or {} / atleast {} / not {} / xor {}",
        types.and, types.or, types.atleast, types.not, types.xor
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Complexity");
    let _ = writeln!(out, "  basic events per gate:   {:.3}", complexity.basic_to_gate_ratio);
    let _ = writeln!(out, "  avg. gate arguments:     {:.3}", complexity.avg_gate_arguments);
    let _ = writeln!(out, "  common basic events:     {}", complexity.common_basic_events);
    let _ = writeln!(out, "  common gates:            {}", complexity.common_gates);
    let _ = writeln!(out, "  basic argument fraction: {:.3}", complexity.frac_basic_arguments);
    let _ = writeln!(out, "  common basic fraction:   {:.3}", complexity.frac_common_basic);
    let _ = writeln!(out, "  common gate fraction:    {:.3}", complexity.frac_common_gates);
    if let Some(avg) = complexity.avg_parents_common_basic {
        let _ = writeln!(out, "  parents per common basic: {avg:.3}");
    }
    if let Some(avg) = complexity.avg_parents_common_gates {
        let _ = writeln!(out, "  parents per common gate:  {avg:.3}");
    }
    out
}

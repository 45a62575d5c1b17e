//! ftgen CLI - synthetic fault tree generator.
//!
//! Commands:
//! - `ftgen generate` - Generate one fault tree
//! - `ftgen batch` - Generate many fault trees concurrently

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{OutputFormat, ParamArgs};

#[derive(Parser)]
#[command(name = "ftgen")]
#[command(about = "Generate synthetic fault trees with controlled complexity factors")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a single fault tree
    Generate {
        #[command(flatten)]
        params: ParamArgs,

        /// Name of the generated system
        #[arg(short, long, default_value = "Autogenerated")]
        name: String,

        /// Name of the top gate
        #[arg(long, default_value = "root")]
        root: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<String>,

        /// Output format (json, yaml, formula or summary)
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Generate independent fault trees concurrently
    Batch {
        #[command(flatten)]
        params: ParamArgs,

        /// Number of trees
        #[arg(short, long, default_value_t = 10)]
        count: usize,

        /// Output directory
        #[arg(short, long, default_value = "trees")]
        out_dir: String,

        /// Tree name prefix
        #[arg(long, default_value = "Autogenerated")]
        prefix: String,

        /// Maximum trees generated at once
        #[arg(short = 'j', long)]
        parallelism: Option<usize>,

        /// Output format of each tree (json, yaml, formula or summary)
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            params,
            name,
            root,
            out,
            format,
        } => commands::generate::run(&params, &name, &root, out.as_deref(), format),
        Commands::Batch {
            params,
            count,
            out_dir,
            prefix,
            parallelism,
            format,
        } => commands::batch::run(&params, count, &out_dir, &prefix, parallelism, format).await,
    }
}

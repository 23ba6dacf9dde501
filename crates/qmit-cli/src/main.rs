//! qmit Command-Line Interface
//!
//! Runs the RAW / DD / ZNE / HYBRID mitigation pipeline on the ideal
//! statevector executor and exposes the individual circuit transforms.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{fold, pad, run, version};

/// qmit - hybrid zero-noise extrapolation and dynamical decoupling
#[derive(Parser)]
#[command(name = "qmit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all four mitigation strategies on a circuit
    Run {
        /// Circuit JSON file, or a built-in name (bell, ghz<N>, grover3)
        #[arg(short, long)]
        input: String,

        /// Configuration file (YAML or JSON)
        #[arg(short, long, env = "QMIT_CONFIG")]
        config: Option<String>,

        /// Override the number of shots
        #[arg(short, long)]
        shots: Option<u32>,

        /// Override the noise-scale factors (comma separated, starting at 1)
        #[arg(long, value_delimiter = ',')]
        scales: Option<Vec<u32>>,

        /// Override the pulse sequence (xx, xy4)
        #[arg(long)]
        sequence: Option<String>,

        /// Target outcome, highest classical bit first
        #[arg(short, long)]
        target: Option<String>,

        /// Sample with this seed instead of returning exact probabilities
        #[arg(long)]
        seed: Option<u64>,

        /// Execute stages one after another
        #[arg(long)]
        sequential: bool,

        /// Export the report as JSON
        #[arg(short, long)]
        export: Option<String>,
    },

    /// Fold a circuit to a noise-scale factor
    Fold {
        /// Circuit JSON file, or a built-in name (bell, ghz<N>, grover3)
        #[arg(short, long)]
        input: String,

        /// Odd noise-scale factor
        #[arg(short, long, default_value = "3")]
        scale: u32,

        /// Folding policy (exact, local)
        #[arg(short, long, default_value = "exact")]
        policy: String,

        /// Output file (JSON)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Insert dynamical-decoupling pulses into idle windows
    Pad {
        /// Circuit JSON file, or a built-in name (bell, ghz<N>, grover3)
        #[arg(short, long)]
        input: String,

        /// Configuration file supplying durations and the pulse sequence
        #[arg(short, long, env = "QMIT_CONFIG")]
        config: Option<String>,

        /// Override the pulse sequence (xx, xy4)
        #[arg(long)]
        sequence: Option<String>,

        /// Output file (JSON)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run {
            input,
            config,
            shots,
            scales,
            sequence,
            target,
            seed,
            sequential,
            export,
        } => {
            let overrides = run::Overrides {
                shots,
                scales,
                sequence,
                target,
                seed,
                sequential,
            };
            run::execute(&input, config.as_deref(), overrides, export.as_deref()).await
        }

        Commands::Fold {
            input,
            scale,
            policy,
            output,
        } => fold::execute(&input, scale, &policy, output.as_deref()),

        Commands::Pad {
            input,
            config,
            sequence,
            output,
        } => pad::execute(
            &input,
            config.as_deref(),
            sequence.as_deref(),
            output.as_deref(),
        ),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

//! serpe: parse, trigger and quantize rhythm notation from the command line,
//! or explore it interactively.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serpe::commands::render_result;
use serpe::{config, repl};
use serpe_core::{Pattern, Session};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "serpe")]
#[command(about = "Rhythm pattern notation: generators, codecs and progressive evolution")]
#[command(version)]
struct Cli {
    /// TOML file with engine settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// State store capacity (overrides the config file)
    #[arg(long, global = true)]
    capacity: Option<usize>,

    /// Seed for unseeded random generators and lengthening
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse notation and print the pattern with its codec forms
    Parse {
        notation: String,
    },

    /// Parse notation, then trigger it repeatedly
    Trigger {
        notation: String,

        /// Number of triggers
        #[arg(short, long, default_value_t = 1)]
        times: usize,
    },

    /// Re-quantize a binary pattern onto a new step count
    Quantize {
        /// Binary pattern, e.g. 10010010
        pattern: String,

        steps: usize,

        #[arg(long)]
        counter_clockwise: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("serpe=info")))
        .init();

    let cli = Cli::parse();
    let config = config::resolve(cli.config.as_deref(), cli.capacity, cli.seed)?;

    match cli.command {
        None => repl::start(config),
        Some(Commands::Parse { notation }) => {
            let result = Session::new(config).parse(&notation);
            println!("{}", render_result(&result));
            if !result.is_valid {
                bail!("invalid notation");
            }
            Ok(())
        }
        Some(Commands::Trigger { notation, times }) => {
            let mut session = Session::new(config);
            let result = session.parse(&notation);
            println!("{}", render_result(&result));
            if !result.is_valid {
                bail!("invalid notation");
            }
            for n in 1..=times {
                let pattern = session.trigger(&notation)?;
                println!("{:>4}  {}  {}", n, pattern.grid(), pattern);
            }
            Ok(())
        }
        Some(Commands::Quantize {
            pattern,
            steps,
            counter_clockwise,
        }) => {
            let pattern: Pattern = pattern.parse()?;
            let result = Session::new(config).quantize(&pattern, steps, !counter_clockwise)?;
            let metrics = result.metrics();
            println!("{} -> {}", pattern, result.pattern);
            println!(
                "onsets kept: {}/{}, conflicts: {}, density change {:+.3}",
                result.quantized_onset_count,
                result.original_onset_count,
                metrics.conflict_count,
                metrics.density_change
            );
            Ok(())
        }
    }
}

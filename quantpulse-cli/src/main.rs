//! quantpulse CLI — fetch history and run single-symbol analysis.
//!
//! Commands:
//! - `history` — fetch a canonical daily-bar series through the fallback chain
//! - `analyze` — run the full pipeline: signal, risk levels, position plan
//!
//! Output is JSON on stdout; diagnostics go to stderr via tracing.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use quantpulse_core::Analyzer;

#[derive(Parser)]
#[command(
    name = "quantpulse",
    about = "quantpulse CLI — multi-source equity analysis pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch daily history for a bare exchange code (e.g. 600000, 00700).
    History {
        /// Bare exchange code; 5-digit codes route to the Hong Kong chain.
        code: String,

        /// Print only the trailing N bars.
        #[arg(long)]
        tail: Option<usize>,
    },
    /// Analyze one symbol: indicators, signal, risk levels, position plan.
    Analyze {
        /// Bare exchange code; 5-digit codes route to the Hong Kong chain.
        code: String,

        /// Account balance used for position sizing.
        #[arg(long, default_value_t = 100_000.0)]
        balance: f64,

        /// Fraction of the balance risked per trade.
        #[arg(long, default_value_t = 0.01)]
        risk: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let analyzer = Analyzer::default();

    match cli.command {
        Commands::History { code, tail } => {
            let bars = analyzer.fetch_history(&code);
            if bars.is_empty() {
                bail!("no data available for {code}");
            }
            let start = tail.map_or(0, |t| bars.len().saturating_sub(t));
            println!("{}", serde_json::to_string_pretty(&bars[start..])?);
        }
        Commands::Analyze {
            code,
            balance,
            risk,
        } => {
            if balance <= 0.0 {
                bail!("balance must be positive");
            }
            if !(0.0..=1.0).contains(&risk) || risk == 0.0 {
                bail!("risk must be in (0, 1]");
            }
            let outcome = analyzer.analyze(&code, balance, risk);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}

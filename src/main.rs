mod analyzer;
mod config;
mod error;
mod indicator;
mod model;
mod notifier;
mod precision;
mod provider;
mod strategy;

use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use analyzer::{Analyzer, AnalyzerSettings};
use config::AppConfig;
use notifier::{Notifier, build_notifier};
use provider::{MarketDataProvider, build_provider};

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("provider setup error")]
    Provider,
    #[display("runtime error")]
    Runtime,
}

#[derive(Parser)]
#[command(name = "candle-signal", about = "Candle-based trading signal analyzer")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Output format
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one or more symbols concurrently, e.g. `analyze SOLUSDT ARB`
    Analyze {
        #[arg(required = true)]
        symbols: Vec<String>,
    },
    /// Read one symbol per line from stdin until EOF or Ctrl-C
    Interactive,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = config::load(Path::new(&cli.config)).change_context(AppError::Config)?;

    init_tracing(&config);

    let provider: Arc<dyn MarketDataProvider> = build_provider(&config.provider)
        .map(Arc::from)
        .ok_or_else(|| Report::new(AppError::Provider))
        .attach_with(|| format!("provider: {}", config.provider.name))?;

    info!(
        provider = provider.name(),
        timeframe = %config.analysis.timeframe(),
        lookback = config.analysis.lookback,
        "analyzer ready"
    );

    let analyzer = Arc::new(
        Analyzer::new(provider, AnalyzerSettings::from_config(&config))
            .change_context(AppError::Config)?,
    );
    let notifier: Arc<dyn Notifier> = Arc::from(build_notifier(&cli.format));

    match cli.command {
        Command::Analyze { symbols } => analyze_all(analyzer, notifier, symbols).await,
        Command::Interactive => interactive(analyzer, notifier).await,
    }
}

fn init_tracing(config: &AppConfig) {
    // Logs go to stderr so stdout carries only rendered results
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// One task per symbol; results are reported in input order.
async fn analyze_all(
    analyzer: Arc<Analyzer>,
    notifier: Arc<dyn Notifier>,
    symbols: Vec<String>,
) -> Result<(), Report<AppError>> {
    let handles: Vec<_> = symbols
        .into_iter()
        .map(|symbol| {
            let analyzer = Arc::clone(&analyzer);
            tokio::spawn(async move {
                let outcome = analyzer.analyze(&symbol).await;
                (symbol, outcome)
            })
        })
        .collect();

    for handle in handles {
        let (symbol, outcome) = handle.await.change_context(AppError::Runtime)?;
        match outcome {
            Ok(result) => notifier.notify(&result),
            Err(report) => notifier.notify_failure(&symbol, &report),
        }
    }
    Ok(())
}

const HELP_TEXT: &str = "Send a symbol to analyze, for example:\nSOLUSDT, ARBUSDT, OPUSDT\n/quit exits.";

async fn interactive(
    analyzer: Arc<Analyzer>,
    notifier: Arc<dyn Notifier>,
) -> Result<(), Report<AppError>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP_TEXT}");

    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl+c received, shutting down");
                break;
            }
            line = lines.next_line() => line.change_context(AppError::Runtime)?,
        };

        let Some(line) = line else {
            break;
        };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/start" | "/help" => println!("{HELP_TEXT}"),
            input => match analyzer.analyze(input).await {
                Ok(result) => notifier.notify(&result),
                Err(report) => notifier.notify_failure(input, &report),
            },
        }
    }

    Ok(())
}

//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::analysis::{analyze, BacktestResponse};
use crate::domain::basket::{parse_assets, AnalysisRequest};
use crate::domain::error::FoliobackError;
use crate::domain::history::HistoryEntry;
use crate::domain::metrics::AnalysisResult;
use crate::ports::candle_port::CandleSource;
use crate::ports::config_port::ConfigPort;
use crate::ports::history_port::{HistoryReader, HistorySink};
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "folioback", about = "Buy-and-hold asset allocation backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest the configured basket
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        benchmark: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List saved backtests for a user
    History {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        user: String,
    },
    /// Load a date,close CSV into the SQLite candle table
    Import {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show candle count and date range for a code
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
    },
}

/// Installs the global tracing subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Analyze {
            config,
            benchmark,
            user,
            output,
        } => run_analyze(&config, benchmark.as_deref(), user.as_deref(), output.as_deref()),
        Command::History { config, user } => run_history(&config, &user),
        Command::Import { config, code, csv } => run_import(&config, &code, &csv),
        Command::Info { config, code } => run_info(&config, &code),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Candle source and optional history store selected by configuration.
pub struct Backends {
    pub source: Box<dyn CandleSource>,
    pub sink: Option<Box<dyn HistorySink>>,
    pub reader: Option<Box<dyn HistoryReader>>,
}

fn source_kind(config: &dyn ConfigPort) -> String {
    config
        .get_non_blank("data", "source")
        .unwrap_or_else(|| "sqlite".to_string())
        .to_lowercase()
}

fn csv_source(config: &dyn ConfigPort, kind: &str) -> Result<Box<dyn CandleSource>, FoliobackError> {
    match kind {
        "csv" => {
            let dir = config.require_string("data", "csv_dir")?;
            Ok(Box::new(CsvAdapter::new(PathBuf::from(dir))))
        }
        other => Err(FoliobackError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown source '{other}' (expected sqlite or csv)"),
        }),
    }
}

/// Opens at most one SQLite pool; its adapter backs the candle source (for
/// `source = sqlite`) and the history ports whenever `[sqlite] path` is set.
#[cfg(feature = "sqlite")]
pub fn open_backends(config: &dyn ConfigPort) -> Result<Backends, FoliobackError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    let kind = source_kind(config);
    let store = if kind == "sqlite" || config.get_non_blank("sqlite", "path").is_some() {
        Some(SqliteAdapter::from_config(config)?)
    } else {
        None
    };

    let source: Box<dyn CandleSource> = match &store {
        Some(adapter) if kind == "sqlite" => Box::new(adapter.clone()),
        _ => csv_source(config, &kind)?,
    };
    let sink = store
        .clone()
        .map(|adapter| Box::new(adapter) as Box<dyn HistorySink>);
    let reader = store.map(|adapter| Box::new(adapter) as Box<dyn HistoryReader>);

    Ok(Backends {
        source,
        sink,
        reader,
    })
}

#[cfg(not(feature = "sqlite"))]
pub fn open_backends(config: &dyn ConfigPort) -> Result<Backends, FoliobackError> {
    let kind = source_kind(config);
    if kind == "sqlite" {
        return Err(sqlite_required());
    }
    Ok(Backends {
        source: csv_source(config, &kind)?,
        sink: None,
        reader: None,
    })
}

#[cfg(not(feature = "sqlite"))]
fn sqlite_required() -> FoliobackError {
    FoliobackError::ConfigInvalid {
        section: "data".into(),
        key: "source".into(),
        reason: "sqlite feature is required".into(),
    }
}

pub fn build_request(
    config: &dyn ConfigPort,
    benchmark_override: Option<&str>,
) -> Result<AnalysisRequest, FoliobackError> {
    let seed_money = config.get_double("analysis", "seed_money", 0.0);
    if seed_money < 1.0 {
        return Err(FoliobackError::ConfigInvalid {
            section: "analysis".into(),
            key: "seed_money".into(),
            reason: "seed_money must be at least 1".into(),
        });
    }

    let period_months = config.get_int("analysis", "period_months", 0);
    if period_months < 1 || period_months > i64::from(u32::MAX) {
        return Err(FoliobackError::ConfigInvalid {
            section: "analysis".into(),
            key: "period_months".into(),
            reason: "period_months must be a positive integer".into(),
        });
    }

    let assets = parse_assets(&config.require_string("analysis", "assets")?)?;

    let benchmark_code = benchmark_override
        .map(str::to_string)
        .or_else(|| config.get_non_blank("analysis", "benchmark"))
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty());

    Ok(AnalysisRequest {
        seed_money,
        period_months: period_months as u32,
        benchmark_code,
        assets,
    })
}

fn run_analyze(
    config_path: &Path,
    benchmark: Option<&str>,
    user: Option<&str>,
    output: Option<&Path>,
) -> Result<(), FoliobackError> {
    eprintln!("Loading config from {}", config_path.display());
    let config = FileConfigAdapter::from_file(config_path)?;
    let request = build_request(&config, benchmark)?;
    let backends = open_backends(&config)?;

    let identity = user
        .map(str::to_string)
        .or_else(|| config.get_non_blank("analysis", "user"));

    eprintln!(
        "Analyzing {} assets over {} months...",
        request.assets.len(),
        request.period_months
    );
    let response = analyze(
        backends.source.as_ref(),
        backends.sink.as_deref(),
        &request,
        identity.as_deref(),
    )?;

    print_response(&request, &response);

    let output = output
        .map(Path::to_path_buf)
        .or_else(|| config.get_non_blank("report", "output").map(PathBuf::from));
    if let Some(path) = output {
        let pretty = config.get_bool("report", "pretty", true);
        JsonReportAdapter::new(pretty).write(&response, &path.to_string_lossy())?;
        eprintln!("\nReport written to: {}", path.display());
    }
    Ok(())
}

fn print_response(request: &AnalysisRequest, response: &BacktestResponse) {
    println!("=== Portfolio ===");
    print_result(&response.portfolio);

    match (&response.benchmark, request.benchmark()) {
        (Some(bm), Some(code)) => {
            println!("\n=== Benchmark ({}) ===", code);
            print_result(bm);
        }
        (None, Some(code)) => println!("\nBenchmark {}: no data", code),
        _ => {}
    }
}

fn print_result(result: &AnalysisResult) {
    println!("Final Balance:    {}", result.final_balance);
    println!("Total Return:     {:.2}%", result.total_return);
    println!("CAGR:             {:.2}%", result.cagr);
    println!("Max Drawdown:     -{:.2}%", result.mdd);
    println!("Volatility:       {:.2}%", result.volatility);
    println!("Sharpe Ratio:     {:.2}", result.sharpe_ratio);
    if let (Some(first), Some(last)) = (result.equity_curve.first(), result.equity_curve.last()) {
        println!(
            "Period:           {} to {} ({} days)",
            first.date,
            last.date,
            result.equity_curve.len()
        );
    }
}

fn run_history(config_path: &Path, user: &str) -> Result<(), FoliobackError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let reader = history_reader(&config)?;

    let entries: Vec<HistoryEntry> = reader
        .list_by_user(user)?
        .iter()
        .map(HistoryEntry::from)
        .collect();

    if entries.is_empty() {
        eprintln!("No saved backtests for {}", user);
        return Ok(());
    }
    for e in &entries {
        println!(
            "#{:<5} {:<16}  {:<32}  seed {:>12}  {:>3}m  return {:>8.2}%  final {:>12}",
            e.id,
            e.date,
            e.assets_summary,
            e.seed_money,
            e.period_months,
            e.total_return,
            e.final_balance
        );
    }
    eprintln!("{} records", entries.len());
    Ok(())
}

#[cfg(feature = "sqlite")]
fn history_reader(config: &dyn ConfigPort) -> Result<Box<dyn HistoryReader>, FoliobackError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;
    Ok(Box::new(SqliteAdapter::from_config(config)?))
}

#[cfg(not(feature = "sqlite"))]
fn history_reader(_config: &dyn ConfigPort) -> Result<Box<dyn HistoryReader>, FoliobackError> {
    Err(sqlite_required())
}

#[cfg(feature = "sqlite")]
fn run_import(config_path: &Path, code: &str, csv_path: &Path) -> Result<(), FoliobackError> {
    use crate::adapters::csv_adapter::read_candles;
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    let config = FileConfigAdapter::from_file(config_path)?;
    let adapter = SqliteAdapter::from_config(&config)?;
    let candles = read_candles(csv_path)?;
    let code = code.trim().to_uppercase();
    let written = adapter.insert_candles(&code, &candles)?;
    eprintln!("Imported {} candles for {}", written, code);
    Ok(())
}

#[cfg(not(feature = "sqlite"))]
fn run_import(_config_path: &Path, _code: &str, _csv_path: &Path) -> Result<(), FoliobackError> {
    Err(sqlite_required())
}

fn run_info(config_path: &Path, code: &str) -> Result<(), FoliobackError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let backends = open_backends(&config)?;
    let code = code.trim().to_uppercase();

    let candles = backends.source.recent_candles(&code, i64::MAX as usize)?;
    match (candles.first(), candles.last()) {
        (Some(first), Some(last)) => println!(
            "{}: {} candles, {} to {}",
            code,
            candles.len(),
            first.date,
            last.date
        ),
        _ => eprintln!("{}: no data found", code),
    }
    Ok(())
}

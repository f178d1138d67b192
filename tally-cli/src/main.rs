use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tally_core::Flow;
use tally_finance::{PipelineConfig, run_batch};
use tally_ingest::{EntryBook, ParseOptions, dates::parse_date};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod report;
mod store;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "tally", version = VERSION, about = "Monthly ledger and expense forecast from a transactions file")]
struct Cli {
    /// TOML config file (defaults to ./tally.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a transactions file, aggregate by month, forecast expenses and check the threshold
    Analyze {
        /// Transactions file (Date, Type, Amount, Category)
        #[arg(long)]
        file: PathBuf,

        /// Alert when a forecast month's expense exceeds this amount
        #[arg(long)]
        threshold: Option<f64>,

        /// Number of months to forecast
        #[arg(long)]
        horizon: Option<usize>,

        /// Confidence level of the forecast bounds, e.g. 0.95
        #[arg(long)]
        confidence: Option<f64>,

        /// Reject Type labels other than Income/Expense instead of counting them as expenses
        #[arg(long)]
        strict: bool,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Append one transaction to a transactions file (created if missing)
    Add {
        #[arg(long)]
        file: PathBuf,

        /// Transaction date, e.g. 2024-01-31
        #[arg(long)]
        date: String,

        #[arg(long = "type", value_enum, ignore_case = true)]
        flow: FlowArg,

        /// Amount greater than zero
        #[arg(long)]
        amount: f64,

        #[arg(long, default_value = "")]
        category: String,
    },

    /// List the transactions in a file
    Show {
        #[arg(long)]
        file: PathBuf,
    },

    /// Remove every transaction from a file, keeping the header
    Clear {
        #[arg(long)]
        file: PathBuf,
    },

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a config file with default settings
    Init,
    /// Print the effective settings
    Show,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FlowArg {
    Income,
    Expense,
}

impl From<FlowArg> for Flow {
    fn from(arg: FlowArg) -> Self {
        match arg {
            FlowArg::Income => Flow::Income,
            FlowArg::Expense => Flow::Expense,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Analyze {
            file,
            threshold,
            horizon,
            confidence,
            strict,
            json,
        } => {
            let mut settings = cfg.analysis;
            if let Some(t) = threshold {
                settings.threshold = t;
            }
            if let Some(h) = horizon {
                settings.forecast.horizon = h;
            }
            if let Some(c) = confidence {
                settings.forecast.confidence = c;
            }
            if strict {
                settings.parse = ParseOptions::strict();
            }
            analyze(&file, &settings, json)?;
        }

        Command::Add {
            file,
            date,
            flow,
            amount,
            category,
        } => {
            let date = parse_date(&date).ok_or_else(|| anyhow!("invalid date: {date}"))?;
            let mut book = EntryBook::new();
            let added = book.add(date, flow.into(), amount, &category)?;
            store::append_record(&file, added)?;
            println!(
                "Transaction added: {}, {}, {:.2}, {}",
                added.date, added.flow, added.amount, added.category
            );
        }

        Command::Show { file } => {
            if !file.exists() {
                bail!("File not found: {} (pass --file <path>)", file.display());
            }
            let (book, batch) = store::load_book(&file, cfg.analysis.parse)?;
            warn_rejects(&file, &batch.rejects);
            show(&book);
        }

        Command::Clear { file } => {
            let (mut book, _) = store::load_book(&file, cfg.analysis.parse)?;
            let removed = book.len();
            book.clear();
            store::save_book(&file, &book)?;
            println!(
                "Transaction list cleared: removed {} from {}",
                removed,
                file.display()
            );
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(cli.config.as_deref())?,
            ConfigCommand::Show => {
                let s = toml::to_string_pretty(&cfg).context("serialize config")?;
                println!("{}", s.trim_end());
            }
        },
    }

    Ok(())
}

fn analyze(file: &Path, settings: &PipelineConfig, json: bool) -> Result<()> {
    if !file.exists() {
        bail!("File not found: {} (pass --file <path>)", file.display());
    }
    settings.forecast.validate()?;

    let batch = store::read_batch(file, settings.parse)?;
    let report = run_batch(batch, settings);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("# Transactions: {}\n", file.display());
        print!("{}", report::render(&report, settings.threshold)?);
    }
    Ok(())
}

fn show(book: &EntryBook) {
    if book.is_empty() {
        println!("No transactions added yet.");
        return;
    }
    println!("{:<12} {:<8} {:>12}  {}", "Date", "Type", "Amount", "Category");
    for r in book.records() {
        println!(
            "{:<12} {:<8} {:>12.2}  {}",
            r.date.to_string(),
            r.flow.label(),
            r.amount,
            r.category
        );
    }
    println!("\n{} transactions", book.len());
}

fn warn_rejects(file: &Path, rejects: &[tally_ingest::RejectedLine]) {
    if !rejects.is_empty() {
        eprintln!(
            "warning: {} line(s) in {} could not be read",
            rejects.len(),
            file.display()
        );
    }
}

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use portwatch::dashboard::{self, YearSummary};
use portwatch::figures::Dimensions;
use portwatch::{config, Converter, PortwatchError, Result, TableSchema, TradeApi};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "portwatch", version, about = "World trade dashboard over IMF PortWatch data")]
struct Cli {
    /// Log at debug level (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a PortWatch CSV export (optionally .csv.gz) into SQLite
    Convert {
        /// CSV file downloaded from the PortWatch portal
        input: PathBuf,
        /// Database file to create or overwrite
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Table name (overrides the schema's)
        #[arg(long)]
        table: Option<String>,
        /// JSON file describing the expected columns
        #[arg(long)]
        schema: Option<PathBuf>,
    },
    /// Print the headline numbers for a year
    Summary {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long, default_value = config::DEFAULT_TABLE)]
        table: String,
        /// Defaults to the most recent year in the data
        #[arg(long)]
        year: Option<i32>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Render the dashboard as a standalone HTML page
    Dashboard {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long, default_value = config::DEFAULT_TABLE)]
        table: String,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long, default_value_t = config::DEFAULT_WIDTH)]
        width: u32,
        #[arg(long, default_value_t = config::DEFAULT_HEIGHT)]
        height: u32,
        /// HTML file to write
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let mut msg = e.to_string();
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                let text = cause.to_string();
                if !msg.contains(&text) {
                    msg.push_str(&format!(": {text}"));
                }
                source = cause.source();
            }
            error!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Convert {
            input,
            output,
            table,
            schema,
        } => {
            let schema = match schema {
                Some(path) => TableSchema::from_json_file(path)?,
                None => TableSchema::portwatch(),
            };
            let mut converter = Converter::new(schema);
            if let Some(t) = table {
                converter = converter.table(&t);
            }
            let output = output.unwrap_or_else(config::default_db_path);
            let report = converter.convert(&input, &output)?;
            println!(
                "{} rows x {} columns -> {} (table {}) in {:.2?}",
                report.rows,
                report.columns,
                output.display(),
                report.table,
                report.elapsed
            );
        }
        Command::Summary {
            db,
            table,
            year,
            json,
        } => {
            let api = open(db, &table)?;
            let board = api.dashboard();
            let year = match year {
                Some(y) => y,
                None => board.default_year()?,
            };
            let summary = YearSummary::from(&board.year_overview(year)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                let pct = |v: Option<f64>| v.map(|p| format!("{:.1}%", p)).unwrap_or_else(|| "n/a".into());
                println!("Year:                      {}", summary.year);
                println!("Total ship arrivals:       {}", summary.total_port_calls);
                println!("Imports % of total trade:  {}", pct(summary.import_pct));
                println!("Exports % of total trade:  {}", pct(summary.export_pct));
                println!("#1 country's trade share:  {:.1}%", summary.top_share);
                println!("Countries with trade:      {}", summary.countries);
            }
        }
        Command::Dashboard {
            db,
            table,
            year,
            country,
            width,
            height,
            out,
        } => {
            let api = open(db, &table)?;
            let board = api.dashboard().dimensions(Dimensions::new(width, height));
            let year = match year {
                Some(y) => y,
                None => board.default_year()?,
            };
            let overview = board.year_overview(year)?;
            let country = match country {
                Some(c) => c,
                None => board.default_country()?,
            };
            let view = board.country_view(&country)?;
            let html = dashboard::render_html(&overview, Some(&view))?;
            fs::write(&out, html).map_err(|source| PortwatchError::Write {
                path: out.clone(),
                source,
            })?;
            info!(out = %out.display(), year, country = %country, "dashboard written");
        }
    }
    Ok(())
}

fn open(db: Option<PathBuf>, table: &str) -> Result<TradeApi> {
    let mut builder = TradeApi::builder().table(table);
    if let Some(path) = db {
        builder = builder.db_path(path);
    }
    builder.build()
}

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ohlcv_digest::models::{PriceField, WeekStart};
use ohlcv_digest::{analysis, chart, export, loader, weekly};

#[derive(Parser)]
#[command(name = "ohlcv-digest")]
#[command(about = "Summarise, filter, resample and chart daily stock prices", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write every artifact
    Run {
        input: PathBuf,
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,
        #[arg(long, value_enum, default_value_t = WeekStart::Sunday)]
        week_start: WeekStart,
        #[arg(long, default_value = "Stock Candlestick Chart")]
        title: String,
        #[arg(long, default_value_t = ',')]
        delimiter: char,
    },
    /// Print max, min and mean of one column
    Stats {
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = PriceField::Close)]
        field: PriceField,
        #[arg(long, default_value_t = ',')]
        delimiter: char,
    },
    /// Print or export weekly summaries
    Weekly {
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = WeekStart::Sunday)]
        week_start: WeekStart,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, default_value_t = ',')]
        delimiter: char,
    },
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            out_dir,
            week_start,
            title,
            delimiter,
        } => run_pipeline(&input, &out_dir, week_start, &title, delimiter_byte(delimiter)?)?,
        Commands::Stats {
            input,
            field,
            delimiter,
        } => {
            let records = loader::load_records_with(&input, delimiter_byte(delimiter)?)
                .context("loading input data")?;
            let stats = analysis::column_statistics(&records, field)
                .context("computing statistics")?;
            println!(
                "{}: max {}, min {}, mean {:.4} across {} records",
                field.label(),
                stats.max,
                stats.min,
                stats.mean,
                records.len()
            );
        }
        Commands::Weekly {
            input,
            week_start,
            out,
            delimiter,
        } => {
            let records = loader::load_records_with(&input, delimiter_byte(delimiter)?)
                .context("loading input data")?;
            let weeks = weekly::aggregate_weekly_with(&records, week_start);

            match out {
                Some(path) => {
                    export::write_table(&path, &weeks).context("writing weekly data")?;
                    println!("Wrote {} weeks to {}.", weeks.len(), path.display());
                }
                None if weeks.is_empty() => println!("No records to aggregate."),
                None => {
                    for week in &weeks {
                        println!(
                            "- week of {}: avg close {:.4}, volume {} over {} days",
                            week.week_start,
                            week.average_close,
                            week.total_volume,
                            week.trading_days
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

fn run_pipeline(
    input: &Path,
    out_dir: &Path,
    week_start: WeekStart,
    title: &str,
    delimiter: u8,
) -> anyhow::Result<()> {
    let records = loader::load_records_with(input, delimiter).context("loading input data")?;
    info!(records = records.len(), input = %input.display(), "loaded input");

    let stats = analysis::compute_statistics(&records).context("computing statistics")?;
    println!(
        "Max close: {}, Min close: {}, Average close: {:.4}",
        stats.max, stats.min, stats.mean
    );

    export::prepare_output_dir(out_dir).context("preparing output directory")?;

    let filtered =
        analysis::filter_by_average_volume(&records).context("filtering by average volume")?;
    let path = out_dir.join(export::FILTERED_FILE);
    export::write_table(&path, &filtered).context("writing filtered data")?;
    info!(retained = filtered.len(), of = records.len(), "volume filter applied");
    println!("Filtered data saved to {}", path.display());

    let with_day = analysis::with_day_of_week(&records);
    let path = out_dir.join(export::DAY_FILE);
    export::write_table(&path, &with_day).context("writing day-of-week data")?;
    println!("Data with day of week saved to {}", path.display());

    let weeks = weekly::aggregate_weekly_with(&records, week_start);
    let path = out_dir.join(export::WEEKLY_FILE);
    export::write_table(&path, &weeks).context("writing weekly data")?;
    info!(weeks = weeks.len(), ?week_start, "weekly aggregation done");
    println!("Weekly aggregated data saved to {}", path.display());

    let series = chart::to_candlestick_series(&filtered).context("building candlestick series")?;
    let html = chart::render_html(&series, title).context("rendering candlestick chart")?;
    let path = out_dir.join(export::CHART_FILE);
    export::write_text(&path, &html).context("writing candlestick chart")?;
    info!(candles = series.dates.len(), "chart rendered");
    println!("Candlestick chart saved to {}", path.display());

    Ok(())
}

fn delimiter_byte(delimiter: char) -> anyhow::Result<u8> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("delimiter {delimiter:?} must be a single ASCII character"))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ohlcv_digest=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

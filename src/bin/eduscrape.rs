use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use eduscrape::collect::{self, CollectOptions, Collector};
use eduscrape::emit::{self, ArtifactFormat};
use eduscrape::report;
use eduscrape::scraper::WebScraper;

#[derive(Parser)]
#[command(name = "eduscrape")]
#[command(about = "Collects state educational programs and generates site artifacts", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Js,
    Html,
}

impl From<OutputFormat> for ArtifactFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Js => ArtifactFormat::Js,
            OutputFormat::Html => ArtifactFormat::Html,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Collect programs from the listing sites into a CSV plus a text report
    Collect {
        #[arg(
            long,
            default_value = "target_list.json",
            help = "JSON file mapping macro-group ids to specialty codes"
        )]
        target_list: PathBuf,

        #[arg(
            long,
            default_value_t = 50,
            help = "Stop collecting once this many records are gathered"
        )]
        min_programs: usize,

        #[arg(
            long,
            value_name = "SECONDS",
            default_value_t = 2,
            help = "Pause between consecutive external requests"
        )]
        request_delay: u64,

        #[arg(
            short = 'o',
            long = "output",
            default_value = "educational_programs_2024.csv",
            help = "Output CSV path (the report lands next to it)"
        )]
        output: PathBuf,
    },
    /// Generate a site artifact (JS array or HTML fragment) from a CSV export
    Generate {
        #[arg(
            long,
            default_value = "table.csv",
            conflicts_with = "url",
            help = "Local CSV export to read"
        )]
        input: PathBuf,

        #[arg(long, help = "Fetch the CSV export from this URL instead of a local file")]
        url: Option<String>,

        #[arg(
            short = 'f',
            long = "format",
            value_enum,
            default_value = "js",
            help = "Artifact format"
        )]
        format: OutputFormat,

        #[arg(
            short = 'o',
            long = "output",
            help = "Output path (defaults to programs.js or programs.html)"
        )]
        output: Option<PathBuf>,
    },
}

/// The report file sits next to the CSV: `<stem>_report.txt`.
fn report_path(csv_path: &Path) -> PathBuf {
    let stem = csv_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("collection");
    csv_path.with_file_name(format!("{}_report.txt", stem))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    match cli.command {
        Commands::Collect {
            target_list,
            min_programs,
            request_delay,
            output,
        } => {
            let target_list = collect::load_target_list(&target_list).unwrap_or_else(|e| {
                log::error!("{}", e);
                process::exit(1);
            });

            let scraper = WebScraper::new().unwrap_or_else(|e| {
                log::error!("Error creating scraper: {}", e);
                process::exit(1);
            });

            let opts = CollectOptions {
                min_programs,
                request_delay: Duration::from_secs(request_delay),
            };
            let (records, stats) = Collector::new(scraper).run(&target_list, &opts).await;

            if records.is_empty() {
                log::warn!("No programs collected, nothing written");
                return;
            }

            collect::write_records_csv(&output, &records).unwrap_or_else(|e| {
                log::error!("{}", e);
                process::exit(1);
            });

            let report_file = report_path(&output);
            let report_text = report::generate_report(&records, &stats, &target_list);
            std::fs::write(&report_file, report_text).unwrap_or_else(|e| {
                log::error!("Failed to write report: {}", e);
                process::exit(1);
            });
            log::info!("Report saved to {}", report_file.display());

            println!("Collected {} unique program(s)", records.len());
            print!("{}", stats);
        }

        Commands::Generate {
            input,
            url,
            format,
            output,
        } => {
            let rows = match url {
                Some(url) => {
                    let client = reqwest::Client::new();
                    emit::fetch_rows(&client, &url).await
                }
                None => emit::read_rows_from_path(&input),
            }
            .unwrap_or_else(|e| {
                log::error!("{}", e);
                process::exit(1);
            });
            log::info!("Loaded {} row(s)", rows.len());

            let format = ArtifactFormat::from(format);
            let output = output.unwrap_or_else(|| {
                PathBuf::from(match format {
                    ArtifactFormat::Js => "programs.js",
                    ArtifactFormat::Html => "programs.html",
                })
            });

            let today = Local::now().date_naive();
            match emit::transform_rows(&rows, format, &output, today) {
                Ok(Some(count)) => {
                    println!("Generated {} program(s) into {}", count, output.display());
                }
                Ok(None) => {
                    println!("No valid rows in input, output file not written");
                }
                Err(e) => {
                    log::error!("{}", e);
                    process::exit(1);
                }
            }
        }
    }
}

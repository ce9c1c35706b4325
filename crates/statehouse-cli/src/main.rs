use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde::Serialize;
use statehouse::batch::{BatchRunner, ManifestEntry};
use statehouse::config::ScrapeConfig;
use statehouse::dates::DateNormalizer;
use statehouse::history::{SiteVersion, extract_history};
use statehouse::output::{OutputStore, combine::combine, query::query};
use statehouse::scraper::WebScraper;
use statehouse::types::{BillFilter, BillKey, Jurisdiction};
use statehouse::votes::{VoteFormat, extract_roll_call};

#[derive(Parser)]
#[command(name = "statehouse")]
#[command(about = "Normalise state legislature bill history, sponsors and roll-call votes", long_about = None)]
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

    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value = "text",
        global = true,
        help = "Output format"
    )]
    format: OutputFormat,

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

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchemaKind {
    Metadata,
    History,
    Sponsors,
    Votes,
    Query,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalise legislature date strings to YYYY-MM-DD
    Date {
        #[arg(required = true, help = "Raw date strings, e.g. 'Apr-21-1999' or '04/03/97'")]
        dates: Vec<String>,

        #[arg(long, default_value_t = statehouse::dates::TWO_DIGIT_YEAR_PIVOT, help = "Two-digit years above this are 19xx")]
        pivot: u32,
    },
    /// Extract a bill's history from a saved page
    History {
        #[arg(help = "Path to the saved history page")]
        file: PathBuf,

        #[arg(long, value_parser = parse_jurisdiction, help = "Jurisdiction code, e.g. NV")]
        state: Jurisdiction,

        #[arg(long, help = "Session the page belongs to, e.g. 73rd2005")]
        session: String,

        #[arg(long, value_parser = parse_site_version, help = "Page layout; detected from state and session when omitted")]
        site: Option<SiteVersion>,

        #[arg(long, help = "Also print the action tags of each entry")]
        classify: bool,
    },
    /// Extract one roll-call vote from a saved page
    Votes {
        #[arg(help = "Path to the saved vote page or journal text")]
        file: PathBuf,

        #[arg(long, value_parser = parse_jurisdiction, help = "Jurisdiction code, e.g. IL")]
        state: Jurisdiction,

        #[arg(long, help = "Session the vote belongs to")]
        session: String,

        #[arg(long = "bill", help = "Bill identifier, e.g. HB1234")]
        state_bill_id: String,

        #[arg(long = "vote-format", value_parser = parse_vote_format, help = "Vote page layout; defaults to the jurisdiction's")]
        vote_format: Option<VoteFormat>,
    },
    /// Classify an action code or action text
    Classify {
        #[arg(long, value_parser = parse_jurisdiction, help = "Jurisdiction code, e.g. GA")]
        state: Jurisdiction,

        #[arg(required = true, help = "Action codes or texts")]
        actions: Vec<String>,
    },
    /// Scrape every bill in a JSON manifest into the output directory
    Scrape {
        #[arg(help = "Path to the manifest (JSON array of bills)")]
        manifest: PathBuf,

        #[arg(long, help = "Output directory [env: STATEHOUSE_OUTPUT_DIR]")]
        output_dir: Option<PathBuf>,

        #[arg(
            long,
            help = "Bills fetched concurrently [env: STATEHOUSE_CONCURRENCY]",
            value_parser = clap::value_parser!(u16).range(1..)
        )]
        concurrency: Option<u16>,

        #[arg(long, help = "Attempts per request, 1-10 [env: STATEHOUSE_MAX_ATTEMPTS]")]
        max_attempts: Option<u32>,

        #[arg(long, help = "Pause before each request in milliseconds [env: STATEHOUSE_REQUEST_DELAY_MS]")]
        request_delay_ms: Option<u64>,

        #[arg(long, help = "Combine the fragments once the batch finishes")]
        combine: bool,
    },
    /// Merge per-bill fragments into the four aggregate files
    Combine {
        #[arg(long, default_value = statehouse::config::DEFAULT_OUTPUT_DIR, help = "Output directory")]
        dir: PathBuf,
    },
    /// Look up a bill in the combined aggregates
    Query {
        #[arg(long, default_value = statehouse::config::DEFAULT_OUTPUT_DIR, help = "Output directory")]
        dir: PathBuf,

        #[arg(long, help = "Bill uuid, e.g. NV73rd2005AB123")]
        uuid: Option<String>,

        #[arg(long, help = "Jurisdiction code")]
        state: Option<String>,

        #[arg(long, help = "Session")]
        session: Option<String>,

        #[arg(long = "bill", help = "Bill identifier")]
        state_bill_id: Option<String>,
    },
    /// Print the JSON Schema of an output record
    Schema {
        #[arg(value_enum, help = "Record to describe")]
        kind: SchemaKind,
    },
}

fn parse_jurisdiction(s: &str) -> Result<Jurisdiction, String> {
    Jurisdiction::from_str(s).map_err(|e| e.to_string())
}

fn parse_site_version(s: &str) -> Result<SiteVersion, String> {
    SiteVersion::from_str(s).map_err(|e| e.to_string())
}

fn parse_vote_format(s: &str) -> Result<VoteFormat, String> {
    VoteFormat::from_str(s).map_err(|e| e.to_string())
}

fn serialize_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

fn read_input(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        log::error!("Error reading {}: {}", path.display(), e);
        process::exit(1);
    })
}

#[derive(Serialize)]
struct NormalizedDate<'a> {
    raw: &'a str,
    date: String,
    parsed: bool,
}

#[derive(Serialize)]
struct ClassifiedAction<'a> {
    action: &'a str,
    classification: statehouse::actions::Classification,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let format = cli.format;

    match cli.command {
        Commands::Date { dates, pivot } => {
            let normalizer = DateNormalizer::new(pivot);
            let normalized: Vec<NormalizedDate> = dates
                .iter()
                .map(|raw| NormalizedDate {
                    raw,
                    date: normalizer.normalize(raw),
                    parsed: normalizer.parse(raw).is_some(),
                })
                .collect();

            match format {
                OutputFormat::Json => serialize_json(&normalized),
                OutputFormat::Text => {
                    for d in &normalized {
                        let marker = if d.parsed { "" } else { "  (unparsed)" };
                        println!("{:<24} {}{}", d.raw, d.date, marker);
                    }
                }
            }
        }

        Commands::History {
            file,
            state,
            session,
            site,
            classify,
        } => {
            let site = site
                .or_else(|| SiteVersion::for_session(state, &session))
                .unwrap_or_else(|| {
                    log::error!("No history layout known for {} session {}; pass --site", state.code(), session);
                    process::exit(1);
                });
            let profile = state.profile();
            let body = read_input(&file);

            log::info!("Extracting {} history from {}...", site, file.display());
            let history = extract_history(&body, site, &profile).unwrap_or_default();

            match format {
                OutputFormat::Json => serialize_json(&history),
                OutputFormat::Text => {
                    if history.is_empty() {
                        println!("No entries to display.");
                    }
                    let actions = profile.actions();
                    for (i, entry) in history.iter().enumerate() {
                        if classify {
                            println!("{:>3}. {}  [{}]", i + 1, entry, actions.classify(&entry.action));
                        } else {
                            println!("{:>3}. {}", i + 1, entry);
                        }
                    }
                }
            }
        }

        Commands::Votes {
            file,
            state,
            session,
            state_bill_id,
            vote_format,
        } => {
            let vote_format = vote_format
                .or_else(|| VoteFormat::for_jurisdiction(state))
                .unwrap_or_else(|| {
                    log::error!("No vote layout known for {}; pass --vote-format", state.code());
                    process::exit(1);
                });
            let profile = state.profile();
            let body = read_input(&file);

            let roll_call = extract_roll_call(&body, vote_format, &profile, &session).unwrap_or_else(|e| {
                log::error!("Error extracting vote: {}", e);
                process::exit(1);
            });
            let Some(roll_call) = roll_call.found() else {
                log::warn!("No roll call found in {}", file.display());
                process::exit(1);
            };
            let record = roll_call.into_record(BillKey::new(state, &session, &state_bill_id), None, &profile);

            match format {
                OutputFormat::Json => serialize_json(&record),
                OutputFormat::Text => {
                    println!("{}", record);
                    for entry in &record.roll_call {
                        println!("    {:<28} {}", entry.name, entry.response);
                    }
                }
            }
        }

        Commands::Classify { state, actions } => {
            let table = state.profile().actions();
            let classified: Vec<ClassifiedAction> = actions
                .iter()
                .map(|action| ClassifiedAction {
                    action,
                    classification: table.classify(action),
                })
                .collect();

            match format {
                OutputFormat::Json => serialize_json(&classified),
                OutputFormat::Text => {
                    for c in &classified {
                        println!("{:<40} {}", c.action, c.classification);
                    }
                }
            }
        }

        Commands::Scrape {
            manifest,
            output_dir,
            concurrency,
            max_attempts,
            request_delay_ms,
            combine: combine_after,
        } => {
            let mut config = ScrapeConfig::from_env().unwrap_or_else(|e| {
                log::error!("Invalid environment: {}", e);
                process::exit(1);
            });
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(n) = concurrency {
                config.concurrency = usize::from(n);
            }
            if let Some(n) = max_attempts {
                config.max_attempts = n;
            }
            if let Some(ms) = request_delay_ms {
                config.request_delay = Duration::from_millis(ms);
            }
            let config = config.validate().unwrap_or_else(|e| {
                log::error!("Invalid args: {e}");
                process::exit(1);
            });

            let entries: Vec<ManifestEntry> = serde_json::from_str(&read_input(&manifest)).unwrap_or_else(|e| {
                log::error!("Error parsing manifest {}: {}", manifest.display(), e);
                process::exit(1);
            });

            let scraper = WebScraper::new(&config).unwrap_or_else(|e| {
                log::error!("Error creating scraper: {}", e);
                process::exit(1);
            });
            let runner = BatchRunner::new(scraper, OutputStore::new(&config.output_dir), config.concurrency);

            let report = runner.run(entries).await.unwrap_or_else(|e| {
                log::error!("Error writing output: {}", e);
                process::exit(1);
            });

            match format {
                OutputFormat::Json => serialize_json(&report.failures),
                OutputFormat::Text => println!("{}", report),
            }

            if combine_after {
                let summary = combine(&config.output_dir).unwrap_or_else(|e| {
                    log::error!("Error combining output: {}", e);
                    process::exit(1);
                });
                if let OutputFormat::Text = format {
                    println!("{}", summary);
                }
            }
        }

        Commands::Combine { dir } => {
            log::info!("Combining fragments under {}...", dir.display());
            let summary = combine(&dir).unwrap_or_else(|e| {
                log::error!("Error combining output: {}", e);
                process::exit(1);
            });

            match format {
                OutputFormat::Json => {
                    let counts: Vec<serde_json::Value> = summary
                        .collections
                        .iter()
                        .map(|(collection, records, skipped)| {
                            serde_json::json!({
                                "file": collection.aggregate_file(),
                                "records": records,
                                "skipped": skipped,
                            })
                        })
                        .collect();
                    serialize_json(&counts)
                }
                OutputFormat::Text => println!("{}", summary),
            }
        }

        Commands::Query {
            dir,
            uuid,
            state,
            session,
            state_bill_id,
        } => {
            let filter = BillFilter {
                uuid,
                state,
                session,
                state_bill_id,
            };
            let filter = filter.validate().unwrap_or_else(|e| {
                log::error!("Invalid args: {e}");
                process::exit(1);
            });

            let result = query(&dir, &filter).unwrap_or_else(|e| {
                log::error!("Error querying {}: {}", dir.display(), e);
                process::exit(1);
            });

            match format {
                OutputFormat::Json => serialize_json(&result),
                OutputFormat::Text => {
                    if result.is_empty() {
                        println!("No entries to display.");
                    } else {
                        println!("{}", result);
                    }
                }
            }
        }

        Commands::Schema { kind } => {
            let schema = match kind {
                SchemaKind::Metadata => schemars::schema_for!(statehouse::types::BillRecord),
                SchemaKind::History => schemars::schema_for!(statehouse::types::BillHistory),
                SchemaKind::Sponsors => schemars::schema_for!(statehouse::types::BillSponsors),
                SchemaKind::Votes => schemars::schema_for!(statehouse::types::VoteRecord),
                SchemaKind::Query => schemars::schema_for!(statehouse::output::query::QueryResult),
            };
            serialize_json(&schema);
        }
    }
}

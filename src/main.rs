use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use match_tracker::api::state::AppState;
use match_tracker::calculate::{parse_dimensions, Engine};
use match_tracker::config::AppConfig;
use match_tracker::ingest::NewMatch;
use match_tracker::models::{find_season, DateRange, Season, DATE_FORMAT};
use match_tracker::storage::{JsonlStore, RecordSource, ReferenceList, StorageConfig};

#[derive(Parser)]
#[command(name = "match-tracker")]
#[command(about = "Match log with win rate, streak and pivot statistics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,

        /// Log all HTTP requests
        #[arg(long)]
        access_log: bool,
    },

    /// Record a match
    Add {
        #[arg(long)]
        queue: Option<String>,

        #[arg(long)]
        mode: Option<String>,

        #[arg(long)]
        map: Option<String>,

        /// Participant, repeat for each (1 to 5)
        #[arg(long = "player", required = true)]
        players: Vec<String>,

        #[arg(long, conflicts_with = "loss", required_unless_present = "loss")]
        win: bool,

        #[arg(long)]
        loss: bool,

        /// Whether the match was one-sided
        #[arg(long, value_enum, default_value = "unknown")]
        one_sided: OneSidedArg,

        /// Session date (defaults to the current session)
        #[arg(long)]
        date: Option<String>,
    },

    /// Print derived statistics as JSON
    Stats {
        #[command(subcommand)]
        kind: StatsKind,
    },

    /// Manage the reference lists offered by the add-match form
    Reference {
        #[command(subcommand)]
        action: ReferenceAction,
    },

    /// Manage season presets
    Season {
        #[command(subcommand)]
        action: SeasonAction,
    },

    /// Write the effective configuration to the --config path
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OneSidedArg {
    Yes,
    No,
    Unknown,
}

impl From<OneSidedArg> for Option<bool> {
    fn from(arg: OneSidedArg) -> Self {
        match arg {
            OneSidedArg::Yes => Some(true),
            OneSidedArg::No => Some(false),
            OneSidedArg::Unknown => None,
        }
    }
}

#[derive(Args)]
struct RangeArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,

    /// Use a season preset as the range
    #[arg(long, conflicts_with_all = ["from", "to"])]
    season: Option<String>,
}

#[derive(Subcommand)]
enum StatsKind {
    /// Daily win rate, games and fun score
    Daily {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Win and lose streak end points
    Streaks {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Win rate by one or two dimensions
    Pivot {
        #[command(flatten)]
        range: RangeArgs,

        /// Queue, Map, Mode or GroupSize
        #[arg(long)]
        first: String,

        #[arg(long)]
        second: Option<String>,
    },
}

#[derive(Subcommand)]
enum ReferenceAction {
    /// Add a name to a list
    Add {
        /// queues, modes, maps or players
        list: String,
        name: String,
    },

    /// Print a list
    List { list: String },
}

#[derive(Subcommand)]
enum SeasonAction {
    /// Add or replace a season
    Set {
        name: String,

        #[arg(long)]
        begin: String,

        /// Leave out for a running season
        #[arg(long)]
        end: Option<String>,
    },

    /// Print all seasons
    List,
}

fn parse_date(value: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .with_context(|| format!("Invalid --{} date (expected YYYY-MM-DD): {}", flag, value))
}

fn parse_list(name: &str) -> Result<ReferenceList> {
    name.parse::<ReferenceList>().map_err(anyhow::Error::msg)
}

fn resolve_range(store: &JsonlStore, args: &RangeArgs) -> Result<DateRange> {
    if let Some(name) = &args.season {
        let seasons = store.seasons()?;
        return match find_season(&seasons, name) {
            Some(season) => Ok(season.date_range()),
            None => bail!("No season named '{}'", name),
        };
    }
    Ok(DateRange::parse(args.from.as_deref(), args.to.as_deref())?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(Path::new(&cli.config))
        .with_context(|| format!("Failed to load config from {}", cli.config))?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn init_tracing(level: &str, json_logs: bool, access_log: bool) -> Result<()> {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if access_log {
        filter = filter.add_directive("tower_http=debug".parse()?);
    }

    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    let access_log = matches!(cli.command, Commands::Serve { access_log: true, .. });
    init_tracing(&config.log_level, cli.json_logs, access_log)?;

    tracing::info!("Starting match-tracker v{}", env!("CARGO_PKG_VERSION"));

    let store = JsonlStore::new(StorageConfig::new(config.data_dir.clone()));

    match cli.command {
        Commands::Serve { host, port, .. } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let state = AppState {
                store: Arc::new(store),
                config: Arc::new(config),
            };
            let app = match_tracker::api::build_router(state);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Dashboard: http://{}", addr);
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await?;
        }
        Commands::Add {
            queue,
            mode,
            map,
            players,
            win,
            loss: _,
            one_sided,
            date,
        } => {
            let date = match date {
                Some(d) => parse_date(&d, "date")?,
                None => config.ingest.session_clock().today(),
            };
            let submitted = NewMatch {
                queue,
                mode,
                map,
                players,
                win,
                one_sided: one_sided.into(),
            };
            let record = submitted.into_record(date)?;
            store.append_match(&record)?;
            print_json(&record)?;
        }
        Commands::Stats { kind } => {
            let engine = Engine::new(&store);
            match kind {
                StatsKind::Daily { range } => {
                    let range = resolve_range(&store, &range)?;
                    print_json(&engine.daily(&range)?)?;
                }
                StatsKind::Streaks { range } => {
                    let range = resolve_range(&store, &range)?;
                    print_json(&engine.streaks(&range)?)?;
                }
                StatsKind::Pivot {
                    range,
                    first,
                    second,
                } => {
                    let (first, second) = parse_dimensions(&first, second.as_deref())?;
                    let range = resolve_range(&store, &range)?;
                    print_json(&engine.pivot(&range, first, second)?)?;
                }
            }
        }
        Commands::Reference { action } => match action {
            ReferenceAction::Add { list, name } => {
                let list = parse_list(&list)?;
                if name.trim().is_empty() {
                    bail!("Name must not be blank");
                }
                if store.add_reference(list, &name)? {
                    tracing::info!("Added '{}' to {:?}", name.trim(), list);
                } else {
                    tracing::info!("'{}' is already in {:?}", name.trim(), list);
                }
            }
            ReferenceAction::List { list } => {
                print_json(&store.reference_list(parse_list(&list)?)?)?;
            }
        },
        Commands::Season { action } => match action {
            SeasonAction::Set { name, begin, end } => {
                let begin = parse_date(&begin, "begin")?;
                let end = end.map(|e| parse_date(&e, "end")).transpose()?;
                if end.is_some_and(|end| end < begin) {
                    bail!("Season '{}' ends before it begins", name);
                }
                store.upsert_season(Season::new(name.clone(), begin, end))?;
                tracing::info!("Saved season '{}'", name);
            }
            SeasonAction::List => print_json(&store.seasons()?)?,
        },
        Commands::InitConfig { force } => {
            let path = Path::new(&cli.config);
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", cli.config);
            }
            std::fs::write(path, config.to_toml()?)
                .with_context(|| format!("Failed to write {}", cli.config))?;
            tracing::info!("Wrote {}", cli.config);
        }
    }

    Ok(())
}

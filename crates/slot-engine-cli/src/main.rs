//! `slots` CLI — inspect conflicts, free time and live automation state for a
//! channel snapshot from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Which slots are spaced too closely? (stdin → stdout)
//! cat snapshot.json | slots conflicts
//!
//! # Free ranges and suggested new slot times
//! slots free -i snapshot.json --suggest
//! slots suggest -i snapshot.json --cap 20
//!
//! # Automation roles at a given instant (local wall-clock time)
//! slots state -i snapshot.json --now 10:05
//! slots state -i snapshot.json --at 2026-03-01T23:59:00 --json
//!
//! # Keep polling: re-arbitrate every 30 s, print countdowns every second
//! slots watch -i snapshot.json --tz Europe/Moscow
//! ```

mod render;
mod watch;

use std::io::{self, Read};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use slot_engine::clock::{Clock, LocalClock, ZonedClock, COUNTDOWN_INTERVAL, STATE_REFRESH_INTERVAL};
use slot_engine::{Snapshot, TimeOfDay, DEFAULT_SUGGESTION_CAP};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Publication slot conflicts, free ranges and automation state"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Snapshot JSON file with `channels` and `settings` (reads from stdin if omitted)
    #[arg(short, long, global = true)]
    input: Option<String>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List slots that violate the minimum spacing policy
    Conflicts {
        /// Also print the violating neighbour pairs
        #[arg(long)]
        pairs: bool,
    },
    /// Show the parts of the day still open for a new slot
    Free {
        /// Also list suggested slot times inside each range
        #[arg(long)]
        suggest: bool,
        /// Maximum number of suggestions
        #[arg(long, default_value_t = DEFAULT_SUGGESTION_CAP)]
        cap: usize,
    },
    /// List suggested new slot times
    Suggest {
        /// Maximum number of suggestions
        #[arg(long, default_value_t = DEFAULT_SUGGESTION_CAP)]
        cap: usize,
    },
    /// Show which channel is current, next and previous
    State {
        #[command(flatten)]
        when: When,
    },
    /// Poll the automation state and print live countdowns until interrupted
    Watch {
        /// IANA time zone for the wall clock (defaults to the host zone)
        #[arg(long)]
        tz: Option<String>,
        /// Seconds between role re-evaluations
        #[arg(long, default_value_t = STATE_REFRESH_INTERVAL.as_secs())]
        refresh_secs: u64,
        /// Seconds between countdown updates
        #[arg(long, default_value_t = COUNTDOWN_INTERVAL.as_secs())]
        tick_secs: u64,
        /// Stop after this many countdown updates
        #[arg(long)]
        ticks: Option<u64>,
    },
}

/// Which instant to evaluate at.
#[derive(clap::Args)]
struct When {
    /// Time of day today, as HH:MM
    #[arg(long, conflicts_with = "at")]
    now: Option<TimeOfDay>,
    /// Full local datetime, e.g. 2026-03-01T10:05:00
    #[arg(long)]
    at: Option<String>,
    /// IANA time zone for the wall clock (defaults to the host zone)
    #[arg(long)]
    tz: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let raw = read_input(cli.input.as_deref())?;
    let snapshot = Snapshot::from_json(&raw).context("Failed to parse snapshot")?;
    debug!(channels = snapshot.channels.len(), "loaded snapshot");

    match cli.command {
        Commands::Conflicts { pairs } => {
            let set = snapshot.conflicts();
            if cli.json {
                print_json(&set)?;
            } else {
                print!("{}", render::conflicts(&set));
            }
            if pairs && snapshot.settings.conflicts_check_enabled {
                let slots = slot_engine::flatten_slots(&snapshot.channels);
                let found = slot_engine::find_conflicts(&slots, &snapshot.settings);
                if cli.json {
                    print_json(&found)?;
                } else {
                    print!("{}", render::conflict_pairs(&found));
                }
            }
        }
        Commands::Free { suggest, cap } => {
            let ranges = snapshot.free_ranges();
            let suggestions = suggest.then(|| snapshot.suggestions(cap));
            if cli.json {
                print_json(&serde_json::json!({
                    "freeRanges": ranges,
                    "suggestions": suggestions,
                }))?;
            } else {
                print!("{}", render::free_ranges(&ranges, suggestions.as_deref()));
            }
        }
        Commands::Suggest { cap } => {
            let suggestions = snapshot.suggestions(cap);
            if cli.json {
                print_json(&suggestions)?;
            } else {
                print!("{}", render::suggestions(&suggestions));
            }
        }
        Commands::State { when } => {
            let now = resolve_now(&when)?;
            let state = snapshot.automation(now);
            if cli.json {
                print_json(&state)?;
            } else {
                print!("{}", render::automation(&state, now));
            }
        }
        Commands::Watch {
            tz,
            refresh_secs,
            tick_secs,
            ticks,
        } => {
            let clock = make_clock(tz.as_deref())?;
            let options = watch::WatchOptions {
                refresh: Duration::from_secs(refresh_secs.max(1)),
                tick: Duration::from_secs(tick_secs.max(1)),
                max_ticks: ticks,
                json: cli.json,
            };
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to start runtime")?;
            runtime.block_on(watch::run(&snapshot, clock.as_ref(), options))?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn make_clock(tz: Option<&str>) -> Result<Box<dyn Clock>> {
    Ok(match tz {
        Some(name) => Box::new(ZonedClock::parse(name)?),
        None => Box::new(LocalClock),
    })
}

/// Pick the evaluation instant from `--at`, `--now` or the wall clock.
fn resolve_now(when: &When) -> Result<NaiveDateTime> {
    if let Some(at) = &when.at {
        return NaiveDateTime::parse_from_str(at, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(at, "%Y-%m-%dT%H:%M"))
            .with_context(|| format!("Invalid --at datetime: '{}'", at));
    }
    let today = make_clock(when.tz.as_deref())?.now();
    match when.now {
        Some(time) => today
            .date()
            .and_hms_opt(time.hour(), time.minute(), 0)
            .context("Invalid --now time"),
        None => Ok(today),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", pretty);
    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

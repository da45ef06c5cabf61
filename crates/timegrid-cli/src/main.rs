use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use timegrid_engine::{
    get_range, parse_anchor, CalendarEvent, FixedClock, WeekViewConfig, WeekViewController,
};

#[derive(Parser)]
#[command(name = "timegrid", version, about = "Lay out calendar events on a week-view time grid")]
struct Cli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    quiet: u8,

    /// View configuration as a JSON file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(short, long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lay out events for the week containing the anchor
    Layout {
        /// Anchor as RFC 3339 or YYYY-MM-DD
        #[arg(short, long)]
        anchor: String,

        /// JSON array of events (reads stdin if omitted or "-")
        #[arg(short, long)]
        events: Option<PathBuf>,

        /// Instant treated as "now" (defaults to the system clock)
        #[arg(long)]
        today: Option<String>,
    },
    /// Print the 7-day window containing the anchor
    Range {
        /// Anchor as RFC 3339 or YYYY-MM-DD
        #[arg(short, long)]
        anchor: String,
    },
    /// Print the week title and hour column labels
    Labels {
        /// Anchor as RFC 3339 or YYYY-MM-DD
        #[arg(short, long)]
        anchor: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    let config = load_config(cli.config.as_deref())?;
    let settings = config.validate().context("invalid view configuration")?;

    let output = match cli.command {
        Command::Layout {
            anchor,
            events,
            today,
        } => {
            let anchor = parse_anchor(&anchor, &settings.tz).context("invalid --anchor")?;
            let events = load_events(events.as_deref())?;
            info!(events = events.len(), %anchor, "laying out week");

            let mut builder = WeekViewController::builder(config, anchor).events(events);
            if let Some(today) = today {
                let today = parse_anchor(&today, &settings.tz).context("invalid --today")?;
                builder = builder.clock(FixedClock(today));
            }
            let controller = builder.build()?;
            let view = controller.view();
            let highlights: Vec<_> = view.dates.iter().map(|date| date.highlight()).collect();

            json!({
                "title": controller.title(),
                "hour_labels": controller.hour_column_labels(),
                "highlights": highlights,
                "view": view,
            })
        }
        Command::Range { anchor } => {
            let anchor = parse_anchor(&anchor, &settings.tz).context("invalid --anchor")?;
            serde_json::to_value(get_range(anchor, settings.week_start, &settings.tz))?
        }
        Command::Labels { anchor } => {
            let anchor = parse_anchor(&anchor, &settings.tz).context("invalid --anchor")?;
            let controller = WeekViewController::builder(config, anchor)
                .clock(FixedClock(anchor))
                .build()?;
            json!({
                "title": controller.title(),
                "hour_labels": controller.hour_column_labels(),
            })
        }
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}

fn init_tracing(verbose: u8, quiet: u8) -> Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 || verbose == 0 {
        "warn"
    } else if verbose == 1 {
        "info"
    } else if verbose == 2 {
        "debug"
    } else {
        "trace"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_ansi(io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<WeekViewConfig> {
    let Some(path) = path else {
        return Ok(WeekViewConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}

fn load_events(path: Option<&Path>) -> Result<Vec<CalendarEvent>> {
    let text = match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("failed to read events {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read events from stdin")?;
            buf
        }
    };
    serde_json::from_str(&text).context("events must be a JSON array of events")
}

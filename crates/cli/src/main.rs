//! rvoip-sessions: replay a SIP message capture through a session counter
//! and report live and peak dialog counts.

mod config;
mod logging;
mod replay;
mod report;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rvoip_session_counter::{Direction, SessionCounter};
use tracing::info;

use crate::config::CliConfig;
use crate::report::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "rvoip-sessions", version, about = "Count concurrent SIP dialogs in a message capture")]
struct Args {
    /// JSON Lines capture to replay ("-" for stdin)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// TOML configuration file
    #[arg(short, long, env = "RVOIP_SESSIONS_CONFIG")]
    config: Option<PathBuf>,

    /// Counter name used in the report
    #[arg(short, long)]
    name: Option<String>,

    /// Direction for records that carry none (IN, OUT, IN&OUT)
    #[arg(short, long)]
    direction: Option<Direction>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl Args {
    fn resolve_config(&self) -> anyhow::Result<CliConfig> {
        let mut config = match &self.config {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };

        if let Some(name) = &self.name {
            config.counter = config.counter.with_name(name.clone());
        }
        if let Some(direction) = self.direction {
            config.counter = config.counter.with_default_direction(direction);
        }
        if let Some(level) = &self.log_level {
            config.logging = config.logging.with_level(level.clone());
        }
        if self.json_logs {
            config.logging = config.logging.with_json();
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.resolve_config()?;
    logging::setup_logging(&config.logging)?;

    info!("Starting rvoip-sessions v{}", env!("CARGO_PKG_VERSION"));

    let mut counter = SessionCounter::with_config(config.counter)?;
    let stats = if args.input.as_os_str() == "-" {
        replay::replay(io::stdin().lock(), &mut counter)?
    } else {
        let file = File::open(&args.input)
            .with_context(|| format!("Failed to open capture {}", args.input.display()))?;
        replay::replay(BufReader::new(file), &mut counter)?
    };

    info!("Replayed {} records, {} counter changes", stats.records, stats.changes);

    let report = report::render(&counter.to_string(), &counter.snapshot(), stats, args.format)?;
    print!("{}", report);
    Ok(())
}

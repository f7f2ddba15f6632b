use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

use mcload::config::{self, Config};
use mcload::dispatch::Scheduler;
use mcload::output::{Reporter, session_table};
use mcload::transport::udp::UdpSink;

#[derive(Parser)]
#[command(name = "mcload")]
#[command(about = "Multicast load generator mimicking an IETF broadcast mix")]
struct Cli {
    /// Multicast group to send to
    #[arg(default_value_t = config::DEFAULT_GROUP)]
    group: Ipv4Addr,

    /// Enable sessions 1 through <N> of the table
    #[arg(short, long, default_value_t = config::DEFAULT_ACTIVE_SESSIONS)]
    sessions: usize,

    /// Clamp every session's TTL to this ceiling
    #[arg(short, long, default_value_t = 255)]
    ttl: u8,

    /// Margin test: each -m raises rates by 5%
    #[arg(short, long, action = clap::ArgAction::Count)]
    margin: u8,

    /// Chop mode: 5 sec on/off, synced to the wall clock
    #[arg(short, long)]
    chop: bool,

    /// Bank rate credit during silent chop windows and burst on resume
    #[arg(long)]
    accrue_while_silent: bool,

    /// Base destination port; session i sends to base + i
    #[arg(short, long, default_value_t = config::DEFAULT_BASE_PORT)]
    port: u16,

    /// YAML file replacing the built-in session table
    #[arg(long)]
    session_file: Option<PathBuf>,

    /// Stop after this many seconds (default: run until Ctrl+C)
    #[arg(long)]
    duration: Option<u64>,

    /// Print the session table and exit
    #[arg(long)]
    list: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    mcload::logging::init(&cli.log_level)?;

    let table = match &cli.session_file {
        Some(path) => config::load_session_file(path)?,
        None => config::builtin_sessions(),
    };
    config::validate_sessions(&table).context("invalid session table")?;

    if cli.list {
        print!("{}", session_table(&table));
        return Ok(());
    }

    let mut cfg = Config::new(table);
    cfg.group = cli.group;
    cfg.base_port = cli.port;
    cfg.active = cli.sessions;
    cfg.ttl_clamp = cli.ttl;
    cfg.margin = cli.margin;
    cfg.chop = cli.chop;
    cfg.accrue_while_silent = cli.accrue_while_silent;
    cfg.validate().context("invalid configuration")?;

    let mut sink = UdpSink::bind().await.context("binding send socket")?;
    let interval = cfg.tick_interval();
    info!(
        group = %cfg.group,
        base_port = cfg.base_port,
        sessions = cfg.active,
        tick_us = interval.as_micros() as u64,
        chop = cfg.chop,
        "starting generator"
    );

    let mut reporter = Reporter::stdout();
    reporter.header();
    let mut scheduler = Scheduler::new(&cfg, SystemTime::now(), reporter)?;

    // One tick in flight at a time: the loop below is the only task that
    // touches the scheduler, and each on_tick completes before the next
    // interval fire is awaited.
    let mut timer = time::interval(interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Burst);
    let deadline = cli
        .duration
        .map(|secs| Instant::now() + Duration::from_secs(secs));

    let run = async {
        loop {
            timer.tick().await;
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    break;
                }
            }
            scheduler.on_tick(SystemTime::now(), &mut sink).await;
        }
    };

    tokio::select! {
        _ = run => {
            info!("duration reached, stopping");
        }
        _ = signal::ctrl_c() => {
            info!("interrupted, stopping");
        }
    }

    Ok(())
}

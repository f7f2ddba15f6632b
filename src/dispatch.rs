//! The per-tick orchestrator: one scheduler owns every session, the window
//! controller, the statistics counters and a pre-allocated packet buffer,
//! and is driven by exactly one periodic wake-up at a time.

use std::net::Ipv4Addr;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::trace;

use crate::config::{Config, ConfigError};
use crate::output::Reporter;
use crate::session::Session;
use crate::stats::SecondStats;
use crate::transport::PacketSink;
use crate::window::WindowController;
use crate::wire::{self, HEADER_LEN, PacketHeader};

/// Filler byte for payload bytes beyond the header.
const PAYLOAD_FILL: u8 = 0xA5;

pub struct Scheduler {
    sessions: Vec<Session>,
    /// Enabled prefix of `sessions`.
    active: usize,
    group: Ipv4Addr,
    ttl_clamp: u8,
    accrue_while_silent: bool,
    window: WindowController,
    stats: SecondStats,
    reporter: Reporter,
    /// Scratch packet, sized for the largest session. Headers are rewritten
    /// per packet; the payload region keeps its filler. Nothing on the tick
    /// path allocates.
    buf: Vec<u8>,
}

impl Scheduler {
    /// Build from a validated configuration. `start` primes the window
    /// controller so the first tick lands on a reporting edge.
    pub fn new(config: &Config, start: SystemTime, reporter: Reporter) -> Result<Self, ConfigError> {
        config.validate()?;
        let sessions: Vec<Session> = config
            .sessions
            .iter()
            .enumerate()
            .map(|(i, spec)| Session::new(spec.clone(), config.base_port + i as u16))
            .collect();
        let largest = sessions
            .iter()
            .map(|s| s.spec.payload)
            .max()
            .unwrap_or(0);
        let (start_secs, _) = split_unix(start);
        Ok(Self {
            sessions,
            active: config.active,
            group: config.group,
            ttl_clamp: config.ttl_clamp,
            accrue_while_silent: config.accrue_while_silent,
            window: WindowController::new(config.chop, start_secs),
            stats: SecondStats::new(),
            reporter,
            buf: vec![PAYLOAD_FILL; HEADER_LEN + largest],
        })
    }

    /// One periodic wake-up. Reads the wall clock, reports on second edges,
    /// honors silent windows, then drives every active session through its
    /// rate accumulator and the send capability. Send failures are counted
    /// and never abort the tick.
    pub async fn on_tick(&mut self, now: SystemTime, sink: &mut dyn PacketSink) {
        let (secs, micros) = split_unix(now);

        if self.window.is_edge(secs) {
            let report = self.stats.flush();
            if self.window.silent() {
                self.reporter.progress(self.window.completed_second());
            } else {
                self.reporter.line(&report);
            }
            self.window.advance(secs);
        }

        if self.window.silent() {
            // Default: no credit accrues while chopped, so resuming never
            // bursts. The opt-in banks credit and catches up instead.
            if self.accrue_while_silent {
                for session in &mut self.sessions[..self.active] {
                    session.accrue();
                }
            }
            return;
        }

        let tstamp = wire::media_timestamp(secs, micros);
        for i in 0..self.active {
            let due = self.sessions[i].due();
            for _ in 0..due {
                let seq = self.sessions[i].next_seq();
                let session = &self.sessions[i];
                let len = HEADER_LEN + session.spec.payload;
                let port = session.port;
                let ttl = session.clamped_ttl(self.ttl_clamp);
                PacketHeader::new(seq, tstamp).encode_into(&mut self.buf[..HEADER_LEN]);
                match sink.send(&self.buf[..len], self.group, port, ttl).await {
                    Ok(()) => self.stats.record(true, len),
                    Err(err) => {
                        trace!(session = %self.sessions[i].spec.name, port, %err, "send failed");
                        self.stats.record(false, len);
                    }
                }
            }
        }
    }

    /// The reporting sink, for inspecting captured output in tests.
    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }
}

fn split_unix(now: SystemTime) -> (u64, u32) {
    let unix = now.duration_since(UNIX_EPOCH).unwrap_or_default();
    (unix.as_secs(), unix.subsec_micros())
}

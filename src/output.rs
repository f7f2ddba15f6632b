//! Per-second reporting sink and the session listing table.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::time::Duration;

use crate::config::NOMINAL_TICK;
use crate::session::SessionSpec;
use crate::stats::SecondReport;
use crate::wire::{HEADER_LEN, IP_UDP_OVERHEAD};

/// Where per-second reports go: the terminal, or an in-memory buffer so
/// tests can assert on the exact lines.
pub enum Reporter {
    Stdout,
    Memory(Vec<String>),
}

impl Reporter {
    pub fn stdout() -> Self {
        Self::Stdout
    }

    pub fn memory() -> Self {
        Self::Memory(Vec::new())
    }

    /// Column header, printed once before dispatch starts.
    pub fn header(&mut self) {
        self.emit("pkts kb/S errors".to_string(), true);
    }

    /// One line per completed active second.
    pub fn line(&mut self, report: &SecondReport) {
        self.emit(
            format!("{:3} {:5} {}", report.packets, report.kbps(), report.errors),
            true,
        );
    }

    /// Progress marker for a completed silent second; the dot row breaks
    /// after the second closing each 10-second cycle.
    pub fn progress(&mut self, completed_second: u64) {
        self.emit(".".to_string(), completed_second % 10 == 9);
    }

    fn emit(&mut self, text: String, newline: bool) {
        match self {
            Self::Stdout => {
                let mut out = io::stdout().lock();
                let _ = if newline {
                    writeln!(out, "{text}")
                } else {
                    write!(out, "{text}")
                };
                let _ = out.flush();
            }
            Self::Memory(entries) => entries.push(text),
        }
    }

    /// Entries captured by a memory reporter; empty for stdout.
    pub fn entries(&self) -> &[String] {
        match self {
            Self::Memory(entries) => entries,
            Self::Stdout => &[],
        }
    }
}

/// Human-readable session table: per-session TTL, rate, on-wire size and
/// bandwidth, with running totals. Rates assume the nominal tick.
pub fn session_table(specs: &[SessionSpec]) -> String {
    let ticks_per_sec = (Duration::from_secs(1).as_micros() / NOMINAL_TICK.as_micros()) as u64;
    let mut out = String::new();
    let _ = writeln!(out, "    ttl  pps  size  kb/S  T pps T kb/S");
    let mut total_rate = 0u64;
    let mut total_bw = 0u64;
    for (i, s) in specs.iter().enumerate() {
        // Centi-pps to keep fractional rates honest under integer math.
        let rate = ticks_per_sec * 100 * s.rate_num as u64 / s.rate_den as u64;
        let size = (IP_UDP_OVERHEAD + HEADER_LEN + s.payload) as u64;
        total_rate += rate;
        total_bw += rate * size;
        let _ = writeln!(
            out,
            "{})  {:3}  {:3}  {:4} {:4}   {:4}   {:4} {}",
            i + 1,
            s.ttl,
            rate / 100,
            size,
            rate * size * 8 / 100_000,
            total_rate / 100,
            total_bw * 8 / 100_000,
            s.name
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin_sessions;
    use crate::stats::SecondReport;

    #[test]
    fn memory_reporter_captures_lines_and_markers() {
        let mut r = Reporter::memory();
        r.line(&SecondReport {
            packets: 10,
            bytes: 680,
            errors: 0,
        });
        r.progress(9);
        assert_eq!(r.entries(), &[" 10     5 0".to_string(), ".".to_string()]);
    }

    #[test]
    fn table_lists_builtin_mix_with_wire_sizes() {
        let table = session_table(&builtin_sessions());
        let mut lines = table.lines();
        assert_eq!(lines.next(), Some("    ttl  pps  size  kb/S  T pps T kb/S"));
        // GSM Audio 1: 12.5 pps, 28 + 8 + 320 bytes on the wire.
        let first = lines.next().unwrap();
        assert!(first.starts_with("1)  255   12   356"), "{first}");
        assert!(first.ends_with("GSM Audio 1"));
        assert_eq!(table.lines().count(), builtin_sessions().len() + 1);
    }
}

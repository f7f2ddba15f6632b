//! Session records: immutable stream parameters plus per-stream send state.

use serde::Deserialize;

use crate::rate::RateAccumulator;

/// Immutable description of one packet stream, as configured (built-in table
/// or `--session-file` YAML).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionSpec {
    pub name: String,
    /// Maximum TTL packets of this session may carry, before the global clamp.
    pub ttl: u8,
    /// Payload bytes beyond the fixed header.
    pub payload: usize,
    /// Target rate in packets per tick, as a rational `rate_num / rate_den`.
    pub rate_num: u32,
    pub rate_den: u32,
}

impl SessionSpec {
    pub fn new(name: &str, ttl: u8, payload: usize, rate_num: u32, rate_den: u32) -> Self {
        Self {
            name: name.to_string(),
            ttl,
            payload,
            rate_num,
            rate_den,
        }
    }
}

/// Runtime state for one stream. Built once at scheduler start and mutated in
/// place on every tick; nothing here allocates after construction.
#[derive(Debug)]
pub struct Session {
    pub spec: SessionSpec,
    /// Destination port, `base_port + index`, fixed at configuration time so
    /// receivers can tell sessions apart without looking at payloads.
    pub port: u16,
    seq: u16,
    acc: RateAccumulator,
}

impl Session {
    pub fn new(spec: SessionSpec, port: u16) -> Self {
        Self {
            spec,
            port,
            seq: 0,
            acc: RateAccumulator::new(),
        }
    }

    /// Advance this session's accumulator one tick; returns packets due now.
    pub fn due(&mut self) -> u32 {
        self.acc.tick(self.spec.rate_num, self.spec.rate_den)
    }

    /// Bank one tick of credit without emitting (accrue-while-silent mode).
    pub fn accrue(&mut self) {
        self.acc.accrue(self.spec.rate_num);
    }

    /// Next wire sequence number; wraps at the 16-bit header field width.
    pub fn next_seq(&mut self) -> u16 {
        let seq = self.seq;
        self.seq = self.seq.wrapping_add(1);
        seq
    }

    pub fn clamped_ttl(&self, clamp: u8) -> u8 {
        self.spec.ttl.min(clamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(SessionSpec::new("t", 255, 64, 1, 1), 12341)
    }

    #[test]
    fn sequence_wraps_at_u16() {
        let mut s = session();
        s.seq = u16::MAX;
        assert_eq!(s.next_seq(), u16::MAX);
        assert_eq!(s.next_seq(), 0);
    }

    #[test]
    fn ttl_clamps_to_global_ceiling() {
        let s = session();
        assert_eq!(s.clamped_ttl(64), 64);
        assert_eq!(s.clamped_ttl(255), 255);
        let low = Session::new(SessionSpec::new("t", 5, 64, 1, 1), 12341);
        assert_eq!(low.clamped_ttl(64), 5);
    }
}

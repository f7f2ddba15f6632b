//! Per-second send counters, flushed once per reporting edge.

/// Running counters for the current reporting second. Only the tick
/// dispatcher touches these, so plain integers suffice; there are no
/// concurrent writers in this design.
#[derive(Debug, Default)]
pub struct SecondStats {
    packets: u64,
    bytes: u64,
    errors: u64,
}

/// Counters for one completed reporting second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondReport {
    pub packets: u64,
    pub bytes: u64,
    pub errors: u64,
}

impl SecondStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one send attempt in: successes count the packet and its bytes,
    /// failures count only the error.
    pub fn record(&mut self, ok: bool, bytes: usize) {
        if ok {
            self.packets += 1;
            self.bytes += bytes as u64;
        } else {
            self.errors += 1;
        }
    }

    /// Return the completed second's counters and reset for the next one.
    pub fn flush(&mut self) -> SecondReport {
        let report = SecondReport {
            packets: self.packets,
            bytes: self.bytes,
            errors: self.errors,
        };
        *self = Self::default();
        report
    }
}

impl SecondReport {
    pub fn kbps(&self) -> u64 {
        self.bytes * 8 / 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_flush_resets() {
        let mut stats = SecondStats::new();
        stats.record(true, 328);
        stats.record(true, 172);
        stats.record(false, 328);
        let r = stats.flush();
        assert_eq!(
            r,
            SecondReport {
                packets: 2,
                bytes: 500,
                errors: 1
            }
        );
        assert_eq!(r.kbps(), 4);
        let empty = stats.flush();
        assert_eq!(empty.packets, 0);
        assert_eq!(empty.bytes, 0);
        assert_eq!(empty.errors, 0);
    }

    #[test]
    fn failures_never_count_bytes() {
        let mut stats = SecondStats::new();
        stats.record(false, 1408);
        let r = stats.flush();
        assert_eq!((r.packets, r.bytes, r.errors), (0, 0, 1));
    }
}

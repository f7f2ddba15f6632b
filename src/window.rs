//! Wall-clock window controller: reporting-second edges and chop cycling.
//!
//! Chop mode silences the generator for the second half of every wall-clock
//! 10-second cycle. Because the decision is `second % 10 >= 5` on the shared
//! wall clock, independently started instances chop in lockstep with no
//! coordination traffic.

#[derive(Debug)]
pub struct WindowController {
    chop: bool,
    last_second: u64,
    silent: bool,
}

impl WindowController {
    /// `start_second` is the wall-clock second observed at startup; the
    /// previous second is primed to `start_second - 1` so the very first tick
    /// lands on a reporting edge. Chop-mode runs start silent.
    pub fn new(chop: bool, start_second: u64) -> Self {
        Self {
            chop,
            last_second: start_second.wrapping_sub(1),
            silent: chop,
        }
    }

    /// True when `second` differs from the last second recorded by
    /// [`advance`](Self::advance), which marks the reporting edge.
    pub fn is_edge(&self, second: u64) -> bool {
        second != self.last_second
    }

    /// The most recently completed reporting second.
    pub fn completed_second(&self) -> u64 {
        self.last_second
    }

    /// Record `second` as seen and recompute the chop phase for it.
    pub fn advance(&mut self, second: u64) {
        self.last_second = second;
        if self.chop {
            self.silent = second % 10 >= 5;
        }
    }

    pub fn silent(&self) -> bool {
        self.silent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_an_edge() {
        let w = WindowController::new(false, 1000);
        assert!(w.is_edge(1000));
    }

    #[test]
    fn same_second_is_not_an_edge() {
        let mut w = WindowController::new(false, 1000);
        w.advance(1000);
        assert!(!w.is_edge(1000));
        assert!(w.is_edge(1001));
        assert_eq!(w.completed_second(), 1000);
    }

    #[test]
    fn chop_starts_silent_and_tracks_modulo_over_thirty_seconds() {
        let mut w = WindowController::new(true, 0);
        assert!(w.silent());
        for sec in 0u64..30 {
            w.advance(sec);
            assert_eq!(w.silent(), sec % 10 >= 5, "second {sec}");
        }
    }

    #[test]
    fn chop_alignment_is_wall_clock_not_start_relative() {
        // Starting mid-cycle must land in the same phase as a fresh start.
        let mut w = WindowController::new(true, 7);
        w.advance(7);
        assert!(w.silent());
        w.advance(12);
        assert!(!w.silent());
    }

    #[test]
    fn without_chop_never_silent() {
        let mut w = WindowController::new(false, 0);
        for sec in 0u64..30 {
            w.advance(sec);
            assert!(!w.silent());
        }
    }
}

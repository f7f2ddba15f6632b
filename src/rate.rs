//! Fractional-rate accumulator for open-loop packet pacing.

/// Converts a rational rate (`num/den` packets per tick) into a whole number
/// of packets each tick without long-run drift: `num` units of credit accrue
/// per tick and every `den` units buy one packet, so any `den` consecutive
/// ticks emit exactly `num` packets.
#[derive(Debug, Default, Clone, Copy)]
pub struct RateAccumulator {
    credit: u32,
}

impl RateAccumulator {
    pub fn new() -> Self {
        Self { credit: 0 }
    }

    /// Advance one tick at rate `num/den` and return how many packets are due.
    ///
    /// `den` must be positive; configuration validation guarantees it before
    /// the scheduler runs. Rates above one packet per tick are fine, the
    /// credit simply buys several packets at once.
    pub fn tick(&mut self, num: u32, den: u32) -> u32 {
        self.credit += num;
        let due = self.credit / den;
        self.credit %= den;
        due
    }

    /// Accrue one tick of credit without emitting. Only used when the
    /// accrue-while-silent option is on; the built-up credit drains as a
    /// burst on the first active tick.
    pub fn accrue(&mut self, num: u32) {
        self.credit += num;
    }
}

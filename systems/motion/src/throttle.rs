/// Lets an object move slower than the tick rate.
///
/// With a period of `k` the object skips `k` ticks between two move
/// attempts, so it moves once every `k + 1` ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Throttle {
    wait: u32,
    period: u32,
}

impl Throttle {
    /// Creates a throttle that first fires after `period` skipped ticks.
    #[must_use]
    pub const fn new(period: u32) -> Self {
        Self {
            wait: period,
            period,
        }
    }

    /// Ticks left before the next move attempt.
    #[must_use]
    pub const fn wait(&self) -> u32 {
        self.wait
    }

    /// Value `wait` is reset to after every move attempt.
    #[must_use]
    pub const fn period(&self) -> u32 {
        self.period
    }

    /// Replaces the period and restarts the countdown.
    pub fn set_period(&mut self, period: u32) {
        *self = Self::new(period);
    }

    /// Consumes one tick, reporting whether the object may move on it.
    pub fn ready(&mut self) -> bool {
        if self.wait > 0 {
            self.wait -= 1;
            false
        } else {
            self.wait = self.period;
            true
        }
    }
}

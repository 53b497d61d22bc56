use std::time::Duration;

/// Converts elapsed wall-clock time into whole timer ticks.
///
/// Time that doesn't add up to a full period is carried over to the next call,
/// so the timers keep their rate no matter how unevenly frames arrive.
#[derive(Clone, Debug)]
pub struct TimerClock {
    period: Duration,
    pending: Duration,
}

impl TimerClock {
    /// # Arguments
    /// * `hz` ticks per second; 0 is treated as 1
    pub fn new(hz: u32) -> Self {
        TimerClock {
            period: Duration::from_secs(1) / hz.max(1),
            pending: Duration::ZERO,
        }
    }

    /// Adds `elapsed` and returns how many periods have completed
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.pending += elapsed;
        let mut ticks = 0;
        while self.pending >= self.period {
            self.pending -= self.period;
            ticks += 1;
        }
        ticks
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

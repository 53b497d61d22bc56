use crate::constants::{CYCLES_PER_FRAME, TIMER_HZ};

/// Tunables for a `Chip8`.
///
/// None of these are hardware constants; the defaults approximate the speed of
/// the original interpreter relative to a 60Hz display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Instructions executed per call to `Chip8::run_frame`
    pub cycles_per_frame: u32,
    /// Rate at which the delay and sound timers count down
    pub timer_hz: u32,
    /// How many past states to keep for rewinding; 0 disables rewinding
    pub history_capacity: usize,
    /// Seed for `CXNN`; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Config {
    pub fn with_cycles_per_frame(mut self, cycles_per_frame: u32) -> Self {
        self.cycles_per_frame = cycles_per_frame;
        self
    }

    pub fn with_timer_hz(mut self, timer_hz: u32) -> Self {
        self.timer_hz = timer_hz;
        self
    }

    pub fn with_history_capacity(mut self, history_capacity: usize) -> Self {
        self.history_capacity = history_capacity;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cycles_per_frame: CYCLES_PER_FRAME,
            timer_hz: TIMER_HZ,
            history_capacity: 0,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cycles_per_frame, 8);
        assert_eq!(config.timer_hz, 60);
        assert_eq!(config.history_capacity, 0);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_builders() {
        let config = Config::default()
            .with_cycles_per_frame(12)
            .with_timer_hz(30)
            .with_history_capacity(100)
            .with_seed(7);
        assert_eq!(config.cycles_per_frame, 12);
        assert_eq!(config.timer_hz, 30);
        assert_eq!(config.history_capacity, 100);
        assert_eq!(config.seed, Some(7));
    }
}

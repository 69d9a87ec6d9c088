/// Slack added before flooring a delay-to-step ratio.
const TICK_EPSILON: f64 = 1e-9;

/// Per-node counter that fires a discovery scan every `delay_ticks` steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCadence {
    delay_ticks: u32,
    elapsed_ticks: u32,
}

impl ScanCadence {
    /// Cadence of exactly `delay_ticks` steps (at least one).
    pub fn every(delay_ticks: u32) -> Self {
        Self {
            delay_ticks: delay_ticks.max(1),
            elapsed_ticks: 0,
        }
    }

    /// Converts a delay in seconds into whole steps of `nominal_dt` seconds.
    ///
    /// # Panics
    ///
    /// Panics if `nominal_dt` is not positive.
    pub fn from_delay(delay_secs: f64, nominal_dt: f64) -> Self {
        assert!(nominal_dt > 0.0, "nominal_dt must be > 0");
        // Absorbs representation error so 0.3 / 0.1 counts as 3 steps
        let ticks = (delay_secs.max(0.0) / nominal_dt + TICK_EPSILON).floor();
        Self::every(ticks.min(f64::from(u32::MAX)) as u32)
    }

    pub fn delay_ticks(&self) -> u32 {
        self.delay_ticks
    }

    /// Counts one step and returns `true` when a scan is due.
    pub fn advance(&mut self) -> bool {
        self.elapsed_ticks += 1;
        if self.elapsed_ticks >= self.delay_ticks {
            self.elapsed_ticks = 0;
            true
        } else {
            false
        }
    }
}

/// A monotonic simulation clock that advances in fixed physics steps.
///
/// Each step covers `dt_seconds * warp` simulated seconds; `warp` is the
/// time acceleration factor (1.0 means real time).
///
/// # Examples
///
/// ```
/// use outpost_power::sim::clock::Clock;
///
/// let mut clock = Clock::new(3, 0.5);
/// let mut steps = Vec::new();
///
/// clock.run(|step| steps.push(step));
/// assert_eq!(steps, vec![0, 1, 2]);
/// assert_eq!(clock.now(), 1.5);
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    /// Current step of the simulation
    current: usize,
    /// Total steps to run in the simulation
    total: usize,
    /// Nominal duration of one step in seconds
    dt_seconds: f64,
    /// Time acceleration factor
    warp: f32,
    /// Simulated seconds elapsed
    now: f64,
}

impl Clock {
    /// Creates a real-time clock with a specified total number of steps.
    ///
    /// # Arguments
    ///
    /// * `total` - The total number of steps the clock will run
    /// * `dt_seconds` - Nominal step duration (must be > 0)
    ///
    /// # Panics
    ///
    /// Panics if `dt_seconds` is not positive.
    pub fn new(total: usize, dt_seconds: f64) -> Self {
        assert!(dt_seconds > 0.0, "dt_seconds must be > 0");
        Self {
            current: 0,
            total,
            dt_seconds,
            warp: 1.0,
            now: 0.0,
        }
    }

    /// Sets the time acceleration factor.
    ///
    /// # Panics
    ///
    /// Panics if `warp` is not positive.
    pub fn with_warp(mut self, warp: f32) -> Self {
        self.set_warp(warp);
        self
    }

    /// Changes the time acceleration factor for subsequent steps.
    ///
    /// # Panics
    ///
    /// Panics if `warp` is not positive.
    pub fn set_warp(&mut self, warp: f32) {
        assert!(warp > 0.0, "warp must be > 0");
        self.warp = warp;
    }

    /// Advances the clock by one step.
    ///
    /// # Returns
    ///
    /// * `Some(step)` - The current step number (starting from 0) before advancing
    /// * `None` - If the clock has reached its total steps
    pub fn tick(&mut self) -> Option<usize> {
        if self.current < self.total {
            let step = self.current;
            self.current += 1;
            self.now += self.step_seconds();
            Some(step)
        } else {
            None
        }
    }

    /// Runs a function for each remaining step in the clock.
    ///
    /// # Arguments
    ///
    /// * `f` - A function that takes the current step number as an argument
    pub fn run(&mut self, mut f: impl FnMut(usize)) {
        while let Some(step) = self.tick() {
            f(step);
        }
    }

    /// Simulated seconds elapsed at the end of the last step.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn warp(&self) -> f32 {
        self.warp
    }

    pub fn dt_seconds(&self) -> f64 {
        self.dt_seconds
    }

    /// Simulated seconds covered by one step at the current warp.
    pub fn step_seconds(&self) -> f64 {
        self.dt_seconds * f64::from(self.warp)
    }

    /// Snapshot of the timing values a node needs for one tick.
    pub fn tick_context(&self) -> TickContext {
        TickContext {
            now: self.now,
            step_seconds: self.step_seconds(),
            warp: self.warp,
        }
    }
}

/// Timing values handed to every node during a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    /// Simulation time at the end of the step.
    pub now: f64,
    /// Simulated seconds covered by the step.
    pub step_seconds: f64,
    /// Time acceleration factor.
    pub warp: f32,
}

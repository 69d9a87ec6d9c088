//! Core simulation types: configuration and per-step records.

use std::fmt;

use crate::devices::TickOutcome;
use crate::world::EntityId;

/// Centralized simulation configuration.
///
/// # Examples
///
/// ```
/// use outpost_power::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(600, 0.02, 42);
/// assert_eq!(cfg.total_steps(), 600);
/// assert!((cfg.duration_seconds() - 12.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of physics steps to simulate.
    pub steps: usize,
    /// Nominal duration of one step in seconds.
    pub dt_seconds: f64,
    /// Time acceleration factor (1.0 is real time).
    pub warp: f32,
    /// Master random seed for reproducibility.
    pub seed: u64,
    /// Delay between discovery scans in seconds.
    pub scan_delay_secs: f64,
}

impl SimConfig {
    /// Creates a real-time configuration with the default scan delay.
    ///
    /// # Arguments
    ///
    /// * `steps` - Number of steps to simulate
    /// * `dt_seconds` - Nominal step duration (must be > 0)
    /// * `seed` - Master random seed
    ///
    /// # Panics
    ///
    /// Panics if `dt_seconds` is not positive.
    pub fn new(steps: usize, dt_seconds: f64, seed: u64) -> Self {
        assert!(dt_seconds > 0.0, "dt_seconds must be > 0");
        Self {
            steps,
            dt_seconds,
            warp: 1.0,
            seed,
            scan_delay_secs: crate::devices::storage::DEFAULT_SCAN_DELAY_SECS,
        }
    }

    pub fn with_warp(mut self, warp: f32) -> Self {
        assert!(warp > 0.0, "warp must be > 0");
        self.warp = warp;
        self
    }

    pub fn with_scan_delay(mut self, scan_delay_secs: f64) -> Self {
        self.scan_delay_secs = scan_delay_secs;
        self
    }

    /// Total number of simulation steps.
    pub fn total_steps(&self) -> usize {
        self.steps
    }

    /// Simulated seconds covered by the whole run.
    pub fn duration_seconds(&self) -> f64 {
        self.steps as f64 * self.dt_seconds * f64::from(self.warp)
    }
}

/// Record of one storage node during one simulation step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Step index.
    pub step: usize,
    /// Simulation time at the end of the step (seconds).
    pub time_s: f64,
    pub node: EntityId,
    pub name: String,
    pub outcome: TickOutcome,
    /// Whether a discovery scan ran during this step.
    pub scanned: bool,
    /// Total demand from the latest snapshot.
    pub demand: f32,
    /// Total production from the latest snapshot.
    pub production: f32,
    /// Storage peers from the latest snapshot.
    pub peers: usize,
    /// Signed flow (positive = charge).
    pub flow: f32,
    pub produced_flow: f32,
    /// Stored quantity after the step.
    pub stored: f32,
    pub capacity: f32,
    /// Hours of supply with the node's modifier applied.
    pub adjusted_hours: f32,
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>5} ({:>8.2}s) | {:<12} {:>6} | stored={:>8.2}/{:<8.2} \
             flow={:>+8.4} | D={:.2} P={:.2} peers={} | {:?}{}",
            self.step,
            self.time_s,
            self.name,
            self.node.to_string(),
            self.stored,
            self.capacity,
            self.flow,
            self.demand,
            self.production,
            self.peers,
            self.outcome,
            if self.scanned { " [scan]" } else { "" },
        )
    }
}

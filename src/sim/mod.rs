/// Per-tick flow allocation rules.
pub mod allocation;
/// One-time performance modifier binding.
pub mod bootstrap;
pub mod cadence;
/// Simulation clock for timestep management.
pub mod clock;
/// Discovery scan and snapshot.
pub mod discovery;
pub mod engine;
pub mod kpi;
pub mod types;

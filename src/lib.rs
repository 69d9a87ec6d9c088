//! Range-based power balancing for deployable storage units.

pub mod config;
pub mod devices;
pub mod error;
pub mod io;
pub mod ledger;
pub mod persist;
pub mod report;
pub mod scenario;
/// Clock, discovery, bootstrap, allocation, and the step engine.
pub mod sim;
pub mod world;

//! Node roles in the power-balancing domain.

/// Mobile agents and their traits.
pub mod agent;
/// Demand aggregation points.
pub mod controller;
/// Energy sources and the production-override policy.
pub mod producer;
/// Deployable storage units.
pub mod storage;

// Re-export the main types for convenience
pub use agent::{AgentTrait, MobileAgent};
pub use controller::{ControllerNode, PowerNeed};
pub use producer::{ProducerKind, ProducerNode, ProductionOverride};
pub use storage::{StorageNode, StorageParams, TickOutcome, TickReport};

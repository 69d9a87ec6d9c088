//! Simulated world: entity registry, geometry, and environment.

/// Illumination model for solar producers.
pub mod daylight;
pub mod entity;
/// Euclidean geometry helpers.
pub mod geometry;
/// Membership index over known entities.
pub mod index;

pub use daylight::Daylight;
pub use entity::{Capability, Entity, EntityId};
pub use geometry::Vec3;
pub use index::{MembershipIndex, World};

//! One-time binding of a storage node's performance modifier.
//!
//! A freshly deployed node looks for the nearest mobile agent within a short
//! capture radius and, if that agent carries a power skill, adopts the skill
//! value as its modifier for the rest of its life.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::NodeError;
use crate::world::entity::is_agent;
use crate::world::{Entity, EntityId, MembershipIndex, Vec3};

/// Default capture radius around a newly deployed node.
pub const DEFAULT_CAPTURE_RADIUS: f32 = 2.0;

/// Performance modifier of a storage node.
///
/// Starts `Unbound` with a configured default and moves to `Bound` at most
/// once. The value always divides the node's rate constant, so it is kept
/// strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PerformanceModifier {
    Unbound { default: f32 },
    Bound { value: f32 },
}

impl PerformanceModifier {
    /// # Panics
    ///
    /// Panics if `default` is not strictly positive.
    pub fn unbound(default: f32) -> Self {
        assert!(default > 0.0, "modifier default must be > 0");
        PerformanceModifier::Unbound { default }
    }

    /// Effective modifier value.
    pub fn value(&self) -> f32 {
        match *self {
            PerformanceModifier::Unbound { default } => default,
            PerformanceModifier::Bound { value } => value,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, PerformanceModifier::Bound { .. })
    }

    /// Freezes the modifier at `value`.
    ///
    /// # Errors
    ///
    /// Returns `NodeError::ModifierAlreadyBound` if a value was bound before.
    pub fn bind(&mut self, node: EntityId, value: f32) -> Result<(), NodeError> {
        if self.is_bound() {
            return Err(NodeError::ModifierAlreadyBound(node));
        }
        *self = PerformanceModifier::Bound { value };
        Ok(())
    }
}

/// Nearest mobile agent strictly inside `radius` of `origin`, with its distance.
///
/// Ties keep the first agent yielded by the index.
pub fn nearest_agent<I: MembershipIndex>(
    index: &I,
    origin: Vec3,
    radius: f32,
) -> Option<(&Entity, f32)> {
    let mut nearest: Option<(&Entity, f32)> = None;
    for agent in index.find_matching(is_agent) {
        let d = agent.distance_to(origin);
        if nearest.is_none_or(|(_, best)| d < best) {
            nearest = Some((agent, d));
        }
    }
    nearest.filter(|&(_, d)| d < radius)
}

/// Binds `modifier` from the nearest qualifying agent, if any.
///
/// Only the single nearest agent is considered; if it has no power skill the
/// modifier keeps its default. Returns the bound value.
///
/// # Errors
///
/// Returns `NodeError::ModifierAlreadyBound` when called on a node that has
/// already been bootstrapped.
pub fn bind_from_nearest_agent<I: MembershipIndex>(
    node: EntityId,
    modifier: &mut PerformanceModifier,
    index: &I,
    origin: Vec3,
    capture_radius: f32,
) -> Result<Option<f32>, NodeError> {
    if modifier.is_bound() {
        return Err(NodeError::ModifierAlreadyBound(node));
    }

    let Some((agent, distance)) = nearest_agent(index, origin, capture_radius) else {
        debug!(%node, "no agent within capture radius, keeping default modifier");
        return Ok(None);
    };

    let Some(value) = agent.agent.as_ref().and_then(|a| a.power_skill()) else {
        debug!(%node, agent = %agent.name, "nearest agent has no power skill");
        return Ok(None);
    };

    if !(value.is_finite() && value > 0.0) {
        warn!(%node, agent = %agent.name, value, "ignoring non-positive power skill");
        return Ok(None);
    }

    modifier.bind(node, value)?;
    info!(%node, agent = %agent.name, distance, modifier = value, "bound performance modifier");
    Ok(Some(value))
}

//! Discovery scan: which controllers, producers, and storage peers a storage
//! node can see, and the aggregate demand and production they imply.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::devices::ProductionOverride;
use crate::world::entity::{is_controller, is_producer, is_storage};
use crate::world::{EntityId, MembershipIndex, Vec3};

use super::bootstrap::DEFAULT_CAPTURE_RADIUS;

/// Which in-range controllers contribute to total demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandScope {
    /// Every controller whose own range covers the node.
    #[default]
    AllInRange,
    /// Only the closest in-range controller.
    ClosestOnly,
}

/// Whether a node counts itself among its storage peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerCount {
    /// The node is one of the storage units sharing the load.
    #[default]
    IncludeSelf,
    /// Only other storage units are counted.
    ExcludeSelf,
}

/// Tunables shared by every scan in a simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanPolicy {
    pub demand_scope: DemandScope,
    pub peer_count: PeerCount,
    pub production_override: ProductionOverride,
    /// Radius for the one-time agent search at deployment.
    pub capture_radius: f32,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            demand_scope: DemandScope::default(),
            peer_count: PeerCount::default(),
            production_override: ProductionOverride::default(),
            capture_radius: DEFAULT_CAPTURE_RADIUS,
        }
    }
}

/// The controller a storage node is attached to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestController {
    pub id: EntityId,
    pub distance: f32,
    pub range: f32,
}

/// Aggregate view of a storage node's surroundings.
///
/// Rebuilt wholesale by every scan and read-only in between; it is
/// expected to go stale until the next scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverySnapshot {
    closest: Option<ClosestController>,
    controllers_in_range: usize,
    total_demand: f32,
    total_production: f32,
    peer_count: usize,
}

impl DiscoverySnapshot {
    pub fn closest_controller(&self) -> Option<ClosestController> {
        self.closest
    }

    pub fn controllers_in_range(&self) -> usize {
        self.controllers_in_range
    }

    pub fn total_demand(&self) -> f32 {
        self.total_demand
    }

    pub fn total_production(&self) -> f32 {
        self.total_production
    }

    /// Storage units sharing the load, per the configured [`PeerCount`].
    pub fn peer_count(&self) -> usize {
        self.peer_count
    }
}

/// Who is scanning and from where.
#[derive(Debug, Clone, Copy)]
pub struct Scanner {
    pub id: EntityId,
    pub position: Vec3,
    /// Whether the scanning node itself counts as a storage unit.
    pub counts_as_storage: bool,
}

/// Builds a fresh snapshot for `scanner`.
///
/// Controllers are members when the scanner lies within their own range;
/// the nearest member is the closest controller (first one wins on ties).
/// Producers and peers are members when they lie within the closest
/// controller's range of the scanner. Without a closest controller the
/// snapshot carries no production and no peers.
pub fn scan<I: MembershipIndex>(
    index: &I,
    scanner: Scanner,
    policy: &ScanPolicy,
    warp: f32,
) -> DiscoverySnapshot {
    let mut snapshot = DiscoverySnapshot::default();
    let mut closest_demand = 0.0_f32;

    for entity in index.find_matching(is_controller) {
        let Some(controller) = entity.controller.as_ref() else {
            continue;
        };
        let distance = entity.distance_to(scanner.position);
        if !controller.covers(distance) {
            continue;
        }

        let demand = match controller.demand() {
            Ok(d) => d,
            Err(e) => {
                warn!(node = %scanner.id, controller = %entity.id, "{e}; counting zero demand");
                0.0
            }
        };
        debug!(
            node = %scanner.id,
            controller = %entity.id,
            demand,
            consumers = controller.connected_consumers,
            "controller in range"
        );

        snapshot.controllers_in_range += 1;
        snapshot.total_demand += demand;

        if snapshot.closest.is_none_or(|c| distance < c.distance) {
            snapshot.closest = Some(ClosestController {
                id: entity.id,
                distance,
                range: controller.range,
            });
            closest_demand = demand;
        }
    }

    if policy.demand_scope == DemandScope::ClosestOnly {
        snapshot.total_demand = closest_demand;
    }

    let Some(closest) = snapshot.closest else {
        debug!(node = %scanner.id, "no controller in range");
        return snapshot;
    };

    for entity in index.find_matching(is_producer) {
        if entity.id == scanner.id || entity.distance_to(scanner.position) > closest.range {
            continue;
        }
        if let Some(producer) = entity.producer.as_ref() {
            snapshot.total_production +=
                policy.production_override.effective_output(producer, warp);
        }
    }

    snapshot.peer_count = index
        .find_matching(is_storage)
        .into_iter()
        .filter(|e| e.id != scanner.id && e.distance_to(scanner.position) <= closest.range)
        .count();
    if policy.peer_count == PeerCount::IncludeSelf && scanner.counts_as_storage {
        snapshot.peer_count += 1;
    }

    debug!(
        node = %scanner.id,
        controller = %closest.id,
        demand = snapshot.total_demand,
        production = snapshot.total_production,
        peers = snapshot.peer_count,
        "scan complete"
    );
    snapshot
}

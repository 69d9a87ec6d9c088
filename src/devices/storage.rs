use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::NodeError;
use crate::ledger::{ResourceAmount, ResourceLedger};
use crate::persist::SavedStorage;
use crate::report;
use crate::sim::allocation::{self, FlowDecision};
use crate::sim::bootstrap::{self, PerformanceModifier};
use crate::sim::cadence::ScanCadence;
use crate::sim::clock::TickContext;
use crate::sim::discovery::{self, DiscoverySnapshot, ScanPolicy, Scanner};
use crate::world::{EntityId, MembershipIndex, Vec3};

/// Resource a storage node holds unless configured otherwise.
pub const DEFAULT_RESOURCE: &str = "ElectricCharge";

/// Units of stored resource per unit of net power per second.
pub const DEFAULT_RATE_CONSTANT: f32 = 0.35;

/// Seconds between discovery scans unless configured otherwise.
pub const DEFAULT_SCAN_DELAY_SECS: f64 = 10.0;

/// Configured (not derived) parameters of a storage node.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageParams {
    /// Ledger key of the resource this node charges and discharges.
    pub resource: String,
    /// Maximum flow rate in units per second.
    pub max_flow_rate: f32,
    /// Rate constant `k` of the flow formula.
    pub rate_constant: f32,
    /// Modifier used until (and unless) bootstrap binds one.
    pub default_modifier: f32,
    /// Whether this node is seen as a storage peer by others.
    pub counts_as_storage: bool,
    /// Delay between discovery scans in seconds.
    pub scan_delay_secs: f64,
}

impl Default for StorageParams {
    fn default() -> Self {
        Self {
            resource: DEFAULT_RESOURCE.to_string(),
            max_flow_rate: 1.0,
            rate_constant: DEFAULT_RATE_CONSTANT,
            default_modifier: 1.0,
            counts_as_storage: true,
            scan_delay_secs: DEFAULT_SCAN_DELAY_SECS,
        }
    }
}

/// What a tick did to the stored quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickOutcome {
    /// No flow computed: disabled node, or no storage peers discovered.
    Idle,
    Charged,
    Discharged,
    /// Discharge refused because too little was stored.
    DischargeRejected,
}

impl TickOutcome {
    /// Stable lowercase label used in telemetry output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Charged => "charged",
            Self::Discharged => "discharged",
            Self::DischargeRejected => "discharge_rejected",
        }
    }
}

/// Values produced by one tick of a storage node.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub outcome: TickOutcome,
    /// Signed flow computed for the tick (0 when idle).
    pub flow: f32,
    /// Flow indicator: the max flow rate when flow was applied, else 0.
    pub produced_flow: f32,
    pub stored: f32,
    pub capacity: f32,
    /// Whether a discovery scan ran during this tick.
    pub scanned: bool,
    pub base_hours: f32,
    pub adjusted_hours: f32,
}

/// A deployable energy-storage unit.
///
/// `StorageNode` owns its resource ledger and its discovery snapshot. It
/// reads other entities only through a [`MembershipIndex`] at scan time and
/// never keeps references to them between ticks.
///
/// # Flow convention
/// - Positive flow: network surplus, the node charges
/// - Negative flow: network deficit, the node discharges
#[derive(Debug, Clone)]
pub struct StorageNode {
    id: EntityId,
    position: Vec3,

    /// Designated resource key within `ledger`.
    resource: String,
    ledger: ResourceLedger,

    /// Maximum flow rate in units per second.
    max_flow_rate: f32,
    rate_constant: f32,
    modifier: PerformanceModifier,
    counts_as_storage: bool,
    enabled: bool,

    /// Simulation time of the last flow update (seconds).
    last_update: f64,
    snapshot: DiscoverySnapshot,
    cadence: ScanCadence,
    produced_flow: f32,
}

impl StorageNode {
    /// Creates an undeployed storage node.
    ///
    /// # Arguments
    ///
    /// * `id` - Entity identifier the node will be registered under
    /// * `position` - World position
    /// * `ledger` - Resources held by the node
    /// * `params` - Configured parameters
    /// * `nominal_dt` - Nominal step duration used to derive the scan cadence
    ///
    /// # Errors
    ///
    /// Returns `NodeError::UnknownResource` if `params.resource` is not a key
    /// of `ledger`.
    ///
    /// # Panics
    ///
    /// Panics if the rate constant, default modifier, or `nominal_dt` is not
    /// positive, or `max_flow_rate` is negative.
    pub fn new(
        id: EntityId,
        position: Vec3,
        ledger: ResourceLedger,
        params: StorageParams,
        nominal_dt: f64,
    ) -> Result<Self, NodeError> {
        assert!(params.rate_constant > 0.0, "rate constant must be > 0");
        assert!(params.max_flow_rate >= 0.0, "max flow rate must be >= 0");

        if !ledger.contains(&params.resource) {
            return Err(NodeError::UnknownResource {
                node: id,
                key: params.resource,
            });
        }

        Ok(Self {
            id,
            position,
            resource: params.resource,
            ledger,
            max_flow_rate: params.max_flow_rate,
            rate_constant: params.rate_constant,
            modifier: PerformanceModifier::unbound(params.default_modifier),
            counts_as_storage: params.counts_as_storage,
            enabled: true,
            last_update: 0.0,
            snapshot: DiscoverySnapshot::default(),
            cadence: ScanCadence::from_delay(params.scan_delay_secs, nominal_dt),
            produced_flow: 0.0,
        })
    }

    /// Runs the first discovery scan, including the one-time bootstrap
    /// binding, and starts the flow clock at `ctx.now`.
    pub fn deploy<I: MembershipIndex>(&mut self, index: &I, policy: &ScanPolicy, ctx: TickContext) {
        self.rescan(index, policy, ctx.warp, true);
        self.last_update = ctx.now;
    }

    /// Rebuilds the discovery snapshot from scratch.
    ///
    /// With `first_time` set, also attempts the bootstrap binding. Failures
    /// are logged and never escape the scan.
    pub fn rescan<I: MembershipIndex>(
        &mut self,
        index: &I,
        policy: &ScanPolicy,
        warp: f32,
        first_time: bool,
    ) {
        self.snapshot = discovery::scan(
            index,
            Scanner {
                id: self.id,
                position: self.position,
                counts_as_storage: self.counts_as_storage,
            },
            policy,
            warp,
        );

        if first_time {
            if let Err(e) = bootstrap::bind_from_nearest_agent(
                self.id,
                &mut self.modifier,
                index,
                self.position,
                policy.capture_radius,
            ) {
                warn!(node = %self.id, "{e}");
            }
        }
    }

    /// Advances the node by one simulation step.
    ///
    /// Rescans on cadence, then charges or discharges according to the
    /// latest snapshot, which may be stale.
    ///
    /// # Errors
    ///
    /// Returns `NodeError::UnknownResource` if the designated resource has
    /// disappeared from the ledger.
    pub fn tick<I: MembershipIndex>(
        &mut self,
        index: &I,
        policy: &ScanPolicy,
        ctx: TickContext,
    ) -> Result<TickReport, NodeError> {
        let scanned = self.cadence.advance();
        if scanned {
            self.rescan(index, policy, ctx.warp, false);
        }

        let ResourceAmount {
            amount: available,
            capacity,
        } = self.resource()?;
        let peers = self.snapshot.peer_count();

        let mut flow = 0.0;
        let mut outcome = TickOutcome::Idle;
        self.produced_flow = 0.0;

        if self.enabled && peers > 0 {
            let elapsed = (ctx.now - self.last_update) as f32;
            flow = allocation::flow_magnitude(
                self.snapshot.total_demand(),
                self.snapshot.total_production(),
                peers,
                self.rate_constant,
                self.modifier.value(),
                elapsed,
            );

            let max_flow_per_tick = self.max_flow_rate * ctx.step_seconds as f32;
            let decision = allocation::decide(flow, available, max_flow_per_tick);
            let stored = allocation::apply(available, capacity, decision);
            self.set_stored(stored)?;

            outcome = match decision {
                FlowDecision::Charge(_) => TickOutcome::Charged,
                FlowDecision::Discharge(_) => TickOutcome::Discharged,
                FlowDecision::Rejected => TickOutcome::DischargeRejected,
            };
            if outcome != TickOutcome::DischargeRejected {
                self.produced_flow = self.max_flow_rate;
            }
            debug!(node = %self.id, flow, ?outcome, stored, "flow applied");
        }

        self.last_update = ctx.now;

        let stored = self.stored()?;
        Ok(TickReport {
            outcome,
            flow,
            produced_flow: self.produced_flow,
            stored,
            capacity,
            scanned,
            base_hours: report::base_duration_hours(stored, self.rate_constant),
            adjusted_hours: report::adjusted_duration_hours(
                stored,
                self.rate_constant,
                self.modifier.value(),
            ),
        })
    }

    fn unknown_resource(&self) -> NodeError {
        NodeError::UnknownResource {
            node: self.id,
            key: self.resource.clone(),
        }
    }

    fn resource(&self) -> Result<ResourceAmount, NodeError> {
        self.ledger
            .get(&self.resource)
            .ok_or_else(|| self.unknown_resource())
    }

    fn set_stored(&mut self, amount: f32) -> Result<(), NodeError> {
        match self.ledger.set_amount(&self.resource, amount) {
            Some(()) => Ok(()),
            None => Err(self.unknown_resource()),
        }
    }

    /// Current stored quantity.
    ///
    /// # Errors
    ///
    /// Returns `NodeError::UnknownResource` if the designated resource is
    /// missing from the ledger.
    pub fn stored(&self) -> Result<f32, NodeError> {
        Ok(self.resource()?.amount)
    }

    /// Storage capacity of the designated resource.
    ///
    /// # Errors
    ///
    /// Returns `NodeError::UnknownResource` if the designated resource is
    /// missing from the ledger.
    pub fn capacity(&self) -> Result<f32, NodeError> {
        Ok(self.resource()?.capacity)
    }

    /// Stored quantity expressed as hours of supply, without modifier.
    ///
    /// # Errors
    ///
    /// Returns `NodeError::UnknownResource` if the designated resource is
    /// missing from the ledger.
    pub fn base_duration_hours(&self) -> Result<f32, NodeError> {
        Ok(report::base_duration_hours(self.stored()?, self.rate_constant))
    }

    /// Stored quantity expressed as hours of supply, with modifier.
    ///
    /// # Errors
    ///
    /// Returns `NodeError::UnknownResource` if the designated resource is
    /// missing from the ledger.
    pub fn adjusted_duration_hours(&self) -> Result<f32, NodeError> {
        Ok(report::adjusted_duration_hours(
            self.stored()?,
            self.rate_constant,
            self.modifier.value(),
        ))
    }

    /// User-facing description of the node.
    ///
    /// # Errors
    ///
    /// Returns `NodeError::UnknownResource` if the designated resource is
    /// missing from the ledger.
    pub fn info(&self) -> Result<String, NodeError> {
        let r = self.resource()?;
        Ok(report::info_string(
            &self.resource,
            r.amount,
            r.capacity,
            self.rate_constant,
        ))
    }

    /// State preserved across save/load.
    ///
    /// # Errors
    ///
    /// Returns `NodeError::UnknownResource` if the designated resource is
    /// missing from the ledger.
    pub fn saved_state(&self) -> Result<SavedStorage, NodeError> {
        Ok(SavedStorage {
            stored: self.stored()?,
            max_flow_rate: self.max_flow_rate,
            modifier: self.modifier,
        })
    }

    /// Reapplies state from a save. The stored quantity is clamped to the
    /// node's capacity and a negative flow rate to zero. Nothing is applied
    /// unless every saved value is usable.
    ///
    /// # Errors
    ///
    /// Returns `NodeError::InvalidSavedState` if the stored quantity or flow
    /// rate is not finite, or the modifier is not a finite positive value.
    /// Returns `NodeError::UnknownResource` if the designated resource is
    /// missing from the ledger.
    pub fn restore(&mut self, saved: &SavedStorage) -> Result<(), NodeError> {
        let node = self.id;
        let invalid = |field, value| NodeError::InvalidSavedState {
            node,
            field,
            value,
        };
        if !saved.stored.is_finite() {
            return Err(invalid("stored", saved.stored));
        }
        if !saved.max_flow_rate.is_finite() {
            return Err(invalid("max_flow_rate", saved.max_flow_rate));
        }
        let modifier = saved.modifier.value();
        if !(modifier.is_finite() && modifier > 0.0) {
            return Err(invalid("modifier", modifier));
        }

        let capacity = self.capacity()?;
        self.set_stored(saved.stored.clamp(0.0, capacity))?;
        self.max_flow_rate = saved.max_flow_rate.max(0.0);
        self.modifier = saved.modifier;
        Ok(())
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn resource_key(&self) -> &str {
        &self.resource
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Host access to the node's resources.
    pub fn ledger_mut(&mut self) -> &mut ResourceLedger {
        &mut self.ledger
    }

    pub fn max_flow_rate(&self) -> f32 {
        self.max_flow_rate
    }

    pub fn rate_constant(&self) -> f32 {
        self.rate_constant
    }

    pub fn modifier(&self) -> PerformanceModifier {
        self.modifier
    }

    pub fn snapshot(&self) -> &DiscoverySnapshot {
        &self.snapshot
    }

    pub fn counts_as_storage(&self) -> bool {
        self.counts_as_storage
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn produced_flow(&self) -> f32 {
        self.produced_flow
    }

    pub fn last_update(&self) -> f64 {
        self.last_update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{ControllerNode, MobileAgent, PowerNeed, ProducerKind, ProducerNode};
    use crate::sim::discovery::PeerCount;
    use crate::world::{Entity, World};

    const RESOURCE: &str = DEFAULT_RESOURCE;

    fn params(scan_delay_secs: f64) -> StorageParams {
        StorageParams {
            scan_delay_secs,
            ..StorageParams::default()
        }
    }

    fn ledger(stored: f32) -> ResourceLedger {
        ResourceLedger::new().with_resource(RESOURCE, stored, 400.0)
    }

    fn ctx(now: f64) -> TickContext {
        TickContext {
            now,
            step_seconds: 1.0,
            warp: 1.0,
        }
    }

    fn add_controller(world: &mut World, pos: Vec3, range: f32, need: f32) -> EntityId {
        let id = world.next_id();
        world.insert(
            Entity::new(id, "ctrl", pos)
                .with_controller(ControllerNode::new(range, Some(PowerNeed::Amount(need)), 1)),
        )
    }

    fn add_producer(world: &mut World, pos: Vec3, output: f32) -> EntityId {
        let id = world.next_id();
        world.insert(
            Entity::new(id, "gen", pos)
                .with_producer(ProducerNode::new(ProducerKind::Steady, output)),
        )
    }

    /// Builds and deploys a node, then registers it in `world`.
    fn add_storage(world: &mut World, pos: Vec3, stored: f32, p: StorageParams) -> EntityId {
        let id = world.next_id();
        let mut node = StorageNode::new(id, pos, ledger(stored), p, 1.0).unwrap();
        node.deploy(&*world, &ScanPolicy::default(), ctx(0.0));
        world.insert(Entity::new(id, "bat", pos).with_storage(node))
    }

    /// Ticks every storage node once, the way the engine does.
    fn tick_all(world: &mut World, policy: &ScanPolicy, now: f64) -> Vec<TickReport> {
        let mut reports = Vec::new();
        for id in world.storage_ids() {
            let mut node = world.take_storage(id).unwrap();
            reports.push(node.tick(&*world, policy, ctx(now)).unwrap());
            world.restore_storage(id, node);
        }
        reports
    }

    fn stored(world: &World, id: EntityId) -> f32 {
        world
            .get(id)
            .and_then(|e| e.storage.as_ref())
            .and_then(|s| s.stored().ok())
            .unwrap()
    }

    #[test]
    fn unknown_resource_fails_fast() {
        let p = StorageParams {
            resource: "Ore".into(),
            ..StorageParams::default()
        };
        let err = StorageNode::new(EntityId(3), Vec3::ZERO, ledger(0.0), p, 1.0).unwrap_err();
        assert_eq!(
            err,
            NodeError::UnknownResource {
                node: EntityId(3),
                key: "Ore".into()
            }
        );
    }

    #[test]
    fn no_controller_leaves_stored_unchanged() {
        let mut world = World::new();
        let id = add_storage(&mut world, Vec3::ZERO, 123.0, params(1.0));
        add_controller(&mut world, Vec3::new(50.0, 0.0, 0.0), 10.0, 5.0);
        add_producer(&mut world, Vec3::new(1.0, 0.0, 0.0), 10.0);

        for step in 1..=20 {
            let reports = tick_all(&mut world, &ScanPolicy::default(), f64::from(step) * 10.0);
            assert_eq!(reports[0].outcome, TickOutcome::Idle);
        }
        assert_eq!(stored(&world, id), 123.0);
    }

    #[test]
    fn lone_empty_node_stays_empty() {
        let mut world = World::new();
        add_controller(&mut world, Vec3::new(1.0, 0.0, 0.0), 10.0, 5.0);
        let id = add_storage(&mut world, Vec3::ZERO, 0.0, params(1.0));

        for policy in [PeerCount::IncludeSelf, PeerCount::ExcludeSelf] {
            let policy = ScanPolicy {
                peer_count: policy,
                ..ScanPolicy::default()
            };
            tick_all(&mut world, &policy, 1.0);
            assert_eq!(stored(&world, id), 0.0);
        }
    }

    #[test]
    fn lone_node_is_idle_when_excluding_self() {
        let mut world = World::new();
        add_controller(&mut world, Vec3::new(1.0, 0.0, 0.0), 10.0, 0.0);
        add_producer(&mut world, Vec3::new(2.0, 0.0, 0.0), 10.0);
        let id = add_storage(&mut world, Vec3::ZERO, 0.0, params(1.0));

        let exclude = ScanPolicy {
            peer_count: PeerCount::ExcludeSelf,
            ..ScanPolicy::default()
        };
        let reports = tick_all(&mut world, &exclude, 1.0);
        assert_eq!(reports[0].outcome, TickOutcome::Idle);
        assert_eq!(stored(&world, id), 0.0);

        let reports = tick_all(&mut world, &ScanPolicy::default(), 2.0);
        assert_eq!(reports[0].outcome, TickOutcome::Charged);
        assert!((stored(&world, id) - 3.5).abs() < 1e-5);
    }

    #[test]
    fn two_nodes_share_deficit() {
        let mut world = World::new();
        add_controller(&mut world, Vec3::new(1.0, 0.0, 0.0), 10.0, 10.0);
        let full = add_storage(&mut world, Vec3::ZERO, 400.0, params(1.0));
        let empty = add_storage(&mut world, Vec3::new(2.0, 0.0, 0.0), 0.0, params(1.0));

        let reports = tick_all(&mut world, &ScanPolicy::default(), 1.0);

        let expected = DEFAULT_RATE_CONSTANT * (0.0 - 10.0) * 1.0 / 2.0;
        assert!((reports[0].flow - expected).abs() < 1e-6);
        assert!((reports[1].flow - expected).abs() < 1e-6);
        assert_eq!(reports[0].outcome, TickOutcome::Discharged);
        assert_eq!(reports[1].outcome, TickOutcome::DischargeRejected);
        assert!((stored(&world, full) - (400.0 + expected)).abs() < 1e-4);
        assert_eq!(stored(&world, empty), 0.0);
    }

    #[test]
    fn stored_stays_within_bounds() {
        let mut world = World::new();
        add_controller(&mut world, Vec3::new(1.0, 0.0, 0.0), 10.0, 0.0);
        add_producer(&mut world, Vec3::new(2.0, 0.0, 0.0), 5000.0);
        let id = add_storage(&mut world, Vec3::ZERO, 399.0, params(1.0));

        for step in 1..=5 {
            tick_all(&mut world, &ScanPolicy::default(), f64::from(step));
            let q = stored(&world, id);
            assert!((0.0..=400.0).contains(&q));
        }
        assert_eq!(stored(&world, id), 400.0);
    }

    #[test]
    fn discharge_clamps_at_zero() {
        let mut world = World::new();
        add_controller(&mut world, Vec3::new(1.0, 0.0, 0.0), 10.0, 1000.0);
        let id = add_storage(&mut world, Vec3::ZERO, 2.0, params(1.0));

        let reports = tick_all(&mut world, &ScanPolicy::default(), 1.0);
        assert_eq!(reports[0].outcome, TickOutcome::Discharged);
        assert_eq!(stored(&world, id), 0.0);

        let reports = tick_all(&mut world, &ScanPolicy::default(), 2.0);
        assert_eq!(reports[0].outcome, TickOutcome::DischargeRejected);
        assert_eq!(reports[0].produced_flow, 0.0);
    }

    #[test]
    fn elapsed_time_drives_flow() {
        let mut world = World::new();
        add_controller(&mut world, Vec3::new(1.0, 0.0, 0.0), 10.0, 0.0);
        add_producer(&mut world, Vec3::new(2.0, 0.0, 0.0), 1.0);
        let id = add_storage(&mut world, Vec3::ZERO, 0.0, params(1000.0));

        // Deployed at t=0; first update at t=4 covers four seconds.
        tick_all(&mut world, &ScanPolicy::default(), 4.0);
        assert!((stored(&world, id) - 4.0 * DEFAULT_RATE_CONSTANT).abs() < 1e-5);
    }

    #[test]
    fn snapshot_stays_stale_between_scans() {
        let mut world = World::new();
        add_controller(&mut world, Vec3::new(1.0, 0.0, 0.0), 10.0, 0.0);
        let id = add_storage(&mut world, Vec3::ZERO, 0.0, params(3.0));
        add_producer(&mut world, Vec3::new(2.0, 0.0, 0.0), 1.0);

        let first = tick_all(&mut world, &ScanPolicy::default(), 1.0);
        assert!(!first[0].scanned);
        assert_eq!(first[0].flow, 0.0);

        tick_all(&mut world, &ScanPolicy::default(), 2.0);
        let third = tick_all(&mut world, &ScanPolicy::default(), 3.0);
        assert!(third[0].scanned);
        assert!(third[0].flow > 0.0);
        assert!(stored(&world, id) > 0.0);
    }

    #[test]
    fn bootstrap_binds_once_and_rescans_never_rebind() {
        let mut world = World::new();
        let crew = world.next_id();
        world.insert(
            Entity::new(crew, "crew", Vec3::new(1.0, 0.0, 0.0))
                .with_agent(MobileAgent::with_power_skill(2.0)),
        );
        add_controller(&mut world, Vec3::new(1.0, 0.0, 0.0), 10.0, 0.0);
        let id = add_storage(&mut world, Vec3::ZERO, 0.0, params(1.0));

        if let Some(agent) = world.get_mut(crew).and_then(|e| e.agent.as_mut()) {
            *agent = MobileAgent::with_power_skill(5.0);
        }

        for step in 1..=5 {
            tick_all(&mut world, &ScanPolicy::default(), f64::from(step));
        }
        let node = world.get(id).and_then(|e| e.storage.as_ref()).unwrap();
        assert_eq!(node.modifier(), PerformanceModifier::Bound { value: 2.0 });
    }

    #[test]
    fn repeated_first_time_scan_keeps_bound_modifier() {
        let mut world = World::new();
        let crew = world.next_id();
        world.insert(
            Entity::new(crew, "crew", Vec3::ZERO).with_agent(MobileAgent::with_power_skill(2.0)),
        );
        let mut node = StorageNode::new(world.next_id(), Vec3::ZERO, ledger(0.0), params(1.0), 1.0)
            .unwrap();
        node.deploy(&world, &ScanPolicy::default(), ctx(0.0));
        if let Some(agent) = world.get_mut(crew).and_then(|e| e.agent.as_mut()) {
            *agent = MobileAgent::with_power_skill(4.0);
        }
        node.rescan(&world, &ScanPolicy::default(), 1.0, true);
        assert_eq!(node.modifier().value(), 2.0);
    }

    #[test]
    fn disabled_node_is_idle() {
        let mut world = World::new();
        add_controller(&mut world, Vec3::new(1.0, 0.0, 0.0), 10.0, 0.0);
        add_producer(&mut world, Vec3::new(2.0, 0.0, 0.0), 1.0);
        let id = add_storage(&mut world, Vec3::ZERO, 0.0, params(1.0));
        if let Some(node) = world.get_mut(id).and_then(|e| e.storage.as_mut()) {
            node.set_enabled(false);
        }

        let reports = tick_all(&mut world, &ScanPolicy::default(), 1.0);
        assert_eq!(reports[0].outcome, TickOutcome::Idle);
        assert_eq!(stored(&world, id), 0.0);
    }

    #[test]
    fn non_storage_peer_is_not_counted() {
        let mut world = World::new();
        add_controller(&mut world, Vec3::new(1.0, 0.0, 0.0), 10.0, 0.0);
        add_storage(
            &mut world,
            Vec3::new(2.0, 0.0, 0.0),
            0.0,
            StorageParams {
                counts_as_storage: false,
                ..params(1.0)
            },
        );
        let id = add_storage(&mut world, Vec3::ZERO, 0.0, params(1.0));

        tick_all(&mut world, &ScanPolicy::default(), 1.0);
        let node = world.get(id).and_then(|e| e.storage.as_ref()).unwrap();
        assert_eq!(node.snapshot().peer_count(), 1);
    }

    #[test]
    fn info_reports_current_and_maximum() {
        let node =
            StorageNode::new(EntityId(0), Vec3::ZERO, ledger(252.0), params(1.0), 1.0).unwrap();
        let info = node.info().unwrap();
        assert!(info.starts_with("ElectricCharge: 252.00/400.00"));
        assert!((node.base_duration_hours().unwrap() - 0.2).abs() < 1e-5);
        assert!((node.adjusted_duration_hours().unwrap() - 0.2).abs() < 1e-5);
    }

    #[test]
    fn restore_clamps_to_capacity() {
        let mut node =
            StorageNode::new(EntityId(0), Vec3::ZERO, ledger(0.0), params(1.0), 1.0).unwrap();
        node.restore(&SavedStorage {
            stored: 900.0,
            max_flow_rate: 3.0,
            modifier: PerformanceModifier::Bound { value: 1.5 },
        })
        .unwrap();
        assert_eq!(node.stored(), Ok(400.0));
        assert_eq!(node.max_flow_rate(), 3.0);
        assert_eq!(node.modifier().value(), 1.5);
    }

    #[test]
    fn restore_rejects_unusable_values_untouched() {
        let mut node =
            StorageNode::new(EntityId(4), Vec3::ZERO, ledger(120.0), params(1.0), 1.0).unwrap();
        let good = SavedStorage {
            stored: 10.0,
            max_flow_rate: 2.0,
            modifier: PerformanceModifier::Bound { value: 1.5 },
        };
        let bound = |value| PerformanceModifier::Bound { value };
        let cases = [
            ("stored", SavedStorage { stored: f32::NAN, ..good }),
            ("stored", SavedStorage { stored: f32::INFINITY, ..good }),
            ("max_flow_rate", SavedStorage { max_flow_rate: f32::NAN, ..good }),
            ("modifier", SavedStorage { modifier: bound(0.0), ..good }),
            ("modifier", SavedStorage { modifier: bound(-2.0), ..good }),
            ("modifier", SavedStorage { modifier: bound(f32::NAN), ..good }),
        ];

        for (field, saved) in cases {
            let err = node.restore(&saved);
            let rejected = match &err {
                Err(NodeError::InvalidSavedState { node, field: f, .. }) => {
                    *node == EntityId(4) && *f == field
                }
                _ => false,
            };
            assert!(rejected, "{field}: {err:?}");
            assert_eq!(node.stored(), Ok(120.0));
            assert_eq!(node.max_flow_rate(), 1.0);
            assert!(!node.modifier().is_bound());
        }
    }
}

//! Simulation engine that steps every storage node over a shared world.

use tracing::{error, info};

use crate::devices::{StorageNode, StorageParams};
use crate::error::NodeError;
use crate::ledger::ResourceLedger;
use crate::persist::{SaveFile, SavedNode};
use crate::world::{Daylight, Entity, EntityId, Vec3, World};

use super::clock::Clock;
use super::discovery::ScanPolicy;
use super::types::{SimConfig, StepResult};

/// Simulation engine owning the world, the clock, and the scan policy.
///
/// Each step the host side runs first (producers refresh their reported
/// output against the daylight model), then every storage node ticks in
/// insertion order against a read-only view of the rest of the world.
pub struct Engine {
    config: SimConfig,
    world: World,
    clock: Clock,
    daylight: Daylight,
    policy: ScanPolicy,
}

impl Engine {
    /// Creates a new simulation engine.
    ///
    /// # Arguments
    ///
    /// * `config` - Simulation configuration
    /// * `world` - Controllers, producers, and agents already in place
    /// * `daylight` - Illumination model for solar producers
    /// * `policy` - Discovery scan policy shared by all nodes
    pub fn new(config: SimConfig, world: World, daylight: Daylight, policy: ScanPolicy) -> Self {
        let clock = Clock::new(config.steps, config.dt_seconds).with_warp(config.warp);
        let mut engine = Self {
            config,
            world,
            clock,
            daylight,
            policy,
        };
        engine.refresh_producers();
        engine
    }

    /// Host-side update of environment-dependent production at the current time.
    fn refresh_producers(&mut self) {
        let lit = self.daylight.is_lit(self.clock.now());
        let warp = self.clock.warp();
        for entity in self.world.iter_mut() {
            if let Some(producer) = entity.producer.as_mut() {
                producer.host_refresh(lit, warp);
            }
        }
    }

    /// Creates, deploys, and registers a storage node at the current time.
    ///
    /// Deployment runs the node's first scan, so agents meant to bind their
    /// skill must already be in the world.
    ///
    /// # Errors
    ///
    /// Returns `NodeError::UnknownResource` if `params.resource` is not held
    /// by `ledger`.
    pub fn deploy_storage(
        &mut self,
        name: &str,
        position: Vec3,
        ledger: ResourceLedger,
        params: StorageParams,
    ) -> Result<EntityId, NodeError> {
        let id = self.world.next_id();
        let mut node = StorageNode::new(id, position, ledger, params, self.config.dt_seconds)?;
        node.deploy(&self.world, &self.policy, self.clock.tick_context());
        info!(node = %id, name, modifier = node.modifier().value(), "storage deployed");
        Ok(self
            .world
            .insert(Entity::new(id, name, position).with_storage(node)))
    }

    /// Executes one simulation step.
    ///
    /// Returns one `StepResult` per storage node that ticked, or `None`
    /// once the clock has run out. A node whose tick fails is logged and
    /// skipped for this step only.
    pub fn step(&mut self) -> Option<Vec<StepResult>> {
        let step = self.clock.tick()?;
        let ctx = self.clock.tick_context();

        // 1. Host update of environment-dependent production
        self.refresh_producers();

        // 2. Storage nodes, one at a time
        let ids = self.world.storage_ids();
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(mut node) = self.world.take_storage(id) else {
                continue;
            };
            let outcome = node.tick(&self.world, &self.policy, ctx);
            let snapshot = node.snapshot().clone();
            self.world.restore_storage(id, node);

            match outcome {
                Ok(report) => results.push(StepResult {
                    step,
                    time_s: ctx.now,
                    node: id,
                    name: self.world.get(id).map(|e| e.name.clone()).unwrap_or_default(),
                    outcome: report.outcome,
                    scanned: report.scanned,
                    demand: snapshot.total_demand(),
                    production: snapshot.total_production(),
                    peers: snapshot.peer_count(),
                    flow: report.flow,
                    produced_flow: report.produced_flow,
                    stored: report.stored,
                    capacity: report.capacity,
                    adjusted_hours: report.adjusted_hours,
                }),
                Err(e) => error!(step, node = %id, "{e}; skipping node this step"),
            }
        }
        Some(results)
    }

    /// Executes all remaining steps and returns every step record.
    pub fn run(&mut self) -> Vec<StepResult> {
        let mut results = Vec::new();
        while let Some(mut step) = self.step() {
            results.append(&mut step);
        }
        results
    }

    /// Changes time acceleration for subsequent steps.
    pub fn set_warp(&mut self, warp: f32) {
        self.clock.set_warp(warp);
        self.config.warp = warp;
    }

    /// Captures the persisted state of every storage node.
    ///
    /// # Errors
    ///
    /// Returns the first `NodeError` raised by a misconfigured node.
    pub fn save(&self) -> Result<SaveFile, NodeError> {
        let mut nodes = Vec::new();
        for entity in self.world.iter() {
            if let Some(storage) = entity.storage.as_ref() {
                nodes.push(SavedNode {
                    name: entity.name.clone(),
                    state: storage.saved_state()?,
                });
            }
        }
        Ok(SaveFile { nodes })
    }

    /// Applies saved state to storage nodes with matching names.
    ///
    /// Returns the number of nodes restored.
    ///
    /// # Errors
    ///
    /// Returns the first `NodeError` raised by a misconfigured node or by an
    /// unusable saved value. That node is left as it was; nodes before it
    /// keep their restored state.
    pub fn load(&mut self, save: &SaveFile) -> Result<usize, NodeError> {
        let mut restored = 0;
        for entity in self.world.iter_mut() {
            let (Some(storage), Some(saved)) = (entity.storage.as_mut(), save.find(&entity.name))
            else {
                continue;
            };
            storage.restore(saved)?;
            restored += 1;
        }
        Ok(restored)
    }

    /// Returns a storage node by entity id.
    pub fn storage(&self, id: EntityId) -> Option<&StorageNode> {
        self.world.get(id).and_then(|e| e.storage.as_ref())
    }

    /// Returns a mutable storage node by entity id.
    pub fn storage_mut(&mut self, id: EntityId) -> Option<&mut StorageNode> {
        self.world.get_mut(id).and_then(|e| e.storage.as_mut())
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Returns a reference to the simulation configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn policy(&self) -> &ScanPolicy {
        &self.policy
    }
}

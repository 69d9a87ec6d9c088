//! Engine construction from a validated [`ScenarioConfig`].

use tracing::debug;

use crate::config::{ScenarioConfig, StorageConfig};
use crate::devices::{AgentTrait, ControllerNode, MobileAgent, ProducerNode, StorageParams};
use crate::error::NodeError;
use crate::ledger::ResourceLedger;
use crate::sim::discovery::ScanPolicy;
use crate::sim::engine::Engine;
use crate::sim::types::SimConfig;
use crate::world::{Daylight, Entity, World};

/// Builds a ready-to-run engine from a scenario.
///
/// Controllers, producers, and agents are placed first so that every storage
/// node sees them during its deployment scan; storage nodes are then deployed
/// in file order. The scenario is expected to have passed
/// [`ScenarioConfig::validate`].
///
/// # Errors
///
/// Returns `NodeError::UnknownResource` if a storage node's `resource` is
/// not the key its ledger holds.
pub fn build_engine(cfg: &ScenarioConfig) -> Result<Engine, NodeError> {
    let s = &cfg.simulation;
    let sim_config = SimConfig::new(s.steps, s.dt_seconds, s.seed)
        .with_warp(s.warp)
        .with_scan_delay(s.scan_delay_secs);

    let d = &cfg.daylight;
    let daylight = Daylight::new(d.day_length_secs, d.sunrise_frac, d.sunset_frac);

    let policy = ScanPolicy {
        demand_scope: s.demand_scope,
        peer_count: s.peer_count,
        production_override: s.production_override,
        capture_radius: s.capture_radius,
    };

    let mut engine = Engine::new(sim_config, populate_world(cfg), daylight, policy);

    for b in &cfg.storage {
        let ledger = ResourceLedger::new().with_resource(b.ledger_key(), b.stored, b.capacity);
        let params = storage_params(b, s.scan_delay_secs);
        let id = engine.deploy_storage(&b.name, b.position, ledger, params)?;
        if !b.enabled {
            if let Some(node) = engine.storage_mut(id) {
                node.set_enabled(false);
            }
        }
    }

    Ok(engine)
}

fn populate_world(cfg: &ScenarioConfig) -> World {
    let mut world = World::new();

    for c in &cfg.controllers {
        let id = world.next_id();
        let node = ControllerNode::new(c.range, c.power_needed.clone(), c.connected_consumers);
        world.insert(
            Entity::new(id, c.name.as_str(), c.position)
                .with_parts(c.parts)
                .with_controller(node),
        );
    }

    for p in &cfg.producers {
        let id = world.next_id();
        let mut node = ProducerNode::new(p.kind, p.nominal_output);
        if !p.enabled {
            node = node.disabled();
        }
        world.insert(
            Entity::new(id, p.name.as_str(), p.position)
                .with_parts(p.parts)
                .with_producer(node),
        );
    }

    for a in &cfg.agents {
        let id = world.next_id();
        let mut traits: Vec<AgentTrait> = a
            .traits
            .iter()
            .map(|name| AgentTrait::Other { name: name.clone() })
            .collect();
        if let Some(value) = a.power_skill {
            traits.push(AgentTrait::PowerSkill { value });
        }
        world.insert(
            Entity::new(id, a.name.as_str(), a.position)
                .with_parts(a.parts)
                .with_agent(MobileAgent { traits }),
        );
    }

    debug!(entities = world.len(), "world populated");
    world
}

fn storage_params(b: &StorageConfig, default_delay: f64) -> StorageParams {
    StorageParams {
        resource: b.resource.clone(),
        max_flow_rate: b.max_flow_rate,
        rate_constant: b.rate_constant,
        default_modifier: b.default_modifier,
        counts_as_storage: b.counts_as_storage,
        scan_delay_secs: b.scan_delay_secs.unwrap_or(default_delay),
    }
}

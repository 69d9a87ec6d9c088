//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use outpost_power::config::{
    ControllerConfig, DaylightConfig, ProducerConfig, ScenarioConfig, SimulationConfig,
    StorageConfig,
};
use outpost_power::devices::{PowerNeed, ProducerKind};
use outpost_power::scenario::build_engine;
use outpost_power::sim::engine::Engine;
use outpost_power::world::Vec3;

/// One-second steps, scanning every step, no agents.
pub fn every_step_simulation(steps: usize) -> SimulationConfig {
    SimulationConfig {
        steps,
        dt_seconds: 1.0,
        scan_delay_secs: 0.0,
        ..SimulationConfig::default()
    }
}

/// A controller at the origin with range 20 and the given demand.
pub fn hub(demand: f32) -> ControllerConfig {
    ControllerConfig {
        name: "hub".into(),
        position: Vec3::ZERO,
        range: 20.0,
        power_needed: Some(PowerNeed::Amount(demand)),
        ..ControllerConfig::default()
    }
}

/// A 400-capacity storage unit on the x axis.
pub fn unit(name: &str, x: f32, stored: f32) -> StorageConfig {
    StorageConfig {
        name: name.into(),
        position: Vec3::new(x, 0.0, 0.0),
        stored,
        ..StorageConfig::default()
    }
}

/// A solar panel on the x axis.
pub fn panel(name: &str, x: f32, nominal_output: f32) -> ProducerConfig {
    ProducerConfig {
        name: name.into(),
        position: Vec3::new(x, 0.0, 0.0),
        kind: ProducerKind::Solar,
        nominal_output,
        ..ProducerConfig::default()
    }
}

/// Daylight for the first half of a 20-second day.
pub fn short_day() -> DaylightConfig {
    DaylightConfig {
        day_length_secs: 20.0,
        sunrise_frac: 0.0,
        sunset_frac: 0.5,
    }
}

/// A scenario with a single hub and the given storage units.
pub fn hub_scenario(steps: usize, demand: f32, storage: Vec<StorageConfig>) -> ScenarioConfig {
    ScenarioConfig {
        simulation: every_step_simulation(steps),
        controllers: vec![hub(demand)],
        storage,
        ..ScenarioConfig::default()
    }
}

/// Validates and builds a scenario, failing the test on any error.
pub fn engine_for(cfg: &ScenarioConfig) -> Engine {
    let errors = cfg.validate();
    assert!(errors.is_empty(), "fixture should be valid: {errors:?}");
    match build_engine(cfg) {
        Ok(engine) => engine,
        Err(e) => panic!("fixture should build: {e}"),
    }
}

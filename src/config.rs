//! TOML-based scenario configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Deserialize;
use thiserror::Error;

use crate::devices::storage::{DEFAULT_RATE_CONSTANT, DEFAULT_RESOURCE, DEFAULT_SCAN_DELAY_SECS};
use crate::devices::{PowerNeed, ProducerKind, ProductionOverride};
use crate::sim::bootstrap::DEFAULT_CAPTURE_RADIUS;
use crate::sim::discovery::{DemandScope, PeerCount};
use crate::world::Vec3;

/// Top-level scenario configuration parsed from TOML.
///
/// Missing sections take their defaults and missing entity lists are empty.
/// Load from TOML with [`ScenarioConfig::from_toml_file`] or use a preset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing and scan policy.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Day/night cycle for solar producers.
    #[serde(default)]
    pub daylight: DaylightConfig,
    /// Demand controllers (`[[controller]]`).
    #[serde(default, rename = "controller")]
    pub controllers: Vec<ControllerConfig>,
    /// Energy producers (`[[producer]]`).
    #[serde(default, rename = "producer")]
    pub producers: Vec<ProducerConfig>,
    /// Mobile agents present at deployment (`[[agent]]`).
    #[serde(default, rename = "agent")]
    pub agents: Vec<AgentConfig>,
    /// Storage nodes, deployed in order (`[[storage]]`).
    #[serde(default, rename = "storage")]
    pub storage: Vec<StorageConfig>,
}

/// Simulation timing and scan policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of physics steps to run (must be > 0).
    pub steps: usize,
    /// Nominal step duration in seconds (must be > 0).
    pub dt_seconds: f64,
    /// Time acceleration factor (must be > 0).
    pub warp: f32,
    /// Master random seed.
    pub seed: u64,
    /// Delay between discovery scans in seconds.
    pub scan_delay_secs: f64,
    /// Radius of the one-time agent search at deployment.
    pub capture_radius: f32,
    /// `"all_in_range"` or `"closest_only"`.
    pub demand_scope: DemandScope,
    /// `"include_self"` or `"exclude_self"`.
    pub peer_count: PeerCount,
    /// `"when_accelerated"` or `"disabled"`.
    pub production_override: ProductionOverride,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: 120,
            dt_seconds: 1.0,
            warp: 1.0,
            seed: 42,
            scan_delay_secs: DEFAULT_SCAN_DELAY_SECS,
            capture_radius: DEFAULT_CAPTURE_RADIUS,
            demand_scope: DemandScope::default(),
            peer_count: PeerCount::default(),
            production_override: ProductionOverride::default(),
        }
    }
}

/// Day/night cycle parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaylightConfig {
    /// Length of one day in simulated seconds.
    pub day_length_secs: f64,
    /// Start of daylight as a fraction of the day (inclusive).
    pub sunrise_frac: f64,
    /// End of daylight as a fraction of the day (exclusive).
    pub sunset_frac: f64,
}

impl Default for DaylightConfig {
    fn default() -> Self {
        Self {
            day_length_secs: 240.0,
            sunrise_frac: 0.0,
            sunset_frac: 0.5,
        }
    }
}

/// Demand controller parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    pub name: String,
    pub position: Vec3,
    /// Discovery range radius.
    pub range: f32,
    /// Declared demand: a number or a `"number unit"` string.
    pub power_needed: Option<PowerNeed>,
    /// Consumers wired to this controller (descriptive).
    pub connected_consumers: u32,
    /// Parts in the assembly; only single-part entities are members.
    pub parts: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec3::ZERO,
            range: 50.0,
            power_needed: None,
            connected_consumers: 0,
            parts: 1,
        }
    }
}

/// Energy producer parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProducerConfig {
    pub name: String,
    pub position: Vec3,
    /// `"solar"` or `"steady"`.
    pub kind: ProducerKind,
    /// Output under ideal conditions (units per second).
    pub nominal_output: f32,
    pub enabled: bool,
    pub parts: usize,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec3::ZERO,
            kind: ProducerKind::Solar,
            nominal_output: 1.0,
            enabled: true,
            parts: 1,
        }
    }
}

/// Mobile agent parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    pub name: String,
    pub position: Vec3,
    /// Power skill modifier, if the agent has one.
    pub power_skill: Option<f32>,
    /// Other trait names (no effect on power equipment).
    pub traits: Vec<String>,
    pub parts: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec3::ZERO,
            power_skill: None,
            traits: Vec::new(),
            parts: 1,
        }
    }
}

/// Storage node parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub name: String,
    pub position: Vec3,
    /// Capacity of the held resource.
    pub capacity: f32,
    /// Initial stored quantity.
    pub stored: f32,
    /// Maximum flow rate (units per second).
    pub max_flow_rate: f32,
    /// Rate constant of the flow formula.
    pub rate_constant: f32,
    /// Modifier used when no agent binds one.
    pub default_modifier: f32,
    /// Resource key the node charges and discharges.
    pub resource: String,
    /// Resource key actually held in the ledger; defaults to `resource`.
    pub holds: Option<String>,
    pub counts_as_storage: bool,
    pub enabled: bool,
    /// Per-node scan delay; defaults to `simulation.scan_delay_secs`.
    pub scan_delay_secs: Option<f64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec3::ZERO,
            capacity: 400.0,
            stored: 0.0,
            max_flow_rate: 1.0,
            rate_constant: DEFAULT_RATE_CONSTANT,
            default_modifier: 1.0,
            resource: DEFAULT_RESOURCE.to_string(),
            holds: None,
            counts_as_storage: true,
            enabled: true,
            scan_delay_secs: None,
        }
    }
}

impl StorageConfig {
    /// Ledger key the node's resource is stored under.
    pub fn ledger_key(&self) -> &str {
        self.holds.as_deref().unwrap_or(&self.resource)
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.dt_seconds"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &["outpost", "twin", "scatter"];

    /// A small surface outpost: one controller, two solar panels, two
    /// storage units, and a skilled crew member next to the first unit.
    pub fn outpost() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            daylight: DaylightConfig::default(),
            controllers: vec![ControllerConfig {
                name: "hub".into(),
                position: Vec3::new(0.0, 0.0, 0.0),
                range: 60.0,
                power_needed: Some(PowerNeed::from("8 kW")),
                connected_consumers: 4,
                ..ControllerConfig::default()
            }],
            producers: vec![
                ProducerConfig {
                    name: "panel-east".into(),
                    position: Vec3::new(12.0, 0.0, 3.0),
                    nominal_output: 6.0,
                    ..ProducerConfig::default()
                },
                ProducerConfig {
                    name: "panel-west".into(),
                    position: Vec3::new(-10.0, 0.0, -4.0),
                    nominal_output: 6.0,
                    ..ProducerConfig::default()
                },
            ],
            agents: vec![AgentConfig {
                name: "engineer".into(),
                position: Vec3::new(5.5, 0.0, 0.0),
                power_skill: Some(1.5),
                ..AgentConfig::default()
            }],
            storage: vec![
                StorageConfig {
                    name: "bat-a".into(),
                    position: Vec3::new(5.0, 0.0, 0.0),
                    stored: 200.0,
                    ..StorageConfig::default()
                },
                StorageConfig {
                    name: "bat-b".into(),
                    position: Vec3::new(-5.0, 0.0, 1.0),
                    stored: 50.0,
                    max_flow_rate: 2.0,
                    ..StorageConfig::default()
                },
            ],
        }
    }

    /// Two units sharing a pure deficit: one full, one empty, demand 10,
    /// no production, one-second steps scanning every step.
    pub fn twin() -> Self {
        Self {
            simulation: SimulationConfig {
                steps: 10,
                scan_delay_secs: 1.0,
                ..SimulationConfig::default()
            },
            daylight: DaylightConfig::default(),
            controllers: vec![ControllerConfig {
                name: "hub".into(),
                range: 20.0,
                power_needed: Some(PowerNeed::Amount(10.0)),
                ..ControllerConfig::default()
            }],
            producers: Vec::new(),
            agents: Vec::new(),
            storage: vec![
                StorageConfig {
                    name: "full".into(),
                    position: Vec3::new(3.0, 0.0, 0.0),
                    stored: 400.0,
                    ..StorageConfig::default()
                },
                StorageConfig {
                    name: "empty".into(),
                    position: Vec3::new(-3.0, 0.0, 0.0),
                    stored: 0.0,
                    ..StorageConfig::default()
                },
            ],
        }
    }

    /// A randomized field of controllers, panels, and storage units.
    ///
    /// Positions, demands, and outputs are drawn from `seed`, so the same
    /// seed always yields the same layout.
    pub fn scatter(seed: u64) -> Self {
        const FIELD: f32 = 120.0;
        let mut rng = StdRng::seed_from_u64(seed);
        let place = |rng: &mut StdRng| {
            Vec3::new(
                rng.random_range(-FIELD..FIELD),
                0.0,
                rng.random_range(-FIELD..FIELD),
            )
        };

        let controllers = (0..3)
            .map(|i| ControllerConfig {
                name: format!("hub-{i}"),
                position: place(&mut rng),
                range: rng.random_range(40.0..90.0),
                power_needed: Some(PowerNeed::Text(format!(
                    "{:.1} kW",
                    rng.random_range(2.0..12.0_f32)
                ))),
                connected_consumers: rng.random_range(1..6),
                ..ControllerConfig::default()
            })
            .collect();

        let producers = (0..6)
            .map(|i| ProducerConfig {
                name: format!("panel-{i}"),
                position: place(&mut rng),
                nominal_output: rng.random_range(1.0..5.0),
                ..ProducerConfig::default()
            })
            .collect();

        let storage = (0..5)
            .map(|i| StorageConfig {
                name: format!("bat-{i}"),
                position: place(&mut rng),
                stored: rng.random_range(0.0..400.0),
                ..StorageConfig::default()
            })
            .collect();

        Self {
            simulation: SimulationConfig {
                seed,
                steps: 480,
                ..SimulationConfig::default()
            },
            daylight: DaylightConfig::default(),
            controllers,
            producers,
            agents: Vec::new(),
            storage,
        }
    }

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "outpost" => Ok(Self::outpost()),
            "twin" => Ok(Self::twin()),
            "scatter" => Ok(Self::scatter(SimulationConfig::default().seed)),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new(
                "scenario",
                format!("cannot read \"{}\": {e}", path.display()),
            )
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. Malformed
    /// `power_needed` strings are deliberately not rejected here; the scan
    /// treats them as zero demand.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.steps == 0 {
            errors.push(ConfigError::new("simulation.steps", "must be > 0"));
        }
        if !positive(s.dt_seconds) {
            errors.push(ConfigError::new("simulation.dt_seconds", "must be > 0"));
        }
        if !positive(s.warp) {
            errors.push(ConfigError::new("simulation.warp", "must be > 0"));
        }
        if !non_negative(s.scan_delay_secs) {
            errors.push(ConfigError::new("simulation.scan_delay_secs", "must be >= 0"));
        }
        if !non_negative(s.capture_radius) {
            errors.push(ConfigError::new("simulation.capture_radius", "must be >= 0"));
        }

        let d = &self.daylight;
        if !positive(d.day_length_secs) {
            errors.push(ConfigError::new("daylight.day_length_secs", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&d.sunrise_frac) || !(0.0..=1.0).contains(&d.sunset_frac) {
            errors.push(ConfigError::new(
                "daylight.sunrise_frac",
                "sunrise_frac and sunset_frac must be in [0.0, 1.0]",
            ));
        } else if d.sunrise_frac > d.sunset_frac {
            errors.push(ConfigError::new(
                "daylight.sunrise_frac",
                "must be <= daylight.sunset_frac",
            ));
        }

        for (i, c) in self.controllers.iter().enumerate() {
            if !non_negative(c.range) {
                errors.push(ConfigError::new(format!("controller[{i}].range"), "must be >= 0"));
            }
        }

        for (i, p) in self.producers.iter().enumerate() {
            if !non_negative(p.nominal_output) {
                errors.push(ConfigError::new(
                    format!("producer[{i}].nominal_output"),
                    "must be >= 0",
                ));
            }
        }

        for (i, a) in self.agents.iter().enumerate() {
            if a.power_skill.is_some_and(|v| !positive(v)) {
                errors.push(ConfigError::new(format!("agent[{i}].power_skill"), "must be > 0"));
            }
        }

        let mut names = HashSet::new();
        for (i, b) in self.storage.iter().enumerate() {
            let field = |name: &str| format!("storage[{i}].{name}");
            if b.name.is_empty() {
                errors.push(ConfigError::new(field("name"), "must not be empty"));
            } else if !names.insert(b.name.as_str()) {
                errors.push(ConfigError::new(
                    field("name"),
                    format!("duplicate storage name \"{}\"", b.name),
                ));
            }
            if !positive(b.capacity) {
                errors.push(ConfigError::new(field("capacity"), "must be > 0"));
            }
            if !(0.0..=b.capacity).contains(&b.stored) {
                errors.push(ConfigError::new(field("stored"), "must be in [0.0, capacity]"));
            }
            if !non_negative(b.max_flow_rate) {
                errors.push(ConfigError::new(field("max_flow_rate"), "must be >= 0"));
            }
            if !positive(b.rate_constant) {
                errors.push(ConfigError::new(field("rate_constant"), "must be > 0"));
            }
            if !positive(b.default_modifier) {
                errors.push(ConfigError::new(field("default_modifier"), "must be > 0"));
            }
            if b.scan_delay_secs.is_some_and(|v| !non_negative(v)) {
                errors.push(ConfigError::new(field("scan_delay_secs"), "must be >= 0"));
            }
        }

        errors
    }
}

/// Finite and strictly positive.
fn positive(x: impl Into<f64>) -> bool {
    let x = x.into();
    x.is_finite() && x > 0.0
}

/// Finite and at least zero.
fn non_negative(x: impl Into<f64>) -> bool {
    let x = x.into();
    x.is_finite() && x >= 0.0
}

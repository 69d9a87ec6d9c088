use serde::{Deserialize, Serialize};

/// Kind of energy source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProducerKind {
    /// Yields output only while illuminated.
    #[default]
    Solar,
    /// Yields nominal output at all times.
    Steady,
}

/// An energy source as seen by the host.
///
/// `actual_output` is whatever the host last reported. Under time
/// acceleration the host stops refreshing it, so it can lag behind
/// `in_sunlight`; see [`ProductionOverride`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerNode {
    pub kind: ProducerKind,

    /// Output under ideal conditions (units per second).
    pub nominal_output: f32,

    /// Output last reported by the host (units per second).
    pub actual_output: f32,

    pub enabled: bool,

    /// Current value of the environmental predicate.
    pub in_sunlight: bool,
}

impl ProducerNode {
    /// Creates an enabled, illuminated producer reporting nominal output.
    ///
    /// Negative nominal output is clamped to zero.
    pub fn new(kind: ProducerKind, nominal_output: f32) -> Self {
        let nominal_output = nominal_output.max(0.0);
        Self {
            kind,
            nominal_output,
            actual_output: nominal_output,
            enabled: true,
            in_sunlight: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Output implied by the current environment, ignoring what the host
    /// reported.
    pub fn environmental_output(&self) -> f32 {
        match self.kind {
            ProducerKind::Solar if !self.in_sunlight => 0.0,
            _ => self.nominal_output,
        }
    }

    /// Host-side refresh for one simulation step.
    ///
    /// The illumination flag always follows the environment, but the
    /// reported output is only recomputed at real-time speed (`warp <= 1`).
    pub fn host_refresh(&mut self, lit: bool, warp: f32) {
        self.in_sunlight = lit;
        if warp <= 1.0 {
            self.actual_output = self.environmental_output();
        }
    }
}

/// Compensation rule for stale host-reported production under time warp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionOverride {
    /// Always trust the host-reported output.
    Disabled,
    /// Above 1x warp, derive output from the environmental predicate.
    #[default]
    WhenAccelerated,
}

impl ProductionOverride {
    /// Output to count for `producer` at time acceleration `warp`.
    ///
    /// Disabled producers yield nothing regardless of policy.
    pub fn effective_output(self, producer: &ProducerNode, warp: f32) -> f32 {
        if !producer.enabled {
            return 0.0;
        }
        match self {
            ProductionOverride::WhenAccelerated if warp > 1.0 => producer.environmental_output(),
            _ => producer.actual_output,
        }
    }
}

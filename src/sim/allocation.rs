//! Per-tick flow allocation for a single storage node.

/// Signed flow for one node over `elapsed` seconds.
///
/// The network surplus `production - demand` is scaled by
/// `rate_constant / modifier` and split evenly across `peers` storage units.
/// Positive means the node charges, negative means it discharges.
///
/// # Panics
///
/// Panics if `peers` is zero or `modifier` is not positive.
///
/// # Examples
///
/// ```
/// use outpost_power::sim::allocation::flow_magnitude;
///
/// // Two units sharing a 10-unit deficit for one second.
/// let flow = flow_magnitude(10.0, 0.0, 2, 0.5, 1.0, 1.0);
/// assert_eq!(flow, -2.5);
/// ```
pub fn flow_magnitude(
    demand: f32,
    production: f32,
    peers: usize,
    rate_constant: f32,
    modifier: f32,
    elapsed: f32,
) -> f32 {
    assert!(peers > 0, "flow needs at least one storage unit");
    assert!(modifier > 0.0, "modifier must be > 0");
    (rate_constant / modifier) * (production - demand) * elapsed / peers as f32
}

/// Outcome of the allocation rule for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowDecision {
    /// Add the (positive) flow.
    Charge(f32),
    /// Apply the (non-positive) flow.
    Discharge(f32),
    /// Not enough stored to cover the discharge this tick.
    Rejected,
}

impl FlowDecision {
    /// Signed amount to apply to the stored quantity.
    pub fn delta(self) -> f32 {
        match self {
            FlowDecision::Charge(f) | FlowDecision::Discharge(f) => f,
            FlowDecision::Rejected => 0.0,
        }
    }
}

/// Decides what to do with `flow` given what is `available`.
///
/// Charging is always allowed. A discharge is only allowed when `available`
/// covers the smaller of `max_flow_per_tick` and the discharge size.
pub fn decide(flow: f32, available: f32, max_flow_per_tick: f32) -> FlowDecision {
    if flow > 0.0 {
        FlowDecision::Charge(flow)
    } else if available >= max_flow_per_tick.min(-flow) {
        FlowDecision::Discharge(flow)
    } else {
        FlowDecision::Rejected
    }
}

/// Applies `decision` to `stored`, clamped to `[0, capacity]`.
pub fn apply(stored: f32, capacity: f32, decision: FlowDecision) -> f32 {
    (stored + decision.delta()).clamp(0.0, capacity)
}

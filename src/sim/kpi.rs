//! Post-hoc KPI computation from simulation results.

use std::collections::HashMap;
use std::fmt;

use crate::devices::TickOutcome;

use super::types::StepResult;

/// Aggregate indicators derived from a complete simulation run.
///
/// Computed post-hoc from `Vec<StepResult>` to ensure consistency between
/// step data and reported metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiReport {
    /// Number of node-steps recorded.
    pub node_steps: usize,
    /// Node-steps that ran a discovery scan.
    pub scans: usize,
    /// Node-steps with no flow computed.
    pub idle_steps: usize,
    /// Discharges refused for lack of stored quantity.
    pub rejected_discharges: usize,
    /// Total quantity added by charging.
    pub total_charged: f32,
    /// Total quantity removed by discharging.
    pub total_discharged: f32,
    /// Lowest stored quantity seen on any node.
    pub min_stored: f32,
    /// Highest stored quantity seen on any node.
    pub max_stored: f32,
}

impl KpiReport {
    /// Computes all KPIs from the complete step record vector.
    ///
    /// Charged and discharged totals are derived from the change in stored
    /// quantity between consecutive records of the same node, so clamping
    /// is accounted for.
    pub fn from_results(results: &[StepResult]) -> Self {
        if results.is_empty() {
            return Self {
                node_steps: 0,
                scans: 0,
                idle_steps: 0,
                rejected_discharges: 0,
                total_charged: 0.0,
                total_discharged: 0.0,
                min_stored: 0.0,
                max_stored: 0.0,
            };
        }

        let mut scans = 0_usize;
        let mut idle = 0_usize;
        let mut rejected = 0_usize;
        let mut charged = 0.0_f32;
        let mut discharged = 0.0_f32;
        let mut min_stored = f32::INFINITY;
        let mut max_stored = f32::NEG_INFINITY;
        let mut last_stored = HashMap::new();

        for r in results {
            if r.scanned {
                scans += 1;
            }
            match r.outcome {
                TickOutcome::Idle => idle += 1,
                TickOutcome::DischargeRejected => rejected += 1,
                TickOutcome::Charged | TickOutcome::Discharged => {}
            }

            if let Some(prev) = last_stored.insert(r.node, r.stored) {
                let delta = r.stored - prev;
                if delta > 0.0 {
                    charged += delta;
                } else {
                    discharged -= delta;
                }
            }

            min_stored = min_stored.min(r.stored);
            max_stored = max_stored.max(r.stored);
        }

        Self {
            node_steps: results.len(),
            scans,
            idle_steps: idle,
            rejected_discharges: rejected,
            total_charged: charged,
            total_discharged: discharged,
            min_stored,
            max_stored,
        }
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Node-steps:            {}", self.node_steps)?;
        writeln!(f, "Discovery scans:       {}", self.scans)?;
        writeln!(f, "Idle node-steps:       {}", self.idle_steps)?;
        writeln!(f, "Rejected discharges:   {}", self.rejected_discharges)?;
        writeln!(f, "Total charged:         {:.2}", self.total_charged)?;
        writeln!(f, "Total discharged:      {:.2}", self.total_discharged)?;
        write!(
            f,
            "Stored range:          {:.2} .. {:.2}",
            self.min_stored, self.max_stored
        )
    }
}

use serde::{Deserialize, Serialize};

use crate::error::DemandParseError;

/// A controller's declared power need.
///
/// Hosts report it either as a bare number or as a display string such as
/// `"12.5 kW"`, in which case only the leading token is the demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PowerNeed {
    Amount(f32),
    Text(String),
}

impl PowerNeed {
    /// Numeric demand carried by this value.
    ///
    /// # Errors
    ///
    /// Returns a `DemandParseError` if a text value does not start with a
    /// finite number.
    pub fn value(&self) -> Result<f32, DemandParseError> {
        match self {
            PowerNeed::Amount(v) => Ok(*v),
            PowerNeed::Text(s) => parse_power_need(s),
        }
    }
}

impl From<&str> for PowerNeed {
    fn from(s: &str) -> Self {
        PowerNeed::Text(s.to_string())
    }
}

impl From<f32> for PowerNeed {
    fn from(v: f32) -> Self {
        PowerNeed::Amount(v)
    }
}

/// Parses a "number [unit]" power-need string.
///
/// Blank input means no demand and yields `0.0`.
///
/// # Errors
///
/// Returns a `DemandParseError` if the leading token is not a finite number.
///
/// # Examples
///
/// ```
/// use outpost_power::devices::controller::parse_power_need;
///
/// assert_eq!(parse_power_need("12.5 kW"), Ok(12.5));
/// assert_eq!(parse_power_need("7"), Ok(7.0));
/// assert_eq!(parse_power_need(""), Ok(0.0));
/// assert!(parse_power_need("lots").is_err());
/// ```
pub fn parse_power_need(raw: &str) -> Result<f32, DemandParseError> {
    let Some(token) = raw.split_whitespace().next() else {
        return Ok(0.0);
    };
    match token.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DemandParseError {
            raw: raw.to_string(),
            token: token.to_string(),
        }),
    }
}

/// A demand aggregation point with its own discovery range.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerNode {
    /// Radius within which this controller serves storage and producers.
    pub range: f32,

    /// Declared demand; `None` means the host reported nothing.
    pub power_needed: Option<PowerNeed>,

    /// Number of consumers wired to this controller (descriptive only).
    pub connected_consumers: u32,
}

impl ControllerNode {
    /// # Panics
    ///
    /// Panics if `range` is negative.
    pub fn new(range: f32, power_needed: Option<PowerNeed>, connected_consumers: u32) -> Self {
        assert!(range >= 0.0, "controller range must be >= 0");
        Self {
            range,
            power_needed,
            connected_consumers,
        }
    }

    /// Parsed demand, with an absent value counting as zero.
    ///
    /// # Errors
    ///
    /// Propagates the parse failure of a malformed text value.
    pub fn demand(&self) -> Result<f32, DemandParseError> {
        self.power_needed.as_ref().map_or(Ok(0.0), PowerNeed::value)
    }

    /// Returns `true` when `distance` lies inside this controller's range.
    pub fn covers(&self, distance: f32) -> bool {
        distance <= self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_number_with_unit() {
        assert_eq!(parse_power_need("12.5 kW"), Ok(12.5));
    }

    #[test]
    fn parses_bare_number() {
        assert_eq!(parse_power_need("7"), Ok(7.0));
    }

    #[test]
    fn blank_is_zero() {
        assert_eq!(parse_power_need(""), Ok(0.0));
        assert_eq!(parse_power_need("   "), Ok(0.0));
    }

    #[test]
    fn leading_whitespace_is_ignored() {
        assert_eq!(parse_power_need("  3 units"), Ok(3.0));
    }

    #[test]
    fn malformed_reports_token() {
        let err = parse_power_need("n/a kW").unwrap_err();
        assert_eq!(err.token, "n/a");
        assert_eq!(err.raw, "n/a kW");
    }

    #[test]
    fn non_finite_is_rejected() {
        assert!(parse_power_need("NaN").is_err());
        assert!(parse_power_need("inf W").is_err());
    }

    #[test]
    fn absent_need_is_zero_demand() {
        let c = ControllerNode::new(10.0, None, 0);
        assert_eq!(c.demand(), Ok(0.0));
    }

    #[test]
    fn numeric_need_is_used_directly() {
        let c = ControllerNode::new(10.0, Some(PowerNeed::Amount(4.5)), 3);
        assert_eq!(c.demand(), Ok(4.5));
    }

    #[test]
    fn range_is_inclusive() {
        let c = ControllerNode::new(10.0, None, 0);
        assert!(c.covers(10.0));
        assert!(!c.covers(10.01));
    }

    #[test]
    #[should_panic]
    fn negative_range_panics() {
        ControllerNode::new(-1.0, None, 0);
    }
}

//! File output.

/// CSV telemetry export.
pub mod export;

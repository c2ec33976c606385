//! Common types for the shared crate

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// Tax/service-charge rate expressed in percent (7 means 7%)
pub type RatePercent = f64;

//! Shared types for the HanTao bill splitter
//!
//! Plain data records exchanged between the settlement engine and its
//! outer layers (UI, persistence, receipt scanning): bill entities,
//! computed summary/transfer outputs, scan payloads, and the unified
//! error type.

pub mod error;
pub mod models;
pub mod scan;
pub mod summary;
pub mod types;
pub mod util;

// Re-exports
pub use error::{BillError, BillErrorCode, BillResult};
pub use serde::{Deserialize, Serialize};

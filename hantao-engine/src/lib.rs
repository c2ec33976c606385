//! HanTao settlement engine
//!
//! Turns (members, items, receipts, config) into per-member consumption
//! breakdowns, net balances, and a minimal peer-to-peer transfer list.
//! The engine is a pure synchronous computation with no I/O: callers
//! re-run [`calculate_summary`] on every state change and identical
//! inputs always yield identical outputs.
//!
//! The [`bill`] module adds the in-memory aggregate the calculator UI
//! mutates (member/receipt/item lifecycle, scan ingestion); it feeds the
//! same pure engine.

pub mod bill;
pub mod money;
pub mod scan;
pub mod summary;

// Re-exports
pub use bill::Bill;
pub use summary::{SummaryOutput, calculate_summary};

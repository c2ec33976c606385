//! Unified error type for bill operations
//!
//! The settlement engine itself is total and never fails for well-formed
//! input; errors come from aggregate mutations and ingestion validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for bill operations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillErrorCode {
    MemberNotFound,
    ReceiptNotFound,
    ItemNotFound,
    NoMembers,
    InvalidAmount,
    InvalidQuantity,
    InvalidOperation,
}

/// Bill operation error: a code plus a human-readable message
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("{message}")]
pub struct BillError {
    pub code: BillErrorCode,
    pub message: String,
}

impl BillError {
    pub fn new(code: BillErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    // ========== Convenient constructors ==========

    pub fn member_not_found(id: &str) -> Self {
        Self::new(
            BillErrorCode::MemberNotFound,
            format!("Member '{}' not found", id),
        )
    }

    pub fn receipt_not_found(id: &str) -> Self {
        Self::new(
            BillErrorCode::ReceiptNotFound,
            format!("Receipt '{}' not found", id),
        )
    }

    pub fn item_not_found(id: &str) -> Self {
        Self::new(
            BillErrorCode::ItemNotFound,
            format!("Item '{}' not found", id),
        )
    }

    pub fn no_members() -> Self {
        Self::new(BillErrorCode::NoMembers, "Bill has no members")
    }

    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::new(BillErrorCode::InvalidAmount, message)
    }

    pub fn invalid_quantity(message: impl Into<String>) -> Self {
        Self::new(BillErrorCode::InvalidQuantity, message)
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::new(BillErrorCode::InvalidOperation, message)
    }
}

/// Result type for bill operations
pub type BillResult<T> = Result<T, BillError>;

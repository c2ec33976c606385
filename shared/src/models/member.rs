//! Member model

use serde::{Deserialize, Serialize};

/// A bill participant.
///
/// At most one member carries `is_payer` at a time: it marks the default
/// payer that item costs fall back to when no explicit payer is set. The
/// flag hands off to another member when its holder is removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: String,
    pub name: String,
    /// Default-payer flag
    #[serde(default)]
    pub is_payer: bool,
    /// Free-text payout identifier (bank account / PromptPay)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_pay_id: Option<String>,
}

/// Create member payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_pay_id: Option<String>,
}

impl MemberCreate {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt_pay_id: None,
        }
    }
}

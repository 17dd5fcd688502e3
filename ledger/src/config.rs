//! Settlement behaviour switches.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What to do when settlement is requested for a transaction that already
/// reached a final status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResettlePolicy {
    /// Fail with `AlreadySettled`.
    #[default]
    Reject,
    /// Return the transaction unchanged.
    Ignore,
}

impl fmt::Display for ResettlePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResettlePolicy::Reject => f.write_str("reject"),
            ResettlePolicy::Ignore => f.write_str("ignore"),
        }
    }
}

impl FromStr for ResettlePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(ResettlePolicy::Reject),
            "ignore" => Ok(ResettlePolicy::Ignore),
            other => Err(format!("unknown resettle policy: {other}")),
        }
    }
}

/// Settlement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Serialize settlements touching the same account.
    pub serialize_per_account: bool,
    /// Handling of repeated settlement requests.
    pub resettle_policy: ResettlePolicy,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            serialize_per_account: true,
            resettle_policy: ResettlePolicy::Reject,
        }
    }
}

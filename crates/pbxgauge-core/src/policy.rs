//! What the refresh loop does when a cycle fails.

use serde::Deserialize;

/// Refresh failure policy.
///
/// `Retry` logs the error, keeps the registry at its last-good values, and
/// tries again on the next tick. `Exit` stops the loop with the error so the
/// process terminates and an external supervisor restarts it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    #[default]
    Retry,
    Exit,
}

impl FailurePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            FailurePolicy::Retry => "retry",
            FailurePolicy::Exit => "exit",
        }
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "retry" => Ok(FailurePolicy::Retry),
            "exit" => Ok(FailurePolicy::Exit),
            other => Err(format!("unknown failure policy: {other} (expected retry|exit)")),
        }
    }
}

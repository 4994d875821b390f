//! Per-object reconciliation outcomes

use serde::{Deserialize, Serialize};

/// Terminal state of one config context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Object did not exist and was created
    Created,
    /// Object existed, differed and was patched
    Updated,
    /// Object existed and already matched
    Skipped,
    /// Object could not be reconciled
    Error,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Terminal state of one local context entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalOutcome {
    /// Document patched onto the destination object
    Applied,
    /// No destination object could be located
    NotFound,
    /// Destination rejected the patch
    Failed,
}

impl LocalOutcome {
    /// Whether the document reached the destination
    #[inline]
    #[must_use]
    pub fn applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_display() {
        assert_eq!(Outcome::Created.to_string(), "created");
        assert_eq!(Outcome::Error.to_string(), "error");
    }

    #[test]
    fn local_outcome_applied() {
        assert!(LocalOutcome::Applied.applied());
        assert!(!LocalOutcome::NotFound.applied());
    }
}

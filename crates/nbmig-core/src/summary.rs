//! Outcome aggregation

use nbmig_model::{LocalOutcome, Outcome};
use serde::Serialize;

/// Counters for a config context run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfigContextSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl ConfigContextSummary {
    /// Count one outcome
    #[inline]
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Error => self.errors += 1,
        }
    }

    /// Objects processed
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped + self.errors
    }
}

impl FromIterator<Outcome> for ConfigContextSummary {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        let mut summary = Self::default();
        for outcome in iter {
            summary.record(outcome);
        }
        summary
    }
}

impl std::fmt::Display for ConfigContextSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Migration complete: {} created, {} updated, {} skipped, {} errors.",
            self.created, self.updated, self.skipped, self.errors
        )
    }
}

/// Counters for a local context run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LocalContextSummary {
    pub applied: usize,
    pub failed: usize,
}

impl LocalContextSummary {
    /// Count one outcome
    #[inline]
    pub fn record(&mut self, outcome: LocalOutcome) {
        if outcome.applied() {
            self.applied += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Entries processed
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.applied + self.failed
    }
}

impl FromIterator<LocalOutcome> for LocalContextSummary {
    fn from_iter<I: IntoIterator<Item = LocalOutcome>>(iter: I) -> Self {
        let mut summary = Self::default();
        for outcome in iter {
            summary.record(outcome);
        }
        summary
    }
}

impl std::fmt::Display for LocalContextSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Done: {} contexts applied, {} failed",
            self.applied, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_context_counts() {
        let summary: ConfigContextSummary = [
            Outcome::Created,
            Outcome::Skipped,
            Outcome::Skipped,
            Outcome::Error,
            Outcome::Updated,
        ]
        .into_iter()
        .collect();

        assert_eq!(summary.created, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.total(), 5);
        assert_eq!(
            summary.to_string(),
            "Migration complete: 1 created, 1 updated, 2 skipped, 1 errors."
        );
    }

    #[test]
    fn local_context_counts_not_found_as_failed() {
        let summary: LocalContextSummary = [
            LocalOutcome::Applied,
            LocalOutcome::NotFound,
            LocalOutcome::Failed,
        ]
        .into_iter()
        .collect();

        assert_eq!(summary.applied, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.to_string(), "Done: 1 contexts applied, 2 failed");
    }
}

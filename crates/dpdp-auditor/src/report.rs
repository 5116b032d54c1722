use serde::{Deserialize, Serialize};

use crate::model::{MatchResult, MatchStatus};

/// Aggregate view of one completed audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_rules: usize,
    pub passed: usize,
    pub failed: usize,
    /// `round(100 * passed / total_rules)`, 0 when there are no results
    pub score_percent: u32,
}

impl AuditSummary {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let total_rules = results.len();
        let passed = results
            .iter()
            .filter(|r| r.status == MatchStatus::Pass)
            .count();
        let score_percent = if total_rules == 0 {
            0
        } else {
            (100.0 * passed as f64 / total_rules as f64).round() as u32
        };
        Self {
            total_rules,
            passed,
            failed: total_rules - passed,
            score_percent,
        }
    }
}

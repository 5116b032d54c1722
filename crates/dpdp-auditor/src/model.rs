use serde::{Deserialize, Serialize};

/// Placeholder shown instead of policy text when no clause satisfies a rule.
pub const NO_MATCH_CLAUSE: &str = "No matching clause found.";

/// A single regulatory requirement, e.g. "Rule 3(1)" with its statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Identifier from the left of the first colon in the rule file
    pub id: String,
    /// Requirement statement; may itself contain colons
    pub text: String,
}

/// A candidate clause cut from the audited document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    /// Position in the produced passage sequence (not the source line number)
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchStatus {
    Pass,
    Fail,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Pass => "PASS",
            MatchStatus::Fail => "FAIL",
        }
    }
}

/// Verdict for one rule against one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub rule_id: String,
    pub requirement: String,
    /// Best passage text on PASS, `NO_MATCH_CLAUSE` on FAIL
    pub company_clause: String,
    /// Raw cosine similarity of the best passage
    pub similarity: f32,
    /// `similarity` on a 0-100 scale, one decimal
    pub match_score: f64,
    pub status: MatchStatus,
}

/// Result of one audit call.
///
/// The two empty cases are kept apart so a missing rule file can never be mistaken for a
/// policy with no gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AuditOutcome {
    RulesMissing,
    NoPassages,
    Completed { results: Vec<MatchResult> },
}

impl AuditOutcome {
    pub fn results(&self) -> &[MatchResult] {
        match self {
            AuditOutcome::Completed { results } => results,
            AuditOutcome::RulesMissing | AuditOutcome::NoPassages => &[],
        }
    }
}

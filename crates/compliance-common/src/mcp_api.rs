use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AuditPolicyParams {
    /// Full privacy-policy text. Each line is treated as one candidate clause.
    pub policy_text: String,
    /// Similarity a clause must strictly exceed to satisfy a rule, in [0, 1]
    /// (default: server configured, normally 0.5).
    pub threshold: Option<f32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetRuleParams {
    /// Rule identifier as it appears in the rule file, e.g. "Rule 3(1)".
    pub rule_id: String,
}

/// Why an audit did or did not produce per-rule results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcomeKind {
    /// One result per loaded rule.
    Completed,
    /// No rules are loaded; the rule file is missing or empty.
    RulesMissing,
    /// The policy text contained no clause long enough to match.
    NoPassages,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClauseMatch {
    pub rule_id: String,
    pub requirement: String,
    /// Best-matching policy clause on PASS; a fixed placeholder on FAIL.
    pub company_clause: String,
    /// Cosine similarity scaled to 0-100, one decimal.
    pub match_score: f64,
    /// "PASS" or "FAIL".
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AuditSummaryInfo {
    pub total_rules: usize,
    pub passed: usize,
    pub failed: usize,
    /// Percentage of rules passed, rounded to the nearest integer.
    pub score_percent: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AuditPolicyResponse {
    pub outcome: AuditOutcomeKind,
    pub threshold: f32,
    /// Present only when `outcome` is `completed`.
    pub summary: Option<AuditSummaryInfo>,
    pub results: Vec<ClauseMatch>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RuleInfo {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RuleListResponse {
    /// Path of the rule file the rules were loaded from.
    pub source: String,
    pub count: usize,
    pub rules: Vec<RuleInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReloadRulesResponse {
    pub rule_count: usize,
    /// Digest of the embedding model and rule set now in use.
    pub fingerprint: String,
}

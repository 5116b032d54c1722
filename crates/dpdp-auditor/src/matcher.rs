/// Rule-to-policy matching.
///
/// Rule embeddings are computed once when the matcher is built and reused by every audit;
/// passage embeddings are computed per audit in a single batch. An audit never mutates the
/// matcher, so one instance can serve concurrent audits from behind an `Arc`.
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use compliance_common::embedding::{cosine_similarity, EmbeddingProvider};
use compliance_common::error::CommonError;

use crate::error::AppError;
use crate::model::{AuditOutcome, MatchResult, MatchStatus, Rule, NO_MATCH_CLAUSE};
use crate::passage;

/// Threshold applied when the caller does not pick one.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

pub struct RuleMatcher {
    provider: Arc<dyn EmbeddingProvider>,
    rules: Vec<Rule>,
    rule_embeddings: Vec<Vec<f32>>,
    fingerprint: String,
}

impl RuleMatcher {
    /// Build a matcher over `rules`, encoding every rule text up front.
    ///
    /// With no rules the provider is never called and every audit reports `RulesMissing`.
    /// This call blocks for the duration of the encode.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, rules: Vec<Rule>) -> Result<Self, AppError> {
        let rule_embeddings = if rules.is_empty() {
            Vec::new()
        } else {
            let texts: Vec<String> = rules.iter().map(|r| r.text.clone()).collect();
            encode_exact(provider.as_ref(), &texts)?
        };
        let fingerprint = fingerprint(provider.model_name(), &rules);
        info!(
            rules = rules.len(),
            model = provider.model_name(),
            fingerprint = %fingerprint,
            "rule matcher ready"
        );

        Ok(Self {
            provider,
            rules,
            rule_embeddings,
            fingerprint,
        })
    }

    /// Audit `document` against every loaded rule.
    ///
    /// A rule passes only when its best passage similarity is strictly greater than
    /// `threshold`. Among equally similar passages the earliest one wins. Results follow
    /// rule load order.
    pub fn audit(&self, document: &str, threshold: f32) -> Result<AuditOutcome, AppError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AppError::InvalidThreshold(threshold));
        }
        if self.rules.is_empty() {
            return Ok(AuditOutcome::RulesMissing);
        }

        let passages = passage::segment(document);
        if passages.is_empty() {
            return Ok(AuditOutcome::NoPassages);
        }

        let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
        let passage_embeddings = encode_exact(self.provider.as_ref(), &texts)?;

        let mut results = Vec::with_capacity(self.rules.len());
        for (rule, rule_embedding) in self.rules.iter().zip(&self.rule_embeddings) {
            let (best_idx, similarity) = best_match(rule_embedding, &passage_embeddings)
                .ok_or_else(|| CommonError::Embedding("no passage produced a finite similarity".to_string()))?;
            debug!(
                rule_id = %rule.id,
                passage = passages[best_idx].index,
                similarity,
                "best passage"
            );

            let status = if similarity > threshold {
                MatchStatus::Pass
            } else {
                MatchStatus::Fail
            };
            let company_clause = match status {
                MatchStatus::Pass => passages[best_idx].text.clone(),
                MatchStatus::Fail => NO_MATCH_CLAUSE.to_string(),
            };

            results.push(MatchResult {
                rule_id: rule.id.clone(),
                requirement: rule.text.clone(),
                company_clause,
                similarity,
                match_score: match_score(similarity),
                status,
            });
        }

        let passed = results.iter().filter(|r| r.status == MatchStatus::Pass).count();
        info!(
            rules = results.len(),
            passages = passages.len(),
            passed,
            threshold,
            "audit complete"
        );
        Ok(AuditOutcome::Completed { results })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Case-insensitive lookup by rule id.
    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id.eq_ignore_ascii_case(id))
    }

    pub fn provider(&self) -> Arc<dyn EmbeddingProvider> {
        Arc::clone(&self.provider)
    }

    /// SHA-256 over the model name and the ordered rule set. Changes whenever either would
    /// change an audit's output.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Scale a similarity to 0-100 and round to one decimal, half away from zero.
///
/// Negative cosines are not clamped and come out below zero; such rules always FAIL.
pub fn match_score(similarity: f32) -> f64 {
    (f64::from(similarity) * 1000.0).round() / 10.0
}

/// Index and similarity of the most similar passage. Ties keep the earlier passage.
///
/// NaN scores are skipped; `None` means no passage produced a comparable score.
fn best_match(rule: &[f32], passages: &[Vec<f32>]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, candidate) in passages.iter().enumerate() {
        let score = cosine_similarity(rule, candidate);
        if score.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((idx, score));
        }
    }
    best
}

fn encode_exact(provider: &dyn EmbeddingProvider, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
    let vectors = provider.encode(texts)?;
    if vectors.len() != texts.len() {
        return Err(CommonError::Embedding(format!(
            "provider returned {} vectors for {} inputs",
            vectors.len(),
            texts.len()
        ))
        .into());
    }
    Ok(vectors)
}

fn fingerprint(model_name: &str, rules: &[Rule]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model_name.as_bytes());
    for rule in rules {
        hasher.update(b"\n");
        hasher.update(rule.id.as_bytes());
        hasher.update(b"\0");
        hasher.update(rule.text.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

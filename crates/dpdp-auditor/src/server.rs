use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::cache::AuditCache;
use crate::config::Config;
use crate::matcher::RuleMatcher;
use crate::model::{AuditOutcome, MatchResult};
use crate::report::AuditSummary;
use crate::rules::{self, RuleLoad};
use compliance_common::mcp_api::{
    AuditOutcomeKind, AuditPolicyParams, AuditPolicyResponse, AuditSummaryInfo, ClauseMatch,
    GetRuleParams, ReloadRulesResponse, RuleInfo, RuleListResponse,
};

/// The rule set currently served. Swapped wholesale on reload.
pub struct ActiveRules {
    pub matcher: Arc<RuleMatcher>,
    pub source: String,
}

#[derive(Clone)]
pub struct DpdpAuditorServer {
    state: Arc<RwLock<ActiveRules>>,
    cache: Arc<AuditCache>,
    config: Config,
    tool_router: ToolRouter<DpdpAuditorServer>,
}

impl DpdpAuditorServer {
    pub fn new(
        matcher: Arc<RuleMatcher>,
        source: String,
        cache: Arc<AuditCache>,
        config: Config,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(ActiveRules { matcher, source })),
            cache,
            config,
            tool_router: Self::tool_router(),
        }
    }

    async fn active_matcher(&self) -> Arc<RuleMatcher> {
        Arc::clone(&self.state.read().await.matcher)
    }
}

#[tool_router]
impl DpdpAuditorServer {
    #[tool(description = "Audit privacy-policy text against the DPDP Rules 2025. Each line of the policy is a candidate clause; every rule gets its best-matching clause and a PASS/FAIL verdict.")]
    async fn audit_policy(
        &self,
        Parameters(params): Parameters<AuditPolicyParams>,
    ) -> Result<Json<AuditPolicyResponse>, String> {
        let threshold = params.threshold.unwrap_or(self.config.default_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(format!("threshold must be within [0, 1], got {threshold}"));
        }

        let matcher = self.active_matcher().await;
        let policy_text = params.policy_text;

        if let Some(cached) = self
            .cache
            .get_audit(matcher.fingerprint(), threshold, &policy_text)
            .await
        {
            info!(threshold, "audit cache hit");
            return Ok(Json(to_api_response(&cached, threshold)));
        }

        let outcome = {
            let matcher = Arc::clone(&matcher);
            let policy_text = policy_text.clone();
            tokio::task::spawn_blocking(move || matcher.audit(&policy_text, threshold))
                .await
                .map_err(|e| format!("audit task failed: {e}"))?
                .map_err(|e| format!("audit failed: {e}"))?
        };

        if matches!(outcome, AuditOutcome::Completed { .. }) {
            self.cache
                .set_audit(matcher.fingerprint(), threshold, &policy_text, &outcome)
                .await;
        }

        Ok(Json(to_api_response(&outcome, threshold)))
    }

    #[tool(description = "List every loaded DPDP rule in file order.")]
    async fn list_rules(&self) -> Result<Json<RuleListResponse>, String> {
        let state = self.state.read().await;
        let rules: Vec<RuleInfo> = state
            .matcher
            .rules()
            .iter()
            .map(|r| RuleInfo {
                id: r.id.clone(),
                text: r.text.clone(),
            })
            .collect();

        Ok(Json(RuleListResponse {
            source: state.source.clone(),
            count: rules.len(),
            rules,
        }))
    }

    #[tool(description = "Get a single DPDP rule by ID (case-insensitive).")]
    async fn get_rule(
        &self,
        Parameters(params): Parameters<GetRuleParams>,
    ) -> Result<Json<RuleInfo>, String> {
        let rule_id = params.rule_id.trim().to_string();
        if rule_id.is_empty() {
            return Err("rule_id must not be empty".to_string());
        }

        let matcher = self.active_matcher().await;
        let rule = matcher
            .rule(&rule_id)
            .ok_or_else(|| format!("rule not found: {rule_id}"))?;

        Ok(Json(RuleInfo {
            id: rule.id.clone(),
            text: rule.text.clone(),
        }))
    }

    #[tool(description = "Re-read the rule file and re-embed the rules. Cached audits are discarded. If the file cannot be read the current rules stay active.")]
    async fn reload_rules(&self) -> Result<Json<ReloadRulesResponse>, String> {
        info!("reload_rules tool invoked");

        let RuleLoad {
            source,
            rules,
            missing,
        } = rules::load_rules(&self.config.rules_path());
        if let Some(reason) = missing {
            return Err(format!("reload failed: cannot read {source}: {reason}"));
        }
        let provider = self.active_matcher().await.provider();
        let matcher = tokio::task::spawn_blocking(move || RuleMatcher::new(provider, rules))
            .await
            .map_err(|e| format!("reload task failed: {e}"))?
            .map_err(|e| format!("reload failed: {e}"))?;
        let matcher = Arc::new(matcher);

        let response = ReloadRulesResponse {
            rule_count: matcher.rule_count(),
            fingerprint: matcher.fingerprint().to_string(),
        };

        {
            let mut state = self.state.write().await;
            *state = ActiveRules { matcher, source };
        }
        self.cache.invalidate_all().await;
        info!(rule_count = response.rule_count, "active rule set replaced");

        Ok(Json(response))
    }
}

fn to_api_response(outcome: &AuditOutcome, threshold: f32) -> AuditPolicyResponse {
    let (kind, summary) = match outcome {
        AuditOutcome::Completed { results } => (
            AuditOutcomeKind::Completed,
            Some(to_api_summary(AuditSummary::from_results(results))),
        ),
        AuditOutcome::RulesMissing => (AuditOutcomeKind::RulesMissing, None),
        AuditOutcome::NoPassages => (AuditOutcomeKind::NoPassages, None),
    };

    AuditPolicyResponse {
        outcome: kind,
        threshold,
        summary,
        results: outcome.results().iter().map(to_api_match).collect(),
    }
}

fn to_api_match(result: &MatchResult) -> ClauseMatch {
    ClauseMatch {
        rule_id: result.rule_id.clone(),
        requirement: result.requirement.clone(),
        company_clause: result.company_clause.clone(),
        match_score: result.match_score,
        status: result.status.as_str().to_string(),
    }
}

fn to_api_summary(summary: AuditSummary) -> AuditSummaryInfo {
    AuditSummaryInfo {
        total_rules: summary.total_rules,
        passed: summary.passed,
        failed: summary.failed,
        score_percent: summary.score_percent,
    }
}

#[tool_handler]
impl ServerHandler for DpdpAuditorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "dpdp-auditor".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "DPDP Rules 2025 compliance auditor. Use audit_policy with the full policy text to \
                 get a PASS/FAIL verdict and best-matching clause per rule (outcome rules_missing \
                 means no rule file is loaded, no_passages means the text had no usable clauses). \
                 Use list_rules/get_rule to inspect requirements and reload_rules after editing \
                 the rule file."
                    .to_string(),
            ),
        }
    }
}

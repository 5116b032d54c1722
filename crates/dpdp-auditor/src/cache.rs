/// Redis caching of audit outcomes.
///
/// All operations degrade to no-ops without Redis.
///
/// Key schema:
/// - `dpdp:v1:audit:{sha256(fingerprint|threshold|document)}`: JSON AuditOutcome (TTL 3600s)
///
/// The matcher fingerprint covers the model and the rule set, so a reload naturally misses
/// old entries; `invalidate_all` additionally reclaims them.
use sha2::{Digest, Sha256};
use tracing::info;

use compliance_common::redis::RedisCache;

use crate::model::AuditOutcome;

const KEY_PREFIX: &str = "dpdp:v1:";
const AUDIT_TTL_SECS: u64 = 3600;

pub struct AuditCache {
    redis: RedisCache,
}

impl AuditCache {
    pub fn new(redis: RedisCache) -> Self {
        Self { redis }
    }

    pub async fn get_audit(
        &self,
        fingerprint: &str,
        threshold: f32,
        document: &str,
    ) -> Option<AuditOutcome> {
        let key = audit_key(fingerprint, threshold, document);
        self.redis.get_json(&key).await
    }

    pub async fn set_audit(
        &self,
        fingerprint: &str,
        threshold: f32,
        document: &str,
        outcome: &AuditOutcome,
    ) {
        let key = audit_key(fingerprint, threshold, document);
        self.redis
            .set_json_with_ttl(&key, outcome, AUDIT_TTL_SECS)
            .await;
    }

    pub async fn invalidate_all(&self) {
        if self.redis.delete_by_prefix(KEY_PREFIX).await {
            info!(prefix = KEY_PREFIX, "audit cache invalidated");
        }
    }
}

fn audit_key(fingerprint: &str, threshold: f32, document: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fingerprint.as_bytes());
    hasher.update(b"|");
    hasher.update(threshold.to_bits().to_le_bytes());
    hasher.update(b"|");
    hasher.update(document.as_bytes());
    let hash = hasher.finalize();
    format!("{KEY_PREFIX}audit:{:x}", hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_depends_on_every_input() {
        let base = audit_key("fp", 0.5, "doc");
        assert!(base.starts_with("dpdp:v1:audit:"));
        assert_eq!(base, audit_key("fp", 0.5, "doc"));
        assert_ne!(base, audit_key("fp2", 0.5, "doc"));
        assert_ne!(base, audit_key("fp", 0.45, "doc"));
        assert_ne!(base, audit_key("fp", 0.5, "doc "));
    }

    #[tokio::test]
    async fn disabled_cache_misses() {
        let cache = AuditCache::new(RedisCache::disabled());
        cache
            .set_audit("fp", 0.5, "doc", &AuditOutcome::NoPassages)
            .await;
        assert_eq!(cache.get_audit("fp", 0.5, "doc").await, None);
        cache.invalidate_all().await;
    }
}

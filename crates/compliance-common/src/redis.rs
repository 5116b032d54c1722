/// Redis client that never fails its caller.
///
/// Every operation swallows Redis errors after logging a warning: reads return `None`,
/// writes return `false`. A missing `REDIS_URL` yields a client that is permanently
/// disabled, and the auditor behaves identically apart from recomputing results.
///
/// Values are stored as JSON strings so cached payloads stay inspectable with `redis-cli`.
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Keys deleted per SCAN round trip in `delete_by_prefix`.
const SCAN_COUNT: usize = 100;

pub struct RedisCache {
    client: Option<redis::Client>,
}

impl RedisCache {
    /// Build a client for `url`. `None` or an unparseable URL disables the cache.
    pub fn new(url: Option<&str>) -> Self {
        let client = url.and_then(|u| {
            redis::Client::open(u)
                .inspect_err(|e| warn!(error = %e, url = u, "invalid redis url, cache disabled"))
                .ok()
        });
        Self { client }
    }

    /// A client that never connects. Used in tests and when caching is turned off.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// PING the server.
    pub async fn is_available(&self) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        let pong: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        pong.is_ok()
    }

    /// Fetch and decode a JSON value. Missing keys, connection failures and payloads that no
    /// longer match `T` all read as `None`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn
            .get(key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis GET failed"))
            .ok()?;
        serde_json::from_str(&raw?)
            .inspect_err(|e| warn!(error = %e, key, "cached payload did not decode"))
            .ok()
    }

    /// Encode `value` as JSON and store it with an expiry.
    pub async fn set_json_with_ttl<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) -> bool {
        let Ok(json) = serde_json::to_string(value)
            .inspect_err(|e| warn!(error = %e, key, "failed to encode cache payload"))
        else {
            return false;
        };
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.set_ex::<_, _, ()>(key, json, ttl_secs)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SETEX failed"))
            .is_ok()
    }

    /// Delete every key starting with `prefix`. Walks the keyspace with SCAN so a large
    /// cache never blocks the server the way KEYS would.
    pub async fn delete_by_prefix(&self, prefix: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };

        let pattern = format!("{prefix}*");
        let mut cursor: u64 = 0;
        loop {
            let scanned: Result<(u64, Vec<String>), _> = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await;
            let (next, keys) = match scanned {
                Ok(page) => page,
                Err(e) => {
                    warn!(error = %e, pattern, "redis SCAN failed");
                    return false;
                }
            };

            if !keys.is_empty() {
                if let Err(e) = conn.del::<_, ()>(&keys).await {
                    warn!(error = %e, pattern, "redis DEL failed during prefix delete");
                    return false;
                }
            }

            if next == 0 {
                return true;
            }
            cursor = next;
        }
    }

    async fn connection(&self) -> Option<MultiplexedConnection> {
        let client = self.client.as_ref()?;
        client
            .get_multiplexed_async_connection()
            .await
            .inspect_err(|e| warn!(error = %e, "redis connection failed"))
            .ok()
    }
}

/// Redis wrapper with graceful degradation.
///
/// Reads return `Option<T>` and writes return `bool` — on any Redis error the
/// operation logs a warning and degrades. Callers treat the remote side as
/// best-effort: the application is fully functional without Redis, it just
/// runs without cloud sync and accounts.
use redis::AsyncCommands;
use tracing::warn;

use crate::error::CommonError;

#[derive(Clone)]
pub struct RedisStore {
    client: Option<redis::Client>,
}

impl RedisStore {
    /// Attempt to create a client. If the URL is `None` or invalid, returns a
    /// `RedisStore` whose every operation degrades gracefully (no-ops).
    pub fn new(url: Option<&str>) -> Self {
        let client = url.and_then(|u| {
            redis::Client::open(u)
                .inspect_err(|e| warn!(error = %e, url = u, "failed to create redis client, cloud sync disabled"))
                .ok()
        });
        Self { client }
    }

    /// Test the connection by sending a PING. Returns `true` if Redis is reachable.
    pub async fn is_available(&self) -> bool {
        let Some(client) = &self.client else {
            return false;
        };
        match client.get_multiplexed_async_connection().await {
            Ok(mut conn) => {
                let result: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
                result.is_ok()
            }
            Err(_) => false,
        }
    }

    async fn connection(&self) -> Option<redis::aio::MultiplexedConnection> {
        let client = self.client.as_ref()?;
        client
            .get_multiplexed_async_connection()
            .await
            .inspect_err(|e| warn!(error = %e, "redis connection failed"))
            .ok()
    }

    // --- Plain keys ---

    /// Get a string value. `None` if Redis is unavailable or the key is absent.
    pub async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .get(key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis GET failed"))
            .ok()?;
        value
    }

    /// Set a string value with no expiry. Returns `true` on success.
    pub async fn set(&self, key: &str, value: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.set::<_, _, ()>(key, value)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SET failed"))
            .is_ok()
    }

    /// Set a string value with a TTL in seconds. Returns `true` on success.
    pub async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SETEX failed"))
            .is_ok()
    }

    /// Set a string value only if the key does not exist yet (SET NX).
    /// `Some(true)` when written, `Some(false)` when the key already held a
    /// value, `None` if Redis is unavailable.
    pub async fn set_if_absent(&self, key: &str, value: &str) -> Option<bool> {
        let mut conn = self.connection().await?;
        conn.set_nx::<_, _, bool>(key, value)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SETNX failed"))
            .ok()
    }

    /// Delete a key. Returns `true` on success.
    pub async fn delete(&self, key: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.del::<_, ()>(key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis DEL failed"))
            .is_ok()
    }

    // --- Sets ---

    /// Read all members of a set. `None` if Redis is unavailable; an absent
    /// key reads as an empty set.
    pub async fn set_members(&self, key: &str) -> Option<Vec<String>> {
        let mut conn = self.connection().await?;
        conn.smembers::<_, Vec<String>>(key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SMEMBERS failed"))
            .ok()
    }

    /// Add a member to a set. Returns `true` on success.
    pub async fn set_add(&self, key: &str, member: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.sadd::<_, _, ()>(key, member)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SADD failed"))
            .is_ok()
    }

    /// Remove a member from a set. Returns `true` on success.
    pub async fn set_remove(&self, key: &str, member: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.srem::<_, _, ()>(key, member)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SREM failed"))
            .is_ok()
    }

    /// Membership test. `None` if Redis is unavailable.
    pub async fn set_contains(&self, key: &str, member: &str) -> Option<bool> {
        let mut conn = self.connection().await?;
        conn.sismember::<_, _, bool>(key, member)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SISMEMBER failed"))
            .ok()
    }

    /// Replace the entire contents of a set in one atomic transaction
    /// (DEL + SADD in a MULTI/EXEC pipeline). Returns `true` on success.
    pub async fn set_replace(&self, key: &str, members: &[String]) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        let mut pipe = redis::pipe();
        pipe.atomic().del(key);
        if !members.is_empty() {
            pipe.sadd(key, members);
        }
        pipe.query_async::<()>(&mut conn)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis set replace failed"))
            .is_ok()
    }

    // --- Pub/sub ---

    /// Publish a payload on a channel. Returns `true` on success.
    pub async fn publish(&self, channel: &str, payload: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.publish::<_, _, ()>(channel, payload)
            .await
            .inspect_err(|e| warn!(error = %e, channel, "redis PUBLISH failed"))
            .is_ok()
    }

    /// Open a dedicated pub/sub connection. Unlike the key and set
    /// operations this surfaces its failure: an observer needs to know that
    /// its stream never started. The caller owns the connection and drives
    /// its message stream.
    pub async fn pubsub(&self) -> Result<redis::aio::PubSub, CommonError> {
        let client = self.client.as_ref().ok_or(CommonError::RedisUnavailable)?;
        Ok(client.get_async_pubsub().await?)
    }
}

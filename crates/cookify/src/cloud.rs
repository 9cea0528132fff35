/// Cloud replica of the favorites set, one Redis set per account.
///
/// Key schema (namespaced to avoid collisions):
/// - `cookify:v1:fav:{uid}` — SET of favorite recipe ids
/// - `cookify:v1:fav:changed:{uid}` — pub/sub channel; every write publishes
///   the full serialized set so observers converge on the latest value
///
/// Every operation is best-effort: on any Redis failure it logs a warning
/// (inside `RedisStore`) and degrades. Nothing here is allowed to take the
/// local store down with it.
use std::collections::HashSet;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use cookify_common::redis::RedisStore;

const KEY_PREFIX: &str = "cookify:v1:";

fn fav_key(uid: &str) -> String {
    format!("{KEY_PREFIX}fav:{uid}")
}

fn changed_channel(uid: &str) -> String {
    format!("{KEY_PREFIX}fav:changed:{uid}")
}

#[derive(Clone)]
pub struct CloudFavorites {
    redis: RedisStore,
}

impl CloudFavorites {
    pub fn new(redis: RedisStore) -> Self {
        Self { redis }
    }

    /// One-shot read of the remote set. `None` on any failure; an account
    /// with no document yet reads as an empty set.
    pub async fn get_once(&self, uid: &str) -> Option<HashSet<String>> {
        let members = self.redis.set_members(&fav_key(uid)).await?;
        Some(members.into_iter().collect())
    }

    /// Replace the remote set and notify observers. Returns `true` on success.
    pub async fn set_all(&self, uid: &str, ids: &HashSet<String>) -> bool {
        let mut members: Vec<String> = ids.iter().cloned().collect();
        members.sort();
        if !self.redis.set_replace(&fav_key(uid), &members).await {
            return false;
        }
        self.publish(uid, &members).await;
        true
    }

    /// Flip membership of `id` remotely using atomic SADD/SREM, then notify
    /// observers with the resulting set. Returns `true` on success.
    pub async fn toggle(&self, uid: &str, id: &str) -> bool {
        let key = fav_key(uid);
        let Some(is_member) = self.redis.set_contains(&key, id).await else {
            return false;
        };
        let ok = if is_member {
            self.redis.set_remove(&key, id).await
        } else {
            self.redis.set_add(&key, id).await
        };
        if !ok {
            return false;
        }
        let Some(members) = self.redis.set_members(&key).await else {
            return true;
        };
        self.publish(uid, &members).await;
        true
    }

    async fn publish(&self, uid: &str, members: &[String]) {
        match serde_json::to_string(members) {
            Ok(payload) => {
                self.redis.publish(&changed_channel(uid), &payload).await;
            }
            Err(e) => warn!(error = %e, uid, "failed to serialize favorites payload"),
        }
    }

    /// Live remote-change stream for one account, as a watch value: `None`
    /// until the first emission, then the latest published set. The returned
    /// task pumps pub/sub messages into the channel; abort it to unsubscribe.
    pub async fn watch(
        &self,
        uid: &str,
    ) -> (watch::Receiver<Option<HashSet<String>>>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(None);
        let channel = changed_channel(uid);
        let pubsub = self.redis.pubsub().await;

        let task = tokio::spawn(async move {
            let mut pubsub = match pubsub {
                Ok(p) => p,
                Err(e) => {
                    warn!(error = %e, channel, "cannot observe cloud favorites");
                    return;
                }
            };
            if let Err(e) = pubsub.subscribe(&channel).await {
                warn!(error = %e, channel, "pubsub subscribe failed");
                return;
            }
            let mut messages = pubsub.on_message();
            while let Some(msg) = messages.next().await {
                let Ok(payload) = msg.get_payload::<String>() else {
                    continue;
                };
                match serde_json::from_str::<Vec<String>>(&payload) {
                    Ok(ids) => {
                        tx.send_replace(Some(ids.into_iter().collect()));
                    }
                    Err(e) => warn!(error = %e, channel, "malformed favorites payload"),
                }
            }
        });

        (rx, task)
    }
}

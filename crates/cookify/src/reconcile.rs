/// Favorites reconciliation between the local durable store and the cloud
/// replica.
///
/// One logical set, two physical copies. On session start the two are merged
/// by union (neither side's favorites are lost); afterwards remote changes
/// flow into local, never the reverse — the asymmetry is what breaks update
/// cycles between two independently observed stores. Local writes reach the
/// cloud only through `toggle`, best-effort.
///
/// Union is the whole conflict policy: it can only add. A removal performed
/// entirely offline on another device is resurrected by the next merge with
/// the older remote state. That is a property of the design, kept on purpose.
use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cloud::CloudFavorites;
use crate::error::AppError;
use crate::favorites::FavoritesStore;

/// Outcome of the session-start merge: which side, if any, must be
/// overwritten with the union. A side is written only when the union
/// actually differs from it, so an already-consistent pair writes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    pub write_local: Option<HashSet<String>>,
    pub write_remote: Option<HashSet<String>>,
}

/// Compute the union merge of the two replicas.
pub fn plan_merge(local: &HashSet<String>, remote: &HashSet<String>) -> MergePlan {
    let union: HashSet<String> = local.union(remote).cloned().collect();
    MergePlan {
        write_local: (union != *local).then(|| union.clone()),
        write_remote: (union != *remote).then(|| union),
    }
}

/// Decide whether a remote emission must overwrite the local store:
/// `Some` iff it differs from the currently observed set.
pub fn apply_remote(
    current: &HashSet<String>,
    incoming: HashSet<String>,
) -> Option<HashSet<String>> {
    (incoming != *current).then_some(incoming)
}

/// Owns the directional update rule for one session. All writes to the
/// favorite set funnel through the local store's single write path; the
/// UI observes that store's stream and nothing else.
pub struct FavoritesReconciler {
    local: Arc<FavoritesStore>,
    cloud: CloudFavorites,
    uid: Option<String>,
    tasks: Vec<JoinHandle<()>>,
}

impl FavoritesReconciler {
    /// Start reconciling. With a uid, the one-time merge runs to completion
    /// (or is abandoned on remote failure) strictly before the remote
    /// live-subscription begins; without one, favorites are purely local.
    pub async fn start(
        local: Arc<FavoritesStore>,
        cloud: CloudFavorites,
        uid: Option<String>,
    ) -> Self {
        let tasks = match &uid {
            Some(uid) => {
                run_initial_merge(&local, &cloud, uid).await;

                let (mut remote_rx, pump) = cloud.watch(uid).await;
                let store = Arc::clone(&local);
                let mut local_rx = store.subscribe();
                let driver = tokio::spawn(async move {
                    loop {
                        if remote_rx.changed().await.is_err() {
                            break;
                        }
                        let Some(incoming) = remote_rx.borrow_and_update().clone() else {
                            continue;
                        };
                        let current = local_rx.borrow_and_update().clone();
                        if let Some(next) = apply_remote(&current, incoming) {
                            if let Err(e) = store.set_all(next).await {
                                warn!(error = %e, "failed to apply remote favorites locally");
                            }
                        }
                    }
                });
                vec![pump, driver]
            }
            None => Vec::new(),
        };

        Self {
            local,
            cloud,
            uid,
            tasks,
        }
    }

    /// The favorite set as the UI sees it: the local store's live stream.
    pub fn favorites(&self) -> watch::Receiver<HashSet<String>> {
        self.local.subscribe()
    }

    /// Flip membership of `id`. The local write is authoritative; the cloud
    /// mirror is fire-and-forget, its failure swallowed — the next session
    /// merge catches the cloud up. Returns whether the id is now a favorite.
    pub async fn toggle(&self, id: &str) -> Result<bool, AppError> {
        let now_favorite = self.local.toggle(id).await?;
        if let Some(uid) = &self.uid {
            self.cloud.toggle(uid, id).await;
        }
        Ok(now_favorite)
    }

    /// Abort the pub/sub pump and the driver. No writes are attempted after
    /// this returns. Idempotent; also runs on drop. Callers replacing one
    /// reconciler with another must stop the old one before the new one's
    /// merge starts, or a stale remote emission can overwrite the merge.
    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for FavoritesReconciler {
    /// Subscriptions are scoped to the reconciler's lifetime.
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_initial_merge(local: &FavoritesStore, cloud: &CloudFavorites, uid: &str) {
    let local_snapshot = local.snapshot();
    let Some(remote) = cloud.get_once(uid).await else {
        // no retry: the merge is abandoned and favorites carry on local-only
        warn!(uid, "remote favorites unreadable, skipping initial merge");
        return;
    };

    let plan = plan_merge(&local_snapshot, &remote);
    if plan.write_local.is_none() && plan.write_remote.is_none() {
        info!(uid, "favorites already consistent, nothing to merge");
        return;
    }
    if let Some(union) = plan.write_local {
        if let Err(e) = local.set_all(union).await {
            warn!(error = %e, "failed to write merged favorites locally");
        }
    }
    if let Some(union) = plan.write_remote {
        cloud.set_all(uid, &union).await;
    }
    info!(uid, "favorites merged on session start");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::temp_dir;
    use cookify_common::redis::RedisStore;

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn merge_takes_the_union_of_both_sides() {
        let plan = plan_merge(&set(&["a", "b"]), &set(&["b", "c"]));
        assert_eq!(plan.write_local, Some(set(&["a", "b", "c"])));
        assert_eq!(plan.write_remote, Some(set(&["a", "b", "c"])));
    }

    #[test]
    fn equal_replicas_merge_without_writing() {
        let plan = plan_merge(&set(&["a", "b"]), &set(&["a", "b"]));
        assert_eq!(plan.write_local, None);
        assert_eq!(plan.write_remote, None);
    }

    #[test]
    fn one_sided_merge_writes_only_the_stale_side() {
        // everything local is already remote: only remote has news
        let plan = plan_merge(&set(&["b"]), &set(&["a", "b"]));
        assert_eq!(plan.write_local, Some(set(&["a", "b"])));
        assert_eq!(plan.write_remote, None);

        let plan = plan_merge(&set(&["a", "b"]), &set(&["b"]));
        assert_eq!(plan.write_local, None);
        assert_eq!(plan.write_remote, Some(set(&["a", "b"])));
    }

    #[test]
    fn merge_never_propagates_removals() {
        // an id removed on one side but present on the other comes back
        let plan = plan_merge(&set(&[]), &set(&["a"]));
        assert_eq!(plan.write_local, Some(set(&["a"])));
    }

    #[test]
    fn remote_emission_overwrites_only_on_difference() {
        let current = set(&["a", "b", "c"]);
        assert_eq!(
            apply_remote(&current, set(&["a", "b", "c", "d"])),
            Some(set(&["a", "b", "c", "d"]))
        );
        assert_eq!(apply_remote(&current, set(&["a", "b", "c"])), None);
    }

    #[tokio::test]
    async fn no_session_reconciler_is_purely_local() {
        let dir = temp_dir("recon-anon");
        let local = Arc::new(FavoritesStore::open(&dir).unwrap());
        let cloud = CloudFavorites::new(RedisStore::new(None));

        let recon = FavoritesReconciler::start(Arc::clone(&local), cloud, None).await;
        assert!(recon.tasks.is_empty());

        assert!(recon.toggle("cazuela").await.unwrap());
        assert!(recon.favorites().borrow().contains("cazuela"));
        assert!(!recon.toggle("cazuela").await.unwrap());
        assert!(recon.favorites().borrow().is_empty());
    }

    #[tokio::test]
    async fn stop_aborts_live_subscriptions() {
        let dir = temp_dir("recon-stop");
        let local = Arc::new(FavoritesStore::open(&dir).unwrap());
        let cloud = CloudFavorites::new(RedisStore::new(None));

        // a stand-in for a pump/driver that would otherwise run forever;
        // it holds the sender, so the receiver erroring proves the abort
        let (tx, mut rx) = tokio::sync::watch::channel(());
        let task = tokio::spawn(async move {
            let _tx = tx;
            futures::future::pending::<()>().await;
        });

        let mut recon = FavoritesReconciler {
            local,
            cloud,
            uid: Some("uid-1".into()),
            tasks: vec![task],
        };
        recon.stop();
        assert!(rx.changed().await.is_err(), "subscription still running after stop");
        assert!(recon.tasks.is_empty());

        recon.stop(); // idempotent
    }

    #[tokio::test]
    async fn unreachable_cloud_leaves_local_working() {
        let dir = temp_dir("recon-degraded");
        let local = Arc::new(FavoritesStore::open(&dir).unwrap());
        local.set_all(set(&["charquican"])).await.unwrap();
        let cloud = CloudFavorites::new(RedisStore::new(None));

        // merge is abandoned (remote unreadable) and must not clobber local
        let recon =
            FavoritesReconciler::start(Arc::clone(&local), cloud, Some("uid-1".into())).await;
        assert_eq!(local.snapshot(), set(&["charquican"]));

        assert!(recon.toggle("pebre").await.unwrap());
        assert_eq!(local.snapshot(), set(&["charquican", "pebre"]));
        drop(recon);
        assert_eq!(local.snapshot(), set(&["charquican", "pebre"]));
    }
}

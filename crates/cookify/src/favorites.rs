/// Local durable favorites store.
///
/// A file-backed set of recipe ids, the device-local replica of the user's
/// favorites. Writes are serialized through one mutex and persisted with a
/// temp-file + rename so the file is never partially written. Every write is
/// re-emitted on a watch channel; the UI projection of "my favorites" is
/// whatever this stream last said, in write order.
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::sync::{watch, Mutex};
use tracing::warn;

use crate::error::AppError;

const FILE_NAME: &str = "favorites.json";

pub struct FavoritesStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    tx: watch::Sender<HashSet<String>>,
}

impl FavoritesStore {
    /// Open (or create) the store inside `dir`. A corrupt file is logged and
    /// treated as empty rather than refusing to start.
    pub fn open(dir: &Path) -> Result<Self, AppError> {
        let path = dir.join(FILE_NAME);
        let initial = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<String>>(&content) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "corrupt favorites file, starting empty");
                    HashSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e.into()),
        };
        let (tx, _rx) = watch::channel(initial);
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
            tx,
        })
    }

    /// Live stream of the persisted set. Emissions arrive in write order;
    /// the latest value is always observable via `borrow`.
    pub fn subscribe(&self) -> watch::Receiver<HashSet<String>> {
        self.tx.subscribe()
    }

    /// The current persisted set.
    pub fn snapshot(&self) -> HashSet<String> {
        self.tx.borrow().clone()
    }

    /// Flip membership of `id`: present is removed, absent is added.
    /// Returns whether the id is a favorite afterwards.
    pub async fn toggle(&self, id: &str) -> Result<bool, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut next = self.tx.borrow().clone();
        let now_favorite = next.insert(id.to_string());
        if !now_favorite {
            next.remove(id);
        }
        self.persist(&next)?;
        self.tx.send_replace(next);
        Ok(now_favorite)
    }

    /// Replace the whole set. Used by the reconciler; never partial.
    pub async fn set_all(&self, ids: HashSet<String>) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        self.persist(&ids)?;
        self.tx.send_replace(ids);
        Ok(())
    }

    fn persist(&self, set: &HashSet<String>) -> Result<(), AppError> {
        let mut ids: Vec<&String> = set.iter().collect();
        ids.sort();
        let json = serde_json::to_string_pretty(&ids)
            .map_err(|e| AppError::LocalStore(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

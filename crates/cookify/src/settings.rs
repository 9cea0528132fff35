/// Local durable app settings. Same file pattern as the favorites store:
/// serialized writes, temp-file + rename, live watch stream.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tracing::warn;

use crate::error::AppError;

const FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub dark_mode: bool,
}

pub struct SettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    tx: watch::Sender<Settings>,
}

impl SettingsStore {
    pub fn open(dir: &Path) -> Result<Self, AppError> {
        let path = dir.join(FILE_NAME);
        let initial = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(error = %e, path = %path.display(), "corrupt settings file, using defaults");
                Settings::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
            Err(e) => return Err(e.into()),
        };
        let (tx, _rx) = watch::channel(initial);
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
            tx,
        })
    }

    pub fn current(&self) -> Settings {
        *self.tx.borrow()
    }

    pub async fn set_dark_mode(&self, enabled: bool) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let next = Settings { dark_mode: enabled };
        let json =
            serde_json::to_string_pretty(&next).map_err(|e| AppError::LocalStore(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        self.tx.send_replace(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::temp_dir;

    #[tokio::test]
    async fn dark_mode_defaults_to_false_and_persists() {
        let dir = temp_dir("settings");
        {
            let store = SettingsStore::open(&dir).unwrap();
            assert!(!store.current().dark_mode);
            store.set_dark_mode(true).await.unwrap();
        }
        let store = SettingsStore::open(&dir).unwrap();
        assert!(store.current().dark_mode);
    }
}

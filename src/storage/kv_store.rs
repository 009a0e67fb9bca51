use std::{future::Future, ops::Deref, path::PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::fs::operations::{read_locked, write_locked};

pub const CONFIG_KEY: &str = "salary_config";
pub const STATE_KEY: &str = "salary_state";
pub const ATTENDANCE_KEY: &str = "attendance_records";

/// Interface for abstracting the place values are persisted in. Values are JSON strings.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>>;

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<()>>;
}

impl<T: Deref> KeyValueStore for T
where
    T::Target: KeyValueStore,
{
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> {
        self.deref().get(key)
    }

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<()>> {
        self.deref().set(key, value)
    }
}

/// The main realization of [KeyValueStore]: one `<key>.json` file per key in a directory.
pub struct FileStore {
    store_dir: PathBuf,
}

impl FileStore {
    pub fn new(store_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&store_dir)?;

        Ok(Self { store_dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.store_dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        read_locked(&path)
            .await
            .with_context(|| format!("Failed to read {path:?}"))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key);
        write_locked(&path, value.as_bytes())
            .await
            .with_context(|| format!("Failed to write {path:?}"))
    }
}

/// Reads a value, falling back to `T::default()` when it is missing, unreadable or malformed.
pub async fn load_or_default<T: DeserializeOwned + Default>(
    store: &impl KeyValueStore,
    key: &str,
) -> T {
    match store.get(key).await {
        Ok(Some(v)) => match serde_json::from_str::<T>(&v) {
            Ok(v) => v,
            Err(e) => {
                warn!("Stored value under {key} is malformed, using defaults: {e}");
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            warn!("Couldn't read {key}, using defaults: {e:?}");
            T::default()
        }
    }
}

#[cfg(test)]
pub mod memory {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicBool, Ordering},
            Mutex,
        },
    };

    use anyhow::{bail, Result};

    use super::KeyValueStore;

    /// In-process store for tests.
    #[derive(Default)]
    pub struct MemoryStore {
        values: Mutex<HashMap<String, String>>,
        failing: AtomicBool,
    }

    impl MemoryStore {
        pub fn with_value(self, key: &str, value: &str) -> Self {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            self
        }

        pub fn value(&self, key: &str) -> Option<String> {
            self.values.lock().unwrap().get(key).cloned()
        }

        /// Makes every following `set` fail until switched back.
        pub fn fail_writes(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    impl KeyValueStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.value(key))
        }

        async fn set(&self, key: &str, value: String) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                bail!("Store is read only");
            }
            self.values.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }
    }
}

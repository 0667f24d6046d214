// File: ./src/storage.rs
// JSON file backed TaskStore, one document per user
use crate::model::{NewTask, Task, TaskPatch};
use crate::store::TaskStore;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use fs2::FileExt;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

/// Every file access runs on the blocking pool; the advisory lock can wait
/// on another process for an unbounded time.
#[derive(Clone)]
pub struct FileStore {
    inner: Arc<Inner>,
}

struct Inner {
    root: PathBuf,
    channels: Mutex<HashMap<String, watch::Sender<Vec<Task>>>>,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("users"))
            .with_context(|| format!("creating data dir {}", root.display()))?;
        Ok(Self {
            inner: Arc::new(Inner {
                root,
                channels: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Runs `f` while holding an exclusive advisory lock next to `path`.
    pub fn with_lock<T, F>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("opening lock {}", lock_path.display()))?;
        lock_file.lock_exclusive()?;
        let result = f();
        if let Err(e) = FileExt::unlock(&lock_file) {
            // Closing the handle below still releases it.
            warn!(path = %lock_path.display(), error = %e, "failed to unlock task file");
        }
        result
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Inner) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&inner))
            .await
            .map_err(|e| anyhow!("store task failed: {}", e))?
    }
}

impl Inner {
    fn user_path(&self, user_id: &str) -> Result<PathBuf> {
        if user_id.is_empty()
            || !user_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            bail!("invalid user id '{}'", user_id);
        }
        Ok(self.root.join("users").join(format!("{}.json", user_id)))
    }

    fn read_tasks(path: &Path) -> Result<Vec<Task>> {
        if !path.exists() {
            return Ok(vec![]);
        }
        let json = fs::read_to_string(path)?;
        if json.trim().is_empty() {
            return Ok(vec![]);
        }
        serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
    }

    /// Locks -> Loads -> Applies Closure -> Saves -> Notifies -> Unlocks.
    ///
    /// Subscribers are notified under the file lock so snapshots reach the
    /// channel in the same order the writes reached the disk.
    fn modify<T, F>(&self, user_id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Task>) -> Result<T>,
    {
        let path = self.user_path(user_id)?;
        FileStore::with_lock(&path, || {
            let mut tasks = Self::read_tasks(&path)?;
            let out = f(&mut tasks)?;
            let json = serde_json::to_string_pretty(&tasks)?;
            FileStore::atomic_write(&path, json)?;
            self.publish(user_id, tasks);
            Ok(out)
        })
    }

    fn publish(&self, user_id: &str, tasks: Vec<Task>) {
        if let Ok(channels) = self.channels.lock()
            && let Some(tx) = channels.get(user_id)
        {
            tx.send_replace(tasks);
        }
    }

    /// Lock order is file lock, then registry, the same as `modify`.
    fn receiver(&self, user_id: &str) -> Result<watch::Receiver<Vec<Task>>> {
        let path = self.user_path(user_id)?;
        FileStore::with_lock(&path, || {
            let mut channels = self
                .channels
                .lock()
                .map_err(|_| anyhow!("subscription registry poisoned"))?;
            if let Some(tx) = channels.get(user_id) {
                return Ok(tx.subscribe());
            }
            let (tx, rx) = watch::channel(Self::read_tasks(&path)?);
            channels.insert(user_id.to_string(), tx);
            Ok(rx)
        })
    }
}

#[async_trait]
impl TaskStore for FileStore {
    async fn create(&self, user_id: &str, task: NewTask) -> Result<Task> {
        let created = Task::from_new(Uuid::new_v4().to_string(), user_id.to_string(), task);
        let out = created.clone();
        let user = user_id.to_string();
        self.blocking(move |inner| {
            inner.modify(&user, move |tasks| {
                tasks.push(created);
                Ok(())
            })
        })
        .await?;
        debug!(user = user_id, id = %out.id, "task created");
        Ok(out)
    }

    async fn update(&self, user_id: &str, id: &str, patch: TaskPatch) -> Result<Task> {
        let (user, id) = (user_id.to_string(), id.to_string());
        self.blocking(move |inner| {
            inner.modify(&user, |tasks| {
                let task = tasks
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or_else(|| anyhow!("task {} not found", id))?;
                task.apply(&patch);
                Ok(task.clone())
            })
        })
        .await
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        let (user, id) = (user_id.to_string(), id.to_string());
        self.blocking(move |inner| {
            inner.modify(&user, |tasks| {
                tasks.retain(|t| t.id != id);
                Ok(())
            })
        })
        .await
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Task>> {
        let user = user_id.to_string();
        self.blocking(move |inner| {
            let path = inner.user_path(&user)?;
            FileStore::with_lock(&path, || Inner::read_tasks(&path))
        })
        .await
    }

    fn subscribe(&self, user_id: &str) -> Result<BoxStream<'static, Vec<Task>>> {
        let rx = self.inner.receiver(user_id)?;
        let updates = stream::unfold((rx, true), |(mut rx, first)| async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let snapshot = rx.borrow_and_update().clone();
            Some((snapshot, (rx, false)))
        });
        Ok(updates.boxed())
    }
}

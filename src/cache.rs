//! Write-through query cache: one named bucket of rows per entity type.
//!
//! A mutation patches the bucket speculatively, awaits the network write and
//! then always re-reads the bucket from the server. The re-read is the only
//! reconciliation; there is no separate rollback.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::http::ApiError;

/// A server-held record that can live in a cache bucket.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Cache bucket name.
    const BUCKET: &'static str;

    /// Server identity; `None` for a record the server has not assigned yet.
    fn id(&self) -> Option<Self::Id>;
}

/// Per-entity remote operations backing a bucket.
#[async_trait]
pub trait EntitySource<T: Entity>: Send + Sync {
    async fn fetch(&self) -> Result<Vec<T>, ApiError>;
    async fn create(&self, entity: &T) -> Result<bool, ApiError>;
    async fn update(&self, batch: &[T]) -> Result<bool, ApiError>;
    async fn delete(&self, id: &T::Id) -> Result<bool, ApiError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey<Id> {
    Server(Id),
    /// Throwaway key of an optimistic row; replaced on the next refresh.
    Placeholder(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedRow<T: Entity> {
    pub key: RowKey<T::Id>,
    pub entity: T,
}

impl<T: Entity> CachedRow<T> {
    pub fn server(entity: T) -> Self {
        let key = match entity.id() {
            Some(id) => RowKey::Server(id),
            None => RowKey::Placeholder(Uuid::new_v4()),
        };
        Self { key, entity }
    }

    pub fn placeholder(entity: T) -> Self {
        Self {
            key: RowKey::Placeholder(Uuid::new_v4()),
            entity,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.key, RowKey::Placeholder(_))
    }

    fn has_id(&self, id: &T::Id) -> bool {
        matches!(&self.key, RowKey::Server(k) if k == id)
    }
}

struct Bucket<T: Entity> {
    rows: Vec<CachedRow<T>>,
    load_failed: bool,
    fetched_at: Option<DateTime<Utc>>,
}

pub struct WriteThroughCache<T: Entity> {
    state: Arc<RwLock<Bucket<T>>>,
}

impl<T: Entity> Clone for WriteThroughCache<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Entity> Default for WriteThroughCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> fmt::Debug for WriteThroughCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteThroughCache")
            .field("bucket", &T::BUCKET)
            .finish_non_exhaustive()
    }
}

impl<T: Entity> WriteThroughCache<T> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(Bucket {
                rows: Vec::new(),
                load_failed: false,
                fetched_at: None,
            })),
        }
    }

    pub fn bucket(&self) -> &'static str {
        T::BUCKET
    }

    pub async fn snapshot(&self) -> Vec<CachedRow<T>> {
        self.state.read().await.rows.clone()
    }

    pub async fn entities(&self) -> Vec<T> {
        self.state
            .read()
            .await
            .rows
            .iter()
            .map(|r| r.entity.clone())
            .collect()
    }

    /// Row currently cached under server id `id`.
    pub async fn get(&self, id: &T::Id) -> Option<T> {
        self.state
            .read()
            .await
            .rows
            .iter()
            .find(|r| r.has_id(id))
            .map(|r| r.entity.clone())
    }

    pub async fn load_failed(&self) -> bool {
        self.state.read().await.load_failed
    }

    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.fetched_at
    }

    /// Replace the bucket with the server collection. On failure the cached
    /// rows stay and the load-failed flag is raised. Returns whether the
    /// fetch succeeded.
    pub async fn refresh<S>(&self, source: &S) -> bool
    where
        S: EntitySource<T> + ?Sized,
    {
        match source.fetch().await {
            Ok(fresh) => {
                let rows: Vec<CachedRow<T>> = fresh.into_iter().map(CachedRow::server).collect();
                let count = rows.len();
                let mut guard = self.state.write().await;
                guard.rows = rows;
                guard.load_failed = false;
                guard.fetched_at = Some(Utc::now());
                info!(bucket = T::BUCKET, rows = count, "cache refreshed");
                true
            }
            Err(err) => {
                warn!(bucket = T::BUCKET, error = %err, "load failed; keeping cached rows");
                self.state.write().await.load_failed = true;
                false
            }
        }
    }

    /// Apply `speculate` to the rows, await `commit`, then re-read the bucket
    /// whatever `commit` returned.
    pub async fn mutate<S, F, Fut, R>(
        &self,
        source: &S,
        speculate: F,
        commit: Fut,
    ) -> Result<R, ApiError>
    where
        S: EntitySource<T> + ?Sized,
        F: FnOnce(&mut Vec<CachedRow<T>>),
        Fut: Future<Output = Result<R, ApiError>>,
    {
        {
            let mut guard = self.state.write().await;
            speculate(&mut guard.rows);
        }
        let result = commit.await;
        if let Err(err) = &result {
            warn!(bucket = T::BUCKET, error = %err, "mutation failed");
        }
        self.refresh(source).await;
        result
    }

    pub async fn create<S>(&self, source: &S, entity: T) -> Result<bool, ApiError>
    where
        S: EntitySource<T> + ?Sized,
    {
        let row = CachedRow::placeholder(entity.clone());
        self.mutate(source, move |rows| rows.push(row), source.create(&entity))
            .await
    }

    pub async fn update<S>(&self, source: &S, batch: Vec<T>) -> Result<bool, ApiError>
    where
        S: EntitySource<T> + ?Sized,
    {
        let patch = batch.clone();
        self.mutate(
            source,
            move |rows| {
                for entity in patch {
                    let Some(id) = entity.id() else { continue };
                    if let Some(row) = rows.iter_mut().find(|r| r.has_id(&id)) {
                        row.entity = entity;
                    }
                }
            },
            source.update(&batch),
        )
        .await
    }

    pub async fn delete<S>(&self, source: &S, id: T::Id) -> Result<bool, ApiError>
    where
        S: EntitySource<T> + ?Sized,
    {
        let target = id.clone();
        self.mutate(
            source,
            move |rows| rows.retain(|r| !r.has_id(&target)),
            source.delete(&id),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: Option<i64>,
        text: String,
    }

    impl Entity for Note {
        type Id = i64;
        const BUCKET: &'static str = "notes";

        fn id(&self) -> Option<i64> {
            self.id
        }
    }

    fn note(id: i64, text: &str) -> Note {
        Note {
            id: Some(id),
            text: text.into(),
        }
    }

    #[derive(Default)]
    struct MemorySource {
        rows: StdMutex<Vec<Note>>,
        fail_fetch: StdMutex<bool>,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl EntitySource<Note> for MemorySource {
        async fn fetch(&self) -> Result<Vec<Note>, ApiError> {
            if *self.fail_fetch.lock().unwrap() {
                return Err(ApiError::InvalidUrl("down".into()));
            }
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn create(&self, entity: &Note) -> Result<bool, ApiError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let mut rows = self.rows.lock().unwrap();
            let id = rows.len() as i64 + 1;
            rows.push(Note {
                id: Some(id),
                ..entity.clone()
            });
            Ok(true)
        }

        async fn update(&self, batch: &[Note]) -> Result<bool, ApiError> {
            let mut rows = self.rows.lock().unwrap();
            for n in batch {
                if let Some(r) = rows.iter_mut().find(|r| r.id == n.id) {
                    *r = n.clone();
                }
            }
            Ok(true)
        }

        async fn delete(&self, id: &i64) -> Result<bool, ApiError> {
            self.rows.lock().unwrap().retain(|r| r.id != Some(*id));
            Ok(true)
        }
    }

    #[tokio::test]
    async fn placeholder_visible_until_settled() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(MemorySource {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let cache: WriteThroughCache<Note> = WriteThroughCache::new();

        let task = {
            let cache = cache.clone();
            let source = source.clone();
            tokio::spawn(async move {
                cache
                    .create(
                        source.as_ref(),
                        Note {
                            id: None,
                            text: "draft".into(),
                        },
                    )
                    .await
            })
        };

        // wait for the speculative row
        let mut pending = Vec::new();
        for _ in 0..100 {
            pending = cache.snapshot().await;
            if !pending.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(pending.len(), 1);
        assert!(pending[0].is_placeholder());

        gate.notify_one();
        assert!(task.await.unwrap().unwrap());

        let settled = cache.snapshot().await;
        assert_eq!(settled.len(), 1);
        assert_eq!(settled[0].key, RowKey::Server(1));
        assert_eq!(cache.entities().await, source.fetch().await.unwrap());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_rows() {
        let source = MemorySource::default();
        source.rows.lock().unwrap().push(note(1, "a"));
        let cache: WriteThroughCache<Note> = WriteThroughCache::new();
        assert!(cache.refresh(&source).await);
        assert!(cache.fetched_at().await.is_some());

        *source.fail_fetch.lock().unwrap() = true;
        assert!(!cache.refresh(&source).await);
        assert!(cache.load_failed().await);
        assert_eq!(cache.entities().await, vec![note(1, "a")]);

        *source.fail_fetch.lock().unwrap() = false;
        cache.refresh(&source).await;
        assert!(!cache.load_failed().await);
    }

    #[tokio::test]
    async fn update_and_delete_resync_with_server() {
        let source = MemorySource::default();
        source
            .rows
            .lock()
            .unwrap()
            .extend([note(1, "a"), note(2, "b")]);
        let cache: WriteThroughCache<Note> = WriteThroughCache::new();
        cache.refresh(&source).await;

        cache.update(&source, vec![note(2, "bb")]).await.unwrap();
        assert_eq!(cache.get(&2).await.unwrap().text, "bb");

        cache.delete(&source, 1).await.unwrap();
        assert_eq!(cache.entities().await, vec![note(2, "bb")]);
    }

    #[tokio::test]
    async fn commit_error_still_refreshes() {
        let source = MemorySource::default();
        source.rows.lock().unwrap().push(note(1, "a"));
        let cache: WriteThroughCache<Note> = WriteThroughCache::new();

        let res: Result<bool, ApiError> = cache
            .mutate(
                &source,
                |rows| rows.clear(),
                async { Err(ApiError::InvalidUrl("x".into())) },
            )
            .await;
        assert!(res.is_err());
        assert_eq!(cache.entities().await, vec![note(1, "a")]);
    }
}

//! Per-collection schema cache with background loading
//!
//! Schemas are keyed by connection and namespace. A slot is either
//! `Loading` (a fetch is in flight) or `Ready` with the time it was fetched.
//! Ready schemas older than the TTL are replaced wholesale on the next lookup.
//! A failed fetch removes the slot so the next lookup tries again.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::sampler::{Namespace, SchemaSampler};
use super::Schema;
use crate::error::Result;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Cache key: a connection identity plus a namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub connection: String,
    pub namespace: Namespace,
}

impl CacheKey {
    pub fn new(connection: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            connection: connection.into(),
            namespace,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.connection, self.namespace)
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Loading,
    Ready {
        schema: Arc<Schema>,
        fetched_at: DateTime<Utc>,
    },
}

/// State of a cache entry
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// Never loaded, or the last load failed
    Missing,
    /// A fetch is in flight
    Loading,
    /// Within the TTL
    Fresh(Arc<Schema>),
    /// Older than the TTL
    Stale(Arc<Schema>),
}

/// Schema slots keyed by [`CacheKey`]
pub struct SchemaCache {
    slots: HashMap<CacheKey, Slot>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SchemaCache {
    /// Default freshness window
    pub fn default_ttl() -> Duration {
        Duration::hours(1)
    }

    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: HashMap::new(),
            ttl,
            clock,
        }
    }

    /// Inspect the slot for `key`
    pub fn lookup(&self, key: &CacheKey) -> CacheLookup {
        match self.slots.get(key) {
            None => CacheLookup::Missing,
            Some(Slot::Loading) => CacheLookup::Loading,
            Some(Slot::Ready { schema, fetched_at }) => {
                if self.clock.now() - *fetched_at < self.ttl {
                    CacheLookup::Fresh(Arc::clone(schema))
                } else {
                    CacheLookup::Stale(Arc::clone(schema))
                }
            }
        }
    }

    /// Fresh schema for `key`, if any
    pub fn fresh(&self, key: &CacheKey) -> Option<Arc<Schema>> {
        match self.lookup(key) {
            CacheLookup::Fresh(schema) => Some(schema),
            _ => None,
        }
    }

    /// Mark `key` as loading if it is missing or stale
    ///
    /// # Returns
    /// * `bool` - `true` when the caller should start the fetch
    pub fn begin_load(&mut self, key: &CacheKey) -> bool {
        match self.lookup(key) {
            CacheLookup::Missing | CacheLookup::Stale(_) => {
                self.slots.insert(key.clone(), Slot::Loading);
                true
            }
            CacheLookup::Loading | CacheLookup::Fresh(_) => false,
        }
    }

    /// Mark `key` as loading regardless of its current state
    pub fn force_load(&mut self, key: &CacheKey) {
        self.slots.insert(key.clone(), Slot::Loading);
    }

    /// Store the outcome of a fetch
    ///
    /// A successful fetch becomes the ready schema; a failed one clears the
    /// slot so a later lookup retries.
    pub fn finish_load(&mut self, key: &CacheKey, result: Result<Schema>) -> Result<Arc<Schema>> {
        match result {
            Ok(schema) => {
                let schema = Arc::new(schema);
                self.slots.insert(
                    key.clone(),
                    Slot::Ready {
                        schema: Arc::clone(&schema),
                        fetched_at: self.clock.now(),
                    },
                );
                Ok(schema)
            }
            Err(e) => {
                warn!("Schema fetch for {} failed: {}", key, e);
                self.slots.remove(key);
                Err(e)
            }
        }
    }

    /// Drop the slot for `key`
    pub fn invalidate(&mut self, key: &CacheKey) {
        self.slots.remove(key);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Shared schema cache that fetches missing schemas in the background
#[derive(Clone)]
pub struct SchemaStore {
    cache: Arc<RwLock<SchemaCache>>,
    sampler: SchemaSampler,
}

impl SchemaStore {
    pub fn new(sampler: SchemaSampler, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(SchemaCache::new(ttl, clock))),
            sampler,
        }
    }

    /// Store with the wall clock and the default TTL
    pub fn with_defaults(sampler: SchemaSampler) -> Self {
        Self::new(sampler, SchemaCache::default_ttl(), Arc::new(SystemClock))
    }

    pub fn sampler(&self) -> &SchemaSampler {
        &self.sampler
    }

    /// Fresh schema for `key`, starting a background fetch when there is none
    ///
    /// Never blocks on the network. Returns `None` while the schema is
    /// missing, stale or loading.
    pub fn schema_for(&self, key: &CacheKey) -> Option<Arc<Schema>> {
        if let Some(schema) = self.read().fresh(key) {
            return Some(schema);
        }
        self.spawn_load(key);
        None
    }

    /// Current state of the entry for `key`
    pub fn status(&self, key: &CacheKey) -> CacheLookup {
        self.read().lookup(key)
    }

    /// Fetch the schema for `key` now, replacing any cached one
    pub async fn refresh(&self, key: &CacheKey) -> Result<Arc<Schema>> {
        self.write().force_load(key);
        let result = self.sampler.sample(&key.namespace).await;
        self.write().finish_load(key, result)
    }

    /// Forget the schema for `key`
    pub fn invalidate(&self, key: &CacheKey) {
        self.write().invalidate(key);
    }

    fn spawn_load(&self, key: &CacheKey) {
        if !self.write().begin_load(key) {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("Loading schema for {} in the background", key);
                let store = self.clone();
                let key = key.clone();
                handle.spawn(async move {
                    let result = store.sampler.sample(&key.namespace).await;
                    // errors are logged by finish_load
                    let _ = store.write().finish_load(&key, result);
                });
            }
            Err(_) => {
                warn!("No async runtime available to load schema for {}", key);
                self.write().invalidate(key);
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SchemaCache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SchemaCache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::sampler::tests::MemorySource;
    use mongodb::bson::doc;
    use std::sync::Mutex;
    use std::sync::atomic::Ordering;

    struct FakeClock(Mutex<DateTime<Utc>>);

    impl FakeClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(Utc::now())))
        }

        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now = *now + by;
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn key() -> CacheKey {
        CacheKey::new("localhost", Namespace::new("test", "users"))
    }

    fn source() -> Arc<MemorySource> {
        Arc::new(MemorySource::with(
            Namespace::new("test", "users"),
            vec![doc! { "name": "ann", "age": 30 }],
        ))
    }

    #[test]
    fn test_cache_lifecycle() {
        let clock = FakeClock::new();
        let mut cache = SchemaCache::new(Duration::hours(1), clock.clone());
        let key = key();

        assert_eq!(cache.lookup(&key), CacheLookup::Missing);
        assert!(cache.begin_load(&key));
        assert!(!cache.begin_load(&key));
        assert_eq!(cache.lookup(&key), CacheLookup::Loading);

        cache.finish_load(&key, Ok(Schema::default())).unwrap();
        assert!(cache.fresh(&key).is_some());
        assert!(!cache.begin_load(&key));

        clock.advance(Duration::minutes(61));
        assert!(matches!(cache.lookup(&key), CacheLookup::Stale(_)));
        assert!(cache.begin_load(&key));
    }

    #[test]
    fn test_failed_load_clears_slot() {
        let mut cache = SchemaCache::new(Duration::hours(1), FakeClock::new());
        let key = key();
        cache.begin_load(&key);
        let result = cache.finish_load(&key, Err("down".into()));
        assert!(result.is_err());
        assert_eq!(cache.lookup(&key), CacheLookup::Missing);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_schema_for_without_runtime() {
        let sampler = SchemaSampler::new(source(), 10);
        let store = SchemaStore::new(sampler, Duration::hours(1), FakeClock::new());
        assert!(store.schema_for(&key()).is_none());
        assert_eq!(store.status(&key()), CacheLookup::Missing);

        let loaded = tokio_test::block_on(store.refresh(&key())).unwrap();
        assert!(loaded.lookup("name").is_some());
        assert!(store.schema_for(&key()).is_some());
    }

    #[tokio::test]
    async fn test_schema_for_loads_in_background() {
        let source = source();
        let sampler = SchemaSampler::new(source.clone(), 10);
        let store = SchemaStore::new(sampler, Duration::hours(1), FakeClock::new());
        let key = key();

        assert!(store.schema_for(&key).is_none());
        assert_eq!(store.status(&key), CacheLookup::Loading);

        let mut schema = None;
        for _ in 0..100 {
            tokio::task::yield_now().await;
            schema = store.schema_for(&key);
            if schema.is_some() {
                break;
            }
        }
        let schema = schema.expect("schema should load");
        assert!(schema.lookup("age").is_some());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_replaces_schema() {
        let source = source();
        let clock = FakeClock::new();
        let sampler = SchemaSampler::new(source.clone(), 10);
        let store = SchemaStore::new(sampler, Duration::hours(1), clock.clone());
        let key = key();

        let first = store.refresh(&key).await.unwrap();
        let second = store.refresh(&key).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        source.set_failing(true);
        assert!(store.refresh(&key).await.is_err());
        assert_eq!(store.status(&key), CacheLookup::Missing);
    }

    #[tokio::test]
    async fn test_stale_schema_is_reloaded() {
        let source = source();
        let clock = FakeClock::new();
        let sampler = SchemaSampler::new(source.clone(), 10);
        let store = SchemaStore::new(sampler, Duration::hours(1), clock.clone());
        let key = key();

        store.refresh(&key).await.unwrap();
        assert!(store.schema_for(&key).is_some());

        clock.advance(Duration::hours(2));
        assert!(store.schema_for(&key).is_none());
        assert_eq!(store.status(&key), CacheLookup::Loading);
    }
}

//! Time-boxed response memoization
//!
//! An explicit cache service constructed once and shared by reference. Each
//! entry carries its own TTL; expired entries are never returned and are
//! dropped by moka on subsequent access. Writes are last-writer-wins, so two
//! concurrent misses on the same key both compute and the later insert stays.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::sync::Cache;
use moka::Expiry;

struct Entry<V> {
    value: Arc<V>,
    ttl: Duration,
}

// Manual impl: cloning shares the Arc, so `V` itself need not be Clone
impl<V> Clone for Entry<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            ttl: self.ttl,
        }
    }
}

struct PerEntryTtl;

impl<V> Expiry<String, Entry<V>> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Expiring key-value store for assembled responses
pub struct TtlCache<V> {
    inner: Cache<String, Entry<V>>,
    default_ttl: Duration,
}

impl<V: Send + Sync + 'static> TtlCache<V> {
    pub fn new(default_ttl: Duration, max_entries: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self { inner, default_ttl }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.inner.get(key).map(|entry| entry.value)
    }

    /// Insert with the default TTL
    pub fn insert(&self, key: impl Into<String>, value: Arc<V>) {
        self.insert_with_ttl(key, value, self.default_ttl);
    }

    pub fn insert_with_ttl(&self, key: impl Into<String>, value: Arc<V>, ttl: Duration) {
        self.inner.insert(key.into(), Entry { value, ttl });
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Approximate number of live entries
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

/// A cache-key component
pub enum KeyPart {
    Scalar(String),
    List(Vec<String>),
}

impl From<&str> for KeyPart {
    fn from(v: &str) -> Self {
        KeyPart::Scalar(v.to_string())
    }
}

impl From<bool> for KeyPart {
    fn from(v: bool) -> Self {
        KeyPart::Scalar(v.to_string())
    }
}

impl From<Vec<String>> for KeyPart {
    fn from(v: Vec<String>) -> Self {
        KeyPart::List(v)
    }
}

/// Deterministic cache key: parts ordered by name, list values sorted,
/// `name=value` pairs joined with `:`.
pub fn generate_cache_key<'a>(parts: impl IntoIterator<Item = (&'a str, KeyPart)>) -> String {
    let ordered: BTreeMap<&str, KeyPart> = parts.into_iter().collect();
    ordered
        .into_iter()
        .map(|(name, part)| match part {
            KeyPart::Scalar(v) => format!("{name}={v}"),
            KeyPart::List(mut values) => {
                values.sort();
                format!("{name}={}", values.join(","))
            }
        })
        .collect::<Vec<_>>()
        .join(":")
}

use lru_cache::LruCache;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

use crate::models::VerificationResult;

/// Cache key: the normalized address plus whether probing was skipped, so a
/// format/MX-only answer never shadows a fully probed one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub address: String,
    pub skip_smtp: bool,
}

impl CacheKey {
    pub fn new(address: impl Into<String>, skip_smtp: bool) -> Self {
        Self {
            address: address.into(),
            skip_smtp,
        }
    }
}

/// Shared store of finished verification results.
pub trait VerdictStore: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<VerificationResult>;
    fn put(&self, key: CacheKey, value: VerificationResult);
    fn evict(&self, key: &CacheKey) -> bool;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Item {
    value: VerificationResult,
    /// `None` when the TTL is too large to represent; such entries never expire.
    expiration: Option<Instant>,
}

impl Item {
    fn is_live(&self, now: Instant) -> bool {
        match self.expiration {
            Some(expiration) => now < expiration,
            None => true,
        }
    }
}

/// Bounded LRU store whose entries expire a fixed time after insertion.
///
/// Expiry is checked on read; an expired entry is dropped the first time it
/// is looked up, or when the store is sized.
pub struct ResultCache {
    entries: Mutex<LruCache<CacheKey, Item>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        tracing::debug!(capacity, ?ttl, "created result cache");
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }
}

impl VerdictStore for ResultCache {
    fn get(&self, key: &CacheKey) -> Option<VerificationResult> {
        let mut entries = self.entries.lock();
        let entry = entries.get_mut(key)?;
        if entry.is_live(Instant::now()) {
            Some(entry.value.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    fn put(&self, key: CacheKey, value: VerificationResult) {
        self.entries.lock().insert(
            key,
            Item {
                value,
                expiration: Instant::now().checked_add(self.ttl),
            },
        );
    }

    fn evict(&self, key: &CacheKey) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    fn len(&self) -> usize {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        let expired: Vec<CacheKey> = entries
            .iter()
            .filter(|(_, item)| !item.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.remove(key);
        }
        entries.len()
    }
}

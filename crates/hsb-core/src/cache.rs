//! Bounded TTL cache for resolved cards.
//!
//! Keys are stable card identifiers (or, for exact single hits, the
//! normalized query term). Entries are immutable once written, so a single
//! mutex around the LRU is all the coordination the dispatcher needs.

use std::time::{Duration, Instant};

use lru_mem::{HeapSize, LruCache};
use tokio::sync::Mutex;

use crate::card::CardRecord;

struct CachedCard {
    card: CardRecord,
    inserted_at: Instant,
    approx_size: usize,
}

impl HeapSize for CachedCard {
    fn heap_size(&self) -> usize {
        self.approx_size
    }
}

pub struct CardCache {
    inner: Mutex<LruCache<String, CachedCard>>,
    ttl: Duration,
}

impl CardCache {
    /// `max_bytes` bounds the approximate memory footprint; `ttl` is the
    /// fixed lifetime of every entry.
    pub fn new(max_bytes: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(max_bytes)),
            ttl,
        }
    }

    /// Fresh entry for `key`, if any. Expired entries are removed on the way
    /// out and reported as misses.
    pub async fn get(&self, key: &str) -> Option<CardRecord> {
        let mut lru = self.inner.lock().await;
        let hit = lru
            .get(key)
            .map(|entry| (entry.inserted_at, entry.card.clone()));

        match hit {
            None => None,
            Some((inserted_at, card)) if inserted_at.elapsed() < self.ttl => Some(card),
            Some(_) => {
                lru.remove(key);
                None
            }
        }
    }

    pub async fn insert(&self, key: impl Into<String>, card: CardRecord) {
        let entry = CachedCard {
            approx_size: card.approx_size(),
            card,
            inserted_at: Instant::now(),
        };
        let mut lru = self.inner.lock().await;
        // An entry larger than the whole budget is dropped, not cached.
        let _ = lru.insert(key.into(), entry);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

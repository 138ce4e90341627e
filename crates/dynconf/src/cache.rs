//! In-process LRU cache adapter

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::RwLock;
use std::num::NonZeroUsize;

use dynconf_types::cache_adapter::CacheAdapter;

use crate::prelude::*;

const DEFAULT_CAPACITY: usize = 100;

/// LRU cache for raw setting values
pub struct LruCacheAdapter {
	cache: RwLock<LruCache<Box<str>, Box<str>>>,
}

impl LruCacheAdapter {
	/// A zero capacity falls back to 100 entries
	pub fn new(capacity: usize) -> Self {
		let capacity = NonZeroUsize::new(capacity)
			.or(NonZeroUsize::new(DEFAULT_CAPACITY))
			.unwrap_or(NonZeroUsize::MIN);
		Self { cache: RwLock::new(LruCache::new(capacity)) }
	}

	pub fn len(&self) -> usize {
		self.cache.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.cache.read().is_empty()
	}
}

impl std::fmt::Debug for LruCacheAdapter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let cache = self.cache.read();
		f.debug_struct("LruCacheAdapter")
			.field("len", &cache.len())
			.field("capacity", &cache.cap())
			.finish()
	}
}

#[async_trait]
impl CacheAdapter for LruCacheAdapter {
	async fn get(&self, key: &str) -> DcResult<Option<Box<str>>> {
		// Promotes the entry, so a write lock
		let mut cache = self.cache.write();
		Ok(cache.get(key).cloned())
	}

	async fn set(&self, key: &str, value: &str) -> DcResult<()> {
		let mut cache = self.cache.write();
		cache.put(key.into(), value.into());
		Ok(())
	}

	async fn delete(&self, key: &str) -> DcResult<()> {
		let mut cache = self.cache.write();
		cache.pop(key);
		Ok(())
	}

	async fn clear(&self) -> DcResult<()> {
		let mut cache = self.cache.write();
		cache.clear();
		Ok(())
	}
}


// vim: ts=4

//! Key-value cache adapter
//!
//! A pure performance layer in front of the store. Keys are namespaced
//! setting names, values are the raw (encoded) values of the store rows.
//! Eviction and expiry are up to the implementation.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

#[async_trait]
pub trait CacheAdapter: Debug + Send + Sync {
	/// `None` means not found (or evicted)
	async fn get(&self, key: &str) -> DcResult<Option<Box<str>>>;

	async fn set(&self, key: &str, value: &str) -> DcResult<()>;

	async fn delete(&self, key: &str) -> DcResult<()>;

	/// Drop every entry
	async fn clear(&self) -> DcResult<()>;
}

// vim: ts=4

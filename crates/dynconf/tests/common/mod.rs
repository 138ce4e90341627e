//! Test helpers: isolated stores, a counting store wrapper and an in-memory
//! entity set.
//!
//! Builders return the TempDir alongside the store so the database file is
//! removed when the TempDir is dropped at the end of the test.

#![allow(dead_code, clippy::expect_used)]

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use dynconf::{LruCacheAdapter, Settings, SettingsRegistry};
use dynconf_store_adapter_sqlite::StoreAdapterSqlite;
use dynconf_types::cache_adapter::CacheAdapter;
use dynconf_types::entity_set::EntitySet;
use dynconf_types::error::{DcResult, Error};
use dynconf_types::store_adapter::StoreAdapter;
use dynconf_types::types::SettingRow;

pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

pub async fn create_test_store() -> (StoreAdapterSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");

	let store = StoreAdapterSqlite::new(temp_dir.path().join("settings.db"))
		.await
		.expect("Failed to create store");

	(store, temp_dir)
}

/// Store wrapper counting write calls
#[derive(Debug)]
pub struct CountingStore {
	inner: StoreAdapterSqlite,
	pub creates: AtomicUsize,
	pub upserts: AtomicUsize,
}

impl CountingStore {
	pub fn new(inner: StoreAdapterSqlite) -> Self {
		Self { inner, creates: AtomicUsize::new(0), upserts: AtomicUsize::new(0) }
	}

	pub fn upserts(&self) -> usize {
		self.upserts.load(Ordering::SeqCst)
	}

	pub fn creates(&self) -> usize {
		self.creates.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl StoreAdapter for CountingStore {
	async fn read_setting(&self, name: &str) -> DcResult<Option<SettingRow>> {
		self.inner.read_setting(name).await
	}

	async fn get_or_create_setting(&self, name: &str, raw_value: &str) -> DcResult<SettingRow> {
		self.creates.fetch_add(1, Ordering::SeqCst);
		self.inner.get_or_create_setting(name, raw_value).await
	}

	async fn upsert_setting(&self, name: &str, raw_value: &str) -> DcResult<SettingRow> {
		self.upserts.fetch_add(1, Ordering::SeqCst);
		self.inner.upsert_setting(name, raw_value).await
	}

	async fn delete_setting(&self, name: &str) -> DcResult<bool> {
		self.inner.delete_setting(name).await
	}

	async fn delete_settings_except(&self, keep: &[Box<str>]) -> DcResult<u64> {
		self.inner.delete_settings_except(keep).await
	}

	async fn list_settings(&self) -> DcResult<Vec<SettingRow>> {
		self.inner.list_settings().await
	}
}

/// Cache whose reads always fail
#[derive(Debug, Default)]
pub struct BrokenCache;

#[async_trait]
impl CacheAdapter for BrokenCache {
	async fn get(&self, _key: &str) -> DcResult<Option<Box<str>>> {
		Err(Error::DbError)
	}

	async fn set(&self, _key: &str, _value: &str) -> DcResult<()> {
		Ok(())
	}

	async fn delete(&self, _key: &str) -> DcResult<()> {
		Ok(())
	}

	async fn clear(&self) -> DcResult<()> {
		Ok(())
	}
}

/// In-memory entity collection
#[derive(Debug)]
pub struct MemoryEntitySet {
	model: Box<str>,
	pks: RwLock<HashSet<String>>,
}

impl MemoryEntitySet {
	pub fn new(model: &str, pks: &[&str]) -> Arc<Self> {
		Arc::new(Self {
			model: model.into(),
			pks: RwLock::new(pks.iter().map(|pk| (*pk).to_string()).collect()),
		})
	}

	pub fn insert(&self, pk: &str) {
		self.pks.write().insert(pk.to_string());
	}

	pub fn remove(&self, pk: &str) -> bool {
		self.pks.write().remove(pk)
	}
}

#[async_trait]
impl EntitySet for MemoryEntitySet {
	fn model(&self) -> &str {
		&self.model
	}

	async fn contains(&self, pk: &str) -> DcResult<bool> {
		Ok(self.pks.read().contains(pk))
	}
}

/// A service over a fresh registry, a counting SQLite store and an LRU cache
pub struct TestEnv {
	pub registry: Arc<SettingsRegistry>,
	pub store: Arc<CountingStore>,
	pub cache: Arc<LruCacheAdapter>,
	pub settings: Settings,
	_temp: TempDir,
}

pub async fn create_test_env() -> TestEnv {
	setup_test_logging();

	let (store, temp) = create_test_store().await;
	let registry = Arc::new(SettingsRegistry::new());
	let store = Arc::new(CountingStore::new(store));
	let cache = Arc::new(LruCacheAdapter::new(100));
	let settings = Settings::new(Arc::clone(&registry), store.clone(), cache.clone());

	TestEnv { registry, store, cache, settings, _temp: temp }
}

// vim: ts=4

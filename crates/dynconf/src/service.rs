//! Settings service - main interface for reading and writing settings

use rust_decimal::Decimal;
use std::sync::Arc;

use dynconf_types::cache_adapter::CacheAdapter;
use dynconf_types::store_adapter::StoreAdapter;

use crate::cache::LruCacheAdapter;
use crate::config::{DEFAULT_CACHE_KEY_PREFIX, SettingsConfig};
use crate::definition::ValueDefinition;
use crate::descriptor::ValueDescriptor;
use crate::prelude::*;
use crate::registry::SettingsRegistry;
use crate::value::SettingValue;

/// Registered settings bound to a store and a cache
pub struct Settings {
	registry: Arc<SettingsRegistry>,
	store: Arc<dyn StoreAdapter>,
	cache: Arc<dyn CacheAdapter>,
	cache_key_prefix: Box<str>,
}

impl Settings {
	pub fn new(
		registry: Arc<SettingsRegistry>,
		store: Arc<dyn StoreAdapter>,
		cache: Arc<dyn CacheAdapter>,
	) -> Self {
		Self { registry, store, cache, cache_key_prefix: DEFAULT_CACHE_KEY_PREFIX.into() }
	}

	/// Service with an in-process LRU cache sized by the config
	pub fn with_config(
		registry: Arc<SettingsRegistry>,
		store: Arc<dyn StoreAdapter>,
		config: &SettingsConfig,
	) -> Self {
		let cache = Arc::new(LruCacheAdapter::new(config.cache_capacity));
		Self::new(registry, store, cache).with_cache_key_prefix(config.cache_key_prefix.as_str())
	}

	pub fn with_cache_key_prefix(mut self, prefix: impl Into<Box<str>>) -> Self {
		self.cache_key_prefix = prefix.into();
		self
	}

	pub fn registry(&self) -> &Arc<SettingsRegistry> {
		&self.registry
	}

	pub fn store(&self) -> &Arc<dyn StoreAdapter> {
		&self.store
	}

	pub fn cache(&self) -> &Arc<dyn CacheAdapter> {
		&self.cache
	}

	pub fn cache_key(&self, name: &str) -> String {
		format!("{}{}", self.cache_key_prefix, name)
	}

	pub fn definition(&self, name: &str) -> DcResult<Arc<ValueDefinition>> {
		self.registry.get_setting(name)
	}

	pub fn descriptor(&self, name: &str) -> DcResult<ValueDescriptor<'_>> {
		Ok(self.bind(self.definition(name)?))
	}

	pub(crate) fn bind(&self, value: Arc<ValueDefinition>) -> ValueDescriptor<'_> {
		ValueDescriptor::new(value, self.store.as_ref(), self.cache.as_ref(), &self.cache_key_prefix)
	}

	/// Get the current value of a registered setting
	pub async fn get(&self, name: &str) -> DcResult<SettingValue> {
		self.descriptor(name)?.get().await
	}

	/// Set a registered setting. Returns whether the stored value changed.
	pub async fn set(&self, name: &str, value: impl Into<SettingValue>) -> DcResult<bool> {
		self.descriptor(name)?.set(value).await
	}

	/// Set a setting from a submitted raw string
	pub async fn set_raw(&self, name: &str, raw: &str) -> DcResult<bool> {
		self.set(name, SettingValue::String(raw.into())).await
	}

	pub async fn get_bool(&self, name: &str) -> DcResult<bool> {
		match self.get(name).await? {
			SettingValue::Bool(b) => Ok(b),
			other => Err(mismatch(name, "boolean", &other)),
		}
	}

	pub async fn get_string(&self, name: &str) -> DcResult<Box<str>> {
		match self.get(name).await? {
			SettingValue::String(s) => Ok(s),
			other => Err(mismatch(name, "string", &other)),
		}
	}

	/// `None` for an unset optional integer
	pub async fn get_int(&self, name: &str) -> DcResult<Option<i64>> {
		match self.get(name).await? {
			SettingValue::Int(i) => Ok(Some(i)),
			SettingValue::Empty if self.is_kind(name, "integer")? => Ok(None),
			other => Err(mismatch(name, "integer", &other)),
		}
	}

	pub async fn get_float(&self, name: &str) -> DcResult<Option<f64>> {
		match self.get(name).await? {
			SettingValue::Float(f) => Ok(Some(f)),
			SettingValue::Empty if self.is_kind(name, "float")? => Ok(None),
			other => Err(mismatch(name, "float", &other)),
		}
	}

	pub async fn get_decimal(&self, name: &str) -> DcResult<Option<Decimal>> {
		match self.get(name).await? {
			SettingValue::Decimal(d) => Ok(Some(d)),
			SettingValue::Empty if self.is_kind(name, "decimal")? => Ok(None),
			other => Err(mismatch(name, "decimal", &other)),
		}
	}

	/// Primary key of the referenced entity, `None` if unset or gone
	pub async fn get_reference(&self, name: &str) -> DcResult<Option<Box<str>>> {
		match self.get(name).await? {
			SettingValue::Reference(pk) => Ok(Some(pk)),
			SettingValue::Empty if self.is_kind(name, "reference")? => Ok(None),
			other => Err(mismatch(name, "reference", &other)),
		}
	}

	fn is_kind(&self, name: &str, kind: &str) -> DcResult<bool> {
		Ok(self.definition(name)?.kind().name() == kind)
	}

	/// Entity deletion hook.
	///
	/// Every registered reference setting into `model` that points at `pk`
	/// is reset to empty, a default pointing at `pk` is cleared. Returns the
	/// number of rewritten store rows.
	pub async fn entity_deleted(&self, model: &str, pk: &str) -> DcResult<usize> {
		let mut reset = 0;

		for value in self.registry.references_to(model) {
			if value.default().as_reference() == Some(pk) {
				value.clear_default();
			}

			let descriptor = self.bind(value);
			let raw = descriptor.raw_value().await?;
			if raw.trim() == pk {
				warn!(
					"Setting '{}' referred to deleted {} '{}', resetting",
					descriptor.definition().name(),
					model,
					pk
				);
				descriptor.reset_to_empty().await?;
				reset += 1;
			}
		}

		Ok(reset)
	}

	/// Delete stored settings which are not registered anymore
	pub async fn prune_stale(&self) -> DcResult<u64> {
		let keep = self.registry.names();
		let deleted = self.store.delete_settings_except(&keep).await?;
		info!("Deleted {} stale settings", deleted);
		Ok(deleted)
	}

	pub async fn clear_cache(&self) -> DcResult<()> {
		self.cache.clear().await
	}
}

impl std::fmt::Debug for Settings {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Settings")
			.field("registry", &self.registry)
			.field("store", &self.store)
			.field("cache", &self.cache)
			.field("cache_key_prefix", &self.cache_key_prefix)
			.finish()
	}
}

fn mismatch(name: &str, expected: &'static str, got: &SettingValue) -> Error {
	Error::TypeMismatch { name: name.into(), expected, got: got.type_name() }
}

// vim: ts=4

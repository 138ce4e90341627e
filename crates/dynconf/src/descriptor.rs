//! Value descriptor
//!
//! Binds one setting definition to the store and the cache. Reads go
//! through the cache and fall back to a get-or-create on the store, writes
//! go to the store first and refresh the cache afterwards.

use std::sync::Arc;

use dynconf_types::cache_adapter::CacheAdapter;
use dynconf_types::store_adapter::StoreAdapter;

use crate::definition::ValueDefinition;
use crate::kind::ValueKind;
use crate::prelude::*;
use crate::value::SettingValue;

pub struct ValueDescriptor<'a> {
	value: Arc<ValueDefinition>,
	store: &'a dyn StoreAdapter,
	cache: &'a dyn CacheAdapter,
	cache_key: String,
}

impl<'a> ValueDescriptor<'a> {
	pub fn new(
		value: Arc<ValueDefinition>,
		store: &'a dyn StoreAdapter,
		cache: &'a dyn CacheAdapter,
		cache_key_prefix: &str,
	) -> Self {
		let cache_key = format!("{}{}", cache_key_prefix, value.name());
		Self { value, store, cache, cache_key }
	}

	pub fn definition(&self) -> &ValueDefinition {
		&self.value
	}

	pub fn cache_key(&self) -> &str {
		&self.cache_key
	}

	/// Current value of the setting. The first read of a setting creates its
	/// store row with the default.
	pub async fn get(&self) -> DcResult<SettingValue> {
		let raw = self.raw_value().await?;
		self.decode(&raw).await
	}

	/// Clean and write a new value. Returns whether anything was written.
	pub async fn set(&self, value: impl Into<SettingValue>) -> DcResult<bool> {
		let current = self.get().await?;
		let value = self.clean(value.into()).await?;

		if value == current {
			debug!("Setting '{}' unchanged", self.value.name());
			return Ok(false);
		}

		let raw = self.value.to_storage(&value);
		self.update_store(&raw).await?;
		self.save_to_cache(&raw).await?;
		info!("Setting '{}' updated", self.value.name());
		Ok(true)
	}

	/// Coerce and validate a value, including reference membership
	pub async fn clean(&self, value: SettingValue) -> DcResult<SettingValue> {
		let value = self.value.clean(value).map_err(|error| self.invalid(error))?;

		if let (ValueKind::Reference { entities }, SettingValue::Reference(pk)) =
			(self.value.kind(), &value)
			&& !entities.contains(pk).await?
		{
			return Err(self.invalid(ValidationError::InvalidChoice { pk: pk.to_string() }));
		}
		Ok(value)
	}

	/// Raw stored value, through the cache
	pub async fn raw_value(&self) -> DcResult<Box<str>> {
		if let Some(raw) = self.get_from_cache().await {
			debug!("Setting cache hit: {}", self.cache_key);
			return Ok(raw);
		}

		debug!("Setting cache miss: {}", self.cache_key);
		let row = self.save_to_store().await?;
		self.save_to_cache(&row.raw_value).await?;
		Ok(row.raw_value)
	}

	/// Get the store row, creating it with the encoded default if missing
	pub async fn save_to_store(&self) -> DcResult<SettingRow> {
		let default = self.value.to_storage(&self.value.default());
		self.store.get_or_create_setting(self.value.name(), &default).await
	}

	/// Overwrite the store row
	pub async fn update_store(&self, raw: &str) -> DcResult<SettingRow> {
		self.store.upsert_setting(self.value.name(), raw).await
	}

	pub async fn save_to_cache(&self, raw: &str) -> DcResult<()> {
		self.cache.set(&self.cache_key, raw).await
	}

	/// A failing cache read counts as a miss
	pub async fn get_from_cache(&self) -> Option<Box<str>> {
		self.cache
			.get(&self.cache_key)
			.await
			.inspect_err(|err| warn!("Cache read failed for '{}': {}", self.cache_key, err))
			.ok()
			.flatten()
	}

	/// Overwrite the stored value with the empty value
	pub async fn reset_to_empty(&self) -> DcResult<()> {
		self.update_store("").await?;
		self.save_to_cache("").await
	}

	/// Decode a raw stored value, resolving references
	async fn decode(&self, raw: &str) -> DcResult<SettingValue> {
		match self.value.decode(raw) {
			Ok(SettingValue::Reference(pk)) => {
				let ValueKind::Reference { entities } = self.value.kind() else {
					return Ok(SettingValue::Reference(pk));
				};
				if entities.contains(&pk).await? {
					Ok(SettingValue::Reference(pk))
				} else {
					debug!("Setting '{}' refers to missing {} '{}'", self.value.name(), entities.model(), pk);
					Ok(SettingValue::Empty)
				}
			}
			Ok(value) => Ok(value),
			Err(err) => {
				warn!(
					"Stored value of setting '{}' is invalid ({}), using the default",
					self.value.name(),
					err
				);
				Ok(self.value.default())
			}
		}
	}

	fn invalid(&self, error: ValidationError) -> Error {
		Error::InvalidSettingValue { name: self.value.name().into(), error }
	}
}

impl std::fmt::Debug for ValueDescriptor<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ValueDescriptor")
			.field("name", &self.value.name())
			.field("cache_key", &self.cache_key)
			.finish_non_exhaustive()
	}
}

// vim: ts=4

//! Service configuration

use serde::{Deserialize, Serialize};

use crate::prelude::*;

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;
pub const DEFAULT_CACHE_KEY_PREFIX: &str = "dynconf_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
	/// Maximum number of entries in the in-process cache
	pub cache_capacity: usize,
	/// Namespace prepended to setting names to form cache keys
	pub cache_key_prefix: String,
}

impl Default for SettingsConfig {
	fn default() -> Self {
		Self {
			cache_capacity: DEFAULT_CACHE_CAPACITY,
			cache_key_prefix: DEFAULT_CACHE_KEY_PREFIX.to_string(),
		}
	}
}

impl SettingsConfig {
	/// Load configuration from `DYNCONF_*` environment variables
	pub fn from_env() -> DcResult<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Load configuration through a variable lookup, unset variables keep
	/// their defaults
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DcResult<Self> {
		let mut config = Self::default();

		if let Some(capacity) = lookup("DYNCONF_CACHE_CAPACITY") {
			config.cache_capacity = capacity.trim().parse().map_err(|_| {
				Error::ConfigError(format!("DYNCONF_CACHE_CAPACITY is not a number: {}", capacity))
			})?;
		}
		if let Some(prefix) = lookup("DYNCONF_CACHE_PREFIX") {
			config.cache_key_prefix = prefix;
		}

		debug!("Settings config: {:?}", config);
		Ok(config)
	}
}


// vim: ts=4

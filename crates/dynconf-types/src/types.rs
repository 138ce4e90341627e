//! Common types used by the registry and the adapters.

use serde::{Deserialize, Serialize};

/// Maximum length of a setting name (the store keys rows by it)
pub const MAX_SETTING_NAME_LEN: usize = 255;

// Timestamp //
//***********//
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_i64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(Timestamp(i64::deserialize(deserializer)?))
	}
}

// SettingRow //
//************//
/// One persisted setting: the encoded value keyed by the setting name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingRow {
	pub name: Box<str>,
	/// String-encoded value, empty for the empty value of every kind
	#[serde(rename = "rawValue")]
	pub raw_value: Box<str>,
	/// Starts at 1 and is incremented by every upsert
	pub version: i64,
	#[serde(rename = "updatedAt")]
	pub updated_at: Timestamp,
}

/// Check a setting name against the store's key constraints
pub fn is_valid_setting_name(name: &str) -> bool {
	!name.is_empty() && name.chars().count() <= MAX_SETTING_NAME_LEN
}


// vim: ts=4

//! Persistent store adapter
//!
//! The store holds one row per setting name. It is the source of truth for
//! setting values; caches are refilled from it.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;
use crate::types::SettingRow;

#[async_trait]
pub trait StoreAdapter: Debug + Send + Sync {
	/// Read a single row by setting name
	async fn read_setting(&self, name: &str) -> DcResult<Option<SettingRow>>;

	/// Return the row for `name`, inserting it with `raw_value` if absent.
	/// An existing row is returned unchanged.
	async fn get_or_create_setting(&self, name: &str, raw_value: &str) -> DcResult<SettingRow>;

	/// Insert or replace the row for `name` unconditionally
	async fn upsert_setting(&self, name: &str, raw_value: &str) -> DcResult<SettingRow>;

	/// Delete the row for `name`. Returns whether a row existed.
	async fn delete_setting(&self, name: &str) -> DcResult<bool>;

	/// Delete every row whose name is not in `keep`. Returns the number of
	/// deleted rows.
	async fn delete_settings_except(&self, keep: &[Box<str>]) -> DcResult<u64>;

	/// List all rows ordered by name
	async fn list_settings(&self) -> DcResult<Vec<SettingRow>>;
}

// vim: ts=4

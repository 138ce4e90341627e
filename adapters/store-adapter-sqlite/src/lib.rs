//! SQLite settings store for dynconf.
//!
//! Stores one row per setting name in a `settings` table. See
//! [`StoreAdapter`] for the operations.

use async_trait::async_trait;
use std::path::Path;

use sqlx::sqlite::{self, SqlitePool};

use dynconf_types::{
	prelude::*,
	store_adapter::StoreAdapter,
	types::is_valid_setting_name,
};

mod schema;
mod setting;

fn check_name(name: &str) -> DcResult<()> {
	if is_valid_setting_name(name) { Ok(()) } else { Err(Error::InvalidSettingName(name.into())) }
}

#[derive(Debug)]
pub struct StoreAdapterSqlite {
	db: SqlitePool,
}

impl StoreAdapterSqlite {
	/// Open (or create) the database file at `path` and initialize the schema
	pub async fn new(path: impl AsRef<Path>) -> DcResult<Self> {
		if let Some(parent) = path.as_ref().parent()
			&& !parent.as_os_str().is_empty()
		{
			tokio::fs::create_dir_all(parent).await?;
		}

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| warn!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| warn!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		info!("Settings store opened: {}", path.as_ref().display());
		Ok(Self { db })
	}
}

#[async_trait]
impl StoreAdapter for StoreAdapterSqlite {
	async fn read_setting(&self, name: &str) -> DcResult<Option<SettingRow>> {
		setting::read(&self.db, name).await
	}

	async fn get_or_create_setting(&self, name: &str, raw_value: &str) -> DcResult<SettingRow> {
		check_name(name)?;
		setting::get_or_create(&self.db, name, raw_value).await
	}

	async fn upsert_setting(&self, name: &str, raw_value: &str) -> DcResult<SettingRow> {
		check_name(name)?;
		setting::upsert(&self.db, name, raw_value).await
	}

	async fn delete_setting(&self, name: &str) -> DcResult<bool> {
		setting::delete(&self.db, name).await
	}

	async fn delete_settings_except(&self, keep: &[Box<str>]) -> DcResult<u64> {
		let deleted = setting::delete_except(&self.db, keep).await?;
		if deleted > 0 {
			info!("Deleted {} stale setting rows", deleted);
		}
		Ok(deleted)
	}

	async fn list_settings(&self) -> DcResult<Vec<SettingRow>> {
		setting::list(&self.db).await
	}
}

// vim: ts=4

//! Settings row management
//!
//! Persistent storage of encoded setting values, keyed by setting name.

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use dynconf_types::prelude::*;

fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

fn map_row(row: &SqliteRow) -> Result<SettingRow, sqlx::Error> {
	let name: String = row.try_get("name")?;
	let raw_value: String = row.try_get("raw_value")?;
	Ok(SettingRow {
		name: name.into(),
		raw_value: raw_value.into(),
		version: row.try_get("version")?,
		updated_at: Timestamp(row.try_get("updated_at")?),
	})
}

fn push_not_in<'a>(
	mut query: sqlx::QueryBuilder<'a, sqlx::Sqlite>,
	values: &'a [Box<str>],
) -> sqlx::QueryBuilder<'a, sqlx::Sqlite> {
	query.push("(");
	{
		let mut separated = query.separated(", ");
		for value in values {
			separated.push_bind(value.as_ref());
		}
	}
	query.push(")");
	query
}

/// Read a single setting by name
pub(crate) async fn read(db: &SqlitePool, name: &str) -> DcResult<Option<SettingRow>> {
	let row = sqlx::query("SELECT name, raw_value, version, updated_at FROM settings WHERE name = ?")
		.bind(name)
		.fetch_optional(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	row.as_ref().map(map_row).transpose().inspect_err(inspect).map_err(|_| Error::DbError)
}

/// Return the existing row or create it with the given raw value
pub(crate) async fn get_or_create(
	db: &SqlitePool,
	name: &str,
	raw_value: &str,
) -> DcResult<SettingRow> {
	let mut tx = db.begin().await.inspect_err(inspect).map_err(|_| Error::DbError)?;

	let res = sqlx::query("INSERT OR IGNORE INTO settings (name, raw_value) VALUES (?, ?)")
		.bind(name)
		.bind(raw_value)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	if res.rows_affected() > 0 {
		debug!("Created setting row: {}", name);
	}

	let row = sqlx::query("SELECT name, raw_value, version, updated_at FROM settings WHERE name = ?")
		.bind(name)
		.fetch_one(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	tx.commit().await.inspect_err(inspect).map_err(|_| Error::DbError)?;

	map_row(&row).inspect_err(inspect).map_err(|_| Error::DbError)
}

/// Insert or update a setting, bumping its version
pub(crate) async fn upsert(db: &SqlitePool, name: &str, raw_value: &str) -> DcResult<SettingRow> {
	let row = sqlx::query(
		"INSERT INTO settings (name, raw_value) VALUES (?, ?)
		ON CONFLICT(name) DO UPDATE SET
			raw_value = excluded.raw_value,
			version = settings.version + 1,
			updated_at = unixepoch()
		RETURNING name, raw_value, version, updated_at",
	)
	.bind(name)
	.bind(raw_value)
	.fetch_one(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	map_row(&row).inspect_err(inspect).map_err(|_| Error::DbError)
}

/// Delete a single setting
pub(crate) async fn delete(db: &SqlitePool, name: &str) -> DcResult<bool> {
	let res = sqlx::query("DELETE FROM settings WHERE name = ?")
		.bind(name)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(res.rows_affected() > 0)
}

/// Delete every setting not listed in `keep`
pub(crate) async fn delete_except(db: &SqlitePool, keep: &[Box<str>]) -> DcResult<u64> {
	let res = if keep.is_empty() {
		sqlx::query("DELETE FROM settings")
			.execute(db)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?
	} else {
		let query = sqlx::QueryBuilder::new("DELETE FROM settings WHERE name NOT IN ");
		let mut query = push_not_in(query, keep);
		query.build().execute(db).await.inspect_err(inspect).map_err(|_| Error::DbError)?
	};

	Ok(res.rows_affected())
}

/// List all settings
pub(crate) async fn list(db: &SqlitePool) -> DcResult<Vec<SettingRow>> {
	let rows =
		sqlx::query("SELECT name, raw_value, version, updated_at FROM settings ORDER BY name")
			.fetch_all(db)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;

	rows.iter()
		.map(map_row)
		.collect::<Result<Vec<_>, _>>()
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)
}

// vim: ts=4

//! Reference setting tests
//!
//! Membership checks, resolution on read and the deletion cascade

#![allow(clippy::expect_used)]

mod common;

use std::sync::Arc;

use dynconf::{Error, SettingValue, SettingsGroup, ValidationError, ValueDefinition};
use dynconf_types::cache_adapter::CacheAdapter;
use dynconf_types::store_adapter::StoreAdapter;

use common::{MemoryEntitySet, TestEnv, create_test_env};

async fn env_with_users(default: &str) -> (TestEnv, Arc<MemoryEntitySet>) {
	let env = create_test_env().await;
	let users = MemoryEntitySet::new("user", &["1", "2", "3"]);

	let group = SettingsGroup::builder("OwnerSettings")
		.setting(
			ValueDefinition::reference("site_owner", users.clone())
				.default(default)
				.build()
				.expect("site_owner"),
		)
		.setting(
			ValueDefinition::reference("fallback_owner", users.clone())
				.default("2")
				.build()
				.expect("fallback_owner"),
		)
		.build()
		.expect("Failed to build group");
	env.registry.register(group).expect("register");

	(env, users)
}

#[tokio::test]
async fn test_reference_write_and_read() {
	let (env, _users) = env_with_users("1").await;

	assert_eq!(env.settings.get_reference("site_owner").await.expect("get").as_deref(), Some("1"));

	env.settings.set("site_owner", SettingValue::reference("3")).await.expect("set");
	assert_eq!(env.settings.get_reference("site_owner").await.expect("get").as_deref(), Some("3"));

	let row = env.store.read_setting("site_owner").await.expect("read").expect("row");
	assert_eq!(&*row.raw_value, "3");
}

#[tokio::test]
async fn test_unknown_entity_is_invalid_choice() {
	let (env, _users) = env_with_users("1").await;

	let res = env.settings.set_raw("site_owner", "42").await;
	assert!(matches!(
		res,
		Err(Error::InvalidSettingValue { error: ValidationError::InvalidChoice { ref pk }, .. }) if pk == "42"
	));
	assert_eq!(env.settings.get_reference("site_owner").await.expect("get").as_deref(), Some("1"));
}

#[tokio::test]
async fn test_reference_can_be_emptied() {
	let (env, _users) = env_with_users("1").await;

	assert!(env.settings.set("site_owner", SettingValue::Empty).await.expect("set"));
	assert_eq!(env.settings.get_reference("site_owner").await.expect("get"), None);

	let row = env.store.read_setting("site_owner").await.expect("read").expect("row");
	assert_eq!(&*row.raw_value, "");
}

#[tokio::test]
async fn test_cascade_resets_current_value() {
	let (env, users) = env_with_users("1").await;
	env.settings.set("site_owner", SettingValue::reference("3")).await.expect("set");
	env.settings.get("fallback_owner").await.expect("get");

	users.remove("3");
	let reset = env.settings.entity_deleted("user", "3").await.expect("cascade");
	assert_eq!(reset, 1);

	assert_eq!(env.settings.get("site_owner").await.expect("get"), SettingValue::Empty);
	let row = env.store.read_setting("site_owner").await.expect("read").expect("row");
	assert_eq!(&*row.raw_value, "");
	let cached = env.cache.get("dynconf_site_owner").await.expect("cache get");
	assert_eq!(cached.as_deref(), Some(""));

	// Unrelated reference untouched
	assert_eq!(env.settings.get_reference("fallback_owner").await.expect("get").as_deref(), Some("2"));
}

#[tokio::test]
async fn test_cascade_clears_default() {
	let (env, users) = env_with_users("1").await;

	users.remove("1");
	env.settings.entity_deleted("user", "1").await.expect("cascade");

	let def = env.registry.get_setting("site_owner").expect("definition");
	assert_eq!(def.default(), SettingValue::Empty);
	assert_eq!(env.settings.get_reference("site_owner").await.expect("get"), None);
	let row = env.store.read_setting("site_owner").await.expect("read").expect("row");
	assert_eq!(&*row.raw_value, "");
}

#[tokio::test]
async fn test_cascade_ignores_other_models() {
	let (env, _users) = env_with_users("1").await;
	env.settings.get("site_owner").await.expect("get");

	let reset = env.settings.entity_deleted("site", "1").await.expect("cascade");
	assert_eq!(reset, 0);
	assert_eq!(env.store.upserts(), 0);
	assert_eq!(env.settings.get_reference("site_owner").await.expect("get").as_deref(), Some("1"));
}

#[tokio::test]
async fn test_vanished_entity_reads_empty() {
	let (env, users) = env_with_users("1").await;
	env.settings.set("site_owner", SettingValue::reference("2")).await.expect("set");

	// Deleted without notification: the row keeps the pk, reads resolve to empty
	users.remove("2");
	assert_eq!(env.settings.get("site_owner").await.expect("get"), SettingValue::Empty);
	let row = env.store.read_setting("site_owner").await.expect("read").expect("row");
	assert_eq!(&*row.raw_value, "2");
}

// vim: ts=4

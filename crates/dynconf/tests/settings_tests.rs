//! Settings service tests
//!
//! Read and write paths against a real SQLite store and the LRU cache

#![allow(clippy::expect_used)]

mod common;

use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use dynconf::{
	Error, SettingValue, Settings, SettingsConfig, SettingsGroup, ValidationError, ValueDefinition,
};
use dynconf_types::cache_adapter::CacheAdapter;
use dynconf_types::store_adapter::StoreAdapter;

use common::{BrokenCache, create_test_env, create_test_store};

fn site_settings() -> SettingsGroup {
	SettingsGroup::builder("SiteSettings")
		.setting(
			ValueDefinition::string("greeting")
				.default("hi")
				.min_length(3)
				.build()
				.expect("greeting"),
		)
		.setting(ValueDefinition::boolean("maintenance").default(false).build().expect("maintenance"))
		.setting(
			ValueDefinition::integer("page_size")
				.default(20)
				.min_value(1)
				.max_value(100)
				.build()
				.expect("page_size"),
		)
		.setting(ValueDefinition::float("ratio").default(0.5).build().expect("ratio"))
		.setting(
			ValueDefinition::decimal("price")
				.default("9.99")
				.max_digits(5)
				.decimal_places(2)
				.build()
				.expect("price"),
		)
		.build()
		.expect("Failed to build group")
}

#[tokio::test]
async fn test_read_creates_default() {
	let env = create_test_env().await;
	env.registry.register(site_settings()).expect("register");

	assert!(env.store.read_setting("greeting").await.expect("read").is_none());

	let value = env.settings.get("greeting").await.expect("get");
	assert_eq!(value, SettingValue::String("hi".into()));

	let row = env.store.read_setting("greeting").await.expect("read").expect("row created");
	assert_eq!(&*row.raw_value, "hi");
	assert_eq!(env.store.list_settings().await.expect("list").len(), 1);

	let cached = env.cache.get("dynconf_greeting").await.expect("cache get");
	assert_eq!(cached.as_deref(), Some("hi"));

	// Second read is served from the cache
	env.settings.get("greeting").await.expect("get");
	assert_eq!(env.store.creates(), 1);
}

#[tokio::test]
async fn test_greeting_scenario() {
	let env = create_test_env().await;
	env.registry.register(site_settings()).expect("register");

	assert_eq!(&*env.settings.get_string("greeting").await.expect("get"), "hi");

	assert!(env.settings.set("greeting", "hey").await.expect("set hey"));
	assert_eq!(&*env.settings.get_string("greeting").await.expect("get"), "hey");

	let res = env.settings.set("greeting", "x").await;
	assert!(matches!(
		res,
		Err(Error::InvalidSettingValue { ref name, error: ValidationError::MinLength { min: 3, got: 1 } })
			if &**name == "greeting"
	));
	assert_eq!(&*env.settings.get_string("greeting").await.expect("get"), "hey");
}

#[tokio::test]
async fn test_write_read_coherence() {
	let env = create_test_env().await;
	env.registry.register(site_settings()).expect("register");

	env.settings.set("page_size", 50).await.expect("set");

	assert_eq!(env.settings.get("page_size").await.expect("get"), SettingValue::Int(50));
	let row = env.store.read_setting("page_size").await.expect("read").expect("row");
	assert_eq!(&*row.raw_value, "50");
	let cached = env.cache.get("dynconf_page_size").await.expect("cache get");
	assert_eq!(cached.as_deref(), Some("50"));

	// A cold cache reads the same value back from the store
	env.settings.clear_cache().await.expect("clear");
	assert_eq!(env.settings.get_int("page_size").await.expect("get"), Some(50));
}

#[tokio::test]
async fn test_validation_gate_leaves_store_untouched() {
	let env = create_test_env().await;
	env.registry.register(site_settings()).expect("register");
	env.settings.get("page_size").await.expect("get");
	let before = env.store.read_setting("page_size").await.expect("read").expect("row");

	let res = env.settings.set("page_size", 500).await;
	assert!(matches!(
		res,
		Err(Error::InvalidSettingValue { error: ValidationError::MaxValue { .. }, .. })
	));

	let res = env.settings.set_raw("page_size", "2.5").await;
	assert!(matches!(
		res,
		Err(Error::InvalidSettingValue { error: ValidationError::NotAWholeNumber, .. })
	));

	let res = env.settings.set_raw("page_size", "lots").await;
	assert!(matches!(res, Err(Error::InvalidSettingValue { error: ValidationError::NotANumber, .. })));

	let res = env.settings.set_raw("page_size", "99999999999999999999").await;
	assert!(matches!(
		res,
		Err(Error::InvalidSettingValue { error: ValidationError::MaxValue { ref max }, .. })
			if max == &i64::MAX.to_string()
	));

	let after = env.store.read_setting("page_size").await.expect("read").expect("row");
	assert_eq!(before, after);
	assert_eq!(env.store.upserts(), 0);
	assert_eq!(env.settings.get_int("page_size").await.expect("get"), Some(20));
}

#[tokio::test]
async fn test_custom_validator_rejects_write() {
	let env = create_test_env().await;
	let group = SettingsGroup::builder("MailSettings")
		.setting(
			ValueDefinition::string("sender")
				.default("noreply@example.com")
				.validator(|value| match value.as_str() {
					Some(s) if !s.contains('@') => Err(ValidationError::Invalid {
						code: "invalid_email",
						message: "Enter a valid email address.".into(),
					}),
					_ => Ok(()),
				})
				.build()
				.expect("sender"),
		)
		.build()
		.expect("Failed to build group");
	env.registry.register(group).expect("register");

	let res = env.settings.set("sender", "nobody").await;
	assert!(matches!(
		res,
		Err(Error::InvalidSettingValue { ref name, error: ValidationError::Invalid { code: "invalid_email", .. } })
			if &**name == "sender"
	));
	assert_eq!(env.store.upserts(), 0);
	assert_eq!(&*env.settings.get_string("sender").await.expect("get"), "noreply@example.com");

	assert!(env.settings.set("sender", "admin@example.com").await.expect("set"));
	assert_eq!(&*env.settings.get_string("sender").await.expect("get"), "admin@example.com");
}

#[tokio::test]
async fn test_unchanged_write_is_skipped() {
	let env = create_test_env().await;
	env.registry.register(site_settings()).expect("register");

	assert!(env.settings.set("page_size", 30).await.expect("set"));
	let row = env.store.read_setting("page_size").await.expect("read").expect("row");

	// Same value, also through loose input
	assert!(!env.settings.set("page_size", 30).await.expect("set"));
	assert!(!env.settings.set_raw("page_size", " 30 ").await.expect("set"));

	let unchanged = env.store.read_setting("page_size").await.expect("read").expect("row");
	assert_eq!(row.version, unchanged.version);
	assert_eq!(env.store.upserts(), 1);
}

#[tokio::test]
async fn test_unknown_setting() {
	let env = create_test_env().await;
	env.registry.register(site_settings()).expect("register");

	let res = env.settings.set("nonexistent", "value").await;
	assert!(matches!(res, Err(Error::SettingNotRegistered(ref name)) if &**name == "nonexistent"));

	let res = env.settings.get("nonexistent").await;
	assert!(matches!(res, Err(Error::SettingNotRegistered(_))));

	// No implicit creation
	assert!(env.store.read_setting("nonexistent").await.expect("read").is_none());
}

#[tokio::test]
async fn test_typed_getters() {
	let env = create_test_env().await;
	env.registry.register(site_settings()).expect("register");

	assert!(!env.settings.get_bool("maintenance").await.expect("bool"));
	assert_eq!(env.settings.get_float("ratio").await.expect("float"), Some(0.5));
	assert_eq!(
		env.settings.get_decimal("price").await.expect("decimal"),
		Some(Decimal::from_str("9.99").expect("decimal"))
	);

	let res = env.settings.get_bool("greeting").await;
	assert!(matches!(
		res,
		Err(Error::TypeMismatch { expected: "boolean", got: "string", .. })
	));
}

#[tokio::test]
async fn test_round_trip_per_kind() {
	let env = create_test_env().await;
	env.registry.register(site_settings()).expect("register");

	env.settings.set("maintenance", true).await.expect("bool");
	env.settings.set("greeting", "hello there").await.expect("string");
	env.settings.set("page_size", 99).await.expect("int");
	env.settings.set("ratio", 1.25).await.expect("float");
	env.settings.set("price", Decimal::from_str("123.45").expect("decimal")).await.expect("decimal");

	let raw = |name: &'static str| {
		let store = env.store.clone();
		async move { store.read_setting(name).await.expect("read").expect("row").raw_value }
	};
	assert_eq!(&*raw("maintenance").await, "True");
	assert_eq!(&*raw("price").await, "123.45");

	// Decode from the store rows, not the cache
	env.settings.clear_cache().await.expect("clear");
	assert!(env.settings.get_bool("maintenance").await.expect("bool"));
	assert_eq!(&*env.settings.get_string("greeting").await.expect("string"), "hello there");
	assert_eq!(env.settings.get_int("page_size").await.expect("int"), Some(99));
	assert_eq!(env.settings.get_float("ratio").await.expect("float"), Some(1.25));
	assert_eq!(
		env.settings.get_decimal("price").await.expect("decimal"),
		Some(Decimal::from_str("123.45").expect("decimal"))
	);

	env.settings.set("maintenance", false).await.expect("bool");
	assert_eq!(&*raw("maintenance").await, "False");
}

#[tokio::test]
async fn test_decimal_digit_limits() {
	let env = create_test_env().await;
	env.registry.register(site_settings()).expect("register");

	let res = env.settings.set_raw("price", "1.234").await;
	assert!(matches!(
		res,
		Err(Error::InvalidSettingValue { error: ValidationError::MaxDecimalPlaces { max: 2 }, .. })
	));

	let res = env.settings.set_raw("price", "1234.5").await;
	assert!(matches!(
		res,
		Err(Error::InvalidSettingValue { error: ValidationError::MaxWholeDigits { max: 3 }, .. })
	));
}

#[tokio::test]
async fn test_unregister_hides_settings() {
	let env = create_test_env().await;
	let site = Arc::new(site_settings());
	env.registry.register(Arc::clone(&site)).expect("register");
	env.settings.set("greeting", "hello").await.expect("set");

	env.registry.unregister("SiteSettings").expect("unregister");
	assert!(matches!(env.registry.get_setting("greeting"), Err(Error::SettingNotRegistered(_))));
	assert!(matches!(env.settings.get("greeting").await, Err(Error::SettingNotRegistered(_))));

	// The row is still there, re-registering resumes with it
	assert!(env.store.read_setting("greeting").await.expect("read").is_some());
	env.registry.register(site).expect("register again");
	assert_eq!(&*env.settings.get_string("greeting").await.expect("get"), "hello");
}

#[tokio::test]
async fn test_prune_stale() {
	let env = create_test_env().await;
	env.registry.register(site_settings()).expect("register");
	env.settings.get("greeting").await.expect("get");
	env.store.upsert_setting("removed_setting", "old").await.expect("upsert");
	env.store.upsert_setting("another_removed", "old").await.expect("upsert");

	let deleted = env.settings.prune_stale().await.expect("prune");
	assert_eq!(deleted, 2);

	let rows = env.store.list_settings().await.expect("list");
	assert_eq!(rows.len(), 1);
	assert_eq!(&*rows[0].name, "greeting");
}

#[tokio::test]
async fn test_corrupt_row_falls_back_to_default() {
	let env = create_test_env().await;
	env.registry.register(site_settings()).expect("register");
	env.store.upsert_setting("page_size", "not a number").await.expect("upsert");

	assert_eq!(env.settings.get_int("page_size").await.expect("get"), Some(20));
}

#[tokio::test]
async fn test_failing_cache_read_is_a_miss() {
	common::setup_test_logging();
	let (store, _temp) = create_test_store().await;
	let registry = Arc::new(dynconf::SettingsRegistry::new());
	registry.register(site_settings()).expect("register");
	let settings = Settings::new(registry, Arc::new(store), Arc::new(BrokenCache));

	assert_eq!(&*settings.get_string("greeting").await.expect("get"), "hi");
	settings.set("greeting", "hello").await.expect("set");
	assert_eq!(&*settings.get_string("greeting").await.expect("get"), "hello");
}

#[tokio::test]
async fn test_service_from_config() {
	let env = create_test_env().await;
	env.registry.register(site_settings()).expect("register");
	let config = SettingsConfig::from_lookup(|key| match key {
		"DYNCONF_CACHE_CAPACITY" => Some("2".to_string()),
		"DYNCONF_CACHE_PREFIX" => Some("cfg_".to_string()),
		_ => None,
	})
	.expect("config");
	let settings = Settings::with_config(Arc::clone(&env.registry), env.store.clone(), &config);

	assert_eq!(settings.cache_key("greeting"), "cfg_greeting");
	settings.set("page_size", 42).await.expect("set");
	assert_eq!(settings.get_int("page_size").await.expect("get"), Some(42));
	assert_eq!(&*settings.get_string("greeting").await.expect("get"), "hi");
}

#[tokio::test]
async fn test_custom_cache_key_prefix() {
	let env = create_test_env().await;
	env.registry.register(site_settings()).expect("register");
	let settings = Settings::new(Arc::clone(&env.registry), env.store.clone(), env.cache.clone())
		.with_cache_key_prefix("site_");

	settings.get("greeting").await.expect("get");
	assert_eq!(settings.cache_key("greeting"), "site_greeting");
	assert!(env.cache.get("site_greeting").await.expect("cache get").is_some());
	assert!(env.cache.get("dynconf_greeting").await.expect("cache get").is_none());
}

// vim: ts=4

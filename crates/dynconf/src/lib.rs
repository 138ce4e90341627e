//! Runtime settings registry.
//!
//! Settings are declared in code as typed groups, registered in a
//! [`SettingsRegistry`] and read or written through [`Settings`], which keeps
//! them in a persistent store behind a read-through, write-through cache.
//!
//! # Features
//!
//! - Typed values: boolean, string, integer, float, decimal and references
//!   to external entities, each with its own coercion and constraints
//! - Lazy persistence: the first read of a setting stores its default
//! - Reference cascade: deleting a referenced entity resets the settings
//!   pointing at it
//! - Form surface for editing settings, with per-field errors
//!
//! ```ignore
//! let site = SettingsGroup::builder("SiteSettings")
//! 	.setting(ValueDefinition::string("greeting").default("hi").build()?)
//! 	.build()?;
//! registry.register(site)?;
//!
//! settings.set("greeting", "hello").await?;
//! assert_eq!(&*settings.get_string("greeting").await?, "hello");
//! ```

#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
pub mod definition;
pub mod descriptor;
pub mod form;
pub mod group;
pub mod kind;
pub mod prelude;
pub mod registry;
pub mod service;
pub mod value;

pub use crate::cache::LruCacheAdapter;
pub use crate::config::SettingsConfig;
pub use crate::definition::{SettingValidator, ValueDefinition, ValueDefinitionBuilder};
pub use crate::form::{FormErrors, FormField, SettingsForm};
pub use crate::group::SettingsGroup;
pub use crate::kind::{ValueKind, Widget};
pub use crate::registry::SettingsRegistry;
pub use crate::service::Settings;
pub use crate::value::SettingValue;

pub use dynconf_types::error::{DcResult, Error, ValidationError};

// vim: ts=4

//! Settings registry
//!
//! Process-wide index of registered groups and a flattened
//! `name -> (group, definition)` map for O(1) dispatch. Names are unique
//! across all registered groups.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::definition::ValueDefinition;
use crate::group::SettingsGroup;
use crate::prelude::*;

/// A registered setting with its owning group
#[derive(Debug, Clone)]
pub struct RegisteredSetting {
	pub group: Arc<SettingsGroup>,
	pub value: Arc<ValueDefinition>,
}

#[derive(Default)]
struct RegistryInner {
	/// Registration order
	groups: Vec<Arc<SettingsGroup>>,
	settings: HashMap<Box<str>, RegisteredSetting>,
}

/// Registry of settings groups.
///
/// Usually one instance per process, shared through an `Arc` and filled at
/// startup. Tests create their own instance.
#[derive(Default)]
pub struct SettingsRegistry {
	inner: RwLock<RegistryInner>,
}

impl SettingsRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a settings group.
	///
	/// Either all of the group's names are indexed or none of them: every
	/// name is checked before the indices are touched.
	pub fn register(&self, group: impl Into<Arc<SettingsGroup>>) -> DcResult<()> {
		let group = group.into();
		let mut inner = self.inner.write();

		if inner.groups.iter().any(|g| g.name() == group.name()) {
			return Err(Error::SettingsGroupAlreadyRegistered(group.name().into()));
		}

		if let Some(name) = group.names().find(|name| inner.settings.contains_key(*name)) {
			warn!("Setting '{}' of group '{}' is already registered", name, group.name());
			return Err(Error::SettingAlreadyRegistered(name.into()));
		}

		for value in group.settings() {
			debug!("Registering setting: {}", value.name());
			inner.settings.insert(
				value.name().into(),
				RegisteredSetting { group: Arc::clone(&group), value: Arc::clone(value) },
			);
		}

		info!("Registered settings group '{}' with {} settings", group.name(), group.len());
		inner.groups.push(group);
		Ok(())
	}

	/// Unregister a group by name, removing all of its settings.
	///
	/// Stored and cached values are left untouched.
	pub fn unregister(&self, group_name: &str) -> DcResult<Arc<SettingsGroup>> {
		let mut inner = self.inner.write();

		let pos = inner
			.groups
			.iter()
			.position(|g| g.name() == group_name)
			.ok_or_else(|| Error::SettingsGroupNotRegistered(group_name.into()))?;
		let group = inner.groups.remove(pos);

		for name in group.names() {
			inner.settings.remove(name);
		}

		info!("Unregistered settings group '{}'", group_name);
		Ok(group)
	}

	/// Get a setting definition by name
	pub fn get_setting(&self, name: &str) -> DcResult<Arc<ValueDefinition>> {
		self.inner
			.read()
			.settings
			.get(name)
			.map(|s| Arc::clone(&s.value))
			.ok_or_else(|| Error::SettingNotRegistered(name.into()))
	}

	/// Get a setting together with its owning group
	pub fn lookup(&self, name: &str) -> DcResult<RegisteredSetting> {
		self.inner
			.read()
			.settings
			.get(name)
			.cloned()
			.ok_or_else(|| Error::SettingNotRegistered(name.into()))
	}

	pub fn group_of(&self, name: &str) -> DcResult<Arc<SettingsGroup>> {
		self.lookup(name).map(|s| s.group)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.inner.read().settings.contains_key(name)
	}

	pub fn is_group_registered(&self, group_name: &str) -> bool {
		self.inner.read().groups.iter().any(|g| g.name() == group_name)
	}

	/// Registered groups in registration order
	pub fn groups(&self) -> Vec<Arc<SettingsGroup>> {
		self.inner.read().groups.clone()
	}

	/// All registered setting names, by group registration and declaration order
	pub fn names(&self) -> Vec<Box<str>> {
		self.inner.read().groups.iter().flat_map(|g| g.names().map(Into::into)).collect()
	}

	/// All registered settings, by group registration and declaration order
	pub fn settings(&self) -> Vec<Arc<ValueDefinition>> {
		self.inner.read().groups.iter().flat_map(|g| g.settings().iter().cloned()).collect()
	}

	/// Reference settings pointing into the given entity model
	pub fn references_to(&self, model: &str) -> Vec<Arc<ValueDefinition>> {
		self.settings().into_iter().filter(|s| s.kind().model() == Some(model)).collect()
	}

	/// Get number of registered settings
	pub fn len(&self) -> usize {
		self.inner.read().settings.len()
	}

	/// Check if registry is empty
	pub fn is_empty(&self) -> bool {
		self.inner.read().settings.is_empty()
	}

	/// Unregister every group
	pub fn clear(&self) {
		let mut inner = self.inner.write();
		inner.groups.clear();
		inner.settings.clear();
	}
}

impl std::fmt::Debug for SettingsRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let inner = self.inner.read();
		f.debug_struct("SettingsRegistry")
			.field("group_count", &inner.groups.len())
			.field("setting_count", &inner.settings.len())
			.finish()
	}
}


// vim: ts=4

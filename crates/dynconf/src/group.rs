//! Settings groups
//!
//! A group is an ordered collection of setting definitions declared
//! together and registered or unregistered as a unit. Declaration order is
//! kept, the form surface renders fields in it.

use std::sync::Arc;

use crate::definition::ValueDefinition;
use crate::prelude::*;

#[derive(Debug)]
pub struct SettingsGroup {
	name: Box<str>,
	verbose_name: Box<str>,
	settings: Vec<Arc<ValueDefinition>>,
}

impl SettingsGroup {
	pub fn builder(name: impl Into<Box<str>>) -> SettingsGroupBuilder {
		SettingsGroupBuilder::new(name)
	}

	/// Group identity
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn verbose_name(&self) -> &str {
		&self.verbose_name
	}

	/// Settings in declaration order
	pub fn settings(&self) -> &[Arc<ValueDefinition>] {
		&self.settings
	}

	pub fn get(&self, name: &str) -> Option<&Arc<ValueDefinition>> {
		self.settings.iter().find(|s| s.name() == name)
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.settings.iter().map(|s| s.name())
	}

	pub fn len(&self) -> usize {
		self.settings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.settings.is_empty()
	}
}

pub struct SettingsGroupBuilder {
	name: Box<str>,
	verbose_name: Option<Box<str>>,
	invalid_options: Vec<Box<str>>,
	settings: Vec<ValueDefinition>,
}

impl SettingsGroupBuilder {
	fn new(name: impl Into<Box<str>>) -> Self {
		Self { name: name.into(), verbose_name: None, invalid_options: Vec::new(), settings: Vec::new() }
	}

	/// Display name (defaults to the humanized group name)
	pub fn verbose_name(mut self, verbose_name: impl Into<Box<str>>) -> Self {
		self.verbose_name = Some(verbose_name.into());
		self
	}

	/// Set a meta option by name. Only `verbose_name` is recognized,
	/// anything else fails at `build()`.
	pub fn meta(mut self, option: &str, value: impl Into<Box<str>>) -> Self {
		match option {
			"verbose_name" => self.verbose_name = Some(value.into()),
			_ => self.invalid_options.push(option.into()),
		}
		self
	}

	/// Append a setting
	pub fn setting(mut self, setting: ValueDefinition) -> Self {
		self.settings.push(setting);
		self
	}

	pub fn settings(mut self, settings: impl IntoIterator<Item = ValueDefinition>) -> Self {
		self.settings.extend(settings);
		self
	}

	pub fn build(self) -> DcResult<SettingsGroup> {
		if !self.invalid_options.is_empty() {
			return Err(Error::InvalidMetaOption {
				group: self.name,
				option: self.invalid_options.join(",").into(),
			});
		}

		let mut settings: Vec<Arc<ValueDefinition>> = Vec::with_capacity(self.settings.len());
		for mut setting in self.settings {
			if settings.iter().any(|s| s.name() == setting.name()) {
				return Err(Error::SettingAlreadyRegistered(setting.name().into()));
			}
			setting.set_group(&self.name);
			settings.push(Arc::new(setting));
		}

		Ok(SettingsGroup {
			verbose_name: self.verbose_name.unwrap_or_else(|| camel_case_to_spaces(&self.name).into()),
			name: self.name,
			settings,
		})
	}
}

/// `TestStringSettings` -> `test string settings`, `HTTPSettings` -> `http settings`
pub fn camel_case_to_spaces(name: &str) -> String {
	let chars: Vec<char> = name.chars().collect();
	let mut out = String::with_capacity(name.len() + 4);
	for (i, c) in chars.iter().enumerate() {
		if c.is_uppercase() {
			let after_lower = i > 0 && chars[i - 1].is_lowercase();
			let before_lower = chars.get(i + 1).is_some_and(|next| !next.is_uppercase());
			if after_lower || before_lower {
				out.push(' ');
			}
		}
		out.extend(c.to_lowercase());
	}
	out.trim().to_string()
}


// vim: ts=4

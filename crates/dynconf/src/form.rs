//! Form surface
//!
//! Describes the registered settings as fieldsets for rendering and applies
//! submitted raw values. A submission is validated as a whole: when any
//! field fails, nothing is written and the errors are reported per field.

use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::definition::ValueDefinition;
use crate::kind::{Constraints, ValueKind, Widget};
use crate::prelude::*;
use crate::service::Settings;
use crate::value::SettingValue;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
	pub name: Box<str>,
	pub verbose_name: Box<str>,
	pub help_text: Box<str>,
	pub kind: &'static str,
	pub widget: Widget,
	pub required: bool,
	pub constraints: Constraints,
	pub default: SettingValue,
	/// Current value
	pub initial: SettingValue,
}

impl FormField {
	fn new(value: &ValueDefinition, initial: SettingValue) -> Self {
		Self {
			name: value.name().into(),
			verbose_name: value.verbose_name().into(),
			help_text: value.help_text().into(),
			kind: value.kind().name(),
			widget: value.widget(),
			required: value.required(),
			constraints: value.constraints(),
			default: value.default(),
			initial,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fieldset {
	pub name: Box<str>,
	pub verbose_name: Box<str>,
	pub fields: Vec<FormField>,
}

/// All registered groups as fieldsets, in registration order
#[derive(Debug, Clone, Serialize)]
pub struct SettingsForm {
	pub fieldsets: Vec<Fieldset>,
}

impl SettingsForm {
	pub fn field(&self, name: &str) -> Option<&FormField> {
		self.fieldsets.iter().flat_map(|fs| fs.fields.iter()).find(|f| &*f.name == name)
	}

	pub fn fields(&self) -> impl Iterator<Item = &FormField> {
		self.fieldsets.iter().flat_map(|fs| fs.fields.iter())
	}
}

/// Per-field validation errors of a rejected submission, in field order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors {
	errors: Vec<(Box<str>, ValidationError)>,
}

impl FormErrors {
	pub fn add(&mut self, name: &str, error: ValidationError) {
		self.errors.push((name.into(), error));
	}

	pub fn get(&self, name: &str) -> Option<&ValidationError> {
		self.errors.iter().find(|(n, _)| &**n == name).map(|(_, e)| e)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationError)> {
		self.errors.iter().map(|(n, e)| (&**n, e))
	}

	pub fn len(&self) -> usize {
		self.errors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.errors.is_empty()
	}

	/// `{ "<name>": [{ "code": .., "message": .. }] }`
	pub fn to_json(&self) -> serde_json::Value {
		let map: serde_json::Map<String, serde_json::Value> = self
			.errors
			.iter()
			.map(|(name, error)| {
				(name.to_string(), json!([{ "code": error.code(), "message": error.to_string() }]))
			})
			.collect();
		serde_json::Value::Object(map)
	}
}

impl fmt::Display for FormErrors {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for (i, (name, error)) in self.errors.iter().enumerate() {
			if i > 0 {
				write!(f, "; ")?;
			}
			write!(f, "{}: {}", name, error)?;
		}
		Ok(())
	}
}

impl std::error::Error for FormErrors {}

impl Settings {
	/// Describe every registered setting with its current value
	pub async fn form(&self) -> DcResult<SettingsForm> {
		let mut fieldsets = Vec::new();
		for group in self.registry().groups() {
			let mut fields = Vec::with_capacity(group.len());
			for value in group.settings() {
				let initial = self.bind(Arc::clone(value)).get().await?;
				fields.push(FormField::new(value, initial));
			}
			fieldsets.push(Fieldset {
				name: group.name().into(),
				verbose_name: group.verbose_name().into(),
				fields,
			});
		}
		Ok(SettingsForm { fieldsets })
	}

	/// Apply submitted raw values.
	///
	/// A missing boolean field counts as unchecked, other missing fields are
	/// left alone. Returns the number of changed settings, or the field
	/// errors if anything failed validation.
	pub async fn submit(
		&self,
		data: &HashMap<String, String>,
	) -> DcResult<Result<usize, FormErrors>> {
		let mut cleaned = Vec::new();
		let mut errors = FormErrors::default();

		for group in self.registry().groups() {
			for value in group.settings() {
				let input = match (data.get(value.name()), value.kind()) {
					(Some(raw), _) => SettingValue::String(raw.as_str().into()),
					(None, ValueKind::Boolean) => SettingValue::Bool(false),
					(None, _) => continue,
				};

				let descriptor = self.bind(Arc::clone(value));
				match descriptor.clean(input).await {
					Ok(value) => cleaned.push((descriptor, value)),
					Err(Error::InvalidSettingValue { name, error }) => errors.add(&name, error),
					Err(err) => return Err(err),
				}
			}
		}

		if !errors.is_empty() {
			info!("Settings form rejected: {}", errors);
			return Ok(Err(errors));
		}

		let mut changed = 0;
		for (descriptor, value) in cleaned {
			if descriptor.set(value).await? {
				changed += 1;
			}
		}
		Ok(Ok(changed))
	}
}

// vim: ts=4

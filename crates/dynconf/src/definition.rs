//! Setting definitions and their builders
//!
//! A definition is the schema of one setting: its kind and constraints,
//! its validated default and display metadata. Definitions are built once
//! at declaration time and shared through `Arc`s afterwards.

use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dynconf_types::entity_set::EntitySet;
use dynconf_types::types::is_valid_setting_name;

use crate::kind::{Constraints, ValueKind, Widget};
use crate::prelude::*;
use crate::value::SettingValue;

/// Custom check run on cleaned, non-empty values after the kind constraints
pub type SettingValidator =
	Box<dyn Fn(&SettingValue) -> Result<(), ValidationError> + Send + Sync>;

pub struct ValueDefinition {
	name: Box<str>,
	kind: ValueKind,
	default: SettingValue,
	/// Set when a referenced default entity is deleted
	default_cleared: AtomicBool,
	required: bool,
	verbose_name: Box<str>,
	help_text: Box<str>,
	widget: Widget,
	validators: Vec<SettingValidator>,
	group: Option<Box<str>>,
}

impl std::fmt::Debug for ValueDefinition {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ValueDefinition")
			.field("name", &self.name)
			.field("kind", &self.kind.name())
			.field("default", &self.default())
			.field("required", &self.required)
			.field("validators", &self.validators.len())
			.field("group", &self.group)
			.finish_non_exhaustive()
	}
}

impl ValueDefinition {
	pub fn boolean(name: impl Into<Box<str>>) -> ValueDefinitionBuilder {
		ValueDefinitionBuilder::new(name, ValueKind::Boolean)
	}

	pub fn string(name: impl Into<Box<str>>) -> ValueDefinitionBuilder {
		ValueDefinitionBuilder::new(name, ValueKind::string())
	}

	pub fn integer(name: impl Into<Box<str>>) -> ValueDefinitionBuilder {
		ValueDefinitionBuilder::new(name, ValueKind::integer())
	}

	pub fn float(name: impl Into<Box<str>>) -> ValueDefinitionBuilder {
		ValueDefinitionBuilder::new(name, ValueKind::float())
	}

	pub fn decimal(name: impl Into<Box<str>>) -> ValueDefinitionBuilder {
		ValueDefinitionBuilder::new(name, ValueKind::decimal())
	}

	/// A setting holding the primary key of an entity from `entities`
	pub fn reference(
		name: impl Into<Box<str>>,
		entities: Arc<dyn EntitySet>,
	) -> ValueDefinitionBuilder {
		ValueDefinitionBuilder::new(name, ValueKind::reference(entities))
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn kind(&self) -> &ValueKind {
		&self.kind
	}

	pub fn required(&self) -> bool {
		self.required
	}

	pub fn verbose_name(&self) -> &str {
		&self.verbose_name
	}

	pub fn help_text(&self) -> &str {
		&self.help_text
	}

	pub fn widget(&self) -> Widget {
		self.widget
	}

	pub fn constraints(&self) -> Constraints {
		self.kind.constraints()
	}

	/// Name of the owning group, once the definition is part of one
	pub fn group(&self) -> Option<&str> {
		self.group.as_deref()
	}

	pub(crate) fn set_group(&mut self, group: &str) {
		self.group = Some(group.into());
	}

	/// The declared default, or `Empty` once a referenced default entity
	/// has been deleted
	pub fn default(&self) -> SettingValue {
		if self.default_cleared.load(Ordering::Acquire) {
			SettingValue::Empty
		} else {
			self.default.clone()
		}
	}

	pub(crate) fn clear_default(&self) {
		if !self.default_cleared.swap(true, Ordering::AcqRel) {
			warn!("Default of setting '{}' cleared", self.name);
		}
	}

	/// Coerce and validate a value. Reference membership is checked by the
	/// descriptor, which can reach the entity set.
	pub fn clean(&self, value: impl Into<SettingValue>) -> Result<SettingValue, ValidationError> {
		let value = self.kind.coerce(value.into())?;
		if self.required && value.is_empty() {
			return Err(ValidationError::Required);
		}
		self.kind.check_constraints(&value)?;
		self.run_validators(&value)?;
		Ok(value)
	}

	/// Like `clean`, but `min_length` does not apply: a short placeholder
	/// default stays valid until the first edit.
	fn clean_default(&self, value: SettingValue) -> Result<SettingValue, ValidationError> {
		let value = self.kind.coerce(value)?;
		if self.required && value.is_empty() {
			return Err(ValidationError::Required);
		}
		match &self.kind {
			ValueKind::String { max_length, .. } => {
				ValueKind::String { min_length: None, max_length: *max_length }.check_constraints(&value)?;
			}
			kind => kind.check_constraints(&value)?,
		}
		self.run_validators(&value)?;
		Ok(value)
	}

	fn run_validators(&self, value: &SettingValue) -> Result<(), ValidationError> {
		if value.is_empty() {
			return Ok(());
		}
		self.validators.iter().try_for_each(|validator| validator(value))
	}

	/// Validate a canonical value against required and the constraints
	pub fn validate(&self, value: &SettingValue) -> Result<(), ValidationError> {
		if self.required && value.is_empty() {
			return Err(ValidationError::Required);
		}
		self.kind.check_constraints(value)?;
		self.run_validators(value)
	}

	pub fn to_storage(&self, value: &SettingValue) -> String {
		self.kind.encode(value)
	}

	/// Decode a raw stored value (references are not resolved here)
	pub fn decode(&self, raw: &str) -> Result<SettingValue, ValidationError> {
		self.kind.decode(raw)
	}
}

/// Builder for ValueDefinition with fluent API
pub struct ValueDefinitionBuilder {
	name: Box<str>,
	kind: ValueKind,
	default: Option<SettingValue>,
	required: bool,
	verbose_name: Option<Box<str>>,
	help_text: Box<str>,
	widget: Option<Widget>,
	validators: Vec<SettingValidator>,
	misused: Option<&'static str>,
}

impl ValueDefinitionBuilder {
	fn new(name: impl Into<Box<str>>, kind: ValueKind) -> Self {
		Self {
			name: name.into(),
			kind,
			default: None,
			required: true,
			verbose_name: None,
			help_text: "".into(),
			widget: None,
			validators: Vec::new(),
			misused: None,
		}
	}

	fn misuse(&mut self, option: &'static str) {
		self.misused.get_or_insert(option);
	}

	/// Set the default value (required)
	pub fn default(mut self, value: impl Into<SettingValue>) -> Self {
		self.default = Some(value.into());
		self
	}

	/// Whether empty values are rejected (defaults to true)
	pub fn required(mut self, required: bool) -> Self {
		self.required = required;
		self
	}

	pub fn verbose_name(mut self, verbose_name: impl Into<Box<str>>) -> Self {
		self.verbose_name = Some(verbose_name.into());
		self
	}

	pub fn help_text(mut self, help_text: impl Into<Box<str>>) -> Self {
		self.help_text = help_text.into();
		self
	}

	pub fn widget(mut self, widget: Widget) -> Self {
		self.widget = Some(widget);
		self
	}

	/// Add a validation function, run in declaration order
	pub fn validator<F>(mut self, f: F) -> Self
	where
		F: Fn(&SettingValue) -> Result<(), ValidationError> + Send + Sync + 'static,
	{
		self.validators.push(Box::new(f));
		self
	}

	pub fn min_length(mut self, min: usize) -> Self {
		match &mut self.kind {
			ValueKind::String { min_length, .. } => *min_length = Some(min),
			_ => self.misuse("min_length"),
		}
		self
	}

	pub fn max_length(mut self, max: usize) -> Self {
		match &mut self.kind {
			ValueKind::String { max_length, .. } => *max_length = Some(max),
			_ => self.misuse("max_length"),
		}
		self
	}

	pub fn min_value(mut self, min: impl Into<SettingValue>) -> Self {
		if !set_bound(&mut self.kind, min.into(), Bound::Min) {
			self.misuse("min_value");
		}
		self
	}

	pub fn max_value(mut self, max: impl Into<SettingValue>) -> Self {
		if !set_bound(&mut self.kind, max.into(), Bound::Max) {
			self.misuse("max_value");
		}
		self
	}

	pub fn max_digits(mut self, digits: u32) -> Self {
		match &mut self.kind {
			ValueKind::Decimal { max_digits, .. } => *max_digits = Some(digits),
			_ => self.misuse("max_digits"),
		}
		self
	}

	pub fn decimal_places(mut self, places: u32) -> Self {
		match &mut self.kind {
			ValueKind::Decimal { decimal_places, .. } => *decimal_places = Some(places),
			_ => self.misuse("decimal_places"),
		}
		self
	}

	/// Build the ValueDefinition, validating the default eagerly
	pub fn build(self) -> DcResult<ValueDefinition> {
		if !is_valid_setting_name(&self.name) {
			return Err(Error::InvalidSettingName(self.name));
		}
		if let Some(option) = self.misused {
			return Err(Error::ConfigError(format!(
				"Option '{}' does not apply to {} setting '{}'",
				option,
				self.kind.name(),
				self.name
			)));
		}

		// Booleans are always optional, references always admit empty
		let required = match self.kind {
			ValueKind::Boolean | ValueKind::Reference { .. } => false,
			_ => self.required,
		};

		let Some(default) = self.default else {
			return Err(Error::DefaultSettingValueRequired(self.name));
		};

		let mut def = ValueDefinition {
			verbose_name: self.verbose_name.unwrap_or_else(|| pretty_name(&self.name).into()),
			widget: self.widget.unwrap_or_else(|| self.kind.default_widget()),
			name: self.name,
			kind: self.kind,
			default: SettingValue::Empty,
			default_cleared: AtomicBool::new(false),
			required,
			help_text: self.help_text,
			validators: self.validators,
			group: None,
		};

		def.default = def
			.clean_default(default)
			.map_err(|error| Error::InvalidDefaultSettingValue { name: def.name.clone(), error })?;

		debug!("Declared {} setting: {}", def.kind.name(), def.name);
		Ok(def)
	}
}

enum Bound {
	Min,
	Max,
}

#[allow(clippy::cast_precision_loss)]
fn set_bound(kind: &mut ValueKind, value: SettingValue, bound: Bound) -> bool {
	match (kind, value) {
		(ValueKind::Integer { min_value, max_value }, SettingValue::Int(i)) => {
			match bound {
				Bound::Min => *min_value = Some(i),
				Bound::Max => *max_value = Some(i),
			}
			true
		}
		(ValueKind::Float { min_value, max_value }, value @ (SettingValue::Int(_) | SettingValue::Float(_))) => {
			let f = match value {
				SettingValue::Int(i) => i as f64,
				SettingValue::Float(f) => f,
				_ => return false,
			};
			match bound {
				Bound::Min => *min_value = Some(f),
				Bound::Max => *max_value = Some(f),
			}
			true
		}
		(ValueKind::Decimal { min_value, max_value, .. }, value @ (SettingValue::Int(_) | SettingValue::Decimal(_))) => {
			let d = match value {
				SettingValue::Int(i) => Decimal::from(i),
				SettingValue::Decimal(d) => d,
				_ => return false,
			};
			match bound {
				Bound::Min => *min_value = Some(d),
				Bound::Max => *max_value = Some(d),
			}
			true
		}
		_ => false,
	}
}

/// Form label from a setting name: `site_title` -> `Site title`
fn pretty_name(name: &str) -> String {
	let spaced = name.replace('_', " ");
	let mut chars = spaced.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}


// vim: ts=4

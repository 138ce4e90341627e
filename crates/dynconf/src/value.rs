//! Typed setting values

use rust_decimal::Decimal;
use serde::Serialize;

/// A decoded setting value.
///
/// `Empty` is the "no value" sentinel shared by every kind. It is stored as
/// an empty string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)] // No type tag - the kind comes from the ValueDefinition
pub enum SettingValue {
	Empty,
	Bool(bool),
	String(Box<str>),
	Int(i64),
	Decimal(#[serde(with = "rust_decimal::serde::str")] Decimal),
	Float(f64),
	/// Primary key of an external entity
	Reference(Box<str>),
}

impl SettingValue {
	/// Build a reference to an external entity by primary key
	pub fn reference(pk: impl Into<Box<str>>) -> Self {
		SettingValue::Reference(pk.into())
	}

	/// Get the type name for error messages
	pub fn type_name(&self) -> &'static str {
		match self {
			SettingValue::Empty => "empty",
			SettingValue::Bool(_) => "boolean",
			SettingValue::String(_) => "string",
			SettingValue::Int(_) => "integer",
			SettingValue::Decimal(_) => "decimal",
			SettingValue::Float(_) => "float",
			SettingValue::Reference(_) => "reference",
		}
	}

	/// Empty values skip constraint validation and fail `required`
	pub fn is_empty(&self) -> bool {
		match self {
			SettingValue::Empty => true,
			SettingValue::String(s) | SettingValue::Reference(s) => s.is_empty(),
			_ => false,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			SettingValue::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			SettingValue::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			SettingValue::Int(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_float(&self) -> Option<f64> {
		match self {
			SettingValue::Float(f) => Some(*f),
			_ => None,
		}
	}

	pub fn as_decimal(&self) -> Option<Decimal> {
		match self {
			SettingValue::Decimal(d) => Some(*d),
			_ => None,
		}
	}

	pub fn as_reference(&self) -> Option<&str> {
		match self {
			SettingValue::Reference(pk) => Some(pk),
			_ => None,
		}
	}
}

impl std::fmt::Display for SettingValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			SettingValue::Empty => Ok(()),
			SettingValue::Bool(true) => write!(f, "True"),
			SettingValue::Bool(false) => write!(f, "False"),
			SettingValue::String(s) | SettingValue::Reference(s) => write!(f, "{}", s),
			SettingValue::Int(i) => write!(f, "{}", i),
			SettingValue::Decimal(d) => write!(f, "{}", d),
			SettingValue::Float(v) => write!(f, "{}", v),
		}
	}
}

impl From<bool> for SettingValue {
	fn from(value: bool) -> Self {
		SettingValue::Bool(value)
	}
}

impl From<&str> for SettingValue {
	fn from(value: &str) -> Self {
		SettingValue::String(value.into())
	}
}

impl From<String> for SettingValue {
	fn from(value: String) -> Self {
		SettingValue::String(value.into())
	}
}

impl From<i64> for SettingValue {
	fn from(value: i64) -> Self {
		SettingValue::Int(value)
	}
}

impl From<i32> for SettingValue {
	fn from(value: i32) -> Self {
		SettingValue::Int(i64::from(value))
	}
}

impl From<f64> for SettingValue {
	fn from(value: f64) -> Self {
		SettingValue::Float(value)
	}
}

impl From<Decimal> for SettingValue {
	fn from(value: Decimal) -> Self {
		SettingValue::Decimal(value)
	}
}

impl<T: Into<SettingValue>> From<Option<T>> for SettingValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(SettingValue::Empty, Into::into)
	}
}


// vim: ts=4

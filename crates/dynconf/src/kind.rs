//! Value kinds: coercion, constraint checks and the storage encoding
//!
//! Coercion turns loosely typed input (form strings, numbers of another
//! kind) into the canonical value of a kind. Constraint checks run on
//! canonical values only and skip empty values.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

use dynconf_types::entity_set::EntitySet;
use dynconf_types::error::ValidationError;

use crate::value::SettingValue;

/// Largest scale a `Decimal` can hold
const MAX_DECIMAL_SCALE: u32 = 28;

/// Display hint for form rendering, no behavioral effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Widget {
	Checkbox,
	Text,
	Textarea,
	Number,
	Select,
}

#[derive(Debug, Clone)]
pub enum ValueKind {
	Boolean,
	String {
		min_length: Option<usize>,
		max_length: Option<usize>,
	},
	Integer {
		min_value: Option<i64>,
		max_value: Option<i64>,
	},
	Float {
		min_value: Option<f64>,
		max_value: Option<f64>,
	},
	Decimal {
		min_value: Option<Decimal>,
		max_value: Option<Decimal>,
		max_digits: Option<u32>,
		decimal_places: Option<u32>,
	},
	Reference {
		entities: Arc<dyn EntitySet>,
	},
}

/// Declared constraints of a kind, flattened for the form surface
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Constraints {
	#[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
	pub min_length: Option<usize>,
	#[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
	pub max_length: Option<usize>,
	#[serde(rename = "minValue", skip_serializing_if = "Option::is_none")]
	pub min_value: Option<String>,
	#[serde(rename = "maxValue", skip_serializing_if = "Option::is_none")]
	pub max_value: Option<String>,
	#[serde(rename = "maxDigits", skip_serializing_if = "Option::is_none")]
	pub max_digits: Option<u32>,
	#[serde(rename = "decimalPlaces", skip_serializing_if = "Option::is_none")]
	pub decimal_places: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub model: Option<String>,
}

impl ValueKind {
	pub fn string() -> Self {
		ValueKind::String { min_length: None, max_length: None }
	}

	pub fn integer() -> Self {
		ValueKind::Integer { min_value: None, max_value: None }
	}

	pub fn float() -> Self {
		ValueKind::Float { min_value: None, max_value: None }
	}

	pub fn decimal() -> Self {
		ValueKind::Decimal { min_value: None, max_value: None, max_digits: None, decimal_places: None }
	}

	pub fn reference(entities: Arc<dyn EntitySet>) -> Self {
		ValueKind::Reference { entities }
	}

	pub fn name(&self) -> &'static str {
		match self {
			ValueKind::Boolean => "boolean",
			ValueKind::String { .. } => "string",
			ValueKind::Integer { .. } => "integer",
			ValueKind::Float { .. } => "float",
			ValueKind::Decimal { .. } => "decimal",
			ValueKind::Reference { .. } => "reference",
		}
	}

	pub fn default_widget(&self) -> Widget {
		match self {
			ValueKind::Boolean => Widget::Checkbox,
			ValueKind::String { .. } => Widget::Textarea,
			ValueKind::Integer { .. } | ValueKind::Float { .. } | ValueKind::Decimal { .. } => {
				Widget::Number
			}
			ValueKind::Reference { .. } => Widget::Select,
		}
	}

	/// Entity model name of a Reference kind
	pub fn model(&self) -> Option<&str> {
		match self {
			ValueKind::Reference { entities } => Some(entities.model()),
			_ => None,
		}
	}

	pub fn constraints(&self) -> Constraints {
		match self {
			ValueKind::Boolean => Constraints::default(),
			ValueKind::String { min_length, max_length } => Constraints {
				min_length: *min_length,
				max_length: *max_length,
				..Constraints::default()
			},
			ValueKind::Integer { min_value, max_value } => Constraints {
				min_value: min_value.map(|v| v.to_string()),
				max_value: max_value.map(|v| v.to_string()),
				..Constraints::default()
			},
			ValueKind::Float { min_value, max_value } => Constraints {
				min_value: min_value.map(|v| v.to_string()),
				max_value: max_value.map(|v| v.to_string()),
				..Constraints::default()
			},
			ValueKind::Decimal { min_value, max_value, max_digits, decimal_places } => Constraints {
				min_value: min_value.map(|v| v.to_string()),
				max_value: max_value.map(|v| v.to_string()),
				max_digits: *max_digits,
				decimal_places: *decimal_places,
				..Constraints::default()
			},
			ValueKind::Reference { entities } => {
				Constraints { model: Some(entities.model().to_string()), ..Constraints::default() }
			}
		}
	}

	/// Convert loosely typed input into the canonical value of this kind
	pub fn coerce(&self, value: SettingValue) -> Result<SettingValue, ValidationError> {
		match self {
			ValueKind::Boolean => coerce_bool(value),
			ValueKind::String { .. } => coerce_string(value),
			ValueKind::Integer { .. } => coerce_int(value),
			ValueKind::Float { .. } => coerce_float(value),
			ValueKind::Decimal { max_digits, decimal_places, .. } => {
				coerce_decimal(value, *max_digits, *decimal_places)
			}
			ValueKind::Reference { .. } => coerce_reference(value),
		}
	}

	/// Check the declared constraints on a canonical value
	pub fn check_constraints(&self, value: &SettingValue) -> Result<(), ValidationError> {
		if value.is_empty() {
			return Ok(());
		}

		match (self, value) {
			(ValueKind::String { min_length, max_length }, SettingValue::String(s)) => {
				let len = s.chars().count();
				if let Some(max) = max_length
					&& len > *max
				{
					return Err(ValidationError::MaxLength { max: *max, got: len });
				}
				if let Some(min) = min_length
					&& len < *min
				{
					return Err(ValidationError::MinLength { min: *min, got: len });
				}
				Ok(())
			}
			(ValueKind::Integer { min_value, max_value }, SettingValue::Int(i)) => {
				check_range(*i, *min_value, *max_value)
			}
			(ValueKind::Float { min_value, max_value }, SettingValue::Float(f)) => {
				check_range(*f, *min_value, *max_value)
			}
			(
				ValueKind::Decimal { min_value, max_value, max_digits, decimal_places },
				SettingValue::Decimal(d),
			) => {
				check_range(*d, *min_value, *max_value)?;
				check_digits(*d, *max_digits, *decimal_places)
			}
			(ValueKind::Boolean, SettingValue::Bool(_))
			| (ValueKind::Reference { .. }, SettingValue::Reference(_)) => Ok(()),
			(kind, value) => Err(ValidationError::InvalidType {
				expected: kind.name(),
				got: value.type_name(),
			}),
		}
	}

	/// Storage encoding: empty string for empty values
	pub fn encode(&self, value: &SettingValue) -> String {
		if value.is_empty() {
			return String::new();
		}
		value.to_string()
	}

	/// Decode a stored raw value. References come back unresolved.
	pub fn decode(&self, raw: &str) -> Result<SettingValue, ValidationError> {
		self.coerce(SettingValue::String(raw.into()))
	}
}

fn coerce_bool(value: SettingValue) -> Result<SettingValue, ValidationError> {
	let b = match value {
		SettingValue::Empty => false,
		SettingValue::Bool(b) => b,
		SettingValue::String(s) => {
			!(s.is_empty() || s.eq_ignore_ascii_case("false") || &*s == "0")
		}
		SettingValue::Int(i) => i != 0,
		SettingValue::Float(f) => f != 0.0,
		SettingValue::Decimal(d) => !d.is_zero(),
		SettingValue::Reference(_) => {
			return Err(ValidationError::InvalidType { expected: "boolean", got: "reference" });
		}
	};
	Ok(SettingValue::Bool(b))
}

fn coerce_string(value: SettingValue) -> Result<SettingValue, ValidationError> {
	match value {
		SettingValue::Empty => Ok(SettingValue::String("".into())),
		SettingValue::String(s) => Ok(SettingValue::String(s.trim().into())),
		SettingValue::Reference(_) => {
			Err(ValidationError::InvalidType { expected: "string", got: "reference" })
		}
		other => Ok(SettingValue::String(other.to_string().into())),
	}
}

/// Range error for a whole number that does not fit an i64
fn int_overflow(negative: bool) -> ValidationError {
	if negative {
		ValidationError::MinValue { min: i64::MIN.to_string() }
	} else {
		ValidationError::MaxValue { max: i64::MAX.to_string() }
	}
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn whole_float(f: f64) -> Result<SettingValue, ValidationError> {
	if !f.is_finite() {
		return Err(ValidationError::NotANumber);
	}
	if f.fract() != 0.0 {
		return Err(ValidationError::NotAWholeNumber);
	}
	if f < i64::MIN as f64 || f >= i64::MAX as f64 {
		return Err(int_overflow(f < 0.0));
	}
	Ok(SettingValue::Int(f as i64))
}

fn coerce_int(value: SettingValue) -> Result<SettingValue, ValidationError> {
	match value {
		SettingValue::Empty => Ok(SettingValue::Empty),
		SettingValue::Int(i) => Ok(SettingValue::Int(i)),
		SettingValue::Bool(b) => Ok(SettingValue::Int(i64::from(b))),
		SettingValue::Float(f) => whole_float(f),
		SettingValue::Decimal(d) => {
			if !d.fract().is_zero() {
				return Err(ValidationError::NotAWholeNumber);
			}
			d.to_i64().map(SettingValue::Int).ok_or_else(|| int_overflow(d.is_sign_negative()))
		}
		SettingValue::String(s) => {
			let s = s.trim();
			if s.is_empty() {
				return Ok(SettingValue::Empty);
			}
			if let Ok(i) = s.parse::<i64>() {
				return Ok(SettingValue::Int(i));
			}
			// Whole numbers are written out, never in exponent notation
			if s.contains(['e', 'E']) && s.parse::<f64>().is_ok() {
				return Err(ValidationError::NotAWholeNumber);
			}
			match Decimal::from_str(s).ok() {
				Some(d) => coerce_int(SettingValue::Decimal(d)),
				None => match s.parse::<f64>() {
					Ok(f) => whole_float(f),
					Err(_) => Err(ValidationError::NotANumber),
				},
			}
		}
		SettingValue::Reference(_) => {
			Err(ValidationError::InvalidType { expected: "integer", got: "reference" })
		}
	}
}

#[allow(clippy::cast_precision_loss)]
fn coerce_float(value: SettingValue) -> Result<SettingValue, ValidationError> {
	let f = match value {
		SettingValue::Empty => return Ok(SettingValue::Empty),
		SettingValue::Float(f) => f,
		SettingValue::Int(i) => i as f64,
		SettingValue::Bool(b) => f64::from(u8::from(b)),
		SettingValue::Decimal(d) => d.to_f64().ok_or(ValidationError::NotANumber)?,
		SettingValue::String(s) => {
			let s = s.trim();
			if s.is_empty() {
				return Ok(SettingValue::Empty);
			}
			s.parse::<f64>().map_err(|_| ValidationError::NotANumber)?
		}
		SettingValue::Reference(_) => {
			return Err(ValidationError::InvalidType { expected: "float", got: "reference" });
		}
	};
	if !f.is_finite() {
		return Err(ValidationError::NotANumber);
	}
	Ok(SettingValue::Float(f))
}

fn parse_decimal(s: &str) -> Option<Decimal> {
	Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s)).ok()
}

/// Total digits and decimal places of a decimal literal as written, before
/// any rounding to the representable precision. `None` if not a literal.
fn literal_digit_counts(s: &str) -> Option<(u32, u32)> {
	let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
	let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
		Some((mantissa, exp)) => (mantissa, exp.parse::<i64>().ok()?),
		None => (unsigned, 0),
	};
	let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
	if whole.is_empty() && fraction.is_empty() {
		return None;
	}
	if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
		return None;
	}

	let leading_zeros = whole.bytes().chain(fraction.bytes()).take_while(|b| *b == b'0').count();
	let significant = i64::try_from((whole.len() + fraction.len()).saturating_sub(leading_zeros))
		.ok()?
		.max(1);
	let exponent = exponent.saturating_sub(i64::try_from(fraction.len()).ok()?);

	let (digits, places) = if exponent >= 0 {
		(significant.saturating_add(exponent), 0)
	} else {
		let places = exponent.saturating_neg();
		(significant.max(places), places)
	};
	let clamp = |n: i64| u32::try_from(n).unwrap_or(u32::MAX);
	Some((clamp(digits), clamp(places)))
}

/// Parse a decimal literal without silent rounding.
///
/// Input beyond the declared digit limits fails with the digit errors.
/// Input that fits the declared limits but not the representable
/// precision fails with a range or decimal places error.
fn decimal_from_literal(
	s: &str,
	max_digits: Option<u32>,
	decimal_places: Option<u32>,
) -> Result<Decimal, ValidationError> {
	let (digits, places) = literal_digit_counts(s).ok_or(ValidationError::NotANumber)?;
	let parsed = parse_decimal(s);
	if let Some(d) = parsed
		&& digit_counts(d) == (digits, places)
	{
		return Ok(d);
	}

	check_digit_counts(digits, places, max_digits, decimal_places)?;
	match parsed {
		Some(_) if places > MAX_DECIMAL_SCALE => {
			Err(ValidationError::MaxDecimalPlaces { max: MAX_DECIMAL_SCALE })
		}
		Some(d) => Err(ValidationError::MaxDigits { max: digit_counts(d).0 }),
		None if digits - places <= MAX_DECIMAL_SCALE => Err(ValidationError::NotANumber),
		None if s.starts_with('-') => Err(ValidationError::MinValue { min: Decimal::MIN.to_string() }),
		None => Err(ValidationError::MaxValue { max: Decimal::MAX.to_string() }),
	}
}

fn coerce_decimal(
	value: SettingValue,
	max_digits: Option<u32>,
	decimal_places: Option<u32>,
) -> Result<SettingValue, ValidationError> {
	let d = match value {
		SettingValue::Empty => return Ok(SettingValue::Empty),
		SettingValue::Decimal(d) => d,
		SettingValue::Int(i) => Decimal::from(i),
		SettingValue::Bool(b) => Decimal::from(u8::from(b)),
		SettingValue::Float(f) => {
			if !f.is_finite() {
				return Err(ValidationError::NotANumber);
			}
			// Through the shortest decimal representation, not the binary value
			decimal_from_literal(&f.to_string(), max_digits, decimal_places)?
		}
		SettingValue::String(s) => {
			let s = s.trim();
			if s.is_empty() {
				return Ok(SettingValue::Empty);
			}
			decimal_from_literal(s, max_digits, decimal_places)?
		}
		SettingValue::Reference(_) => {
			return Err(ValidationError::InvalidType { expected: "decimal", got: "reference" });
		}
	};
	Ok(SettingValue::Decimal(d))
}

fn coerce_reference(value: SettingValue) -> Result<SettingValue, ValidationError> {
	match value {
		SettingValue::Empty => Ok(SettingValue::Empty),
		SettingValue::Reference(pk) | SettingValue::String(pk) => {
			let pk = pk.trim();
			if pk.is_empty() { Ok(SettingValue::Empty) } else { Ok(SettingValue::Reference(pk.into())) }
		}
		SettingValue::Int(i) => Ok(SettingValue::Reference(i.to_string().into())),
		other => Err(ValidationError::InvalidType { expected: "reference", got: other.type_name() }),
	}
}

fn check_range<T>(value: T, min: Option<T>, max: Option<T>) -> Result<(), ValidationError>
where
	T: PartialOrd + ToString + Copy,
{
	if let Some(max) = max
		&& value > max
	{
		return Err(ValidationError::MaxValue { max: max.to_string() });
	}
	if let Some(min) = min
		&& value < min
	{
		return Err(ValidationError::MinValue { min: min.to_string() });
	}
	Ok(())
}

/// Total digits and decimal places of a decimal, counted on its written form
fn digit_counts(d: Decimal) -> (u32, u32) {
	let mut mantissa = d.mantissa().unsigned_abs();
	let mut significant = 1;
	while mantissa >= 10 {
		mantissa /= 10;
		significant += 1;
	}
	let scale = d.scale();
	if scale > significant { (scale, scale) } else { (significant, scale) }
}

fn check_digits(
	d: Decimal,
	max_digits: Option<u32>,
	decimal_places: Option<u32>,
) -> Result<(), ValidationError> {
	let (digits, decimals) = digit_counts(d);
	check_digit_counts(digits, decimals, max_digits, decimal_places)
}

fn check_digit_counts(
	digits: u32,
	decimals: u32,
	max_digits: Option<u32>,
	decimal_places: Option<u32>,
) -> Result<(), ValidationError> {
	let whole_digits = digits - decimals;

	if let Some(max) = max_digits
		&& digits > max
	{
		return Err(ValidationError::MaxDigits { max });
	}
	if let Some(max) = decimal_places
		&& decimals > max
	{
		return Err(ValidationError::MaxDecimalPlaces { max });
	}
	if let (Some(max_digits), Some(decimal_places)) = (max_digits, decimal_places)
		&& whole_digits > max_digits.saturating_sub(decimal_places)
	{
		return Err(ValidationError::MaxWholeDigits { max: max_digits.saturating_sub(decimal_places) });
	}
	Ok(())
}


// vim: ts=4

//! Error types shared by the registry, the service and the adapters

use std::fmt;

pub type DcResult<T> = std::result::Result<T, Error>;

/// A single constraint violation of a setting value.
///
/// These are field-level errors: the form surface reports them per field,
/// the write path wraps them into [`Error::InvalidSettingValue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
	Required,
	MinLength { min: usize, got: usize },
	MaxLength { max: usize, got: usize },
	MinValue { min: String },
	MaxValue { max: String },
	NotAWholeNumber,
	NotANumber,
	MaxDigits { max: u32 },
	MaxDecimalPlaces { max: u32 },
	MaxWholeDigits { max: u32 },
	InvalidChoice { pk: String },
	InvalidType { expected: &'static str, got: &'static str },
	/// Raised by a custom validator of a setting
	Invalid { code: &'static str, message: String },
}

impl ValidationError {
	/// Short machine-readable code, stable across message changes
	pub fn code(&self) -> &'static str {
		match self {
			ValidationError::Required => "required",
			ValidationError::MinLength { .. } => "min_length",
			ValidationError::MaxLength { .. } => "max_length",
			ValidationError::MinValue { .. } => "min_value",
			ValidationError::MaxValue { .. } => "max_value",
			ValidationError::NotAWholeNumber => "invalid_integer",
			ValidationError::NotANumber => "invalid_number",
			ValidationError::MaxDigits { .. } => "max_digits",
			ValidationError::MaxDecimalPlaces { .. } => "max_decimal_places",
			ValidationError::MaxWholeDigits { .. } => "max_whole_digits",
			ValidationError::InvalidChoice { .. } => "invalid_choice",
			ValidationError::InvalidType { .. } => "invalid_type",
			ValidationError::Invalid { code, .. } => *code,
		}
	}
}

impl fmt::Display for ValidationError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			ValidationError::Required => write!(f, "This field is required."),
			ValidationError::MinLength { min, got } => write!(
				f,
				"Ensure this value has at least {} characters (it has {}).",
				min, got
			),
			ValidationError::MaxLength { max, got } => write!(
				f,
				"Ensure this value has at most {} characters (it has {}).",
				max, got
			),
			ValidationError::MinValue { min } => {
				write!(f, "Ensure this value is greater than or equal to {}.", min)
			}
			ValidationError::MaxValue { max } => {
				write!(f, "Ensure this value is less than or equal to {}.", max)
			}
			ValidationError::NotAWholeNumber => write!(f, "Enter a whole number."),
			ValidationError::NotANumber => write!(f, "Enter a number."),
			ValidationError::MaxDigits { max } => {
				write!(f, "Ensure that there are no more than {} digits in total.", max)
			}
			ValidationError::MaxDecimalPlaces { max } => {
				write!(f, "Ensure that there are no more than {} decimal places.", max)
			}
			ValidationError::MaxWholeDigits { max } => write!(
				f,
				"Ensure that there are no more than {} digits before the decimal point.",
				max
			),
			ValidationError::InvalidChoice { pk } => write!(
				f,
				"Select a valid choice. {} is not one of the available choices.",
				pk
			),
			ValidationError::InvalidType { expected, got } => {
				write!(f, "Expected a {} value, got {}.", expected, got)
			}
			ValidationError::Invalid { message, .. } => write!(f, "{}", message),
		}
	}
}

impl std::error::Error for ValidationError {}

#[derive(Debug)]
pub enum Error {
	SettingAlreadyRegistered(Box<str>),
	SettingNotRegistered(Box<str>),
	SettingsGroupAlreadyRegistered(Box<str>),
	SettingsGroupNotRegistered(Box<str>),
	InvalidSettingValue { name: Box<str>, error: ValidationError },
	InvalidDefaultSettingValue { name: Box<str>, error: ValidationError },
	DefaultSettingValueRequired(Box<str>),
	InvalidMetaOption { group: Box<str>, option: Box<str> },
	InvalidSettingName(Box<str>),
	TypeMismatch { name: Box<str>, expected: &'static str, got: &'static str },
	ConfigError(String),
	DbError,

	// externals
	Io(std::io::Error),
}

impl Error {
	/// The field-level error, if this is a validation failure
	pub fn validation_error(&self) -> Option<&ValidationError> {
		match self {
			Error::InvalidSettingValue { error, .. }
			| Error::InvalidDefaultSettingValue { error, .. } => Some(error),
			_ => None,
		}
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::SettingAlreadyRegistered(name) => {
				write!(f, "Setting \"{}\" is already registered", name)
			}
			Error::SettingNotRegistered(name) => write!(f, "Setting \"{}\" is not registered", name),
			Error::SettingsGroupAlreadyRegistered(group) => {
				write!(f, "Settings group \"{}\" is already registered", group)
			}
			Error::SettingsGroupNotRegistered(group) => {
				write!(f, "Settings group \"{}\" is not registered", group)
			}
			Error::InvalidSettingValue { name, error } => {
				write!(f, "Invalid value for setting \"{}\": {}", name, error)
			}
			Error::InvalidDefaultSettingValue { name, error } => {
				write!(f, "Invalid default value for setting \"{}\": {}", name, error)
			}
			Error::DefaultSettingValueRequired(name) => {
				write!(f, "Setting \"{}\" requires a default value", name)
			}
			Error::InvalidMetaOption { group, option } => {
				write!(f, "Settings group \"{}\" got invalid meta option: {}", group, option)
			}
			Error::InvalidSettingName(name) => write!(f, "Invalid setting name: \"{}\"", name),
			Error::TypeMismatch { name, expected, got } => write!(
				f,
				"Setting \"{}\" is not {}, got {}",
				name, expected, got
			),
			Error::ConfigError(msg) => write!(f, "config error: {}", msg),
			Error::DbError => write!(f, "database error"),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::InvalidSettingValue { error, .. }
			| Error::InvalidDefaultSettingValue { error, .. } => Some(error),
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}


// vim: ts=4

pub use crate::error::{DcResult, Error, ValidationError};
pub use crate::types::{SettingRow, Timestamp};

pub use tracing::{debug, error, info, warn};

// vim: ts=4

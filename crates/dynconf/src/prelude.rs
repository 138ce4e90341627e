pub use dynconf_types::error::{DcResult, Error, ValidationError};
pub use dynconf_types::types::{SettingRow, Timestamp};

pub use tracing::{debug, error, info, warn};

// vim: ts=4

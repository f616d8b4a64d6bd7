//! Constants used throughout the documentation engine.
//!
//! Values that must agree between the engine, the stores and the hosts live here so there is
//! exactly one place to change them.

use std::time::Duration;

/// Quiet interval after the last edit before an autosave fires.
pub const DEFAULT_AUTOSAVE_DEBOUNCE: Duration = Duration::from_secs(3);

/// Patients younger than this (in whole years) are treated as pediatric.
pub const PEDIATRIC_AGE_LIMIT: u32 = 18;

/// Default directory for draft storage when no explicit directory is configured.
pub const DEFAULT_RECORD_DATA_DIR: &str = "record_data";

/// Completion value written into stored progress when a record is finalized.
///
/// Informational only; the displayed percentage is always derived from the live visible set.
pub const FINALIZED_COMPLETION_MARKER: u8 = 100;

/// Internal name of the record-level finalization flag.
pub const IS_COMPLETE_FIELD: &str = "isComplete";

/// Persisted column of the record-level finalization flag.
pub const IS_COMPLETE_COLUMN: &str = "is_complete";

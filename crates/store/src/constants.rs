/// File holding a record's columns and workflow progress.
pub const DRAFT_FILENAME: &str = "draft.json";

/// File holding the investigations attached to a record.
pub const INVESTIGATIONS_FILENAME: &str = "investigations.yaml";

/// Suffix of the scratch file a draft is written to before it replaces the real one.
pub(crate) const TEMP_SUFFIX: &str = "tmp";

//! Record and entry identifiers.

use crate::{IdError, IdResult};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Identifier of a documentation draft (32 lowercase hex characters, no hyphens).
///
/// Once constructed the inner UUID is always rendered in canonical form, so the same
/// record always maps to the same storage location.
///
/// # Construction
/// - [`RecordId::new`] allocates a fresh identifier for a new encounter.
/// - [`RecordId::parse`] validates an identifier supplied from outside (CLI, HTTP path).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(Uuid);

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordId {
    /// Allocates a new random record identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an identifier that must already be canonical.
    ///
    /// Hyphenated or uppercase forms are rejected rather than normalised, so that two
    /// spellings of one id can never address two different drafts.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> IdResult<Self> {
        if !Self::is_canonical(input) {
            return Err(IdError::InvalidInput(format!(
                "record id must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| IdError::InvalidInput(format!("invalid record id '{}': {}", input, e)))
    }

    /// Returns the underlying UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is exactly 32 characters of `0-9a-f`.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns `parent_dir/<s1>/<s2>/<id>/` where `s1`/`s2` are the first two pairs of hex
    /// characters of this id.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A time-prefixed identifier for entries attached to a record.
///
/// Format: `YYYYMMDDTHHMMSS.mmmZ-<canonical_uuid>`
///
/// Example: `20260111T143522.045Z-550e8400e29b41d4a716446655440000`
///
/// When generated with the previous id of the same list, the timestamp is strictly greater
/// than the previous one, so lexical order equals creation order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntryId {
    timestamp: DateTime<Utc>,
    uuid: Uuid,
}

impl EntryId {
    /// Generates a new entry id, bumping the timestamp by 1 ms past `last` if needed.
    pub fn generate(last: Option<&EntryId>) -> Self {
        let now = Utc::now().trunc_subsecs(3);

        let timestamp = match last {
            Some(prev) if now <= prev.timestamp => prev.timestamp + Duration::milliseconds(1),
            _ => now,
        };

        Self {
            timestamp,
            uuid: Uuid::new_v4(),
        }
    }

    /// Returns the timestamp component.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl FromStr for EntryId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ts_str, uuid_str) = s
            .split_once('-')
            .ok_or_else(|| IdError::InvalidInput(format!("invalid entry id format: '{}'", s)))?;

        let Some(ts_no_z) = ts_str.strip_suffix('Z') else {
            return Err(IdError::InvalidInput(format!(
                "timestamp must end with 'Z': '{}'",
                ts_str
            )));
        };

        let naive = chrono::NaiveDateTime::parse_from_str(ts_no_z, "%Y%m%dT%H%M%S%.3f")
            .map_err(|e| {
                IdError::InvalidInput(format!("invalid timestamp format '{}': {}", ts_str, e))
            })?;
        let timestamp = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc);

        let uuid = RecordId::parse(uuid_str)?.uuid();

        Ok(Self { timestamp, uuid })
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.timestamp.format("%Y%m%dT%H%M%S%.3fZ"),
            self.uuid.simple()
        )
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for EntryId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for EntryId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EntryId::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_id_is_canonical() {
        let id = RecordId::new();
        assert!(RecordId::is_canonical(&id.to_string()));
    }

    #[test]
    fn parse_accepts_canonical_id() {
        let id = RecordId::parse("550e8400e29b41d4a716446655440000").expect("canonical");
        assert_eq!(id.to_string(), "550e8400e29b41d4a716446655440000");
    }

    #[test]
    fn parse_rejects_hyphenated_and_uppercase() {
        assert!(RecordId::parse("550e8400-e29b-41d4-a716-446655440000").is_err());
        assert!(RecordId::parse("550E8400E29B41D4A716446655440000").is_err());
        assert!(RecordId::parse("550e8400").is_err());
        assert!(RecordId::parse("zz0e8400e29b41d4a716446655440000").is_err());
    }

    #[test]
    fn sharded_dir_uses_two_level_prefix() {
        let id = RecordId::parse("550e8400e29b41d4a716446655440000").expect("canonical");
        let dir = id.sharded_dir(Path::new("/data"));
        assert_eq!(
            dir,
            PathBuf::from("/data/55/0e/550e8400e29b41d4a716446655440000")
        );
    }

    #[test]
    fn record_id_serde_uses_canonical_string() {
        let id = RecordId::parse("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").expect("canonical");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\"");
        let back: RecordId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);

        let bad = serde_json::from_str::<RecordId>("\"not-an-id\"");
        assert!(bad.is_err());
    }

    #[test]
    fn entry_id_display_parses_back() {
        let id = EntryId::generate(None);
        let parsed: EntryId = id.to_string().parse().expect("parse");
        assert_eq!(parsed.to_string(), id.to_string());
    }

    #[test]
    fn entry_id_generate_is_strictly_increasing() {
        let first = EntryId::generate(None);
        let second = EntryId::generate(Some(&first));
        assert!(second.timestamp() > first.timestamp());
        assert!(second.to_string() > first.to_string());
    }

    #[test]
    fn entry_id_rejects_missing_z_suffix() {
        let err = "20260111T143522.045-550e8400e29b41d4a716446655440000"
            .parse::<EntryId>()
            .expect_err("should fail");
        assert!(matches!(err, IdError::InvalidInput(_)));
    }
}

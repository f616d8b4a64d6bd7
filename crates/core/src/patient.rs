//! Patient descriptor consumed by section applicability rules.
//!
//! The engine never edits patient demographics. It receives a read-only descriptor from
//! the host and uses it only to decide which sections apply to an encounter.

use crate::constants::PEDIATRIC_AGE_LIMIT;
use serde::{Deserialize, Serialize};

/// Minimal identity and demographic fields of the patient being documented.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDescriptor {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Free-text sex/gender as recorded in the registry (e.g. "Female", "M").
    #[serde(default)]
    pub gender: Option<String>,
    /// Age in whole years, if known.
    #[serde(default)]
    pub age: Option<u32>,
}

/// Interpretation of the free-text gender field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedSex {
    Female,
    Male,
    Other,
    Unknown,
}

impl PatientDescriptor {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        gender: Option<String>,
        age: Option<u32>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            gender,
            age,
        }
    }

    /// "First Last", skipping whichever part is blank.
    pub fn display_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Normalises the recorded gender.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace. Anything that is
    /// neither blank nor a recognised female/male token is [`RecordedSex::Other`].
    pub fn recorded_sex(&self) -> RecordedSex {
        let Some(raw) = self.gender.as_deref() else {
            return RecordedSex::Unknown;
        };

        match raw.trim().to_ascii_lowercase().as_str() {
            "" => RecordedSex::Unknown,
            "female" | "f" | "woman" | "girl" => RecordedSex::Female,
            "male" | "m" | "man" | "boy" => RecordedSex::Male,
            _ => RecordedSex::Other,
        }
    }

    /// True when the patient's age is known and below [`PEDIATRIC_AGE_LIMIT`].
    pub fn is_pediatric(&self) -> bool {
        self.age.is_some_and(|age| age < PEDIATRIC_AGE_LIMIT)
    }
}

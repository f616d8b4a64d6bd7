//! Request and response bodies.
//!
//! Engine types are carried as-is and documented as plain objects in the OpenAPI schema.

use casenote_core::{FieldValue, PatientDescriptor, SectionDescriptor, WizardEvent, WizardView};
use casenote_store::Investigation;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionRes {
    pub id: String,
    pub title: String,
    pub short_title: String,
    pub icon: String,
    pub description: String,
    pub fields: Vec<String>,
}

impl From<&SectionDescriptor> for SectionRes {
    fn from(section: &SectionDescriptor) -> Self {
        Self {
            id: section.id.to_string(),
            title: section.title.into(),
            short_title: section.short_title.into(),
            icon: section.icon.into(),
            description: section.description.into(),
            fields: section.fields.iter().map(|f| f.name.to_string()).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ListSectionsRes {
    pub sections: Vec<SectionRes>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateRecordReq {
    #[schema(value_type = Object)]
    pub patient: PatientDescriptor,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct OpenSessionReq {
    #[schema(value_type = Object)]
    pub patient: PatientDescriptor,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UpdateFieldReq {
    /// A string, number or boolean matching the field's kind.
    #[schema(value_type = Object)]
    pub value: FieldValue,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MarkCompleteReq {
    pub completed: bool,
}

/// Wizard state after a call, with the notifications the call produced.
#[derive(Serialize, ToSchema)]
pub struct WizardRes {
    #[schema(value_type = Object)]
    pub view: WizardView,
    #[schema(value_type = Vec<Object>)]
    pub events: Vec<WizardEvent>,
}

#[derive(Serialize, ToSchema)]
pub struct ListInvestigationsRes {
    #[schema(value_type = Vec<Object>)]
    pub investigations: Vec<Investigation>,
}

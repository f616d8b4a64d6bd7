use super::controller::WizardController;
use crate::error::{WizardError, WizardResult};
use crate::record::{DocumentationRecord, FieldValue};
use crate::sections::SectionDescriptor;
use tokio::time::Instant;

/// What a section editor sees of the wizard.
///
/// A host is scoped to one section: it can read the whole record but only write the fields
/// its section declares, and only toggle its own completion flag.
pub struct SectionHost<'a> {
    controller: &'a mut WizardController,
    section: SectionDescriptor,
}

impl<'a> SectionHost<'a> {
    pub(super) fn new(controller: &'a mut WizardController, section: SectionDescriptor) -> Self {
        Self {
            controller,
            section,
        }
    }

    pub fn section(&self) -> &SectionDescriptor {
        &self.section
    }

    pub fn record(&self) -> &DocumentationRecord {
        self.controller.record()
    }

    pub fn completed(&self) -> bool {
        self.controller.progress().is_completed(self.section.id)
    }

    /// Names of this section's fields whose text is below the minimum-length guidance.
    pub fn guidance(&self) -> Vec<&'static str> {
        let record = self.controller.record();
        self.section
            .fields
            .iter()
            .filter(|spec| {
                record
                    .get(spec.name)
                    .is_some_and(|value| !spec.meets_guidance(value))
            })
            .map(|spec| spec.name)
            .collect()
    }

    pub fn on_field_change(&mut self, name: &str, value: FieldValue) -> WizardResult<()> {
        if !self.section.declares(name) {
            return Err(WizardError::UnknownField(format!(
                "{} is not a field of {}",
                name, self.section.id
            )));
        }
        self.controller.update_field(name, value, Instant::now())
    }

    pub fn on_mark_complete(&mut self, completed: bool) -> WizardResult<()> {
        self.controller
            .mark_complete(self.section.id, completed, Instant::now())
    }
}

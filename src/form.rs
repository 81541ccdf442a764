//! School submission form
//!
//! Owns the field values, per-field errors, the image selection and the
//! user-facing status. Fields are revalidated after they have been
//! touched (blurred once), not on every keystroke.

use crate::api::SchoolApi;
use crate::error::{DirectoryError, Result};
use crate::selection::{AddOutcome, ImageSelectionBuffer, PendingImage};
use crate::upload::{ScheduledRefresh, Submitted, UploadCoordinator};
use crate::validate::{validate_field, validate_fields, Field};
use school_directory_common::{SchoolFields, MAX_IMAGES};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

pub const SUCCESS_MESSAGE: &str = "School added successfully!";

/// Submission status shown under the form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded(String),
    Failed(String),
}

#[derive(Debug, Default)]
pub struct SchoolForm {
    fields: SchoolFields,
    touched: BTreeSet<Field>,
    errors: BTreeMap<Field, &'static str>,
    buffer: ImageSelectionBuffer,
    status: FormStatus,
}

impl SchoolForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &SchoolFields {
        &self.fields
    }

    pub fn value(&self, field: Field) -> &str {
        field.get(&self.fields)
    }

    /// Keystroke into a field
    pub fn input(&mut self, field: Field, value: impl Into<String>) {
        field.set(&mut self.fields, value.into());
        if self.touched.contains(&field) {
            self.revalidate(field);
        }
    }

    /// Field lost focus
    pub fn blur(&mut self, field: Field) {
        self.touched.insert(field);
        self.revalidate(field);
    }

    fn revalidate(&mut self, field: Field) {
        match validate_field(field, field.get(&self.fields)) {
            Some(message) => {
                self.errors.insert(field, message);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }

    pub fn field_error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn has_field_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn buffer(&self) -> &ImageSelectionBuffer {
        &self.buffer
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == FormStatus::Submitting
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            FormStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn success_message(&self) -> Option<&str> {
        match &self.status {
            FormStatus::Succeeded(message) => Some(message),
            _ => None,
        }
    }

    /// Add picked files to the selection, surfacing limit and duplicate
    /// messages
    pub fn add_images(&mut self, files: Vec<PendingImage>) -> Result<AddOutcome> {
        match self.buffer.add(files) {
            Ok(outcome) => {
                self.status = match self.buffer.warning() {
                    Some(warning) => FormStatus::Failed(warning.message().to_string()),
                    None => FormStatus::Idle,
                };
                Ok(outcome)
            }
            Err(e) => {
                self.status = FormStatus::Failed(format!("Maximum {} images allowed", MAX_IMAGES));
                Err(e)
            }
        }
    }

    pub fn remove_image(&mut self, index: usize) -> Option<PendingImage> {
        let removed = self.buffer.remove(index);
        if matches!(self.status, FormStatus::Failed(_)) {
            self.status = FormStatus::Idle;
        }
        removed
    }

    /// Validate every field and enter the submitting state.
    ///
    /// Refused while another submission is in flight.
    pub fn begin_submit(&mut self) -> Result<()> {
        if self.is_submitting() {
            return Err(DirectoryError::SubmissionInProgress);
        }

        self.touched.extend(Field::ALL);
        if let Err(errors) = validate_fields(&self.fields) {
            self.errors = errors.iter().collect();
            return Err(DirectoryError::Validation(errors));
        }
        self.errors.clear();
        self.status = FormStatus::Submitting;
        Ok(())
    }

    /// Apply the coordinator's outcome.
    ///
    /// Success resets the fields and empties the selection; failure keeps
    /// both so the user can retry.
    pub fn complete_submit(
        &mut self,
        result: Result<Submitted>,
        refresh_delay: Duration,
    ) -> Result<ScheduledRefresh> {
        match result {
            Ok(_) => {
                self.buffer.clear();
                self.fields = SchoolFields::default();
                self.touched.clear();
                self.errors.clear();
                self.status = FormStatus::Succeeded(SUCCESS_MESSAGE.to_string());
                Ok(ScheduledRefresh::after(refresh_delay))
            }
            Err(e) => {
                self.status = FormStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Validate, run both phases, apply the outcome
    pub async fn submit<A: SchoolApi>(
        &mut self,
        coordinator: &UploadCoordinator<A>,
        refresh_delay: Duration,
    ) -> Result<ScheduledRefresh> {
        self.begin_submit()?;
        let result = coordinator.submit(&self.fields, &self.buffer).await;
        self.complete_submit(result, refresh_delay)
    }

    /// Drop the transient success indicator
    pub fn clear_success(&mut self) {
        if matches!(self.status, FormStatus::Succeeded(_)) {
            self.status = FormStatus::Idle;
        }
    }
}

//! Add-contact form state.
//!
//! Blank fields are rejected here, before the state holder queues anything.

use crate::model::contact::{ContactValidationError, NewContact};
use crate::repo::ContactRepository;
use crate::service::contact_service::{ContactService, ContactServiceError};
use crate::ui::navigation::Navigator;

pub const NAME_LABEL: &str = "Name";
pub const PHONE_NUMBER_LABEL: &str = "Phone Number";
pub const SAVE_LABEL: &str = "Save Contact";

/// Result of pressing the save button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Queued for insert; the form was popped off the back stack.
    Saved,
    /// Nothing was sent; the form stays open.
    Rejected(ContactValidationError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddContactForm {
    name: String,
    phone_number: String,
}

impl AddContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.name = value.into();
    }

    pub fn set_phone_number(&mut self, value: impl Into<String>) {
        self.phone_number = value.into();
    }

    fn draft(&self) -> NewContact {
        NewContact::new(self.name.as_str(), self.phone_number.as_str())
    }

    /// Whether save would currently be accepted by `service`'s policy.
    pub fn can_submit<R: ContactRepository + 'static>(&self, service: &ContactService<R>) -> bool {
        service.validate(&self.draft()).is_ok()
    }

    /// Validates, queues the insert, and navigates back on success.
    ///
    /// # Errors
    /// - `ContactServiceError::Closed` when the state holder is shut down.
    pub fn submit<R: ContactRepository + 'static>(
        &mut self,
        service: &ContactService<R>,
        nav: &mut Navigator,
    ) -> Result<SubmitOutcome, ContactServiceError> {
        match service.add_contact(self.name.as_str(), self.phone_number.as_str()) {
            Ok(()) => {
                *self = Self::default();
                nav.pop_back();
                Ok(SubmitOutcome::Saved)
            }
            Err(ContactServiceError::Invalid(reason)) => Ok(SubmitOutcome::Rejected(reason)),
            Err(err) => Err(err),
        }
    }
}

//! Contact list screen state.

use crate::model::contact::Contact;
use crate::repo::ContactRepository;
use crate::service::contact_service::{ContactService, ContactServiceError};
use crate::ui::navigation::{Drawer, Navigator, Route};

pub const EMPTY_LIST_MESSAGE: &str = "No contacts yet.";
pub const DELETE_DIALOG_TITLE: &str = "Delete Contact";
pub const DELETE_DIALOG_MESSAGE: &str = "Are you sure you want to delete this contact?";

/// What the list body shows for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactListBody {
    Empty { message: &'static str },
    Rows(Vec<Contact>),
}

impl ContactListBody {
    /// Rows keep the order the store returned them in.
    pub fn from_snapshot(snapshot: &[Contact]) -> Self {
        if snapshot.is_empty() {
            Self::Empty {
                message: EMPTY_LIST_MESSAGE,
            }
        } else {
            Self::Rows(snapshot.to_vec())
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContactListScreen {
    pub drawer: Drawer,
    pending_delete: Option<Contact>,
}

impl ContactListScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contact awaiting delete confirmation, if the dialog is showing.
    pub fn pending_delete(&self) -> Option<&Contact> {
        self.pending_delete.as_ref()
    }

    /// Opens the delete confirmation dialog for `contact`.
    pub fn request_delete(&mut self, contact: Contact) {
        self.pending_delete = Some(contact);
    }

    pub fn dismiss_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Forwards the pending delete to the state holder and closes the dialog.
    ///
    /// Returns `Ok(false)` when no dialog was showing.
    pub fn confirm_delete<R: ContactRepository + 'static>(
        &mut self,
        service: &ContactService<R>,
    ) -> Result<bool, ContactServiceError> {
        match self.pending_delete.take() {
            Some(contact) => service.delete_contact(contact).map(|()| true),
            None => Ok(false),
        }
    }

    /// Floating action button: opens the add form.
    pub fn open_add_form(&mut self, nav: &mut Navigator) {
        self.drawer.close();
        nav.navigate(Route::AddContact);
    }
}

//! Contact records and their draft form.
//!
//! # Responsibility
//! - Define the single persisted entity and the id-less draft used by the
//!   creation path.
//! - Provide the blank checks shared by every validation policy.
//!
//! # Invariants
//! - `id` is assigned once by the store and never reused after deletion.
//! - There is no update path; records are only created and deleted.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned identifier, stable for the record's lifetime.
pub type ContactId = i64;

/// A persisted contact row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    /// Serialized as `phoneNumber` to match the persisted column name.
    pub phone_number: String,
}

/// A contact that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub name: String,
    pub phone_number: String,
}

impl NewContact {
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone_number: phone_number.into(),
        }
    }

    /// Rejects drafts with a blank name or blank phone number.
    ///
    /// Blank means empty or whitespace-only. Field contents are otherwise
    /// stored exactly as entered.
    pub fn ensure_not_blank(&self) -> Result<(), ContactValidationError> {
        if self.name.trim().is_empty() {
            return Err(ContactValidationError::BlankName);
        }
        if self.phone_number.trim().is_empty() {
            return Err(ContactValidationError::BlankPhoneNumber);
        }
        Ok(())
    }

    /// Attaches the id assigned by the store.
    pub fn into_contact(self, id: ContactId) -> Contact {
        Contact {
            id,
            name: self.name,
            phone_number: self.phone_number,
        }
    }
}

/// Input rejected before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    BlankName,
    BlankPhoneNumber,
    InvalidPhoneNumber(String),
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::BlankPhoneNumber => write!(f, "phone number must not be blank"),
            Self::InvalidPhoneNumber(value) => write!(f, "invalid phone number: `{value}`"),
        }
    }
}

impl Error for ContactValidationError {}

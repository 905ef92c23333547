//! Validation policies applied to drafts before they reach storage.

use crate::model::contact::{ContactValidationError, NewContact};
use once_cell::sync::Lazy;
use regex::Regex;

static PHONE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ().\-]{3,32}$").expect("valid phone number regex"));

const MIN_PHONE_DIGITS: usize = 3;

/// Decides whether a draft may be forwarded to the gateway.
pub trait ContactPolicy: Send + Sync {
    fn check(&self, draft: &NewContact) -> Result<(), ContactValidationError>;
}

/// Accepts any draft whose name and phone number are non-blank.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonBlankPolicy;

impl ContactPolicy for NonBlankPolicy {
    fn check(&self, draft: &NewContact) -> Result<(), ContactValidationError> {
        draft.ensure_not_blank()
    }
}

/// Non-blank plus a permissive phone number shape.
///
/// Accepts an optional leading `+`, then digits, spaces, `-`, `.` and
/// parentheses, with at least three digits overall.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneFormatPolicy;

impl ContactPolicy for PhoneFormatPolicy {
    fn check(&self, draft: &NewContact) -> Result<(), ContactValidationError> {
        draft.ensure_not_blank()?;

        let phone = draft.phone_number.trim();
        let digits = phone.chars().filter(char::is_ascii_digit).count();
        if !PHONE_NUMBER_RE.is_match(phone) || digits < MIN_PHONE_DIGITS {
            return Err(ContactValidationError::InvalidPhoneNumber(phone.to_string()));
        }
        Ok(())
    }
}

/// Config-level selector for the validation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    NonBlank,
    PhoneFormat,
}

impl ValidationMode {
    pub fn policy(self) -> Box<dyn ContactPolicy> {
        match self {
            Self::NonBlank => Box::new(NonBlankPolicy),
            Self::PhoneFormat => Box::new(PhoneFormatPolicy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ContactPolicy, NonBlankPolicy, PhoneFormatPolicy};
    use crate::model::contact::{ContactValidationError, NewContact};

    #[test]
    fn non_blank_policy_accepts_free_form_phone_text() {
        let draft = NewContact::new("Ada", "call the office");
        assert!(NonBlankPolicy.check(&draft).is_ok());
    }

    #[test]
    fn phone_format_policy_accepts_common_shapes() {
        for phone in ["555-0100", "+1 (555) 010-0200", "030.1234.5678"] {
            let draft = NewContact::new("Ada", phone);
            assert!(PhoneFormatPolicy.check(&draft).is_ok(), "{phone}");
        }
    }

    #[test]
    fn phone_format_policy_rejects_letters_and_too_few_digits() {
        let letters = NewContact::new("Ada", "call me");
        assert!(matches!(
            PhoneFormatPolicy.check(&letters),
            Err(ContactValidationError::InvalidPhoneNumber(_))
        ));

        let punctuation = NewContact::new("Ada", "(-)");
        assert!(matches!(
            PhoneFormatPolicy.check(&punctuation),
            Err(ContactValidationError::InvalidPhoneNumber(_))
        ));
    }

    #[test]
    fn phone_format_policy_still_reports_blank_fields_first() {
        let draft = NewContact::new(" ", "abc");
        assert_eq!(
            PhoneFormatPolicy.check(&draft),
            Err(ContactValidationError::BlankName)
        );
    }
}

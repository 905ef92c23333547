//! Contact domain model.
//!
//! # Invariants
//! - A persisted contact is identified by a store-assigned `ContactId`.
//! - Drafts (`NewContact`) never carry an id; only the store assigns one.

pub mod contact;

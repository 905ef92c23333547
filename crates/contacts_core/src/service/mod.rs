//! State holder between the presentation layer and the storage gateway.
//!
//! # Responsibility
//! - Accept add/delete intents without blocking the caller.
//! - Run every mutation off the caller's thread, one at a time.
//! - Pass the gateway's live sequence through unchanged.

pub mod contact_service;
pub mod policy;

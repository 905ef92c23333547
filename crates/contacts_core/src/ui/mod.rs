//! Presentation-side state for the two contact screens and the drawer.
//!
//! # Responsibility
//! - Model routes, back-stack navigation and the side drawer.
//! - Turn snapshots into list rows or the empty-state message.
//! - Gate the add form on the intent-layer validation before anything is
//!   sent to the state holder.
//!
//! Rendering itself belongs to the host UI toolkit.

pub mod add_contact;
pub mod contact_list;
pub mod navigation;

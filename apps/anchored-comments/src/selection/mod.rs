//! Selection and annotation state
//!
//! The single owner of session-scoped comment state: the selection being
//! made, the active annotation, the annotation list, per-comment screen
//! positions and the registry of commentable containers. Consumers receive
//! the store by reference and mutate it only through its named operations.

mod store;
mod types;

pub use store::{SelectionStore, SubscriptionId};
pub use types::{CommentPosition, SelectionState};

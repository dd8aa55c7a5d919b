//! Annotation module
//!
//! The boundary through which annotation objects reach the annotator.
//!
//! # Features
//!
//! - Comment objects anchored to a character-offset range, with any other
//!   payload (author, body, timestamps) carried through untouched
//! - The [`Anchored`] trait, so callers can supply their own annotation types
//! - The in-progress selection, highlighted under [`NEW_COMMENT_ID`] until it
//!   is committed or cancelled
//! - Range collection per container, in a stable caller-defined order

mod collect;
mod types;

pub use collect::collect_ranges;
pub use types::{Anchored, Comment, PositionedSelectionRange, SelectionRange, NEW_COMMENT_ID};

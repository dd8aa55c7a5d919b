//! Anchored comments
//!
//! Highlights user comments on rendered documents. Comments are anchored to
//! character-offset ranges of a document's plain text, while the document is
//! rendered as a tree of nodes. This crate provides:
//!
//! - a range-overlap annotator that re-derives text offsets while walking
//!   the tree and splits text leaves into highlighted segments
//! - a session-scoped store for the selection being made, the active
//!   comment and the comment list
//! - HTML output of annotated trees
//!
//! Markup conversion, comment persistence and comment-box layout belong to
//! the host application.

pub mod annotations;
pub mod annotator;
pub mod config;
pub mod error;
pub mod html;
pub mod node;
pub mod range;
pub mod selection;

// Re-export common types
pub use annotations::{
    collect_ranges, Anchored, Comment, PositionedSelectionRange, SelectionRange, NEW_COMMENT_ID,
};
pub use annotator::{annotate, Annotator};
pub use config::HighlightConfig;
pub use error::{Error, Result};
pub use html::{lower_highlights, render_html};
pub use node::{Element, Node, Segment};
pub use range::{OffsetUnit, Range};
pub use selection::{CommentPosition, SelectionState, SelectionStore, SubscriptionId};

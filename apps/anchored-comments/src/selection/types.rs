//! Selection state types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::annotations::{Comment, PositionedSelectionRange};

/// Screen position of a comment, recorded for the positioning layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPosition {
    /// Distance from the top of the commentable section, in pixels
    pub top: f64,
    /// Measured height of the comment box, once known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl CommentPosition {
    pub fn new(top: f64) -> Self {
        Self { top, height: None }
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }
}

/// Snapshot of everything the store owns except the container registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    /// Live selection under the pointer, used to place the comment button;
    /// never highlighted
    pub positioned_selection: Option<PositionedSelectionRange>,
    /// Selection being made, not yet a comment
    pub in_progress_selection: Option<PositionedSelectionRange>,
    /// Whether the new-comment box is open
    pub show_new_comment_box: bool,
    /// The one annotation drawn with the active color
    pub active_annotation_id: Option<String>,
    /// Mirror of the externally owned annotation list
    pub annotations: Vec<Comment>,
    /// Screen positions by comment id
    pub positions: BTreeMap<String, CommentPosition>,
    /// Vertical offset of the commentable section, in pixels
    pub commentable_section_offset_y: f64,
    /// Vertical offset of the comments column, in pixels
    pub comments_section_offset_y: f64,
}

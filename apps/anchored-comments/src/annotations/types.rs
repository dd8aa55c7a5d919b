//! Annotation types
//!
//! Field names follow the camelCase JSON used by browser-side comment stores,
//! so comment lists can be handed over without remapping.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::range::Range;

/// Identifier of the transient range for a selection that is not a comment yet
pub const NEW_COMMENT_ID: &str = "new-comment";

/// Character-offset anchor of an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRange {
    /// First offset of the anchored text
    pub start_offset: usize,
    /// Offset one past the anchored text
    pub end_offset: usize,
}

impl SelectionRange {
    pub fn new(start_offset: usize, end_offset: usize) -> Self {
        Self {
            start_offset,
            end_offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_offset >= self.end_offset
    }

    /// Tag this anchor with an identifier
    pub fn to_range(&self, id: impl Into<String>) -> Range {
        Range::new(id, self.start_offset, self.end_offset)
    }
}

/// A selection being made inside one container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedSelectionRange {
    /// The container the selection was started in
    pub container_id: String,
    #[serde(flatten)]
    pub range: SelectionRange,
}

impl PositionedSelectionRange {
    pub fn new(container_id: impl Into<String>, range: SelectionRange) -> Self {
        Self {
            container_id: container_id.into(),
            range,
        }
    }
}

/// A comment anchored to a range of one container's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique identifier
    pub id: String,
    /// Container the anchor offsets refer to; `None` applies to every container
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    /// The anchored offsets
    pub selection_range: SelectionRange,
    /// Remaining fields (author, body, timestamps, ...), never interpreted
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Comment {
    /// Create a comment without a container or payload
    pub fn new(id: impl Into<String>, start_offset: usize, end_offset: usize) -> Self {
        Self {
            id: id.into(),
            container_id: None,
            selection_range: SelectionRange::new(start_offset, end_offset),
            payload: Map::new(),
        }
    }

    /// Set the container
    pub fn in_container(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = Some(container_id.into());
        self
    }

    /// Attach a payload field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// Anything anchored to a range of a container's text
pub trait Anchored {
    /// Identifier carried by the highlight of this anchor
    fn anchor_id(&self) -> &str;

    /// The anchored offsets
    fn selection_range(&self) -> SelectionRange;

    /// Container the offsets refer to; `None` applies to every container
    fn container_id(&self) -> Option<&str> {
        None
    }
}

impl Anchored for Comment {
    fn anchor_id(&self) -> &str {
        &self.id
    }

    fn selection_range(&self) -> SelectionRange {
        self.selection_range
    }

    fn container_id(&self) -> Option<&str> {
        self.container_id.as_deref()
    }
}

impl Anchored for Range {
    fn anchor_id(&self) -> &str {
        &self.id
    }

    fn selection_range(&self) -> SelectionRange {
        SelectionRange::new(self.start, self.end)
    }
}

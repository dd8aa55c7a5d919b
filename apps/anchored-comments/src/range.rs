//! Offset ranges
//!
//! Offsets index the flattened plain-text stream of a rendered document.
//! Every text leaf advances the running offset by its length, measured in an
//! [`OffsetUnit`]; elements and opaque nodes consume nothing.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Unit in which offsets are counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetUnit {
    /// UTF-16 code units, as reported by browser selection APIs
    #[default]
    Utf16,
    /// Unicode scalar values
    Char,
    /// UTF-8 bytes
    Byte,
}

impl OffsetUnit {
    /// Width of a single character in this unit
    pub fn width(self, c: char) -> usize {
        match self {
            OffsetUnit::Utf16 => c.len_utf16(),
            OffsetUnit::Char => 1,
            OffsetUnit::Byte => c.len_utf8(),
        }
    }

    /// Length of `text` in this unit
    pub fn len(self, text: &str) -> usize {
        match self {
            OffsetUnit::Utf16 => text.encode_utf16().count(),
            OffsetUnit::Char => text.chars().count(),
            OffsetUnit::Byte => text.len(),
        }
    }

    /// Map ascending offsets, relative to the start of `text`, to byte indices
    ///
    /// An offset that lands inside a character resolves to the first byte of
    /// that character. Offsets past the end resolve to `text.len()`.
    pub fn byte_indices(self, text: &str, offsets: &[usize]) -> Vec<usize> {
        let mut indices = Vec::with_capacity(offsets.len());
        let mut chars = text.char_indices().peekable();
        let mut position = 0;

        for &target in offsets {
            while let Some(&(_, c)) = chars.peek() {
                let width = self.width(c);
                if position + width > target {
                    break;
                }
                position += width;
                chars.next();
            }
            indices.push(chars.peek().map_or(text.len(), |&(i, _)| i));
        }

        indices
    }
}

impl FromStr for OffsetUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf16" | "utf-16" => Ok(OffsetUnit::Utf16),
            "char" | "chars" => Ok(OffsetUnit::Char),
            "byte" | "bytes" | "utf8" | "utf-8" => Ok(OffsetUnit::Byte),
            other => Err(Error::InvalidConfig(format!("unknown offset unit: {}", other))),
        }
    }
}

/// A half-open offset interval `[start, end)` tagged with its annotation id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub id: String,
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn new(id: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            id: id.into(),
            start,
            end,
        }
    }

    /// Degenerate ranges never highlight anything and are dropped before annotation
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `[start, end)` shares at least one offset with this range
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start.max(start) < self.end.min(end)
    }

    /// Whether this range fully contains `[start, end)`
    pub fn covers(&self, start: usize, end: usize) -> bool {
        self.start <= start && self.end >= end
    }
}

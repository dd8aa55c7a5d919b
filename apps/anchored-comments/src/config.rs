//! Configuration management for highlight rendering

use std::env;

use serde::{Deserialize, Serialize};

use crate::annotator::Annotator;
use crate::error::{Error, Result};
use crate::html::is_valid_name;
use crate::range::OffsetUnit;

/// Attribute listing every covering annotation id on a highlight
pub const IDS_ATTRIBUTE: &str = "data-comment-ids";

/// Attributes every highlight writes itself
const RESERVED_ATTRIBUTES: &[&str] = &["style", "class", IDS_ATTRIBUTE];

const ENV_COLOR: &str = "ANCHORED_COMMENTS_COLOR";
const ENV_ACTIVE_COLOR: &str = "ANCHORED_COMMENTS_ACTIVE_COLOR";
const ENV_ID_ATTRIBUTE: &str = "ANCHORED_COMMENTS_ID_ATTRIBUTE";
const ENV_CLASS: &str = "ANCHORED_COMMENTS_CLASS";
const ENV_OFFSET_UNIT: &str = "ANCHORED_COMMENTS_OFFSET_UNIT";

/// How highlights are measured and drawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HighlightConfig {
    /// Background of highlights that are not active (CSS color value)
    pub color: String,
    /// Background of highlights covered by the active annotation
    pub active_color: String,
    /// Attribute carrying the primary annotation id
    pub id_attribute: String,
    /// Optional class added to every highlight
    pub class_name: Option<String>,
    /// Unit of annotation offsets
    pub offset_unit: OffsetUnit,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            color: "rgba(255, 212, 0, 0.3)".to_string(),
            active_color: "rgba(255, 170, 0, 0.6)".to_string(),
            id_attribute: "data-comment-id".to_string(),
            class_name: None,
            offset_unit: OffsetUnit::default(),
        }
    }
}

impl HighlightConfig {
    /// Read configuration from `ANCHORED_COMMENTS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through `lookup`, defaulting missing keys
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let offset_unit = match lookup(ENV_OFFSET_UNIT) {
            Some(unit) => unit.parse()?,
            None => defaults.offset_unit,
        };

        let config = Self {
            color: lookup(ENV_COLOR).unwrap_or(defaults.color),
            active_color: lookup(ENV_ACTIVE_COLOR).unwrap_or(defaults.active_color),
            id_attribute: lookup(ENV_ID_ATTRIBUTE).unwrap_or(defaults.id_attribute),
            class_name: lookup(ENV_CLASS).filter(|c| !c.is_empty()),
            offset_unit,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the id attribute can be written without clobbering the
    /// other highlight attributes
    pub fn validate(&self) -> Result<()> {
        let name = self.id_attribute.as_str();
        if !is_valid_name(name) {
            return Err(Error::InvalidConfig(format!("invalid id attribute: {:?}", name)));
        }
        if RESERVED_ATTRIBUTES
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(name))
        {
            return Err(Error::InvalidConfig(format!(
                "id attribute {:?} is reserved for highlights",
                name
            )));
        }
        Ok(())
    }

    /// Set both highlight colors
    pub fn with_colors(
        mut self,
        color: impl Into<String>,
        active_color: impl Into<String>,
    ) -> Self {
        self.color = color.into();
        self.active_color = active_color.into();
        self
    }

    /// Background for a highlight in the given state
    pub fn color_for(&self, active: bool) -> &str {
        if active {
            &self.active_color
        } else {
            &self.color
        }
    }

    /// Annotator measuring offsets in the configured unit
    pub fn annotator(&self) -> Annotator {
        Annotator::new(self.offset_unit)
    }
}

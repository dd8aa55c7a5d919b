//! HTML output
//!
//! Hands annotated trees to renderers that only understand elements: styled
//! units become `span` elements carrying a background color and the
//! annotation identifiers, and whole trees can be serialized to HTML.

mod render;

pub use render::{highlight_span, is_valid_name, lower_highlights, render_html, VOID_ELEMENTS};

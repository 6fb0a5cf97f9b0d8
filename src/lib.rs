//! glyphcore
//!
//! The glyph data model of a collaborative font editor, with the clipboard
//! import pipeline that turns pasted SVG or GLIF text into it, and the
//! schema reflection other components use to describe it.

pub mod clipboard;
pub mod error;
pub mod model;

pub use clipboard::parse_clipboard;
pub use model::{StaticGlyph, VariableGlyph};

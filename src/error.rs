//! Error types for the glyph core.
//!
//! Unrecognized clipboard input is not an error and is reported as an absent
//! result by the pipeline. The types here cover structural problems: outline
//! data that cannot be packed, invalid axis definitions, and interchange
//! values that do not match the declared shape of a model type.

use thiserror::Error;

/// Structural errors in outline data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A contour with zero points has no well-formed boundary.
    #[error("contour {index} has no points")]
    EmptyContour { index: usize },
}

/// Invalid variation-axis definitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AxisError {
    #[error("axis `{name}`: expected min <= default <= max, got {min}, {default}, {max}")]
    OutOfOrder {
        name: String,
        min: f64,
        default: f64,
        max: f64,
    },
    #[error("axis `{name}`: mapping entries must be sorted by input value")]
    UnsortedMapping { name: String },
}

/// Data-shape errors from typed deserialization.
///
/// Each variant carries the path of the offending field (for example
/// `layers[0].glyph.path.pointTypes[2]`) so callers can report exactly which
/// part of the input was malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("missing required field `{0}`")]
    MissingField(String),
    #[error("expected {expected} at `{path}`, found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("unknown point type {value} at `{path}`")]
    UnknownPointType { path: String, value: u64 },
}

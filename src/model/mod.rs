//! The canonical glyph data model.
//!
//! Value types only: glyph records compose by containment, reference each
//! other by name, and are replaced rather than mutated. The packed outline
//! encoding lives in [`path`], the record types in [`glyph`], their
//! structural reflection in [`schema`], and strict construction from
//! loosely-typed interchange data in [`deserialize`].

pub mod deserialize;
pub mod glyph;
pub mod path;
pub mod schema;

// Record types
pub use glyph::{
    AxisMapping, Component, GlobalAxis, Layer, LocalAxis, Location, Source, StaticGlyph,
    Transformation, VariableGlyph,
};
// Outline encoding
pub use path::{Contour, ContourInfo, ContourPoint, PackedPath, PointType};
// Reflection
pub use schema::{classes_schema, derive_schema, FieldSchema, Schema};

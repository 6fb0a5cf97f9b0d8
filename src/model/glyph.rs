//! Glyph record types.
//!
//! Pure value types: no behavior beyond equality, cloning, and the affine
//! helpers on [`Transformation`]. Relationships between records are by name
//! (a [`Source`] names its [`Layer`], a [`Component`] names its base glyph);
//! resolving those names is the consumer's job, so nothing here holds a
//! back-pointer to its container.

use std::collections::HashMap;
use std::f64::consts::FRAC_PI_2;

use kurbo::Affine;
use serde::Serialize;

use crate::error::AxisError;
use crate::model::path::PackedPath;

/// Mapping from axis name to a coordinate in design space.
pub type Location = HashMap<String, f64>;

/// A decomposed 2D transform. Angles are in degrees.
///
/// Immutable in spirit: edits replace the whole value rather than adjusting
/// individual fields in place.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformation {
    pub translate_x: f64,
    pub translate_y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub skew_x: f64,
    pub skew_y: f64,
    pub t_center_x: f64,
    pub t_center_y: f64,
}

impl Default for Transformation {
    /// The identity transform: zero translation, rotation and skew, unit scale.
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            skew_x: 0.0,
            skew_y: 0.0,
            t_center_x: 0.0,
            t_center_y: 0.0,
        }
    }
}

impl Transformation {
    /// Compose the decomposed fields back into a single affine matrix:
    /// translate ∘ center ∘ rotate ∘ scale ∘ skew ∘ uncenter.
    pub fn to_affine(&self) -> Affine {
        Affine::translate((
            self.translate_x + self.t_center_x,
            self.translate_y + self.t_center_y,
        )) * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::skew(
                self.skew_x.to_radians().tan(),
                self.skew_y.to_radians().tan(),
            )
            * Affine::translate((-self.t_center_x, -self.t_center_y))
    }

    /// Decompose a 2×3 affine matrix into translation, rotation, scale and
    /// skew, with the transform center at the origin.
    pub fn from_affine(affine: Affine) -> Self {
        let [a, b, c, d, x, y] = affine.as_coeffs();
        let delta = a * d - b * c;
        let mut rotation = 0.0;
        let mut scale = (0.0, 0.0);
        let mut skew = (0.0, 0.0);
        if a != 0.0 || b != 0.0 {
            let r = a.hypot(b);
            rotation = if b >= 0.0 {
                (a / r).acos()
            } else {
                -(a / r).acos()
            };
            scale = (r, delta / r);
            skew = (((a * c + b * d) / (r * r)).atan(), 0.0);
        } else if c != 0.0 || d != 0.0 {
            let s = c.hypot(d);
            rotation = FRAC_PI_2
                - if d >= 0.0 {
                    (-c / s).acos()
                } else {
                    -(c / s).acos()
                };
            scale = (delta / s, s);
            skew = (0.0, ((a * c + b * d) / (s * s)).atan());
        }
        Self {
            translate_x: x,
            translate_y: y,
            rotation: rotation.to_degrees(),
            scale_x: scale.0,
            scale_y: scale.1,
            skew_x: skew.0.to_degrees(),
            skew_y: skew.1.to_degrees(),
            ..Default::default()
        }
    }
}

/// A named reference to another glyph, placed by its own transformation and,
/// for variable components, a location in the base glyph's design space.
///
/// Whether `name` refers to an existing glyph is for the owning font
/// collection to enforce.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Component {
    pub name: String,
    pub transformation: Transformation,
    pub location: Location,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// One concrete, non-variable rendering of a glyph.
///
/// Absent advance metrics are semantically distinct from zero: a pasted
/// outline with no declared advance keeps `x_advance` as `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticGlyph {
    pub path: PackedPath,
    pub components: Vec<Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_advance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_advance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_origin: Option<f64>,
}

/// Binds a location in variation space to a layer, by layer name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub name: String,
    pub layer_name: String,
    pub location: Location,
}

/// A named static glyph; the unit of storage for one design-space instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    pub glyph: StaticGlyph,
}

/// A glyph-scoped variation axis.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalAxis {
    pub name: String,
    pub min_value: f64,
    pub default_value: f64,
    pub max_value: f64,
}

impl LocalAxis {
    /// Fail-fast constructor enforcing min <= default <= max. The fields stay
    /// public for trusted construction paths (typed deserialization keeps the
    /// values it was given).
    pub fn new(
        name: impl Into<String>,
        min_value: f64,
        default_value: f64,
        max_value: f64,
    ) -> Result<Self, AxisError> {
        let axis = Self {
            name: name.into(),
            min_value,
            default_value,
            max_value,
        };
        axis.validate()?;
        Ok(axis)
    }

    pub fn validate(&self) -> Result<(), AxisError> {
        if !(self.min_value <= self.default_value && self.default_value <= self.max_value) {
            return Err(AxisError::OutOfOrder {
                name: self.name.clone(),
                min: self.min_value,
                default: self.default_value,
                max: self.max_value,
            });
        }
        Ok(())
    }
}

/// The top-level glyph entity: local axes, code points, and the sources and
/// layers spanning its design space.
///
/// Referential invariants (each source's `layer_name` resolves to a layer,
/// layer names are unique) are validated by the consumer that assembles
/// glyphs, not enforced on construction.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct VariableGlyph {
    pub name: String,
    pub axes: Vec<LocalAxis>,
    pub unicodes: Vec<u32>,
    pub sources: Vec<Source>,
    pub layers: Vec<Layer>,
}

/// One (input, output) pair of a piecewise-linear axis remapping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AxisMapping {
    pub input: f64,
    pub output: f64,
}

/// A font-wide variation axis.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalAxis {
    pub name: String,
    /// Four-character OpenType axis tag, e.g. `"wght"`.
    pub tag: String,
    pub min_value: f64,
    pub default_value: f64,
    pub max_value: f64,
    /// Piecewise-linear remapping of user to design coordinates, sorted by
    /// input value. Empty means linear.
    pub mapping: Vec<AxisMapping>,
}

impl GlobalAxis {
    pub fn validate(&self) -> Result<(), AxisError> {
        if !(self.min_value <= self.default_value && self.default_value <= self.max_value) {
            return Err(AxisError::OutOfOrder {
                name: self.name.clone(),
                min: self.min_value,
                default: self.default_value,
                max: self.max_value,
            });
        }
        if self
            .mapping
            .windows(2)
            .any(|pair| pair[0].input > pair[1].input)
        {
            return Err(AxisError::UnsortedMapping {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn transformation_default_is_identity() {
        let t = Transformation::default();
        assert_eq!(t.scale_x, 1.0);
        assert_eq!(t.scale_y, 1.0);
        assert_eq!(t.to_affine(), Affine::IDENTITY);
        assert_eq!(Transformation::from_affine(Affine::IDENTITY), t);
    }

    #[test]
    fn decompose_flip_matrix() {
        // The y-flip matrix a pasted SVG typically carries.
        let t = Transformation::from_affine(Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, 120.0]));
        assert_eq!(t.translate_x, 0.0);
        assert_eq!(t.translate_y, 120.0);
        assert_eq!(t.rotation, 0.0);
        assert_eq!(t.scale_x, 1.0);
        assert_eq!(t.scale_y, -1.0);
        assert_eq!(t.skew_x, 0.0);
    }

    #[test]
    fn affine_round_trip() {
        let original = Transformation {
            translate_x: 15.0,
            translate_y: -40.0,
            rotation: 30.0,
            scale_x: 2.0,
            scale_y: 0.5,
            skew_x: 10.0,
            ..Default::default()
        };
        let recovered = Transformation::from_affine(original.to_affine());
        for (a, b) in [
            (original.translate_x, recovered.translate_x),
            (original.translate_y, recovered.translate_y),
            (original.rotation, recovered.rotation),
            (original.scale_x, recovered.scale_x),
            (original.scale_y, recovered.scale_y),
            (original.skew_x, recovered.skew_x),
            (original.skew_y, recovered.skew_y),
        ] {
            assert!((a - b).abs() < 1e-9, "expected {a}, got {b}");
        }
    }

    #[test]
    fn local_axis_rejects_out_of_order_values() {
        let err = LocalAxis::new("weight", 500.0, 400.0, 700.0).unwrap_err();
        assert!(matches!(err, AxisError::OutOfOrder { .. }));
        assert!(LocalAxis::new("weight", 100.0, 400.0, 700.0).is_ok());
    }

    #[test]
    fn global_axis_mapping_must_be_sorted() {
        let mut axis = GlobalAxis {
            name: "weight".into(),
            tag: "wght".into(),
            min_value: 100.0,
            default_value: 400.0,
            max_value: 700.0,
            mapping: vec![
                AxisMapping {
                    input: 100.0,
                    output: 20.0,
                },
                AxisMapping {
                    input: 400.0,
                    output: 90.0,
                },
            ],
        };
        assert!(axis.validate().is_ok());
        axis.mapping.swap(0, 1);
        assert_eq!(
            axis.validate(),
            Err(AxisError::UnsortedMapping {
                name: "weight".into()
            })
        );
    }

    #[test]
    fn static_glyph_advances_default_to_absent() {
        let glyph = StaticGlyph::default();
        assert_eq!(glyph.x_advance, None);
        let value = serde_json::to_value(&glyph).unwrap();
        assert!(value.get("xAdvance").is_none());
    }
}

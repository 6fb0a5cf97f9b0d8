//! Font-glyph-XML (UFO GLIF) decoder.
//!
//! Deserializes a `<glyph>` document via quick-xml and converts it to the
//! packed model: string point tags become the closed [`PointType`]
//! enumeration, off-curve runs are classified as quadratic or cubic by the
//! segment type of the following on-curve point, and `<component>` elements
//! become model components with their affine matrix decomposed into a
//! [`Transformation`].
//!
//! An absent `<advance width>` leaves the x-advance unset; absence is not
//! zero.

use kurbo::Affine;
use serde::Deserialize;

use super::DecodeOutcome;
use crate::model::path::{Contour, ContourPoint, PackedPath, PointType};
use crate::model::{Component, StaticGlyph, Transformation};

/// A decoded GLIF document.
///
/// The unicodes and glyph name are not part of the returned [`StaticGlyph`];
/// they are collected here for the collaborator that merges pasted glyphs
/// into a variable glyph.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedGlif {
    pub name: String,
    pub glyph: StaticGlyph,
    pub unicodes: Vec<u32>,
}

/// Attempt to decode the text as a GLIF document.
pub fn decode(text: &str) -> DecodeOutcome {
    if !text.contains("<glyph") {
        return DecodeOutcome::NotThisFormat;
    }
    match parse_document(text) {
        Ok(parsed) => DecodeOutcome::Decoded(parsed.glyph),
        Err(reason) => DecodeOutcome::Malformed(reason),
    }
}

/// Parse a GLIF document, keeping the glyph name and unicode code points
/// alongside the static glyph. `None` for anything that is not a
/// well-formed GLIF document.
pub fn parse_glif(text: &str) -> Option<ParsedGlif> {
    if !text.contains("<glyph") {
        return None;
    }
    parse_document(text).ok()
}

#[derive(Debug, Deserialize)]
#[serde(rename = "glyph")]
struct GlifDoc {
    #[serde(rename = "@name")]
    name: String,
    #[serde(default)]
    advance: Option<GlifAdvance>,
    #[serde(default)]
    unicode: Vec<GlifUnicode>,
    #[serde(default)]
    outline: Option<GlifOutline>,
}

#[derive(Debug, Deserialize)]
struct GlifAdvance {
    #[serde(rename = "@width", default)]
    width: Option<f64>,
    #[serde(rename = "@height", default)]
    height: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GlifUnicode {
    #[serde(rename = "@hex")]
    hex: String,
}

#[derive(Debug, Deserialize)]
struct GlifOutline {
    #[serde(rename = "$value", default)]
    entries: Vec<GlifOutlineEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum GlifOutlineEntry {
    Contour(GlifContour),
    Component(GlifComponent),
}

#[derive(Debug, Deserialize)]
struct GlifContour {
    #[serde(default)]
    point: Vec<GlifPoint>,
}

#[derive(Debug, Deserialize)]
struct GlifPoint {
    #[serde(rename = "@x")]
    x: f64,
    #[serde(rename = "@y")]
    y: f64,
    #[serde(rename = "@type", default)]
    tag: GlifPointTag,
    #[serde(
        rename = "@smooth",
        default,
        deserialize_with = "deserialize_smooth"
    )]
    smooth: bool,
}

/// The dialect's point-type strings. An off-curve control point carries no
/// type attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum GlifPointTag {
    Move,
    Line,
    #[default]
    Offcurve,
    Curve,
    Qcurve,
}

#[derive(Debug, Deserialize)]
struct GlifComponent {
    #[serde(rename = "@base")]
    base: String,
    #[serde(rename = "@xScale", default = "one")]
    x_scale: f64,
    #[serde(rename = "@xyScale", default)]
    xy_scale: f64,
    #[serde(rename = "@yxScale", default)]
    yx_scale: f64,
    #[serde(rename = "@yScale", default = "one")]
    y_scale: f64,
    #[serde(rename = "@xOffset", default)]
    x_offset: f64,
    #[serde(rename = "@yOffset", default)]
    y_offset: f64,
}

fn one() -> f64 {
    1.0
}

fn deserialize_smooth<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    match String::deserialize(deserializer)?.as_str() {
        "yes" => Ok(true),
        "no" => Ok(false),
        other => Err(Error::custom(format!(
            "invalid smooth value `{other}`, expected `yes` or `no`"
        ))),
    }
}

fn parse_document(text: &str) -> Result<ParsedGlif, String> {
    let doc: GlifDoc = quick_xml::de::from_str(text).map_err(|e| e.to_string())?;

    let mut contours = Vec::new();
    let mut components = Vec::new();
    for entry in doc.outline.into_iter().flat_map(|o| o.entries) {
        match entry {
            GlifOutlineEntry::Contour(contour) => {
                if let Some(contour) = convert_contour(&contour)? {
                    contours.push(contour);
                }
            }
            GlifOutlineEntry::Component(component) => {
                components.push(convert_component(component));
            }
        }
    }

    let glyph = StaticGlyph {
        path: PackedPath::from_contours(&contours)
            .map_err(|e| format!("unencodable outline: {e}"))?,
        components,
        x_advance: doc.advance.as_ref().and_then(|a| a.width),
        y_advance: doc.advance.as_ref().and_then(|a| a.height),
        vertical_origin: None,
    };
    let unicodes = doc
        .unicode
        .iter()
        .filter_map(|u| u32::from_str_radix(&u.hex, 16).ok())
        .collect();
    Ok(ParsedGlif {
        name: doc.name,
        glyph,
        unicodes,
    })
}

/// Convert one `<contour>`. Empty contours are dropped (`Ok(None)`).
///
/// A contour whose points are all off-curve is the TrueType "no on-curve
/// points" form: fully closed, every point a quadratic control.
fn convert_contour(contour: &GlifContour) -> Result<Option<Contour>, String> {
    let raw = &contour.point;
    if raw.is_empty() {
        return Ok(None);
    }
    let has_on_curve = raw.iter().any(|p| p.tag != GlifPointTag::Offcurve);
    if !has_on_curve {
        let points = raw
            .iter()
            .map(|p| ContourPoint::off_curve_quad(p.x, p.y))
            .collect();
        return Ok(Some(Contour::closed(points)));
    }

    // A contour starting with a move point is open.
    let is_closed = raw[0].tag != GlifPointTag::Move;
    let mut points = Vec::with_capacity(raw.len());
    for (i, point) in raw.iter().enumerate() {
        let typ = match point.tag {
            GlifPointTag::Move | GlifPointTag::Line | GlifPointTag::Curve | GlifPointTag::Qcurve => {
                PointType::OnCurve
            }
            GlifPointTag::Offcurve => classify_off_curve(raw, i)?,
        };
        points.push(ContourPoint {
            x: point.x,
            y: point.y,
            typ,
            smooth: point.smooth && typ.is_on_curve(),
        });
    }
    Ok(Some(Contour { points, is_closed }))
}

/// An off-curve point is quadratic or cubic depending on the segment type of
/// the next on-curve point (wrapping around the contour).
fn classify_off_curve(raw: &[GlifPoint], index: usize) -> Result<PointType, String> {
    for offset in 1..raw.len() {
        let next = &raw[(index + offset) % raw.len()];
        match next.tag {
            GlifPointTag::Offcurve => continue,
            GlifPointTag::Curve => return Ok(PointType::OffCurveCubic),
            GlifPointTag::Qcurve => return Ok(PointType::OffCurveQuad),
            GlifPointTag::Line | GlifPointTag::Move => {
                return Err(format!(
                    "off-curve point {index} is followed by a {:?} point",
                    next.tag
                ))
            }
        }
    }
    unreachable!("caller checked the contour has an on-curve point")
}

fn convert_component(component: GlifComponent) -> Component {
    let affine = Affine::new([
        component.x_scale,
        component.xy_scale,
        component.yx_scale,
        component.y_scale,
        component.x_offset,
        component.y_offset,
    ]);
    Component {
        name: component.base,
        transformation: Transformation::from_affine(affine),
        location: Default::default(),
    }
}

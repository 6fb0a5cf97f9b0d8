//! Packed outline encoding.
//!
//! A glyph outline is stored flat: one array of alternating x,y scalars, a
//! parallel array of per-point type tags, and one boundary descriptor per
//! contour. The packed form is what gets stored and sent over the wire; the
//! unpacked per-contour view ([`Contour`]/[`ContourPoint`]) is what editing
//! and import code works with. The two views round-trip exactly.

use serde::{Serialize, Serializer};

use crate::error::PathError;

/// Per-point type tag in the packed encoding.
///
/// A closed enumeration: downstream consumers switch on it exhaustively.
/// String tags such as `"line"` or `"qcurve"` exist only at format
/// boundaries and are mapped here by the decoders.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointType {
    /// On-curve point, straight corner.
    OnCurve = 0,
    /// Off-curve quadratic control point.
    OffCurveQuad = 1,
    /// Off-curve cubic control point.
    OffCurveCubic = 2,
    /// On-curve point with a smooth (tangent-continuous) connection.
    OnCurveSmooth = 8,
}

impl PointType {
    /// Whether this point lies on the rendered outline.
    pub fn is_on_curve(self) -> bool {
        !matches!(self, PointType::OffCurveQuad | PointType::OffCurveCubic)
    }

    pub fn is_smooth(self) -> bool {
        matches!(self, PointType::OnCurveSmooth)
    }
}

impl TryFrom<u8> for PointType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(PointType::OnCurve),
            1 => Ok(PointType::OffCurveQuad),
            2 => Ok(PointType::OffCurveCubic),
            8 => Ok(PointType::OnCurveSmooth),
            other => Err(other),
        }
    }
}

// Serialized as its numeric value; the wire format stores point types as
// plain integers.
impl Serialize for PointType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Boundary descriptor for one contour in the packed encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContourInfo {
    /// Index (into the point-type array) of the contour's last point.
    pub end_point: usize,
    pub is_closed: bool,
}

/// The canonical packed outline representation.
///
/// Invariants (maintained by [`PackedPath::from_contours`]):
/// `point_types.len() * 2 == coordinates.len()`; contour end-point indices
/// are strictly increasing and the last one equals `point_types.len() - 1`.
/// An empty outline has empty arrays, never absent ones.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedPath {
    pub coordinates: Vec<f64>,
    pub point_types: Vec<PointType>,
    pub contour_info: Vec<ContourInfo>,
}

/// One point of the unpacked per-contour view.
///
/// `typ` is never [`PointType::OnCurveSmooth`] in this view; smoothness is
/// carried by the separate flag and folded into the tag when packing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContourPoint {
    pub x: f64,
    pub y: f64,
    pub typ: PointType,
    pub smooth: bool,
}

impl ContourPoint {
    pub fn new(x: f64, y: f64, typ: PointType) -> Self {
        Self {
            x,
            y,
            typ,
            smooth: false,
        }
    }

    pub fn on_curve(x: f64, y: f64) -> Self {
        Self::new(x, y, PointType::OnCurve)
    }

    pub fn off_curve_quad(x: f64, y: f64) -> Self {
        Self::new(x, y, PointType::OffCurveQuad)
    }

    pub fn off_curve_cubic(x: f64, y: f64) -> Self {
        Self::new(x, y, PointType::OffCurveCubic)
    }

    pub fn with_smooth(mut self, smooth: bool) -> Self {
        if self.typ.is_on_curve() {
            self.smooth = smooth;
        }
        self
    }
}

/// One sub-path of the unpacked view.
#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    pub points: Vec<ContourPoint>,
    pub is_closed: bool,
}

impl Contour {
    pub fn closed(points: Vec<ContourPoint>) -> Self {
        Self {
            points,
            is_closed: true,
        }
    }

    pub fn open(points: Vec<ContourPoint>) -> Self {
        Self {
            points,
            is_closed: false,
        }
    }
}

impl PackedPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.point_types.is_empty()
    }

    /// Pack an ordered list of contours into the flat encoding.
    ///
    /// A zero-point contour is rejected: it cannot be given a well-formed
    /// boundary descriptor. An empty contour list packs to an empty path.
    pub fn from_contours(contours: &[Contour]) -> Result<Self, PathError> {
        let num_points: usize = contours.iter().map(|c| c.points.len()).sum();
        let mut path = PackedPath {
            coordinates: Vec::with_capacity(num_points * 2),
            point_types: Vec::with_capacity(num_points),
            contour_info: Vec::with_capacity(contours.len()),
        };
        for (index, contour) in contours.iter().enumerate() {
            if contour.points.is_empty() {
                return Err(PathError::EmptyContour { index });
            }
            for point in &contour.points {
                path.coordinates.push(point.x);
                path.coordinates.push(point.y);
                let typ = if point.typ.is_on_curve() && (point.smooth || point.typ.is_smooth()) {
                    PointType::OnCurveSmooth
                } else if point.typ.is_on_curve() {
                    PointType::OnCurve
                } else {
                    point.typ
                };
                path.point_types.push(typ);
            }
            path.contour_info.push(ContourInfo {
                end_point: path.point_types.len() - 1,
                is_closed: contour.is_closed,
            });
        }
        Ok(path)
    }

    /// Unpack into the per-contour view. Inverse of [`PackedPath::from_contours`].
    pub fn to_contours(&self) -> Vec<Contour> {
        let mut contours = Vec::with_capacity(self.contour_info.len());
        let mut start = 0;
        for info in &self.contour_info {
            let end = info.end_point + 1;
            let points = (start..end)
                .map(|i| {
                    let typ = self.point_types[i];
                    ContourPoint {
                        x: self.coordinates[i * 2],
                        y: self.coordinates[i * 2 + 1],
                        typ: if typ.is_on_curve() {
                            PointType::OnCurve
                        } else {
                            typ
                        },
                        smooth: typ.is_smooth(),
                    }
                })
                .collect();
            contours.push(Contour {
                points,
                is_closed: info.is_closed,
            });
            start = end;
        }
        contours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn square_contour() -> Contour {
        Contour::closed(vec![
            ContourPoint::on_curve(0.0, 0.0),
            ContourPoint::on_curve(100.0, 0.0),
            ContourPoint::on_curve(100.0, 100.0),
            ContourPoint::on_curve(0.0, 100.0),
        ])
    }

    fn curved_contour() -> Contour {
        Contour::open(vec![
            ContourPoint::on_curve(0.0, 0.0),
            ContourPoint::off_curve_cubic(10.0, 20.0),
            ContourPoint::off_curve_cubic(30.0, 40.0),
            ContourPoint::on_curve(50.0, 50.0).with_smooth(true),
            ContourPoint::off_curve_quad(70.0, 60.0),
            ContourPoint::on_curve(90.0, 50.0),
        ])
    }

    #[test]
    fn pack_square() {
        let path = PackedPath::from_contours(&[square_contour()]).unwrap();
        assert_eq!(
            path.coordinates,
            vec![0.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0, 100.0]
        );
        assert_eq!(path.point_types, vec![PointType::OnCurve; 4]);
        assert_eq!(
            path.contour_info,
            vec![ContourInfo {
                end_point: 3,
                is_closed: true
            }]
        );
    }

    #[test]
    fn smooth_folds_into_point_type() {
        let path = PackedPath::from_contours(&[curved_contour()]).unwrap();
        assert_eq!(path.point_types[3], PointType::OnCurveSmooth);
        assert_eq!(path.point_types[4], PointType::OffCurveQuad);
    }

    #[test]
    fn round_trip() {
        let contours = vec![square_contour(), curved_contour()];
        let path = PackedPath::from_contours(&contours).unwrap();
        assert_eq!(path.to_contours(), contours);
        // Re-packing the unpacked view reproduces the arrays exactly.
        let repacked = PackedPath::from_contours(&path.to_contours()).unwrap();
        assert_eq!(repacked, path);
    }

    #[test]
    fn packed_invariants() {
        let path = PackedPath::from_contours(&[square_contour(), curved_contour()]).unwrap();
        assert_eq!(path.point_types.len() * 2, path.coordinates.len());
        let ends: Vec<usize> = path.contour_info.iter().map(|c| c.end_point).collect();
        assert!(ends.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*ends.last().unwrap(), path.point_types.len() - 1);
    }

    #[test]
    fn empty_contour_list_packs_to_empty_path() {
        let path = PackedPath::from_contours(&[]).unwrap();
        assert!(path.is_empty());
        assert_eq!(path, PackedPath::new());
        assert_eq!(path.to_contours(), vec![]);
    }

    #[test]
    fn zero_point_contour_is_rejected() {
        let contours = vec![square_contour(), Contour::closed(vec![])];
        assert_eq!(
            PackedPath::from_contours(&contours),
            Err(crate::error::PathError::EmptyContour { index: 1 })
        );
    }

    #[test]
    fn point_type_from_bits() {
        assert_eq!(PointType::try_from(0), Ok(PointType::OnCurve));
        assert_eq!(PointType::try_from(8), Ok(PointType::OnCurveSmooth));
        assert_eq!(PointType::try_from(3), Err(3));
    }

    #[test]
    fn serializes_with_wire_names() {
        let path = PackedPath::from_contours(&[square_contour()]).unwrap();
        let value = serde_json::to_value(&path).unwrap();
        assert_eq!(value["pointTypes"], serde_json::json!([0, 0, 0, 0]));
        assert_eq!(value["contourInfo"][0]["endPoint"], 3);
        assert_eq!(value["contourInfo"][0]["isClosed"], true);
    }
}

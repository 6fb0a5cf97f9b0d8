//! Vector-markup (SVG) decoder.
//!
//! Scans the markup for the root element's extent and the first `<path>`
//! element, decodes the path geometry through the standard command grammar
//! (absolute and relative move/line/curve/close), composes the element's
//! `matrix(…)` transform under a y-flip to font coordinates, and infers the
//! advance width from the viewBox.
//!
//! Only the first path element is honored; extra paths are ignored with a
//! log message. This mirrors what the editor's copy operation produces and
//! is a documented limitation, not an oversight.

use kurbo::{Affine, BezPath, PathEl, Point};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use super::DecodeOutcome;
use crate::model::path::{Contour, ContourPoint, PackedPath};
use crate::model::StaticGlyph;

/// Attempt to decode the text as SVG markup.
pub fn decode(text: &str) -> DecodeOutcome {
    if !text.contains("<svg") {
        return DecodeOutcome::NotThisFormat;
    }
    match parse_document(text) {
        Ok(glyph) => DecodeOutcome::Decoded(glyph),
        Err(reason) => DecodeOutcome::Malformed(reason),
    }
}

#[derive(Default)]
struct Scan {
    width: Option<f64>,
    height: Option<f64>,
    view_box: Option<[f64; 4]>,
    geometry: Option<String>,
    transform: Option<String>,
    extra_paths: usize,
}

fn parse_document(text: &str) -> Result<StaticGlyph, String> {
    let scan = scan_markup(text)?;
    if scan.extra_paths > 0 {
        warn!(
            "pasted SVG has {} extra path element(s); only the first is honored",
            scan.extra_paths
        );
    }
    let geometry = scan
        .geometry
        .ok_or_else(|| "no path element with geometry".to_string())?;
    let bez = BezPath::from_svg(&geometry).map_err(|e| format!("bad path geometry: {e}"))?;

    // SVG y points down; flip to font coordinates around the canvas height.
    let height = scan
        .view_box
        .map(|vb| vb[3])
        .or(scan.height)
        .unwrap_or(0.0);
    let flip = Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, height]);
    let transform = match &scan.transform {
        Some(spec) => flip * parse_matrix(spec)?,
        None => flip,
    };

    let mut contours = contours_from_bez(&bez, transform);
    for contour in &mut contours {
        guess_smooth(contour);
    }
    let path =
        PackedPath::from_contours(&contours).map_err(|e| format!("unencodable outline: {e}"))?;

    // The advance is the right edge of the canvas: viewBox x + width, or the
    // width attribute when no viewBox is declared.
    let x_advance = scan.view_box.map(|vb| vb[0] + vb[2]).or(scan.width);

    Ok(StaticGlyph {
        path,
        x_advance,
        ..Default::default()
    })
}

fn scan_markup(text: &str) -> Result<Scan, String> {
    let mut reader = Reader::from_str(text);
    let mut scan = Scan::default();
    let mut saw_root = false;
    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(format!("XML error: {e}")),
        };
        match event {
            Event::Eof => break,
            Event::Start(el) | Event::Empty(el) => match el.local_name().as_ref() {
                b"svg" if !saw_root => {
                    saw_root = true;
                    for attr in el.attributes() {
                        let attr = attr.map_err(|e| format!("bad attribute: {e}"))?;
                        let value = attr
                            .unescape_value()
                            .map_err(|e| format!("bad attribute value: {e}"))?;
                        match attr.key.as_ref() {
                            b"width" => scan.width = Some(parse_length(&value)?),
                            b"height" => scan.height = Some(parse_length(&value)?),
                            b"viewBox" => scan.view_box = Some(parse_view_box(&value)?),
                            _ => {}
                        }
                    }
                }
                b"path" => {
                    if scan.geometry.is_some() {
                        scan.extra_paths += 1;
                        continue;
                    }
                    for attr in el.attributes() {
                        let attr = attr.map_err(|e| format!("bad attribute: {e}"))?;
                        let value = attr
                            .unescape_value()
                            .map_err(|e| format!("bad attribute value: {e}"))?;
                        match attr.key.as_ref() {
                            b"d" => scan.geometry = Some(value.into_owned()),
                            b"transform" => scan.transform = Some(value.into_owned()),
                            _ => {}
                        }
                    }
                    if scan.geometry.is_none() {
                        return Err("path element without a d attribute".into());
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }
    if !saw_root {
        return Err("no svg root element".into());
    }
    Ok(scan)
}

fn parse_length(value: &str) -> Result<f64, String> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_suffix("px").unwrap_or(trimmed);
    trimmed
        .trim()
        .parse()
        .map_err(|_| format!("bad length `{value}`"))
}

fn parse_view_box(value: &str) -> Result<[f64; 4], String> {
    let parts: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(|_| format!("bad viewBox `{value}`")))
        .collect::<Result<_, _>>()?;
    parts
        .try_into()
        .map_err(|_| format!("bad viewBox `{value}`"))
}

/// Parse a `matrix(a b c d e f)` transform attribute.
fn parse_matrix(spec: &str) -> Result<Affine, String> {
    let inner = spec
        .trim()
        .strip_prefix("matrix(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| format!("unsupported transform `{spec}`"))?;
    let coeffs: Vec<f64> = inner
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(|_| format!("bad transform `{spec}`")))
        .collect::<Result<_, _>>()?;
    let coeffs: [f64; 6] = coeffs
        .try_into()
        .map_err(|_| format!("transform `{spec}` needs six values"))?;
    Ok(Affine::new(coeffs))
}

/// Rebuild per-contour points from the decoded path commands, mapping every
/// point through `transform`.
fn contours_from_bez(bez: &BezPath, transform: Affine) -> Vec<Contour> {
    let mut contours = Vec::new();
    let mut points: Vec<ContourPoint> = Vec::new();
    let map = |p: Point| transform * p;

    for el in bez.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                if !points.is_empty() {
                    contours.push(Contour::open(std::mem::take(&mut points)));
                }
                let p = map(p);
                points.push(ContourPoint::on_curve(p.x, p.y));
            }
            PathEl::LineTo(p) => {
                let p = map(p);
                points.push(ContourPoint::on_curve(p.x, p.y));
            }
            PathEl::QuadTo(c, p) => {
                let (c, p) = (map(c), map(p));
                points.push(ContourPoint::off_curve_quad(c.x, c.y));
                points.push(ContourPoint::on_curve(p.x, p.y));
            }
            PathEl::CurveTo(c1, c2, p) => {
                let (c1, c2, p) = (map(c1), map(c2), map(p));
                points.push(ContourPoint::off_curve_cubic(c1.x, c1.y));
                points.push(ContourPoint::off_curve_cubic(c2.x, c2.y));
                points.push(ContourPoint::on_curve(p.x, p.y));
            }
            PathEl::ClosePath => {
                if points.is_empty() {
                    continue;
                }
                // A trailing segment that lands exactly on the start point is
                // the closing segment; the wrapped-around boundary already
                // implies it.
                if points.len() > 1 {
                    let first = points[0];
                    let last = points[points.len() - 1];
                    if last.typ.is_on_curve() && last.x == first.x && last.y == first.y {
                        points.pop();
                    }
                }
                contours.push(Contour::closed(std::mem::take(&mut points)));
            }
        }
    }
    if !points.is_empty() {
        contours.push(Contour::open(points));
    }
    contours
}

/// Tag on-curve points whose neighboring segments meet with a continuous
/// tangent as smooth. Only points adjacent to at least one control point
/// qualify; a corner between two straight lines stays a corner.
fn guess_smooth(contour: &mut Contour) {
    const TANGENT_TOLERANCE: f64 = 0.05;
    let n = contour.points.len();
    if n < 3 {
        return;
    }
    let points = contour.points.clone();
    for (i, point) in contour.points.iter_mut().enumerate() {
        if !point.typ.is_on_curve() {
            continue;
        }
        if !contour.is_closed && (i == 0 || i == n - 1) {
            continue;
        }
        let prev = points[(i + n - 1) % n];
        let next = points[(i + 1) % n];
        if prev.typ.is_on_curve() && next.typ.is_on_curve() {
            continue;
        }
        let incoming = (point.x - prev.x, point.y - prev.y);
        let outgoing = (next.x - point.x, next.y - point.y);
        let norms = incoming.0.hypot(incoming.1) * outgoing.0.hypot(outgoing.1);
        if norms == 0.0 {
            continue;
        }
        let cross = incoming.0 * outgoing.1 - incoming.1 * outgoing.0;
        let dot = incoming.0 * outgoing.0 + incoming.1 * outgoing.1;
        if dot > 0.0 && (cross / norms).abs() < TANGENT_TOLERANCE {
            point.smooth = true;
        }
    }
}

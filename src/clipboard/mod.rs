//! Clipboard import pipeline.
//!
//! Turns externally pasted text into a [`StaticGlyph`], or reports that the
//! text is not a recognized glyph format. Decoders are tried in a fixed
//! order; each one gets the full input and fresh local state, so a failed
//! attempt can never leak partial results into a later one.

pub mod glif;
pub mod svg;

use tracing::debug;

use crate::model::StaticGlyph;

pub use glif::ParsedGlif;

/// Tagged outcome of a single decoder attempt.
#[derive(Debug)]
pub enum DecodeOutcome {
    Decoded(StaticGlyph),
    /// The input does not look like this decoder's dialect at all.
    NotThisFormat,
    /// The input looked like the dialect but violated its structure.
    /// The pipeline treats this exactly like [`DecodeOutcome::NotThisFormat`];
    /// the reason is kept for logging.
    Malformed(String),
}

const DECODERS: [(&str, fn(&str) -> DecodeOutcome); 2] =
    [("SVG", svg::decode), ("GLIF", glif::decode)];

/// Try each known format in order and return the first decoded glyph.
///
/// `None` is the normal outcome for unrecognized clipboard contents;
/// malformed input in either dialect never raises to the caller.
pub fn parse_clipboard(text: &str) -> Option<StaticGlyph> {
    for (format, decode) in DECODERS {
        match decode(text) {
            DecodeOutcome::Decoded(glyph) => return Some(glyph),
            DecodeOutcome::NotThisFormat => {}
            DecodeOutcome::Malformed(reason) => {
                debug!("clipboard text resembles {format} but did not decode: {reason}");
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::path::{ContourInfo, PackedPath, PointType};
    use pretty_assertions::assert_eq;

    fn period_path() -> PackedPath {
        PackedPath {
            coordinates: vec![60.0, 0.0, 110.0, 0.0, 110.0, 120.0, 60.0, 120.0],
            point_types: vec![PointType::OnCurve; 4],
            contour_info: vec![ContourInfo {
                end_point: 3,
                is_closed: true,
            }],
        }
    }

    #[test]
    fn unrecognized_text_gives_no_result() {
        assert!(parse_clipboard("dasasdad").is_none());
        assert!(parse_clipboard("").is_none());
        // Malformed XML in a recognized dialect falls through to "no result"
        // instead of raising.
        assert!(parse_clipboard("<svg><path d=").is_none());
        assert!(parse_clipboard("<?xml version='1.0'?><glyph name=").is_none());
    }

    #[test]
    fn pastes_svg_rectangle() {
        let glyph = parse_clipboard(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"50\" \
             height=\"120\" viewBox=\"60 0 50 120\">\
             <path transform=\"matrix(1 0 0 -1 0 120)\" \
             d=\"M60,0L110,0L110,120L60,120L60,0Z\"/>\
             </svg>",
        )
        .unwrap();
        assert_eq!(glyph.path, period_path());
        assert_eq!(glyph.x_advance, Some(110.0));
        assert_eq!(glyph.y_advance, None);
        assert_eq!(glyph.vertical_origin, None);
        assert!(glyph.components.is_empty());
    }

    #[test]
    fn pastes_glif_document() {
        let glyph = parse_clipboard(
            "<?xml version='1.0' encoding='UTF-8'?>\
             <glyph name=\"period\" format=\"2\">\
               <advance width=\"170\"/>\
               <unicode hex=\"002E\"/>\
               <outline>\
                 <contour>\
                   <point x=\"60\" y=\"0\" type=\"line\"/>\
                   <point x=\"110\" y=\"0\" type=\"line\"/>\
                   <point x=\"110\" y=\"120\" type=\"line\"/>\
                   <point x=\"60\" y=\"120\" type=\"line\"/>\
                 </contour>\
               </outline>\
             </glyph>",
        )
        .unwrap();
        assert_eq!(glyph.path, period_path());
        assert_eq!(glyph.x_advance, Some(170.0));
        assert_eq!(glyph.y_advance, None);
        assert_eq!(glyph.vertical_origin, None);
    }
}

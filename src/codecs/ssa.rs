//! SubStation Alpha v4 (the ASS predecessor): same `[Script Info]`/
//! `[Events]` shape as ASS but a `[V4 Styles]` section and the legacy
//! alignment numbering (spec.md §4.3.2).

use crate::codecs::ass::{parse_with_scheme, serialize_with_scheme, AlignmentScheme};
use crate::codecs::{ParseOptions, ParseResult, SerializeOptions};
use crate::error::SubforgeError;
use crate::model::Document;

const STYLES_SECTION: &str = "V4 Styles";
const SCRIPT_TYPE: &str = "v4.00";

pub fn parse(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    parse_with_scheme(bytes, opts, STYLES_SECTION, AlignmentScheme::LegacySsa)
}

pub fn serialize(doc: &Document, opts: &SerializeOptions) -> String {
    serialize_with_scheme(doc, opts, STYLES_SECTION, SCRIPT_TYPE, AlignmentScheme::LegacySsa)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> &'static str {
        "[Script Info]\nScriptType: v4.00\n\n[V4 Styles]\nFormat: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\nStyle: Default,Arial,20,&HFFFFFF,&H0000FF,&H000000,&H000000,0,0,0,0,100,100,0,0,1,2,2,9,10,10,10,1\n\n[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\nDialogue: 0,0:00:01.00,0:00:05.00,Default,,0,0,0,,Hello\n"
    }

    #[test]
    fn scenario_c_legacy_alignment_nine_maps_to_numpad_seven() {
        let result = parse(sample().as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.styles.get("Default").unwrap().alignment, 7);
    }

    #[test]
    fn round_trip_preserves_legacy_alignment_value() {
        let result = parse(sample().as_bytes(), &ParseOptions::default()).unwrap();
        let out = serialize(&result.document, &SerializeOptions::default());
        assert!(out.contains(",9,10,10,10,1"));
    }

    #[test]
    fn uses_v4_styles_section_name() {
        let out = serialize(&Document::new(), &SerializeOptions::default());
        assert!(out.contains("[V4 Styles]"));
        assert!(!out.contains("[V4+ Styles]"));
    }
}

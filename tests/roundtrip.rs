//! parse . serialize round-trip properties for every text format that
//! carries the full document model, plus the within-1ms round trip the
//! frame-quantized and binary formats are held to instead.

use subforge::codecs::{ParseOptions, SerializeOptions};
use subforge::{facade, FormatId};

fn assert_text_round_trips(format: FormatId, input: &str) {
    let first = facade::parse(input.as_bytes(), format, &ParseOptions::default()).unwrap();
    let count = first.document.events.len();
    assert!(count > 0, "{:?}: fixture produced no events", format);

    let serialized = facade::serialize(&first.document, format, &SerializeOptions::default());
    let second = facade::parse(serialized.into_bytes().as_slice(), format, &ParseOptions::default()).unwrap();

    assert_eq!(second.document.events.len(), count, "{:?}: event count drifted on re-parse", format);
    for (a, b) in first.document.events.iter().zip(second.document.events.iter()) {
        assert_eq!(a.start_ms, b.start_ms, "{:?}: start drifted", format);
        assert_eq!(a.end_ms, b.end_ms, "{:?}: end drifted", format);
        assert_eq!(a.text, b.text, "{:?}: text drifted", format);
    }
}

#[test]
fn srt_round_trips() {
    assert_text_round_trips(FormatId::Srt, "1\n00:00:01,000 --> 00:00:02,000\nHello\n");
}

#[test]
fn vtt_round_trips() {
    assert_text_round_trips(FormatId::Vtt, "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHello\n");
}

#[test]
fn sbv_round_trips() {
    assert_text_round_trips(FormatId::Sbv, "0:00:01.000,0:00:02.000\nHello\n");
}

#[test]
fn lrc_round_trips() {
    assert_text_round_trips(FormatId::Lrc, "[00:01.00]Hello\n[00:02.00]Goodbye\n");
}

#[test]
fn sami_round_trips() {
    assert_text_round_trips(
        FormatId::Sami,
        "<SAMI><BODY><SYNC Start=1000><P Class=ENCC>Hello<SYNC Start=2000><P Class=ENCC>&nbsp;</BODY></SAMI>",
    );
}

#[test]
fn realtext_round_trips() {
    assert_text_round_trips(FormatId::RealText, "<window><time begin=\"1.0\" end=\"2.0\"/>Hello</window>");
}

#[test]
fn ass_round_trips() {
    assert_text_round_trips(
        FormatId::Ass,
        "[Script Info]\nScriptType: v4.00+\n\n[V4+ Styles]\nFormat: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\nStyle: Default,Arial,20,&HFFFFFF,&H0000FF,&H000000,&H000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1\n\n[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\nDialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hello\n",
    );
}

#[test]
fn ssa_round_trips() {
    assert_text_round_trips(
        FormatId::Ssa,
        "[Script Info]\nScriptType: v4.00\n\n[V4 Styles]\nFormat: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\nStyle: Default,Arial,20,&HFFFFFF,&H0000FF,&H000000,&H000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1\n\n[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\nDialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hello\n",
    );
}

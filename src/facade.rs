//! Public entry points: format identification, generic parse/serialize and
//! per-format convenience wrappers (spec.md §6).

use crate::codecs::{self, ParseOptions, ParseResult, SerializeOptions};
use crate::error::{ErrorCode, SubforgeError};
use crate::model::Document;

/// Every subtitle format this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatId {
    Ass,
    Ssa,
    Srt,
    Vtt,
    Sbv,
    Lrc,
    MicroDvd,
    Sami,
    RealText,
    Qt,
    Ttml,
    Scc,
    Cap,
    SpruceStl,
    EbuStl,
    Pac,
    Pgs,
    Dvb,
    VobSub,
    Teletext,
}

impl FormatId {
    pub fn name(self) -> &'static str {
        match self {
            Self::Ass => "ass",
            Self::Ssa => "ssa",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Sbv => "sbv",
            Self::Lrc => "lrc",
            Self::MicroDvd => "microdvd",
            Self::Sami => "sami",
            Self::RealText => "realtext",
            Self::Qt => "qt",
            Self::Ttml => "ttml",
            Self::Scc => "scc",
            Self::Cap => "cap",
            Self::SpruceStl => "spruce_stl",
            Self::EbuStl => "ebu_stl",
            Self::Pac => "pac",
            Self::Pgs => "pgs",
            Self::Dvb => "dvb",
            Self::VobSub => "vobsub",
            Self::Teletext => "teletext",
        }
    }

    /// Formats whose canonical serialization is raw bytes rather than text.
    pub fn is_binary(self) -> bool {
        matches!(self, Self::EbuStl | Self::Pac | Self::Pgs | Self::Dvb | Self::VobSub | Self::Teletext)
    }
}

/// A serializer's output: text formats produce a `String`, bitmap/binary
/// formats produce raw bytes (spec.md §6).
#[derive(Debug, Clone)]
pub enum SerializedOutput {
    Text(String),
    Binary(Vec<u8>),
}

impl SerializedOutput {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(s) => s.into_bytes(),
            Self::Binary(b) => b,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Binary(_) => None,
        }
    }
}

/// Sniff a byte buffer's likely format from its leading content. Formats
/// that require external context to parse correctly (Teletext's page
/// timing, VobSub's paired `.idx`/`.sub`) are never returned here; dispatch
/// to their dedicated entry points explicitly.
pub fn probe(bytes: &[u8]) -> Option<FormatId> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    let trimmed = head.trim_start();
    if trimmed.starts_with("WEBVTT") {
        return Some(FormatId::Vtt);
    }
    if trimmed.starts_with("[Script Info]") {
        return if head.contains("V4+ Styles") { Some(FormatId::Ass) } else { Some(FormatId::Ssa) };
    }
    if trimmed.starts_with("Scenarist_SCC") {
        return Some(FormatId::Scc);
    }
    if trimmed.starts_with("$CaptionMAX") || trimmed.starts_with("$VideoStandard") {
        return Some(FormatId::Cap);
    }
    if trimmed.to_ascii_lowercase().starts_with("<sami") {
        return Some(FormatId::Sami);
    }
    if trimmed.to_ascii_lowercase().contains("<window") {
        return Some(FormatId::RealText);
    }
    if trimmed.starts_with("<?xml") || trimmed.starts_with("<tt") {
        return Some(FormatId::Ttml);
    }
    if bytes.len() >= 11 && (&bytes[3..11] == b"STL25.01" || &bytes[3..11] == b"STL30.01") {
        return Some(FormatId::EbuStl);
    }
    if trimmed.starts_with('{') && trimmed.contains("}{") {
        return Some(FormatId::MicroDvd);
    }
    if trimmed.starts_with('[') && (trimmed[1..].trim_start().chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false)) {
        return Some(FormatId::Lrc);
    }
    if trimmed.contains("-->") {
        return Some(FormatId::Srt);
    }
    None
}

pub fn parse(bytes: &[u8], format: FormatId, opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    match format {
        FormatId::Ass => codecs::ass::parse(bytes, opts),
        FormatId::Ssa => codecs::ssa::parse(bytes, opts),
        FormatId::Srt => codecs::srt::parse(bytes, opts),
        FormatId::Vtt => codecs::vtt::parse(bytes, opts),
        FormatId::Sbv => codecs::sbv::parse(bytes, opts),
        FormatId::Lrc => codecs::lrc::parse(bytes, opts),
        FormatId::MicroDvd => codecs::microdvd::parse(bytes, opts, 25.0),
        FormatId::Sami => codecs::sami::parse(bytes, opts),
        FormatId::RealText => codecs::realtext::parse(bytes, opts),
        FormatId::Qt => codecs::qt::parse(bytes, opts),
        FormatId::Ttml => codecs::ttml::parse(bytes, opts),
        FormatId::Scc => codecs::scc::parse(bytes, opts),
        FormatId::Cap => codecs::cap::parse(bytes, opts),
        FormatId::SpruceStl => codecs::spruce_stl::parse(bytes, opts, 25.0),
        FormatId::EbuStl => codecs::ebu_stl::parse(bytes, opts),
        FormatId::Pac => codecs::pac::parse(bytes, opts),
        FormatId::Pgs => codecs::pgs::parse(bytes, opts),
        FormatId::Dvb => codecs::dvb::parse(bytes, opts),
        FormatId::VobSub => Err(SubforgeError::new(
            ErrorCode::MissingField,
            "VobSub requires both .idx and .sub data; use codecs::vobsub::parse directly",
        )),
        FormatId::Teletext => Err(SubforgeError::new(
            ErrorCode::MissingField,
            "Teletext requires an external page timing map; use codecs::teletext::parse directly",
        )),
    }
}

pub fn serialize(doc: &Document, format: FormatId, opts: &SerializeOptions) -> SerializedOutput {
    match format {
        FormatId::Ass => SerializedOutput::Text(codecs::ass::serialize(doc, opts)),
        FormatId::Ssa => SerializedOutput::Text(codecs::ssa::serialize(doc, opts)),
        FormatId::Srt => SerializedOutput::Text(codecs::srt::serialize(doc, opts)),
        FormatId::Vtt => SerializedOutput::Text(codecs::vtt::serialize(doc, opts)),
        FormatId::Sbv => SerializedOutput::Text(codecs::sbv::serialize(doc, opts)),
        FormatId::Lrc => SerializedOutput::Text(codecs::lrc::serialize(doc, opts)),
        FormatId::MicroDvd => SerializedOutput::Text(codecs::microdvd::serialize(doc, opts)),
        FormatId::Sami => SerializedOutput::Text(codecs::sami::serialize(doc, opts)),
        FormatId::RealText => SerializedOutput::Text(codecs::realtext::serialize(doc, opts)),
        FormatId::Qt => SerializedOutput::Text(codecs::qt::serialize(doc, opts)),
        FormatId::Ttml => SerializedOutput::Text(codecs::ttml::serialize(doc, opts)),
        FormatId::Scc => SerializedOutput::Text(codecs::scc::serialize(doc, opts)),
        FormatId::Cap => SerializedOutput::Text(codecs::cap::serialize(doc, opts)),
        FormatId::SpruceStl => SerializedOutput::Text(codecs::spruce_stl::serialize(doc, opts)),
        FormatId::EbuStl => SerializedOutput::Binary(codecs::ebu_stl::serialize(doc, opts)),
        FormatId::Pac => SerializedOutput::Binary(codecs::pac::serialize(doc, opts)),
        FormatId::Pgs => SerializedOutput::Binary(codecs::pgs::serialize(doc)),
        FormatId::Dvb => SerializedOutput::Binary(codecs::dvb::serialize(doc)),
        // VobSub's canonical output is a paired .idx/.sub file, which doesn't
        // fit a single byte buffer; this returns only the .sub bytes. Use
        // `to_vobsub` to get the .idx text alongside it.
        FormatId::VobSub => SerializedOutput::Binary(codecs::vobsub::serialize(doc).1),
        FormatId::Teletext => SerializedOutput::Binary(codecs::teletext::serialize(doc, opts)),
    }
}

macro_rules! text_format_fns {
    ($($parse_fn:ident, $to_fn:ident => $module:ident);* $(;)?) => {
        $(
            pub fn $parse_fn(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
                codecs::$module::parse(bytes, opts)
            }
            pub fn $to_fn(doc: &Document, opts: &SerializeOptions) -> String {
                codecs::$module::serialize(doc, opts)
            }
        )*
    };
}

text_format_fns! {
    parse_ass, to_ass => ass;
    parse_ssa, to_ssa => ssa;
    parse_srt, to_srt => srt;
    parse_vtt, to_vtt => vtt;
    parse_sbv, to_sbv => sbv;
    parse_lrc, to_lrc => lrc;
    parse_sami, to_sami => sami;
    parse_realtext, to_realtext => realtext;
    parse_qt, to_qt => qt;
    parse_ttml, to_ttml => ttml;
    parse_scc, to_scc => scc;
    parse_cap, to_cap => cap;
}

pub fn parse_ebu_stl(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    codecs::ebu_stl::parse(bytes, opts)
}
pub fn to_ebu_stl(doc: &Document, opts: &SerializeOptions) -> Vec<u8> {
    codecs::ebu_stl::serialize(doc, opts)
}

pub fn parse_pac(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    codecs::pac::parse(bytes, opts)
}
pub fn to_pac(doc: &Document, opts: &SerializeOptions) -> Vec<u8> {
    codecs::pac::serialize(doc, opts)
}

pub fn parse_pgs(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    codecs::pgs::parse(bytes, opts)
}
pub fn to_pgs(doc: &Document) -> Vec<u8> {
    codecs::pgs::serialize(doc)
}

pub fn parse_dvb(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    codecs::dvb::parse(bytes, opts)
}
pub fn to_dvb(doc: &Document) -> Vec<u8> {
    codecs::dvb::serialize(doc)
}

pub fn parse_microdvd(bytes: &[u8], opts: &ParseOptions, fps: f64) -> Result<ParseResult, SubforgeError> {
    codecs::microdvd::parse(bytes, opts, fps)
}
pub fn to_microdvd(doc: &Document, opts: &SerializeOptions) -> String {
    codecs::microdvd::serialize(doc, opts)
}

pub fn parse_spruce_stl(bytes: &[u8], opts: &ParseOptions, fps: f64) -> Result<ParseResult, SubforgeError> {
    codecs::spruce_stl::parse(bytes, opts, fps)
}
pub fn to_spruce_stl(doc: &Document, opts: &SerializeOptions) -> String {
    codecs::spruce_stl::serialize(doc, opts)
}

pub fn parse_vobsub(idx_text: &str, sub_bytes: &[u8], opts: &ParseOptions) -> Result<Document, SubforgeError> {
    codecs::vobsub::parse(idx_text, sub_bytes, opts)
}
/// Returns `(idx_text, sub_bytes)`: VobSub's two halves.
pub fn to_vobsub(doc: &Document) -> (String, Vec<u8>) {
    codecs::vobsub::serialize(doc)
}

pub fn parse_teletext(
    bytes: &[u8],
    opts: &ParseOptions,
    page_timing: Option<&[codecs::teletext::PageTiming]>,
) -> Result<ParseResult, SubforgeError> {
    codecs::teletext::parse(bytes, opts, page_timing)
}

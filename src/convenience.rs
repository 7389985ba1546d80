//! Filesystem convenience pair (spec.md §2.4/§9): thin `std::fs` wrappers
//! kept from the teacher's `vsg_core::subtitles::{parse_file, write_file}`.
//! The engine itself never touches a filesystem; these two functions are
//! the "outer layer" spec.md §1 says a host would normally own, present
//! only because the teacher already ships the equivalent as a tested
//! convenience.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::codecs::{ParseOptions, ParseResult, SerializeOptions};
use crate::facade::{self, FormatId};
use crate::model::Document;

#[derive(Debug, Error)]
pub enum ConvenienceError {
    #[error("failed to read '{path}': {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to write '{path}': {source}")]
    Write { path: String, source: std::io::Error },
    #[error("unrecognized subtitle format for '{path}'")]
    UnknownFormat { path: String },
    #[error(transparent)]
    Parse(#[from] crate::error::SubforgeError),
}

fn format_from_extension(path: &Path) -> Option<FormatId> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "ass" => FormatId::Ass,
        "ssa" => FormatId::Ssa,
        "srt" => FormatId::Srt,
        "vtt" => FormatId::Vtt,
        "sbv" => FormatId::Sbv,
        "lrc" => FormatId::Lrc,
        "smi" | "sami" => FormatId::Sami,
        "rt" => FormatId::RealText,
        "qt" => FormatId::Qt,
        "ttml" | "dfxp" => FormatId::Ttml,
        "scc" => FormatId::Scc,
        "cap" => FormatId::Cap,
        "stl" => FormatId::EbuStl,
        "pac" => FormatId::Pac,
        _ => return None,
    })
}

/// Read a subtitle file from disk, detecting its format from the extension
/// and falling back to content sniffing ([`facade::probe`]). Binary formats
/// that need external context (VobSub, Teletext) are not handled here; call
/// their dedicated `facade` functions directly.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParseResult, ConvenienceError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| ConvenienceError::Read { path: path.display().to_string(), source: e })?;

    let format = format_from_extension(path)
        .or_else(|| facade::probe(&bytes))
        .ok_or_else(|| ConvenienceError::UnknownFormat { path: path.display().to_string() })?;

    Ok(facade::parse(&bytes, format, &ParseOptions::default())?)
}

/// Write a document to disk, deriving the format from the output path's
/// extension.
pub fn write_file(doc: &Document, path: impl AsRef<Path>) -> Result<(), ConvenienceError> {
    let path = path.as_ref();
    let format = format_from_extension(path)
        .ok_or_else(|| ConvenienceError::UnknownFormat { path: path.display().to_string() })?;

    let output = facade::serialize(doc, format, &SerializeOptions::default());
    fs::write(path, output.into_bytes()).map_err(|e| ConvenienceError::Write { path: path.display().to_string(), source: e })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_srt_through_a_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.srt");
        fs::write(&path, "1\n00:00:01,000 --> 00:00:02,000\nHello\n").unwrap();

        let result = parse_file(&path).unwrap();
        assert_eq!(result.document.events.len(), 1);

        let out_path = dir.path().join("out.srt");
        write_file(&result.document, &out_path).unwrap();
        let roundtripped = parse_file(&out_path).unwrap();
        assert_eq!(roundtripped.document.events[0].text, "Hello");
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.xyz");
        fs::write(&path, "whatever").unwrap();
        assert!(parse_file(&path).is_err());
    }
}

//! The codec protocol (spec.md §4.3) and the per-format implementations.

pub mod ass;
pub mod cap;
pub mod dvb;
pub mod ebu_stl;
pub mod lrc;
pub mod microdvd;
pub mod pac;
pub mod pgs;
pub mod qt;
pub mod realtext;
pub mod sami;
pub mod sbv;
pub mod scc;
pub mod spruce_stl;
pub mod srt;
pub mod ssa;
pub mod teletext;
pub mod ttml;
pub mod vobsub;
pub mod vtt;

use crate::error::{OnError, SubforgeError, Warning};
use crate::model::Document;
use crate::primitives::Encoding;

/// Options shared by every text-format parser, plus per-format extensions
/// carried in their own parse functions (MicroDVD `fps`, Spruce STL
/// `frame_rate`, CAP header overrides, etc.).
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub on_error: OnError,
    pub strict: bool,
    pub encoding: Option<Encoding>,
    pub preserve_order: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            on_error: OnError::default(),
            strict: false,
            encoding: None,
            preserve_order: true,
        }
    }
}

/// Options shared by every serializer.
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    pub fps: Option<f64>,
    pub video_standard: Option<String>,
    pub character_set: Option<String>,
    pub include_metadata: bool,
    pub use_centiseconds: bool,
    pub offset_ms: i64,
    pub include_head: bool,
}

/// The result of a codec `parse` call: a best-effort document plus any
/// errors/warnings accumulated along the way.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub document: Document,
    pub errors: Vec<SubforgeError>,
    pub warnings: Vec<Warning>,
    /// `false` when a fatal `INVALID_FORMAT` error aborted the parse before
    /// any events were recovered.
    pub ok: bool,
}

impl ParseResult {
    pub fn ok(document: Document) -> Self {
        Self { document, errors: Vec::new(), warnings: Vec::new(), ok: true }
    }

    pub fn failed(document: Document, error: SubforgeError) -> Self {
        Self { document, errors: vec![error], warnings: Vec::new(), ok: false }
    }
}

/// Dispatch a recoverable error per `onError` policy. Returns `Err` only
/// when the policy is `throw`.
pub(crate) fn handle_error(
    opts: &ParseOptions,
    errors: &mut Vec<SubforgeError>,
    error: SubforgeError,
) -> Result<bool, SubforgeError> {
    match opts.on_error {
        OnError::Throw => Err(error),
        OnError::Skip => Ok(false),
        OnError::Collect => {
            errors.push(error);
            Ok(true)
        }
    }
}

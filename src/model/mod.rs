//! The normalized document model: script info, styles, events, segments,
//! effects and the invariants spec.md §3 defines over them.

pub mod document;
pub mod event;
pub mod region;
pub mod segment;
pub mod style;

pub use document::{Document, EmbeddedBlob, ScriptInfo, StyleMap, WrapStyle};
pub use event::{Comment, Event, Image, Sidecar};
pub use region::{ScrollMode, VttRegion};
pub use segment::{ClipRect, Effect, InlineStyle, KaraokeMode, TextSegment};
pub use style::{BorderStyle, Style};

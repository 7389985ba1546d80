//! Inline-markup parsing and serialization for every text-tag dialect the
//! engine understands: ASS override blocks, HTML-like tags (SRT/WebVTT/
//! SAMI) and MicroDVD `{tag:value}` blocks.

pub mod ass;
pub mod html;
pub mod microdvd;

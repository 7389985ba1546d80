//! Leaf-level primitives shared by every codec: timecodes, color, and byte
//! encoding detection. No primitive depends on the document model.

pub mod codepage;
pub mod color;
pub mod encoding;
pub mod timecode;

pub use color::AbgrColor;
pub use encoding::Encoding;

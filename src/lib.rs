//! Subforge - universal subtitle engine.
//!
//! Parses, edits and converts between the text and bitmap subtitle formats
//! listed in spec.md §4.3 through one normalized [`model::Document`].

pub mod binary;
pub mod codecs;
pub mod convenience;
pub mod convert;
pub mod error;
pub mod facade;
pub mod id;
pub mod model;
pub mod ops;
pub mod primitives;
pub mod tags;

pub use error::{ErrorCode, OnError, SubforgeError, Warning};
pub use facade::{parse, probe, serialize, FormatId};
pub use model::Document;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}

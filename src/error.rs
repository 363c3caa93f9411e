//! Error types shared by the text-format parsers.

use thiserror::Error;

/// A hard failure while reading a mesh or material document.
///
/// Every variant carries the 1-based line number and the trimmed text of the
/// offending record so the caller can point at the exact spot in the asset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("line {line}: face references position {index} but only {available} positions are declared: `{text}`")]
    FaceIndexOutOfRange {
        line: usize,
        index: i64,
        available: usize,
        text: String,
    },

    #[error("line {line}: malformed face reference `{reference}`: `{text}`")]
    MalformedFaceReference {
        line: usize,
        reference: String,
        text: String,
    },

    #[error("line {line}: `{value}` is not a number: `{text}`")]
    MalformedNumber {
        line: usize,
        value: String,
        text: String,
    },

    #[error("line {line}: record is missing its {field}: `{text}`")]
    MissingField {
        line: usize,
        field: &'static str,
        text: String,
    },
}

impl ParseError {
    /// Line (1-based) the error was raised on.
    pub fn line(&self) -> usize {
        match self {
            ParseError::FaceIndexOutOfRange { line, .. }
            | ParseError::MalformedFaceReference { line, .. }
            | ParseError::MalformedNumber { line, .. }
            | ParseError::MissingField { line, .. } => *line,
        }
    }
}

//! Line-record tokenizer shared by the mesh and material parsers.

use crate::error::ParseError;

/// Splits a document into `(line_number, keyword, arguments)` records.
///
/// Blank lines and `#` comments are skipped. Both parsers share this tokenizer.
pub(crate) fn records(text: &str) -> impl Iterator<Item = Record<'_>> {
    text.lines().enumerate().filter_map(|(idx, raw)| {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        let mut parts = trimmed.split_whitespace();
        let keyword = parts.next()?;
        Some(Record {
            line: idx + 1,
            text: trimmed,
            keyword,
            args: parts.collect(),
        })
    })
}

pub(crate) struct Record<'a> {
    pub line: usize,
    pub text: &'a str,
    pub keyword: &'a str,
    pub args: Vec<&'a str>,
}

impl<'a> Record<'a> {
    pub fn missing(&self, field: &'static str) -> ParseError {
        ParseError::MissingField {
            line: self.line,
            field,
            text: self.text.to_string(),
        }
    }

    /// First argument, e.g. the name in `o name` or `newmtl name`.
    pub fn name(&self, field: &'static str) -> Result<&'a str, ParseError> {
        self.args.first().copied().ok_or_else(|| self.missing(field))
    }

    /// Parses the first `N` arguments as floats.
    pub fn floats<const N: usize>(&self, field: &'static str) -> Result<[f32; N], ParseError> {
        self.padded_floats(N, field)
    }

    /// Like [`Record::floats`], but only the first `required` arguments must be
    /// present. Absent trailing components are `0.0`.
    pub fn padded_floats<const N: usize>(
        &self,
        required: usize,
        field: &'static str,
    ) -> Result<[f32; N], ParseError> {
        if self.args.len() < required.min(N) {
            return Err(self.missing(field));
        }
        let mut out = [0.0; N];
        for (slot, value) in out.iter_mut().zip(&self.args) {
            *slot = value.parse().map_err(|_| ParseError::MalformedNumber {
                line: self.line,
                value: value.to_string(),
                text: self.text.to_string(),
            })?;
        }
        Ok(out)
    }
}

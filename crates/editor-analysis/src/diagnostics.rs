//! Diagnostics data model.
//!
//! Engines report diagnostics as character-offset spans. Hosts want gutter annotations and
//! coordinate ranges, so [`Diagnostic::to_annotation`] converts through a
//! [`PositionTranslator`].

use crate::position::{PositionTranslator, Range};
use serde::{Deserialize, Serialize};

/// A half-open character-offset range (`start..end`) in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRange {
    /// Range start offset (inclusive), in Unicode scalar values (`char`) from the start of the document.
    pub start: usize,
    /// Range end offset (exclusive), in Unicode scalar values (`char`) from the start of the document.
    pub end: usize,
}

impl DiagnosticRange {
    /// Create a new diagnostic range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Error diagnostics.
    #[default]
    Error,
    /// Warning diagnostics.
    Warning,
    /// Informational diagnostics.
    Info,
}

/// A single diagnostic reported by an analysis engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic range in character offsets.
    pub range: DiagnosticRange,
    /// Severity.
    pub severity: DiagnosticSeverity,
    /// Message text.
    pub message: String,
    /// Optional engine-specific code.
    pub code: Option<u32>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(start: usize, end: usize, message: impl Into<String>) -> Self {
        Self {
            range: DiagnosticRange::new(start, end),
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            code: None,
        }
    }

    /// Coordinate range of the diagnostic.
    pub fn coordinate_range(&self, translator: &impl PositionTranslator) -> Range {
        translator.to_range(self.range.start, self.range.end)
    }

    /// Convert to a gutter annotation anchored at the diagnostic's start.
    pub fn to_annotation(&self, translator: &impl PositionTranslator) -> Annotation {
        let start = translator.to_coordinate(self.range.start);
        Annotation {
            row: start.row,
            column: start.column,
            text: self.message.clone(),
            min_char: self.range.start,
            lim_char: self.range.end,
            kind: self.severity,
        }
    }
}

/// Host-facing gutter annotation.
///
/// Serializes as `{row, column, text, minChar, limChar, type}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Row of the diagnostic start.
    pub row: usize,
    /// Column of the diagnostic start.
    pub column: usize,
    /// Message text.
    pub text: String,
    /// Start offset.
    pub min_char: usize,
    /// End offset.
    pub lim_char: usize,
    /// Severity, serialized as `type`.
    #[serde(rename = "type")]
    pub kind: DiagnosticSeverity,
}

impl Annotation {
    /// Coordinate range covered by the annotation.
    pub fn range(&self, translator: &impl PositionTranslator) -> Range {
        translator.to_range(self.min_char, self.lim_char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use crate::position::Coordinate;

    #[test]
    fn test_to_annotation() {
        let buffer = Buffer::from_lines(["let a = 1;", "a +;"]);
        let diagnostic = Diagnostic::error(13, 14, "Expression expected.");
        let annotation = diagnostic.to_annotation(&buffer);
        assert_eq!(annotation.row, 1);
        assert_eq!(annotation.column, 2);
        assert_eq!(annotation.kind, DiagnosticSeverity::Error);
        assert_eq!(
            annotation.range(&buffer),
            Range::new(Coordinate::new(1, 2), Coordinate::new(1, 3))
        );
    }

    #[test]
    fn test_annotation_json_shape() {
        let annotation = Annotation {
            row: 0,
            column: 1,
            text: "x".to_string(),
            min_char: 1,
            lim_char: 2,
            kind: DiagnosticSeverity::Error,
        };
        let value = serde_json::to_value(&annotation).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "row": 0, "column": 1, "text": "x", "minChar": 1, "limChar": 2, "type": "error"
            })
        );
    }
}

#![warn(missing_docs)]
//! Editor Analysis - headless buffer/offset synchronization for language-analysis engines
//!
//! # Overview
//!
//! `editor-analysis` keeps a flat, offset-addressed copy of an editor buffer (the
//! [`MirroredDocument`]) in lock step with a line-oriented [`Buffer`], so that an analysis engine
//! can be queried with character offsets while the host editor keeps thinking in rows and
//! columns.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Edit Events (insert/remove text or lines)  │  ← Host buffer mutations
//! ├─────────────────────────────────────────────┤
//! │  Position Translator (Coordinate ⇄ Offset)  │  ← Pure per-call conversion
//! ├─────────────────────────────────────────────┤
//! │  Text Edits + Change Ranges                 │  ← Offset-addressed deltas
//! ├─────────────────────────────────────────────┤
//! │  Mirrored Document (Rope + version history) │  ← Engine-side text
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use editor_analysis::{Buffer, Coordinate, MirroredDocument, PositionTranslator, TextEdit};
//!
//! let mut buffer = Buffer::from_lines(["abc", "def"]);
//! let mut mirror = MirroredDocument::from_text(&buffer.text());
//!
//! buffer.insert_text(Coordinate::new(0, 1), "X");
//! let start = buffer.to_offset(Coordinate::new(0, 1));
//! mirror.edit(&TextEdit::insert(start, "X")).unwrap();
//!
//! assert_eq!(mirror.text(), "aXbc\ndef");
//! assert_eq!(mirror.version(), 2);
//! ```
//!
//! # Module Description
//!
//! - [`position`] - coordinates, ranges and offset translation
//! - [`buffer`] - line buffer emitting one edit event per mutation
//! - [`event`] - edit event model (JSON-compatible)
//! - [`delta`] - offset edits, change ranges, batch application
//! - [`mirror`] - rope-backed mirrored document with version history
//! - [`markers`] - coordinate-ranged marker bookkeeping
//! - [`diagnostics`] - offset diagnostics and host annotations
//! - [`line_ending`] - newline normalization

pub mod buffer;
pub mod delta;
pub mod diagnostics;
pub mod event;
pub mod line_ending;
pub mod markers;
pub mod mirror;
pub mod position;

pub use buffer::Buffer;
pub use delta::{
    EditError, TextChangeRange, TextEdit, TextSpan, apply_edits, normalize_edits,
};
pub use diagnostics::{Annotation, Diagnostic, DiagnosticRange, DiagnosticSeverity};
pub use event::{EditAction, EditEvent, EventError};
pub use line_ending::{LineEnding, normalize_newlines};
pub use markers::{Marker, MarkerClass, MarkerId, MarkerSet};
pub use mirror::{EditRecord, MirroredDocument};
pub use position::{
    Coordinate, PositionError, PositionTranslator, Range, coordinate_of, line_col_to_offset,
    offset_of, offset_to_zero_based_line_col, sum_lengths, try_coordinate_of, try_offset_of,
};

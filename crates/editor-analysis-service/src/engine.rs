//! The analysis engine seam.
//!
//! An [`AnalysisEngine`] owns named documents (mirrored text) and answers offset-addressed
//! questions about them. Everything on the editor side of the seam talks in [`Coordinate`]s and
//! converts through a [`PositionTranslator`](editor_analysis::PositionTranslator) before calling
//! in; nothing here inspects engine internals.
//!
//! [`Coordinate`]: editor_analysis::Coordinate

use crate::error::EngineError;
use editor_analysis::{Diagnostic, TextEdit, TextSpan};
use editor_analysis_lang::EditorOptions;
use serde::{Deserialize, Serialize};

/// A single completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEntry {
    /// Inserted name.
    pub name: String,
    /// Coarse kind (`"function"`, `"var"`, `"class"`, ...).
    pub kind: String,
    /// Type text shown next to the name (may be empty).
    #[serde(rename = "type")]
    pub type_text: String,
}

impl CompletionEntry {
    /// Create an entry.
    pub fn new(name: impl Into<String>, kind: impl Into<String>, type_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            type_text: type_text.into(),
        }
    }
}

/// Completion candidates at one offset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompletionInfo {
    /// Whether the engine answered a member (`a.b`) completion.
    pub is_member_completion: bool,
    /// Candidates, unordered.
    pub entries: Vec<CompletionEntry>,
}

/// The name (or overload list) describing a symbol's type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemberName {
    /// Plain text description, if the symbol has a single printable form.
    pub text: Option<String>,
    /// One entry per overload / signature.
    pub entries: Vec<String>,
}

/// Type information for the symbol at an offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Printable type.
    pub member_name: MemberName,
    /// Start of the symbol the type belongs to.
    pub min_char: usize,
    /// End of the symbol the type belongs to.
    pub lim_char: usize,
}

/// Signature help at an offset inside a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureInfo {
    /// Callee name.
    pub name: String,
    /// Zero-based index of the argument the offset is in.
    pub active_formal: usize,
}

/// One occurrence (or reference) of a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// Document the occurrence is in.
    pub file_name: String,
    /// Start offset.
    pub min_char: usize,
    /// End offset.
    pub lim_char: usize,
    /// Whether the occurrence assigns to the symbol.
    pub is_write_access: bool,
    /// Span of the symbol's declared name, when the declaration is known.
    pub declaration: Option<TextSpan>,
}

/// A declaration reached from a use site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionInfo {
    /// Document that declares the symbol.
    pub file_name: String,
    /// Start offset of the declared name.
    pub min_char: usize,
    /// End offset of the declared name.
    pub lim_char: usize,
    /// Declaration kind.
    pub kind: String,
    /// Declared name.
    pub name: String,
}

/// A declaration matched by a navigate-to search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigateToItem {
    /// Declared name.
    pub name: String,
    /// Declaration kind.
    pub kind: String,
    /// Declaring document.
    pub file_name: String,
    /// Start offset of the declared name.
    pub min_char: usize,
    /// End offset of the declared name.
    pub lim_char: usize,
}

/// A language-analysis backend.
///
/// Implementations must apply edits atomically: a failing [`AnalysisEngine::apply_edit`] leaves
/// the document untouched.
pub trait AnalysisEngine {
    /// Register `id` with `text`, replacing any previous content.
    fn register_document(&mut self, id: &str, text: &str);

    /// Returns `true` if a document is registered under `id`.
    fn has_document(&self, id: &str) -> bool;

    /// Current text of `id`.
    fn document_text(&self, id: &str) -> Option<String>;

    /// Apply an offset-addressed edit to `id`.
    fn apply_edit(&mut self, id: &str, edit: &TextEdit) -> Result<(), EngineError>;

    /// Register a read-only library source visible to every document.
    fn add_library(&mut self, name: &str, text: &str);

    /// Completion candidates at `offset`.
    fn completions_at(
        &self,
        id: &str,
        offset: usize,
        is_member_completion: bool,
    ) -> Result<Option<CompletionInfo>, EngineError>;

    /// Type of the symbol at `offset`.
    fn type_at(&self, id: &str, offset: usize) -> Result<Option<TypeInfo>, EngineError>;

    /// Signature help at `offset`.
    fn signature_at(&self, id: &str, offset: usize) -> Result<Option<SignatureInfo>, EngineError>;

    /// Occurrences of the symbol at `offset` within `id`.
    fn occurrences_at(&self, id: &str, offset: usize) -> Result<Vec<ReferenceEntry>, EngineError>;

    /// References to the symbol at `offset` across every registered document.
    fn references_at(&self, id: &str, offset: usize) -> Result<Vec<ReferenceEntry>, EngineError>;

    /// Declarations of the symbol at `offset`.
    fn definition_at(&self, id: &str, offset: usize) -> Result<Vec<DefinitionInfo>, EngineError>;

    /// Declarations whose name contains `query` (case-insensitive).
    fn navigate_to(&self, query: &str) -> Vec<NavigateToItem>;

    /// Diagnostics for `id`.
    fn diagnostics(&self, id: &str) -> Result<Vec<Diagnostic>, EngineError>;

    /// Indentation width the engine suggests for `line` (zero-based).
    fn smart_indent(
        &self,
        id: &str,
        line: usize,
        options: &EditorOptions,
    ) -> Result<usize, EngineError>;
}

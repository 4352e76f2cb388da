//! Completion requests and the completion popup state machine.
//!
//! Two pieces:
//!
//! - [`completion_request`]: works out what the user is completing at a cursor (the typed prefix,
//!   whether it follows a member trigger such as `.`) and the offset to ask the engine at.
//! - [`AutoComplete`]: headless popup state: the filtered candidate list, the focused item,
//!   and how it reacts to edits, dismiss keys and acceptance.

use crate::engine::{AnalysisEngine, CompletionEntry};
use crate::error::EngineError;
use editor_analysis::{Buffer, Coordinate, EditEvent, PositionTranslator, Range};
use editor_analysis_lang::CompletionSyntax;

/// What to ask the engine for at a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Offset passed to the engine.
    pub offset: usize,
    /// Identifier characters typed before the cursor.
    pub prefix: String,
    /// Whether the prefix follows the member trigger.
    pub is_member_completion: bool,
}

/// Build the completion request for `cursor`.
///
/// For member completion (`foo.ba|`) the offset is moved back to just after the trigger so the
/// engine sees the member access; otherwise the cursor offset is used as is.
pub fn completion_request(
    buffer: &Buffer,
    cursor: Coordinate,
    syntax: &CompletionSyntax,
) -> CompletionRequest {
    let cursor = buffer.clamp(cursor);
    let line = buffer.line(cursor.row).unwrap_or_default();
    let before: String = line.chars().take(cursor.column).collect();
    let prefix = syntax.identifier_suffix(&before);
    let head = &before[..before.len() - prefix.len()];
    let is_member_completion = head.ends_with(syntax.member_trigger);

    let mut offset = buffer.to_offset(cursor);
    if is_member_completion {
        offset -= prefix.chars().count();
    }

    CompletionRequest {
        offset,
        prefix: prefix.to_string(),
        is_member_completion,
    }
}

/// Keep entries starting with `prefix` (case-insensitive) and order them: entries matching the
/// prefix with exact case first, then by name.
pub fn filter_and_sort(entries: Vec<CompletionEntry>, prefix: &str) -> Vec<CompletionEntry> {
    let lowered = prefix.to_lowercase();
    let mut entries: Vec<CompletionEntry> = if prefix.is_empty() {
        entries
    } else {
        entries
            .into_iter()
            .filter(|entry| entry.name.to_lowercase().starts_with(&lowered))
            .collect()
    };
    entries.sort_by(|a, b| {
        let a_exact = a.name.starts_with(prefix);
        let b_exact = b.name.starts_with(prefix);
        b_exact.cmp(&a_exact).then_with(|| a.name.cmp(&b.name))
    });
    entries
}

/// Ask `engine` for completions at `cursor` and return the request plus the filtered, ordered
/// candidates.
pub fn fetch_completions<E: AnalysisEngine + ?Sized>(
    engine: &E,
    document_id: &str,
    buffer: &Buffer,
    cursor: Coordinate,
    syntax: &CompletionSyntax,
) -> Result<(CompletionRequest, Vec<CompletionEntry>), EngineError> {
    let request = completion_request(buffer, cursor, syntax);
    let info = engine.completions_at(document_id, request.offset, request.is_member_completion)?;
    let entries = info.map(|info| info.entries).unwrap_or_default();
    let entries = filter_and_sort(entries, &request.prefix);
    Ok((request, entries))
}

/// How an open popup reacts to a buffer change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTarget {
    /// Re-query completions at this cursor.
    Query(Coordinate),
    /// Close the popup.
    Deactivate,
}

/// Buffer edit that accepting a completion performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEdit {
    /// The typed prefix, to be removed.
    pub replace: Range,
    /// Text inserted at `replace.start`.
    pub text: String,
}

/// Headless completion popup state.
#[derive(Debug, Clone, Default)]
pub struct AutoComplete {
    active: bool,
    prefix: String,
    items: Vec<CompletionEntry>,
    selected: usize,
}

impl AutoComplete {
    /// Create an inactive popup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while the popup is open.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current candidates.
    pub fn items(&self) -> &[CompletionEntry] {
        &self.items
    }

    /// The typed prefix the candidates were filtered with.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Index of the focused candidate.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The focused candidate.
    pub fn selected(&self) -> Option<&CompletionEntry> {
        self.items.get(self.selected)
    }

    /// Open (or refresh) the popup with `items`. An empty list closes it instead.
    ///
    /// Returns whether the popup is open afterwards.
    pub fn show(&mut self, prefix: &str, items: Vec<CompletionEntry>) -> bool {
        if items.is_empty() {
            self.deactivate();
            return false;
        }
        self.active = true;
        self.prefix = prefix.to_string();
        self.items = items;
        self.selected = 0;
        true
    }

    /// Close the popup.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.items.clear();
        self.prefix.clear();
        self.selected = 0;
    }

    /// Same as [`AutoComplete::deactivate`].
    pub fn cancel(&mut self) {
        self.deactivate();
    }

    /// Move focus down, wrapping to the first item.
    pub fn focus_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    /// Move focus up, wrapping to the last item.
    pub fn focus_prev(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + self.items.len() - 1) % self.items.len();
        }
    }

    /// Feed a typed character; dismiss characters close the popup.
    ///
    /// Returns whether the popup is still open.
    pub fn on_char(&mut self, ch: char, syntax: &CompletionSyntax) -> bool {
        if self.active && syntax.is_dismiss_char(ch) {
            self.deactivate();
        }
        self.active
    }

    /// Decide how to refresh the popup after `event`.
    ///
    /// Typing re-queries at the end of the inserted text; deleting a line break (or any
    /// whole-row change) closes the popup.
    pub fn refresh_target(event: &EditEvent) -> RefreshTarget {
        match event {
            EditEvent::InsertText { range, .. } => RefreshTarget::Query(range.end),
            EditEvent::RemoveText { text, .. } if text.contains('\n') => RefreshTarget::Deactivate,
            EditEvent::RemoveText { range, .. } => RefreshTarget::Query(range.start),
            EditEvent::InsertLines { .. } | EditEvent::RemoveLines { .. } => {
                RefreshTarget::Deactivate
            }
        }
    }

    /// Accept the focused candidate at `cursor`: the typed prefix is replaced by its name.
    ///
    /// The popup closes either way.
    pub fn accept(&mut self, cursor: Coordinate) -> Option<CompletionEdit> {
        let edit = self.selected().map(|entry| {
            let typed = self.prefix.chars().count();
            let start = Coordinate::new(cursor.row, cursor.column.saturating_sub(typed));
            CompletionEdit {
                replace: Range::new(start, cursor),
                text: entry.name.clone(),
            }
        });
        self.deactivate();
        edit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(names: &[&str]) -> Vec<CompletionEntry> {
        names
            .iter()
            .map(|name| CompletionEntry::new(*name, "var", ""))
            .collect()
    }

    fn names(entries: &[CompletionEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_member_request_moves_offset_back() {
        let buffer = Buffer::from_lines(["let x = 1;", "console.lo"]);
        let request = completion_request(
            &buffer,
            Coordinate::new(1, 10),
            &CompletionSyntax::default(),
        );
        assert!(request.is_member_completion);
        assert_eq!(request.prefix, "lo");
        assert_eq!(request.offset, 11 + 8);
    }

    #[test]
    fn test_identifier_request_keeps_cursor_offset() {
        let buffer = Buffer::from_lines(["foo(ba"]);
        let request =
            completion_request(&buffer, Coordinate::new(0, 6), &CompletionSyntax::default());
        assert!(!request.is_member_completion);
        assert_eq!(request.prefix, "ba");
        assert_eq!(request.offset, 6);
    }

    #[test]
    fn test_filter_and_sort_prefers_exact_case() {
        let sorted = filter_and_sort(entries(&["Bar", "baz", "bar", "qux", "BAZ"]), "ba");
        assert_eq!(names(&sorted), vec!["bar", "baz", "BAZ", "Bar"]);
    }

    #[test]
    fn test_focus_wraps_and_accept_replaces_prefix() {
        let mut popup = AutoComplete::new();
        assert!(popup.show("ba", entries(&["bar", "baz"])));
        popup.focus_prev();
        assert_eq!(popup.selected().unwrap().name, "baz");
        popup.focus_next();
        assert_eq!(popup.selected().unwrap().name, "bar");

        let edit = popup.accept(Coordinate::new(3, 6)).unwrap();
        assert_eq!(edit.replace, Range::from_rows(3, 4, 3, 6));
        assert_eq!(edit.text, "bar");
        assert!(!popup.is_active());
    }

    #[test]
    fn test_show_empty_list_deactivates() {
        let mut popup = AutoComplete::new();
        popup.show("x", entries(&["x1"]));
        assert!(!popup.show("xy", Vec::new()));
        assert!(!popup.is_active());
    }

    #[test]
    fn test_dismiss_chars() {
        let syntax = CompletionSyntax::default();
        let mut popup = AutoComplete::new();
        popup.show("a", entries(&["abc"]));
        assert!(popup.on_char('_', &syntax));
        assert!(!popup.on_char('(', &syntax));
    }

    #[test]
    fn test_refresh_target() {
        let typed = EditEvent::InsertText {
            range: Range::from_rows(0, 3, 0, 4),
            text: "x".to_string(),
        };
        assert_eq!(
            AutoComplete::refresh_target(&typed),
            RefreshTarget::Query(Coordinate::new(0, 4))
        );
        let joined = EditEvent::RemoveText {
            range: Range::from_rows(0, 3, 1, 0),
            text: "\n".to_string(),
        };
        assert_eq!(AutoComplete::refresh_target(&joined), RefreshTarget::Deactivate);
    }
}

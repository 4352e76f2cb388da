#![warn(missing_docs)]
//! `editor-analysis-lang` - data-driven language options for `editor-analysis`.
//!
//! This crate stays lightweight and does **not** know about any particular analysis engine. It
//! provides small serde-friendly structs that hosts use to describe how a language is indented
//! and what counts as an identifier while completing.

use serde::{Deserialize, Serialize};

/// Indentation and newline options forwarded to an analysis engine's smart-indent query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    /// Display width of a tab character.
    pub tab_size: usize,
    /// Columns per indentation level.
    pub indent_size: usize,
    /// Newline sequence (`"\n"` or `"\r\n"`).
    pub new_line_character: String,
    /// Insert spaces instead of tab characters.
    pub convert_tabs_to_spaces: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            tab_size: 4,
            indent_size: 4,
            new_line_character: "\n".to_string(),
            convert_tabs_to_spaces: true,
        }
    }
}

impl EditorOptions {
    /// Text inserted for one indentation level.
    pub fn indent_unit(&self) -> String {
        if self.convert_tabs_to_spaces {
            " ".repeat(self.indent_size)
        } else {
            "\t".to_string()
        }
    }

    /// Width of the leading whitespace of `line`: a tab counts as `tab_size`, a space as one.
    pub fn measure_indent(&self, line: &str) -> usize {
        line.chars()
            .map_while(|ch| match ch {
                '\t' => Some(self.tab_size),
                ' ' => Some(1),
                _ => None,
            })
            .sum()
    }

    /// Number of leading whitespace characters of `line` (tabs and spaces).
    pub fn leading_whitespace_len(line: &str) -> usize {
        line.chars().take_while(|ch| matches!(ch, '\t' | ' ')).count()
    }
}

/// Characters that drive completion: what an identifier is made of, what opens member
/// completion and what closes the popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSyntax {
    /// Characters allowed in identifiers besides ASCII letters, digits and `_`.
    pub extra_identifier_chars: String,
    /// Character that introduces member completion.
    pub member_trigger: char,
    /// Typing any of these characters closes an active completion popup.
    pub dismiss_chars: String,
}

impl Default for CompletionSyntax {
    fn default() -> Self {
        Self {
            extra_identifier_chars: "$".to_string(),
            member_trigger: '.',
            dismiss_chars: " -=,[]/()!';:<>".to_string(),
        }
    }
}

impl CompletionSyntax {
    /// Returns `true` if `ch` may appear in an identifier.
    pub fn is_identifier_char(&self, ch: char) -> bool {
        ch.is_ascii_alphanumeric() || ch == '_' || self.extra_identifier_chars.contains(ch)
    }

    /// Returns `true` if typing `ch` closes the completion popup.
    pub fn is_dismiss_char(&self, ch: char) -> bool {
        self.dismiss_chars.contains(ch)
    }

    /// Returns `true` if `text` ends with at least one character that dismisses completion.
    pub fn dismisses(&self, text: &str) -> bool {
        text.chars().any(|ch| self.is_dismiss_char(ch))
    }

    /// The identifier characters immediately before the end of `text`.
    pub fn identifier_suffix<'a>(&self, text: &'a str) -> &'a str {
        let start = text
            .char_indices()
            .rev()
            .take_while(|(_, ch)| self.is_identifier_char(*ch))
            .last()
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        &text[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_indent() {
        let options = EditorOptions::default();
        assert_eq!(options.measure_indent("\t  foo"), 6);
        assert_eq!(options.measure_indent("foo"), 0);
        assert_eq!(EditorOptions::leading_whitespace_len("\t  foo"), 3);
    }

    #[test]
    fn test_indent_unit() {
        let mut options = EditorOptions::default();
        assert_eq!(options.indent_unit(), "    ");
        options.convert_tabs_to_spaces = false;
        assert_eq!(options.indent_unit(), "\t");
    }

    #[test]
    fn test_identifier_suffix() {
        let syntax = CompletionSyntax::default();
        assert_eq!(syntax.identifier_suffix("foo.ba$r_1"), "ba$r_1");
        assert_eq!(syntax.identifier_suffix("foo("), "");
        assert_eq!(syntax.identifier_suffix(""), "");
    }

    #[test]
    fn test_underscore_is_not_a_dismiss_char() {
        let syntax = CompletionSyntax::default();
        assert!(syntax.is_dismiss_char('('));
        assert!(!syntax.is_dismiss_char('_'));
        assert!(syntax.dismisses("a;"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: EditorOptions = serde_json::from_str(r#"{"tab_size": 2}"#).unwrap();
        assert_eq!(options.tab_size, 2);
        assert_eq!(options.indent_size, 4);
        assert_eq!(options.new_line_character, "\n");
    }
}

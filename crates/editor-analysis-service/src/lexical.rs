//! A lexical reference implementation of [`AnalysisEngine`].
//!
//! [`LexicalEngine`] answers every query from the token stream alone: identifiers, declaration
//! keywords and bracket structure of C-family source (comments and string literals are blanked
//! out first). It has no type checker, so it is useful as a test double, as a fallback when no real
//! engine is available, and as a worked example of the engine seam.

use crate::engine::{
    AnalysisEngine, CompletionEntry, CompletionInfo, DefinitionInfo, MemberName, NavigateToItem,
    ReferenceEntry, SignatureInfo, TypeInfo,
};
use crate::error::EngineError;
use crate::script::ScriptHost;
use editor_analysis::{Diagnostic, TextEdit, TextSpan};
use editor_analysis_lang::EditorOptions;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").expect("valid identifier regex"));

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|[^A-Za-z0-9_$.])(function|class|interface|var|let|const|enum|module)\s+([A-Za-z_$][A-Za-z0-9_$]*)",
    )
    .expect("valid declaration regex")
});

static MEMBER_ACCESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.\s*([A-Za-z_$][A-Za-z0-9_$]*)").expect("valid member access regex")
});

static MEMBER_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:(?:public|private|static|readonly)\s+)*([A-Za-z_$][A-Za-z0-9_$]*)\s*\??\s*[:(]",
    )
    .expect("valid member declaration regex")
});

const KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "declare", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "module", "new", "null",
    "private", "public", "readonly", "return", "static", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with",
];

fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Source text with comments and string literal contents replaced by spaces.
///
/// Newlines are kept and every character maps to exactly one character, so character offsets are
/// shared with the original text.
struct Masked {
    text: String,
    chars: Vec<char>,
    char_starts: Vec<usize>,
    issues: Vec<Diagnostic>,
}

impl Masked {
    fn new(source: &str) -> Self {
        let input: Vec<char> = source.chars().collect();
        let mut chars = Vec::with_capacity(input.len());
        let mut issues = Vec::new();
        let blank = |ch: char| if ch == '\n' { '\n' } else { ' ' };

        let mut i = 0;
        while i < input.len() {
            let ch = input[i];
            let next = input.get(i + 1).copied();
            match (ch, next) {
                ('/', Some('/')) => {
                    while i < input.len() && input[i] != '\n' {
                        chars.push(' ');
                        i += 1;
                    }
                }
                ('/', Some('*')) => {
                    let start = i;
                    chars.extend(['/', '*']);
                    i += 2;
                    let mut closed = false;
                    while i < input.len() {
                        if input[i] == '*' && input.get(i + 1) == Some(&'/') {
                            chars.extend(['*', '/']);
                            i += 2;
                            closed = true;
                            break;
                        }
                        chars.push(blank(input[i]));
                        i += 1;
                    }
                    if !closed {
                        issues.push(Diagnostic::error(start, input.len(), "'*/' expected."));
                    }
                }
                ('"' | '\'' | '`', _) => {
                    let quote = ch;
                    let start = i;
                    chars.push(quote);
                    i += 1;
                    let mut closed = false;
                    while i < input.len() {
                        let c = input[i];
                        if c == '\\' {
                            chars.push(' ');
                            i += 1;
                            if i < input.len() {
                                chars.push(blank(input[i]));
                                i += 1;
                            }
                            continue;
                        }
                        if c == quote {
                            chars.push(quote);
                            i += 1;
                            closed = true;
                            break;
                        }
                        if c == '\n' && quote != '`' {
                            break;
                        }
                        chars.push(blank(c));
                        i += 1;
                    }
                    if !closed {
                        issues.push(Diagnostic::error(start, i, "Unterminated string literal."));
                    }
                }
                _ => {
                    chars.push(ch);
                    i += 1;
                }
            }
        }

        let text: String = chars.iter().collect();
        let mut char_starts: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_starts.push(text.len());
        Self {
            text,
            chars,
            char_starts,
            issues,
        }
    }

    fn to_char(&self, byte: usize) -> usize {
        self.char_starts.partition_point(|&b| b < byte)
    }

    fn slice(&self, min_char: usize, lim_char: usize) -> String {
        let end = lim_char.min(self.chars.len());
        let start = min_char.min(end);
        self.chars[start..end].iter().collect()
    }

    /// Identifier tokens as `(min_char, lim_char, name)`.
    fn identifiers(&self) -> impl Iterator<Item = (usize, usize, &str)> + '_ {
        IDENTIFIER.find_iter(&self.text).filter_map(move |m| {
            // Skip identifier-like runs glued to a preceding digit (e.g. `1e5`).
            let preceded_by_digit = self.text[..m.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_digit());
            (!preceded_by_digit).then(|| (self.to_char(m.start()), self.to_char(m.end()), m.as_str()))
        })
    }

    /// Identifier touching `offset` (the cursor may sit right after it).
    fn identifier_at(&self, offset: usize) -> Option<(usize, usize, String)> {
        self.identifiers()
            .find(|(min, lim, _)| *min <= offset && offset <= *lim)
            .map(|(min, lim, name)| (min, lim, name.to_string()))
    }

    fn skip_whitespace(&self, mut at: usize) -> usize {
        while at < self.chars.len() && self.chars[at].is_whitespace() {
            at += 1;
        }
        at
    }

    /// First non-blank character of the line starting at `from`.
    fn first_non_blank_in_line(&self, from: usize) -> Option<char> {
        self.chars[from.min(self.chars.len())..]
            .iter()
            .copied()
            .take_while(|c| *c != '\n')
            .find(|c| !c.is_whitespace())
    }

    /// Offset of the bracket closing the one at `open`.
    fn matching_close(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, ch) in self.chars.iter().enumerate().skip(open) {
            match ch {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Text after a `:` annotation starting at `at`, up to any of `stops`.
    fn annotation(&self, at: usize, stops: &[char]) -> Option<String> {
        let at = self.skip_whitespace(at);
        if self.chars.get(at) != Some(&':') {
            return None;
        }
        let end = self.chars[at + 1..]
            .iter()
            .position(|c| stops.contains(c) || *c == '\n')
            .map(|p| at + 1 + p)
            .unwrap_or(self.chars.len());
        let ty = self.slice(at + 1, end).trim().to_string();
        (!ty.is_empty()).then_some(ty)
    }
}

#[derive(Debug, Clone)]
struct Declaration {
    name: String,
    kind: String,
    min_char: usize,
    lim_char: usize,
    signature: Option<String>,
    annotation: Option<String>,
}

impl Declaration {
    fn display(&self) -> String {
        match (&self.signature, &self.annotation) {
            (Some(signature), _) => signature.clone(),
            (None, Some(ty)) => format!("({}) {}: {}", self.kind, self.name, ty),
            (None, None) => format!("{} {}", self.kind, self.name),
        }
    }
}

fn declarations(masked: &Masked) -> Vec<Declaration> {
    DECLARATION
        .captures_iter(&masked.text)
        .filter_map(|caps| {
            let kind = caps.get(1)?.as_str().to_string();
            let name_match = caps.get(2)?;
            let name = name_match.as_str().to_string();
            let min_char = masked.to_char(name_match.start());
            let lim_char = masked.to_char(name_match.end());

            let (signature, annotation) = if kind == "function" {
                let open = masked.skip_whitespace(lim_char);
                let signature = (masked.chars.get(open) == Some(&'('))
                    .then(|| masked.matching_close(open))
                    .flatten()
                    .map(|close| {
                        let params = masked.slice(open + 1, close);
                        let params: Vec<&str> = params
                            .split(',')
                            .map(str::trim)
                            .filter(|p| !p.is_empty())
                            .collect();
                        let ret = masked
                            .annotation(close + 1, &['{', ';'])
                            .map(|ty| format!(": {ty}"))
                            .unwrap_or_default();
                        format!("{name}({}){ret}", params.join(", "))
                    });
                (signature, None)
            } else if matches!(kind.as_str(), "var" | "let" | "const") {
                (None, masked.annotation(lim_char, &['=', ';', ',']))
            } else {
                (None, None)
            };

            Some(Declaration {
                name,
                kind,
                min_char,
                lim_char,
                signature,
                annotation,
            })
        })
        .collect()
}

/// Token-level engine over a [`ScriptHost`].
#[derive(Debug, Clone, Default)]
pub struct LexicalEngine {
    host: ScriptHost,
}

impl LexicalEngine {
    /// Create an engine with no scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// The script table.
    pub fn host(&self) -> &ScriptHost {
        &self.host
    }

    /// Mutable access to the script table.
    pub fn host_mut(&mut self) -> &mut ScriptHost {
        &mut self.host
    }

    fn masked(&self, id: &str) -> Result<Masked, EngineError> {
        let script = self
            .host
            .script(id)
            .ok_or_else(|| EngineError::UnknownDocument(id.to_string()))?;
        Ok(Masked::new(&script.document.text()))
    }

    fn all_masked(&self) -> Vec<(String, Masked)> {
        self.host
            .scripts()
            .map(|script| (script.name.clone(), Masked::new(&script.document.text())))
            .collect()
    }

    fn declarations_named(&self, name: &str) -> Vec<(String, Declaration)> {
        self.all_masked()
            .iter()
            .flat_map(|(file, masked)| {
                declarations(masked)
                    .into_iter()
                    .filter(|decl| decl.name == name)
                    .map(|decl| (file.clone(), decl))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn occurrences_in(
        file: &str,
        masked: &Masked,
        name: &str,
        declaration: Option<TextSpan>,
    ) -> Vec<ReferenceEntry> {
        masked
            .identifiers()
            .filter(|(_, _, token)| *token == name)
            .map(|(min_char, lim_char, _)| {
                let after = masked.skip_whitespace(lim_char);
                let assigns = masked.chars.get(after) == Some(&'=')
                    && !matches!(masked.chars.get(after + 1), Some('=' | '>'));
                let declares = declaration.is_some_and(|span| span.start == min_char);
                ReferenceEntry {
                    file_name: file.to_string(),
                    min_char,
                    lim_char,
                    is_write_access: assigns || declares,
                    declaration,
                }
            })
            .collect()
    }
}

impl AnalysisEngine for LexicalEngine {
    fn register_document(&mut self, id: &str, text: &str) {
        self.host.update_script(id, text);
    }

    fn has_document(&self, id: &str) -> bool {
        self.host.contains(id)
    }

    fn document_text(&self, id: &str) -> Option<String> {
        self.host.script(id).map(|script| script.document.text())
    }

    fn apply_edit(&mut self, id: &str, edit: &TextEdit) -> Result<(), EngineError> {
        self.host.edit_script(id, edit)
    }

    fn add_library(&mut self, name: &str, text: &str) {
        self.host.add_library(name, text);
    }

    fn completions_at(
        &self,
        id: &str,
        offset: usize,
        is_member_completion: bool,
    ) -> Result<Option<CompletionInfo>, EngineError> {
        let current = self.masked(id)?;
        let typing = current.identifier_at(offset).map(|(min, _, _)| min);
        let mut entries: BTreeMap<String, CompletionEntry> = BTreeMap::new();

        for (file, masked) in self.all_masked() {
            let in_current = file == id;
            if is_member_completion {
                let accessed = MEMBER_ACCESS.captures_iter(&masked.text).filter_map(|caps| {
                    let m = caps.get(1)?;
                    Some((masked.to_char(m.start()), m.as_str().to_string()))
                });
                let declared = MEMBER_DECLARATION.captures_iter(&masked.text).filter_map(|caps| {
                    let m = caps.get(1)?;
                    Some((masked.to_char(m.start()), m.as_str().to_string()))
                });
                for (min, name) in accessed.chain(declared) {
                    if is_keyword(&name) || (in_current && Some(min) == typing) {
                        continue;
                    }
                    entries
                        .entry(name.clone())
                        .or_insert_with(|| CompletionEntry::new(name, "property", ""));
                }
                continue;
            }

            for decl in declarations(&masked) {
                let type_text = decl.signature.clone().or(decl.annotation.clone()).unwrap_or_default();
                entries.insert(
                    decl.name.clone(),
                    CompletionEntry::new(decl.name, decl.kind, type_text),
                );
            }
            if in_current {
                for (min, _, name) in masked.identifiers() {
                    if is_keyword(name) || Some(min) == typing {
                        continue;
                    }
                    entries
                        .entry(name.to_string())
                        .or_insert_with(|| CompletionEntry::new(name, "var", ""));
                }
            }
        }

        Ok(Some(CompletionInfo {
            is_member_completion,
            entries: entries.into_values().collect(),
        }))
    }

    fn type_at(&self, id: &str, offset: usize) -> Result<Option<TypeInfo>, EngineError> {
        let masked = self.masked(id)?;
        let Some((min_char, lim_char, name)) = masked.identifier_at(offset) else {
            return Ok(None);
        };
        if is_keyword(&name) {
            return Ok(None);
        }

        let decls = self.declarations_named(&name);
        let functions: Vec<String> = decls
            .iter()
            .filter_map(|(_, decl)| decl.signature.clone())
            .collect();
        let member_name = if !functions.is_empty() {
            MemberName {
                text: None,
                entries: functions,
            }
        } else if let Some((_, decl)) = decls.first() {
            MemberName {
                text: Some(decl.display()),
                entries: Vec::new(),
            }
        } else {
            return Ok(None);
        };

        Ok(Some(TypeInfo {
            member_name,
            min_char,
            lim_char,
        }))
    }

    fn signature_at(&self, id: &str, offset: usize) -> Result<Option<SignatureInfo>, EngineError> {
        let masked = self.masked(id)?;
        let mut depth = 0usize;
        let mut commas = 0usize;
        let mut at = offset.min(masked.chars.len());

        while at > 0 {
            at -= 1;
            match masked.chars[at] {
                ')' | ']' | '}' => depth += 1,
                '(' if depth == 0 => {
                    let mut end = at;
                    while end > 0 && masked.chars[end - 1].is_whitespace() {
                        end -= 1;
                    }
                    return Ok(masked
                        .identifier_at(end)
                        .filter(|(_, lim, name)| *lim == end && !is_keyword(name))
                        .map(|(_, _, name)| SignatureInfo {
                            name,
                            active_formal: commas,
                        }));
                }
                '[' | '{' if depth == 0 => return Ok(None),
                ';' if depth == 0 => return Ok(None),
                '(' | '[' | '{' => depth -= 1,
                ',' if depth == 0 => commas += 1,
                _ => {}
            }
        }
        Ok(None)
    }

    fn occurrences_at(&self, id: &str, offset: usize) -> Result<Vec<ReferenceEntry>, EngineError> {
        let masked = self.masked(id)?;
        let Some((_, _, name)) = masked.identifier_at(offset) else {
            return Ok(Vec::new());
        };
        if is_keyword(&name) {
            return Ok(Vec::new());
        }
        let declaration = declarations(&masked)
            .into_iter()
            .find(|decl| decl.name == name)
            .map(|decl| TextSpan::from_bounds(decl.min_char, decl.lim_char));
        Ok(Self::occurrences_in(id, &masked, &name, declaration))
    }

    fn references_at(&self, id: &str, offset: usize) -> Result<Vec<ReferenceEntry>, EngineError> {
        let current = self.masked(id)?;
        let Some((_, _, name)) = current.identifier_at(offset) else {
            return Ok(Vec::new());
        };
        if is_keyword(&name) {
            return Ok(Vec::new());
        }
        Ok(self
            .all_masked()
            .iter()
            .flat_map(|(file, masked)| {
                let declaration = declarations(masked)
                    .into_iter()
                    .find(|decl| decl.name == name)
                    .map(|decl| TextSpan::from_bounds(decl.min_char, decl.lim_char));
                Self::occurrences_in(file, masked, &name, declaration)
            })
            .collect())
    }

    fn definition_at(&self, id: &str, offset: usize) -> Result<Vec<DefinitionInfo>, EngineError> {
        let masked = self.masked(id)?;
        let Some((_, _, name)) = masked.identifier_at(offset) else {
            return Ok(Vec::new());
        };
        Ok(self
            .declarations_named(&name)
            .into_iter()
            .map(|(file_name, decl)| DefinitionInfo {
                file_name,
                min_char: decl.min_char,
                lim_char: decl.lim_char,
                kind: decl.kind,
                name: decl.name,
            })
            .collect())
    }

    fn navigate_to(&self, query: &str) -> Vec<NavigateToItem> {
        let query = query.to_lowercase();
        self.all_masked()
            .iter()
            .flat_map(|(file, masked)| {
                declarations(masked)
                    .into_iter()
                    .filter(|decl| decl.name.to_lowercase().contains(&query))
                    .map(|decl| NavigateToItem {
                        name: decl.name,
                        kind: decl.kind,
                        file_name: file.clone(),
                        min_char: decl.min_char,
                        lim_char: decl.lim_char,
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn diagnostics(&self, id: &str) -> Result<Vec<Diagnostic>, EngineError> {
        let masked = self.masked(id)?;
        let mut out = masked.issues.clone();
        let mut open: Vec<(char, usize)> = Vec::new();

        for (i, ch) in masked.chars.iter().copied().enumerate() {
            let expected_open = match ch {
                '(' | '[' | '{' => {
                    open.push((ch, i));
                    continue;
                }
                ')' => '(',
                ']' => '[',
                '}' => '{',
                _ => continue,
            };
            match open.pop() {
                Some((opener, _)) if opener == expected_open => {}
                Some((opener, _)) => {
                    out.push(Diagnostic::error(
                        i,
                        i + 1,
                        format!("'{}' expected.", closer_for(opener)),
                    ));
                }
                None => out.push(Diagnostic::error(i, i + 1, format!("Unexpected '{ch}'."))),
            }
        }
        for (opener, at) in open {
            out.push(Diagnostic::error(
                at,
                at + 1,
                format!("'{}' expected.", closer_for(opener)),
            ));
        }

        out.sort_by_key(|d| d.range.start);
        Ok(out)
    }

    fn smart_indent(
        &self,
        id: &str,
        line: usize,
        options: &EditorOptions,
    ) -> Result<usize, EngineError> {
        let masked = self.masked(id)?;
        let line_start = match line.checked_sub(1) {
            None => 0,
            Some(previous) => masked
                .chars
                .iter()
                .enumerate()
                .filter(|(_, c)| **c == '\n')
                .nth(previous)
                .map(|(i, _)| i + 1)
                .unwrap_or(masked.chars.len()),
        };

        let mut depth = 0usize;
        for ch in &masked.chars[..line_start] {
            match ch {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        let first = masked.first_non_blank_in_line(line_start);
        if matches!(first, Some(')' | ']' | '}')) {
            depth = depth.saturating_sub(1);
        }
        Ok(depth * options.indent_size)
    }
}

fn closer_for(opener: char) -> char {
    match opener {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "\
function add(a: number, b: number): number {
    return a + b;
}
var total: number = add(1, 2);
// add(\"comment\")
total = add(total, 3);
";

    fn engine() -> LexicalEngine {
        let mut engine = LexicalEngine::new();
        engine.register_document("temp.ts", SOURCE);
        engine
    }

    fn offset_of(needle: &str, nth: usize) -> usize {
        let byte = SOURCE.match_indices(needle).nth(nth).unwrap().0;
        SOURCE[..byte].chars().count()
    }

    #[test]
    fn test_masking_keeps_offsets() {
        let masked = Masked::new("a = \"héllo\"; // c\nb");
        assert_eq!(masked.chars.len(), "a = \"héllo\"; // c\nb".chars().count());
        assert_eq!(masked.text, "a = \"     \";     \nb");
    }

    #[test]
    fn test_type_at_function_and_variable() {
        let engine = engine();
        let info = engine.type_at("temp.ts", offset_of("add", 1)).unwrap().unwrap();
        assert_eq!(
            info.member_name.entries,
            vec!["add(a: number, b: number): number".to_string()]
        );

        let info = engine.type_at("temp.ts", offset_of("total", 0)).unwrap().unwrap();
        assert_eq!(info.member_name.text.as_deref(), Some("(var) total: number"));
        assert_eq!(info.lim_char - info.min_char, 5);
    }

    #[test]
    fn test_signature_counts_commas() {
        let engine = engine();
        let at = offset_of("add(total, 3)", 0) + "add(total, ".len();
        let sig = engine.signature_at("temp.ts", at).unwrap().unwrap();
        assert_eq!(sig.name, "add");
        assert_eq!(sig.active_formal, 1);
    }

    #[test]
    fn test_occurrences_skip_comments_and_mark_declaration() {
        let engine = engine();
        let refs = engine.occurrences_at("temp.ts", offset_of("total", 1)).unwrap();
        assert_eq!(refs.len(), 3);
        let decl = refs[0].declaration.unwrap();
        assert_eq!(decl.start, offset_of("total", 0));
        assert!(refs[0].is_write_access);
        assert!(refs[1].is_write_access);
        assert!(!refs[2].is_write_access);

        let adds = engine.occurrences_at("temp.ts", offset_of("add", 0)).unwrap();
        assert_eq!(adds.len(), 3);
    }

    #[test]
    fn test_bracket_diagnostics() {
        let mut engine = LexicalEngine::new();
        engine.register_document("bad.ts", "f(a];\n}");
        let diags = engine.diagnostics("bad.ts").unwrap();
        let messages: Vec<&str> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["')' expected.", "Unexpected '}'."]);
        assert_eq!(diags[0].range.start, 3);
    }

    #[test]
    fn test_smart_indent_follows_bracket_depth() {
        let mut engine = LexicalEngine::new();
        engine.register_document("i.ts", "class A {\n    f() {\nx\n    }\n}\n");
        let options = EditorOptions::default();
        assert_eq!(engine.smart_indent("i.ts", 0, &options).unwrap(), 0);
        assert_eq!(engine.smart_indent("i.ts", 1, &options).unwrap(), 4);
        assert_eq!(engine.smart_indent("i.ts", 2, &options).unwrap(), 8);
        assert_eq!(engine.smart_indent("i.ts", 3, &options).unwrap(), 4);
        assert_eq!(engine.smart_indent("i.ts", 4, &options).unwrap(), 0);
    }

    #[test]
    fn test_unknown_document() {
        let engine = LexicalEngine::new();
        assert_eq!(
            engine.diagnostics("nope.ts"),
            Err(EngineError::UnknownDocument("nope.ts".to_string()))
        );
    }
}

//! Named scripts backing an analysis engine.
//!
//! A [`ScriptHost`] owns one [`MirroredDocument`] per script name. Library scripts (ambient
//! declarations shared by every document) live in the same host instance: there is no
//! process-wide library cache.

use crate::error::EngineError;
use editor_analysis::{MirroredDocument, TextChangeRange, TextEdit, normalize_newlines};
use std::collections::BTreeMap;

/// One script known to a [`ScriptHost`].
#[derive(Debug, Clone)]
pub struct ScriptInfo {
    /// Script name (file name).
    pub name: String,
    /// Flat text plus version history.
    pub document: MirroredDocument,
    /// Whether the script is open in an editor.
    pub is_open: bool,
    /// Whether the script is a read-only library.
    pub is_library: bool,
}

impl ScriptInfo {
    fn new(name: &str, content: &str, is_library: bool) -> Self {
        Self {
            name: name.to_string(),
            document: MirroredDocument::from_text(content),
            is_open: !is_library,
            is_library,
        }
    }

    /// Current version.
    pub fn version(&self) -> u64 {
        self.document.version()
    }
}

/// Script table keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ScriptHost {
    scripts: BTreeMap<String, ScriptInfo>,
}

impl ScriptHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a script with fresh history.
    pub fn add_script(&mut self, name: &str, content: &str) {
        self.scripts
            .insert(name.to_string(), ScriptInfo::new(name, content, false));
    }

    /// Replace the content of `name`, creating it when absent.
    ///
    /// An existing script keeps counting versions; its edit history is discarded.
    pub fn update_script(&mut self, name: &str, content: &str) {
        match self.scripts.get_mut(name) {
            Some(script) => script.document.update_content(content),
            None => self.add_script(name, content),
        }
    }

    /// Apply an edit to an existing script.
    pub fn edit_script(&mut self, name: &str, edit: &TextEdit) -> Result<(), EngineError> {
        let script = self
            .scripts
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownDocument(name.to_string()))?;
        script.document.edit(edit)?;
        Ok(())
    }

    /// Register a library script. `\r\n` and lone `\r` are normalized to `\n`.
    pub fn add_library(&mut self, name: &str, content: &str) {
        let content = normalize_newlines(content);
        self.scripts
            .insert(name.to_string(), ScriptInfo::new(name, &content, true));
    }

    /// Drop a script. Returns `false` if it was not registered.
    pub fn remove_script(&mut self, name: &str) -> bool {
        self.scripts.remove(name).is_some()
    }

    /// Look up a script.
    pub fn script(&self, name: &str) -> Option<&ScriptInfo> {
        self.scripts.get(name)
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    /// All script names, sorted.
    pub fn script_names(&self) -> Vec<String> {
        self.scripts.keys().cloned().collect()
    }

    /// All scripts, sorted by name.
    pub fn scripts(&self) -> impl Iterator<Item = &ScriptInfo> {
        self.scripts.values()
    }

    /// Current version of `name`.
    pub fn script_version(&self, name: &str) -> Option<u64> {
        self.scripts.get(name).map(ScriptInfo::version)
    }

    /// Collapsed change range of `name` between two versions.
    pub fn text_change_range(&self, name: &str, from: u64, to: u64) -> Option<TextChangeRange> {
        self.scripts
            .get(name)?
            .document
            .text_change_range_between_versions(from, to)
    }
}

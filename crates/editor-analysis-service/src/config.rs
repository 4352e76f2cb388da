//! Session and worker configuration.

use crate::error::ConfigError;
use editor_analysis_lang::{CompletionSyntax, EditorOptions};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MAX_DELAY_MS: u64 = 10_000;

/// Configuration for an [`AnalysisSession`](crate::session::AnalysisSession) and its worker.
///
/// Every field has a default, so a partial JSON object is enough:
///
/// ```
/// use editor_analysis_service::AnalysisConfig;
///
/// let config = AnalysisConfig::from_json_str(r#"{ "document_id": "main.ts" }"#).unwrap();
/// assert_eq!(config.document_id, "main.ts");
/// assert_eq!(config.reanalysis_delay_ms, 150);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Engine document id the buffer is mirrored into.
    pub document_id: String,
    /// Delay between the last edit and background re-analysis.
    pub reanalysis_delay_ms: u64,
    /// Delay between the last cursor move and occurrence highlighting.
    pub occurrences_delay_ms: u64,
    /// Hover delay before a tooltip is resolved.
    pub tooltip_delay_ms: u64,
    /// Default timeout for worker queries.
    pub request_timeout_ms: u64,
    /// Compare the full engine text with the buffer after every edit.
    pub verify_after_edit: bool,
    /// Indentation options passed to smart-indent queries.
    pub editor: EditorOptions,
    /// Completion characters.
    pub completion: CompletionSyntax,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            document_id: "temp.ts".to_string(),
            reanalysis_delay_ms: 150,
            occurrences_delay_ms: 200,
            tooltip_delay_ms: 100,
            request_timeout_ms: 2_000,
            verify_after_edit: false,
            editor: EditorOptions::default(),
            completion: CompletionSyntax::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.document_id.is_empty() {
            return Err(invalid("document_id", "must not be empty"));
        }
        for (field, value) in [
            ("reanalysis_delay_ms", self.reanalysis_delay_ms),
            ("occurrences_delay_ms", self.occurrences_delay_ms),
            ("tooltip_delay_ms", self.tooltip_delay_ms),
        ] {
            if value > MAX_DELAY_MS {
                return Err(invalid(field, format!("{value} exceeds {MAX_DELAY_MS}")));
            }
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be positive"));
        }
        if self.editor.tab_size == 0 {
            return Err(invalid("editor.tab_size", "must be at least 1"));
        }
        if !matches!(self.editor.new_line_character.as_str(), "\n" | "\r\n") {
            return Err(invalid(
                "editor.new_line_character",
                format!("unsupported newline {:?}", self.editor.new_line_character),
            ));
        }
        Ok(())
    }

    /// Re-analysis delay.
    pub fn reanalysis_delay(&self) -> Duration {
        Duration::from_millis(self.reanalysis_delay_ms)
    }

    /// Occurrence highlighting delay.
    pub fn occurrences_delay(&self) -> Duration {
        Duration::from_millis(self.occurrences_delay_ms)
    }

    /// Tooltip hover delay.
    pub fn tooltip_delay(&self) -> Duration {
        Duration::from_millis(self.tooltip_delay_ms)
    }

    /// Default worker query timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

//! Edit synchronization: buffer events → engine edits.
//!
//! The [`EditSynchronizer`] turns each [`EditEvent`] reported by the host buffer into exactly one
//! offset-addressed [`TextEdit`] against the engine's copy of the document. Offsets are computed
//! from the buffer *after* the event was applied, which is what line editors report.

use crate::engine::AnalysisEngine;
use crate::error::SyncError;
use editor_analysis::{Buffer, EditEvent, TextEdit};
use serde_json::Value;

/// What [`EditSynchronizer::sync_event`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The event was replayed as this edit.
    Applied(TextEdit),
    /// The engine had no document; it was registered from the full buffer content instead.
    Registered,
}

/// Keeps one engine document in step with one buffer.
#[derive(Debug, Clone)]
pub struct EditSynchronizer {
    document_id: String,
    verify_after_edit: bool,
}

impl EditSynchronizer {
    /// Create a synchronizer for `document_id`.
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            verify_after_edit: false,
        }
    }

    /// Compare the full engine text with the buffer after every edit.
    pub fn with_verification(mut self, verify_after_edit: bool) -> Self {
        self.verify_after_edit = verify_after_edit;
        self
    }

    /// The synchronized document id.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Register (or replace) the engine document with the full buffer content.
    pub fn register<E: AnalysisEngine + ?Sized>(&self, engine: &mut E, buffer: &Buffer) {
        tracing::info!(
            document = %self.document_id,
            lines = buffer.line_count(),
            "registering document"
        );
        engine.register_document(&self.document_id, &buffer.text());
    }

    /// Replay one event.
    ///
    /// `buffer` must already contain the event's change. If the engine does not know the
    /// document yet, it is registered from `buffer` (which already includes the change) and the
    /// event itself is not applied again.
    pub fn sync_event<E: AnalysisEngine + ?Sized>(
        &self,
        engine: &mut E,
        buffer: &Buffer,
        event: &EditEvent,
    ) -> Result<SyncOutcome, SyncError> {
        if !engine.has_document(&self.document_id) {
            tracing::warn!(
                document = %self.document_id,
                "document not registered, registering from buffer"
            );
            self.register(engine, buffer);
            return Ok(SyncOutcome::Registered);
        }

        let edit = event.to_text_edit(buffer);
        tracing::debug!(
            document = %self.document_id,
            action = ?event.action(),
            min_char = edit.min_char,
            lim_char = edit.lim_char,
            new_len = edit.new_len(),
            "applying edit"
        );
        engine.apply_edit(&self.document_id, &edit)?;

        if self.verify_after_edit {
            self.verify(engine, buffer)?;
        }
        Ok(SyncOutcome::Applied(edit))
    }

    /// Decode a JSON-shaped event and replay it.
    pub fn sync_value<E: AnalysisEngine + ?Sized>(
        &self,
        engine: &mut E,
        buffer: &Buffer,
        value: &Value,
    ) -> Result<SyncOutcome, SyncError> {
        let event = EditEvent::from_value(value)?;
        self.sync_event(engine, buffer, &event)
    }

    /// Check that the engine text equals the buffer text.
    pub fn verify<E: AnalysisEngine + ?Sized>(
        &self,
        engine: &E,
        buffer: &Buffer,
    ) -> Result<(), SyncError> {
        match engine.document_text(&self.document_id) {
            Some(text) if text == buffer.text() => Ok(()),
            _ => Err(SyncError::Desynchronized {
                id: self.document_id.clone(),
            }),
        }
    }

    /// Discard the engine's copy and register it again from the buffer.
    pub fn resync<E: AnalysisEngine + ?Sized>(&self, engine: &mut E, buffer: &Buffer) {
        tracing::warn!(document = %self.document_id, "re-registering document after failure");
        self.register(engine, buffer);
    }
}

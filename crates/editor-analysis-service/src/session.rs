//! Per-buffer analysis session.
//!
//! An [`AnalysisSession`] binds one host buffer to one engine document. The host forwards every
//! buffer event through [`AnalysisSession::on_buffer_change`], cursor and hover moves through
//! [`AnalysisSession::on_cursor_change`] / [`AnalysisSession::on_hover`], and calls
//! [`AnalysisSession::poll`] from its event loop so debounced work (re-analysis, occurrence
//! highlighting, tooltips) runs once things settle.
//!
//! Engine and synchronization failures never reach the host: they are logged and the engine
//! document is re-registered from the buffer.

use crate::completion::{AutoComplete, RefreshTarget, fetch_completions};
use crate::config::AnalysisConfig;
use crate::debounce::Debouncer;
use crate::engine::{AnalysisEngine, CompletionEntry, ReferenceEntry};
use crate::error::EngineError;
use crate::indent::{self, IndentAction};
use crate::occurrences::{OccurrenceState, definition_target, occurrence_ranges};
use crate::sync::EditSynchronizer;
use crate::tooltip::{self, Tooltip, TooltipState};
use editor_analysis::{
    Annotation, Buffer, Coordinate, EditEvent, LineEnding, MarkerClass, MarkerSet,
    PositionTranslator, Range,
};
use std::time::Instant;

/// What a [`AnalysisSession::poll`] call refreshed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// Error markers were replaced by a fresh analysis.
    pub diagnostics: bool,
    /// Occurrence highlights were recomputed.
    pub occurrences: bool,
    /// A tooltip was opened.
    pub tooltip: bool,
}

/// One buffer's analysis state.
pub struct AnalysisSession<E> {
    config: AnalysisConfig,
    engine: E,
    sync: EditSynchronizer,
    enabled: bool,
    sync_suspended: bool,
    markers: MarkerSet,
    autocomplete: AutoComplete,
    tooltip: TooltipState,
    occurrences: OccurrenceState,
    reanalysis: Debouncer,
    cursor: Coordinate,
    line_ending: LineEnding,
}

impl<E: AnalysisEngine> AnalysisSession<E> {
    /// Create a disabled session around `engine`.
    pub fn new(engine: E, config: AnalysisConfig) -> Self {
        let sync = EditSynchronizer::new(config.document_id.clone())
            .with_verification(config.verify_after_edit);
        Self {
            tooltip: TooltipState::new(config.tooltip_delay()),
            occurrences: OccurrenceState::new(config.occurrences_delay()),
            reanalysis: Debouncer::new(config.reanalysis_delay()),
            config,
            engine,
            sync,
            enabled: false,
            sync_suspended: false,
            markers: MarkerSet::new(),
            autocomplete: AutoComplete::new(),
            cursor: Coordinate::default(),
            line_ending: LineEnding::default(),
        }
    }

    /// The engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine, mutably. Edits made here bypass synchronization.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Session configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Engine document id of this buffer.
    pub fn document_id(&self) -> &str {
        self.sync.document_id()
    }

    /// Markers to render.
    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Completion popup state.
    pub fn autocomplete(&self) -> &AutoComplete {
        &self.autocomplete
    }

    /// Completion popup state, mutably (focus movement, cancel).
    pub fn autocomplete_mut(&mut self) -> &mut AutoComplete {
        &mut self.autocomplete
    }

    /// Tooltip state.
    pub fn tooltip(&self) -> &TooltipState {
        &self.tooltip
    }

    /// Occurrence highlight state.
    pub fn occurrences(&self) -> &OccurrenceState {
        &self.occurrences
    }

    /// Last reported cursor.
    pub fn cursor(&self) -> Coordinate {
        self.cursor
    }

    /// Line ending of the last [`AnalysisSession::load_content`] text.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Buffer text converted back to the loaded line ending, for saving.
    pub fn saved_text(&self, buffer: &Buffer) -> String {
        self.line_ending.apply_to_text(&buffer.text())
    }

    /// Returns `true` between [`AnalysisSession::enable`] and [`AnalysisSession::disable`].
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start analysing `buffer`: its full content is registered and re-analysis is scheduled.
    pub fn enable(&mut self, buffer: &Buffer) {
        tracing::info!(document = %self.sync.document_id(), "enabling analysis session");
        self.sync.register(&mut self.engine, buffer);
        self.enabled = true;
        self.sync_suspended = false;
        self.reanalysis.schedule(Instant::now());
    }

    /// Stop analysing. Markers, popup, tooltip and highlights are dropped.
    pub fn disable(&mut self) {
        tracing::info!(document = %self.sync.document_id(), "disabling analysis session");
        self.enabled = false;
        self.markers.clear();
        self.autocomplete.deactivate();
        self.tooltip.close();
        self.occurrences.clear();
        self.reanalysis.cancel();
    }

    /// Ignore buffer events until [`AnalysisSession::resume_sync`].
    pub fn suspend_sync(&mut self) {
        self.sync_suspended = true;
    }

    /// Resume after [`AnalysisSession::suspend_sync`]; the engine document is re-registered.
    pub fn resume_sync(&mut self, buffer: &Buffer) {
        self.sync_suspended = false;
        if self.enabled {
            self.sync.register(&mut self.engine, buffer);
            self.reanalysis.schedule(Instant::now());
        }
    }

    /// Replace the buffer content (line endings normalized) and register it.
    ///
    /// The text's original line ending is kept for [`AnalysisSession::saved_text`].
    pub fn load_content(&mut self, buffer: &mut Buffer, text: &str) {
        self.suspend_sync();
        self.line_ending = LineEnding::detect_in_text(text);
        buffer.set_value(text);
        self.markers.clear();
        self.autocomplete.deactivate();
        self.tooltip.close();
        self.occurrences.clear();
        self.sync_suspended = false;
        self.sync.register(&mut self.engine, buffer);
        self.reanalysis.schedule(Instant::now());
    }

    /// Register a library source with the engine.
    pub fn add_library(&mut self, name: &str, content: &str) {
        tracing::info!(library = %name, "adding library");
        self.engine.add_library(name, content);
        self.reanalysis.schedule(Instant::now());
    }

    /// Forward one buffer event. `buffer` must already contain the change.
    pub fn on_buffer_change(&mut self, buffer: &Buffer, event: &EditEvent) {
        if !self.enabled || self.sync_suspended {
            return;
        }

        if let Err(err) = self.sync.sync_event(&mut self.engine, buffer, event) {
            tracing::warn!(error = %err, "edit synchronization failed");
            self.sync.resync(&mut self.engine, buffer);
        }

        self.markers.shift_for_event(event);
        self.tooltip.close();
        self.reanalysis.schedule(Instant::now());

        if self.autocomplete.is_active() {
            match AutoComplete::refresh_target(event) {
                RefreshTarget::Query(at) => {
                    self.activate_completion(buffer, at);
                }
                RefreshTarget::Deactivate => self.autocomplete.deactivate(),
            }
        }
    }

    /// Record a cursor move; occurrence highlighting refreshes once it settles.
    pub fn on_cursor_change(&mut self, cursor: Coordinate, now: Instant) {
        self.cursor = cursor;
        self.occurrences.cursor_moved(now);
    }

    /// Record a hover position; a tooltip is resolved after the hover delay.
    pub fn on_hover(&mut self, at: Coordinate, now: Instant) {
        if self.enabled {
            self.tooltip.hover(at, now);
        }
    }

    /// Run whatever debounced work is due at `now`.
    pub fn poll(&mut self, buffer: &Buffer, now: Instant) -> PollOutcome {
        let mut outcome = PollOutcome::default();
        if !self.enabled {
            return outcome;
        }

        if let Some(generation) = self.reanalysis.take_due(now) {
            tracing::debug!(generation, "re-analysis due");
            self.refresh_diagnostics(buffer);
            outcome.diagnostics = true;
        }

        if self.occurrences.take_due(now) {
            let ranges = self.refactor_ranges(buffer, self.cursor);
            self.occurrences.set_ranges(ranges);
            outcome.occurrences = true;
        }

        if let Some(at) = self.tooltip.take_due(now)
            && let Some(tip) = self.tooltip_at(buffer, at)
        {
            self.markers.clear_class(MarkerClass::TypeHighlight);
            if let Some(range) = tip.highlight {
                self.markers.add(MarkerClass::TypeHighlight, range);
            }
            self.tooltip.open(tip);
            outcome.tooltip = true;
        }

        outcome
    }

    /// Filtered, ordered completion candidates at `cursor`.
    pub fn completions(&self, buffer: &Buffer, cursor: Coordinate) -> Vec<CompletionEntry> {
        absorb(
            fetch_completions(
                &self.engine,
                self.sync.document_id(),
                buffer,
                cursor,
                &self.config.completion,
            )
            .map(|(_, entries)| entries),
            "completions",
        )
    }

    /// Open (or refresh) the completion popup at `cursor`. Returns whether it is open.
    pub fn activate_completion(&mut self, buffer: &Buffer, cursor: Coordinate) -> bool {
        let fetched = fetch_completions(
            &self.engine,
            self.sync.document_id(),
            buffer,
            cursor,
            &self.config.completion,
        );
        match fetched {
            Ok((request, entries)) => self.autocomplete.show(&request.prefix, entries),
            Err(err) => {
                tracing::warn!(error = %err, "completion query failed");
                self.autocomplete.deactivate();
                false
            }
        }
    }

    /// Feed a typed character to the popup; dismiss characters close it.
    pub fn on_char(&mut self, ch: char) -> bool {
        self.autocomplete.on_char(ch, &self.config.completion)
    }

    /// Accept the focused completion: the typed prefix in `buffer` is replaced by the candidate
    /// name. Returns the cursor after the inserted text.
    pub fn accept_completion(
        &mut self,
        buffer: &mut Buffer,
        cursor: Coordinate,
    ) -> Option<Coordinate> {
        let edit = self.autocomplete.accept(cursor)?;
        if !edit.replace.is_empty() {
            let event = buffer.remove_text(edit.replace);
            self.on_buffer_change(buffer, &event);
        }
        let event = buffer.insert_text(edit.replace.start, &edit.text);
        self.on_buffer_change(buffer, &event);
        let end = event.range().end;
        self.cursor = end;
        Some(end)
    }

    /// Resolve the tooltip for `at` immediately.
    pub fn tooltip_at(&self, buffer: &Buffer, at: Coordinate) -> Option<Tooltip> {
        absorb(
            tooltip::tooltip_at(&self.engine, self.sync.document_id(), buffer, at),
            "tooltip",
        )
    }

    /// Close the tooltip and its highlight.
    pub fn close_tooltip(&mut self) {
        self.tooltip.close();
        self.markers.clear_class(MarkerClass::TypeHighlight);
    }

    fn occurrences_at(&self, buffer: &Buffer, cursor: Coordinate) -> Vec<ReferenceEntry> {
        let offset = buffer.to_offset(buffer.clamp(cursor));
        absorb(
            self.engine.occurrences_at(self.sync.document_id(), offset),
            "occurrences",
        )
    }

    /// Jump to the declaration of the symbol at `cursor`.
    ///
    /// The declaration gets a reference marker (replacing earlier ones) and the new cursor is
    /// returned.
    pub fn go_to_definition(&mut self, buffer: &Buffer, cursor: Coordinate) -> Option<Coordinate> {
        let references = self.occurrences_at(buffer, cursor);
        let target = definition_target(buffer, &references)?;
        self.markers.clear_class(MarkerClass::Reference);
        self.markers.add(MarkerClass::Reference, target.range);
        self.cursor = target.cursor;
        Some(target.cursor)
    }

    /// Every occurrence of the symbol at `cursor`, for multi-cursor renaming.
    pub fn refactor_ranges(&self, buffer: &Buffer, cursor: Coordinate) -> Vec<Range> {
        occurrence_ranges(buffer, &self.occurrences_at(buffer, cursor))
    }

    /// Indentation action for the cursor row. Engine failures fall back to the default indent.
    pub fn smart_indent(&self, buffer: &Buffer, cursor: Coordinate) -> IndentAction {
        indent::smart_indent(
            &self.engine,
            self.sync.document_id(),
            buffer,
            cursor,
            &self.config.editor,
        )
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "smart indent failed");
            IndentAction::Default
        })
    }

    /// Replace the error markers with `annotations`.
    pub fn apply_annotations(&mut self, buffer: &Buffer, annotations: &[Annotation]) {
        self.markers.clear_class(MarkerClass::Error);
        for annotation in annotations {
            self.markers
                .add(MarkerClass::Error, annotation.range(buffer));
        }
    }

    /// Analyse now and replace the error markers. Returns the annotations.
    pub fn refresh_diagnostics(&mut self, buffer: &Buffer) -> Vec<Annotation> {
        let diagnostics = absorb(
            self.engine.diagnostics(self.sync.document_id()),
            "diagnostics",
        );
        let annotations: Vec<Annotation> = diagnostics
            .iter()
            .map(|d| d.to_annotation(buffer))
            .collect();
        tracing::debug!(count = annotations.len(), "diagnostics refreshed");
        self.apply_annotations(buffer, &annotations);
        annotations
    }
}

fn absorb<T: Default>(result: Result<T, EngineError>, what: &str) -> T {
    result.unwrap_or_else(|err| {
        tracing::warn!(error = %err, query = what, "engine query failed");
        T::default()
    })
}

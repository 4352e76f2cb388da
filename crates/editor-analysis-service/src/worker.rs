//! Background analysis worker.
//!
//! The worker thread owns its own [`Buffer`], [`EditSynchronizer`] and engine. The UI side
//! forwards edit events over an ordered channel, the worker replays them in order and, once edits
//! stop arriving for the re-analysis delay, computes diagnostics. Queries are tagged with
//! client-allocated ids and answered on the same event channel.
//!
//! The design stays runtime-agnostic: plain threads plus `std::sync::mpsc`.

use crate::config::AnalysisConfig;
use crate::debounce::Debouncer;
use crate::engine::{
    AnalysisEngine, CompletionInfo, DefinitionInfo, NavigateToItem, ReferenceEntry,
    SignatureInfo, TypeInfo,
};
use crate::error::{EngineError, WorkerError};
use crate::sync::EditSynchronizer;
use editor_analysis::{Annotation, Buffer, EditEvent};
use editor_analysis_lang::EditorOptions;
use std::collections::VecDeque;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// An offset-addressed question for the worker's engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Completion candidates.
    Completions {
        /// Query offset.
        offset: usize,
        /// Member completion flag.
        is_member_completion: bool,
    },
    /// Type at an offset.
    Type {
        /// Query offset.
        offset: usize,
    },
    /// Signature help at an offset.
    Signature {
        /// Query offset.
        offset: usize,
    },
    /// Occurrences in the worker's document.
    Occurrences {
        /// Query offset.
        offset: usize,
    },
    /// References across all documents.
    References {
        /// Query offset.
        offset: usize,
    },
    /// Declarations of the symbol at an offset.
    Definition {
        /// Query offset.
        offset: usize,
    },
    /// Declarations matching a name fragment.
    NavigateTo {
        /// Name fragment.
        query: String,
    },
    /// Current diagnostics, as annotations.
    Diagnostics,
    /// Suggested indentation of a row.
    SmartIndent {
        /// Zero-based row.
        line: usize,
        /// Indentation options.
        options: EditorOptions,
    },
}

/// Answer to a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Completion candidates.
    Completions(Option<CompletionInfo>),
    /// Type information.
    Type(Option<TypeInfo>),
    /// Signature help.
    Signature(Option<SignatureInfo>),
    /// Occurrences or references.
    References(Vec<ReferenceEntry>),
    /// Declarations.
    Definitions(Vec<DefinitionInfo>),
    /// Navigate-to matches.
    NavigateTo(Vec<NavigateToItem>),
    /// Diagnostics.
    Diagnostics(Vec<Annotation>),
    /// Indentation width.
    SmartIndent(usize),
}

/// Messages from the UI side to the worker.
#[derive(Debug, Clone)]
pub enum WorkerRequest {
    /// Buffer events, in emission order.
    Change(Vec<EditEvent>),
    /// Replace the whole content.
    SetContent(String),
    /// Register a library source.
    AddLibrary {
        /// Library name.
        name: String,
        /// Library source.
        content: String,
    },
    /// Answer `query` under `id`.
    Query {
        /// Client-allocated request id.
        id: u64,
        /// The question.
        query: Query,
    },
    /// Stop the worker thread.
    Shutdown,
}

/// Messages from the worker to the UI side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    /// Answer to the request with this id.
    Response {
        /// Request id.
        id: u64,
        /// Result, or the engine error message.
        result: Result<QueryResult, String>,
    },
    /// Fresh diagnostics from a debounced re-analysis.
    Diagnostics {
        /// Re-analysis generation; later generations supersede earlier ones.
        generation: u64,
        /// Annotations for the current content.
        annotations: Vec<Annotation>,
    },
    /// An edit could not be replayed.
    ///
    /// The rest of that batch is dropped, and so are later [`WorkerRequest::Change`] batches: they
    /// describe a buffer state the worker never reached. The worker's engine is re-registered
    /// from the worker's last good content, which may lag the client; send
    /// [`WorkerRequest::SetContent`] (see [`AnalysisWorker::set_content`]) with the client's
    /// current text to resume synchronization.
    Failed {
        /// Error description.
        message: String,
        /// Events of the failing batch that were not replayed after the failure.
        skipped: usize,
    },
}

struct WorkerState<E> {
    engine: E,
    buffer: Buffer,
    sync: EditSynchronizer,
    reanalysis: Debouncer,
    diverged: bool,
    tx: mpsc::Sender<WorkerEvent>,
}

impl<E: AnalysisEngine> WorkerState<E> {
    fn apply_changes(&mut self, events: Vec<EditEvent>) {
        if self.diverged {
            tracing::debug!(count = events.len(), "dropping changes until content is reset");
            return;
        }
        let total = events.len();
        for (index, event) in events.iter().enumerate() {
            let result = self
                .buffer
                .apply_event(event)
                .map_err(crate::error::SyncError::from)
                .and_then(|()| self.sync.sync_event(&mut self.engine, &self.buffer, event));
            if let Err(err) = result {
                let skipped = total - index - 1;
                tracing::warn!(error = %err, skipped, "worker failed to replay edit");
                self.diverged = true;
                self.sync.resync(&mut self.engine, &self.buffer);
                let _ = self.tx.send(WorkerEvent::Failed {
                    message: err.to_string(),
                    skipped,
                });
                return;
            }
        }
    }

    fn annotations(&self) -> Result<Vec<Annotation>, EngineError> {
        let diagnostics = self.engine.diagnostics(self.sync.document_id())?;
        Ok(diagnostics
            .iter()
            .map(|d| d.to_annotation(&self.buffer))
            .collect())
    }

    fn answer(&self, query: Query) -> Result<QueryResult, EngineError> {
        let id = self.sync.document_id();
        let engine = &self.engine;
        Ok(match query {
            Query::Completions {
                offset,
                is_member_completion,
            } => QueryResult::Completions(engine.completions_at(id, offset, is_member_completion)?),
            Query::Type { offset } => QueryResult::Type(engine.type_at(id, offset)?),
            Query::Signature { offset } => QueryResult::Signature(engine.signature_at(id, offset)?),
            Query::Occurrences { offset } => {
                QueryResult::References(engine.occurrences_at(id, offset)?)
            }
            Query::References { offset } => {
                QueryResult::References(engine.references_at(id, offset)?)
            }
            Query::Definition { offset } => {
                QueryResult::Definitions(engine.definition_at(id, offset)?)
            }
            Query::NavigateTo { query } => QueryResult::NavigateTo(engine.navigate_to(&query)),
            Query::Diagnostics => QueryResult::Diagnostics(self.annotations()?),
            Query::SmartIndent { line, options } => {
                QueryResult::SmartIndent(engine.smart_indent(id, line, &options)?)
            }
        })
    }

    fn run_due_analysis(&mut self) {
        let Some(generation) = self.reanalysis.take_due(Instant::now()) else {
            return;
        };
        match self.annotations() {
            Ok(annotations) => {
                tracing::debug!(generation, count = annotations.len(), "re-analysis finished");
                let _ = self.tx.send(WorkerEvent::Diagnostics {
                    generation,
                    annotations,
                });
            }
            Err(err) => tracing::warn!(error = %err, "re-analysis failed"),
        }
    }
}

fn worker_loop<E: AnalysisEngine>(mut state: WorkerState<E>, rx: mpsc::Receiver<WorkerRequest>) {
    loop {
        let received = match state.reanalysis.deadline() {
            Some(deadline) => {
                rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(WorkerRequest::Change(events)) => {
                state.apply_changes(events);
                state.reanalysis.schedule(Instant::now());
            }
            Ok(WorkerRequest::SetContent(text)) => {
                state.diverged = false;
                state.buffer.set_value(&text);
                state.sync.register(&mut state.engine, &state.buffer);
                state.reanalysis.schedule(Instant::now());
            }
            Ok(WorkerRequest::AddLibrary { name, content }) => {
                tracing::info!(library = %name, "adding library");
                state.engine.add_library(&name, &content);
                state.reanalysis.schedule(Instant::now());
            }
            Ok(WorkerRequest::Query { id, query }) => {
                let result = state.answer(query).map_err(|err| err.to_string());
                if state.tx.send(WorkerEvent::Response { id, result }).is_err() {
                    break;
                }
            }
            Ok(WorkerRequest::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        state.run_due_analysis();
    }
    tracing::info!(document = %state.sync.document_id(), "analysis worker stopped");
}

/// Handle to a background analysis thread.
pub struct AnalysisWorker {
    tx: mpsc::Sender<WorkerRequest>,
    rx: mpsc::Receiver<WorkerEvent>,
    pending: VecDeque<WorkerEvent>,
    next_id: u64,
    timeout: Duration,
    handle: Option<JoinHandle<()>>,
}

impl AnalysisWorker {
    /// Spawn a worker owning `engine`, starting from `initial_text`.
    pub fn spawn<E>(engine: E, initial_text: &str, config: &AnalysisConfig) -> Self
    where
        E: AnalysisEngine + Send + 'static,
    {
        let (tx_req, rx_req) = mpsc::channel::<WorkerRequest>();
        let (tx_evt, rx_evt) = mpsc::channel::<WorkerEvent>();

        let mut state = WorkerState {
            engine,
            buffer: Buffer::from_text(initial_text),
            sync: EditSynchronizer::new(config.document_id.clone())
                .with_verification(config.verify_after_edit),
            reanalysis: Debouncer::new(config.reanalysis_delay()),
            diverged: false,
            tx: tx_evt,
        };
        state.sync.register(&mut state.engine, &state.buffer);
        state.reanalysis.schedule(Instant::now());

        tracing::info!(document = %config.document_id, "spawning analysis worker");
        let handle = thread::spawn(move || worker_loop(state, rx_req));

        Self {
            tx: tx_req,
            rx: rx_evt,
            pending: VecDeque::new(),
            next_id: 1,
            timeout: config.request_timeout(),
            handle: Some(handle),
        }
    }

    fn send(&self, request: WorkerRequest) -> Result<(), WorkerError> {
        self.tx.send(request).map_err(|_| WorkerError::Disconnected)
    }

    /// Forward buffer events (already applied on the UI side) in emission order.
    ///
    /// After a [`WorkerEvent::Failed`], changes are ignored until [`AnalysisWorker::set_content`].
    pub fn send_changes(&self, events: Vec<EditEvent>) -> Result<(), WorkerError> {
        self.send(WorkerRequest::Change(events))
    }

    /// Replace the worker's content. This also recovers from [`WorkerEvent::Failed`].
    pub fn set_content(&self, text: impl Into<String>) -> Result<(), WorkerError> {
        self.send(WorkerRequest::SetContent(text.into()))
    }

    /// Register a library source in the worker's engine.
    pub fn add_library(
        &self,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<(), WorkerError> {
        self.send(WorkerRequest::AddLibrary {
            name: name.into(),
            content: content.into(),
        })
    }

    /// Send a query and return its request id.
    pub fn request(&mut self, query: Query) -> Result<u64, WorkerError> {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.send(WorkerRequest::Query { id, query })?;
        Ok(id)
    }

    /// Wait for the response to `id`.
    ///
    /// Unrelated events received meanwhile are kept for [`AnalysisWorker::try_recv`].
    pub fn wait_for_response(
        &mut self,
        id: u64,
        timeout: Duration,
    ) -> Result<QueryResult, WorkerError> {
        let buffered = self
            .pending
            .iter()
            .position(|event| matches!(event, WorkerEvent::Response { id: got, .. } if *got == id));
        if let Some(WorkerEvent::Response { result, .. }) =
            buffered.and_then(|index| self.pending.remove(index))
        {
            return result.map_err(WorkerError::Engine);
        }

        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(WorkerError::Timeout { id });
            }

            let event = self.rx.recv_timeout(deadline - now).map_err(|err| match err {
                RecvTimeoutError::Timeout => WorkerError::Timeout { id },
                RecvTimeoutError::Disconnected => WorkerError::Disconnected,
            })?;

            match event {
                WorkerEvent::Response { id: got, result } if got == id => {
                    return result.map_err(WorkerError::Engine);
                }
                other => self.pending.push_back(other),
            }
        }
    }

    /// Send a query and wait for its answer with the configured timeout.
    pub fn query(&mut self, query: Query) -> Result<QueryResult, WorkerError> {
        let id = self.request(query)?;
        self.wait_for_response(id, self.timeout)
    }

    /// Next buffered or received event, without blocking.
    pub fn try_recv(&mut self) -> Option<WorkerEvent> {
        self.pending
            .pop_front()
            .or_else(|| self.rx.try_recv().ok())
    }

    /// Next buffered or received event, waiting up to `timeout`.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<WorkerEvent> {
        self.pending
            .pop_front()
            .or_else(|| self.rx.recv_timeout(timeout).ok())
    }

    /// Stop the worker and wait for its thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.tx.send(WorkerRequest::Shutdown);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("analysis worker thread panicked");
        }
    }
}

impl Drop for AnalysisWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

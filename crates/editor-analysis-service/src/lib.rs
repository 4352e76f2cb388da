#![warn(missing_docs)]
//! Editor Analysis Service - language-service integration on top of `editor-analysis`
//!
//! # Overview
//!
//! This crate connects a host [`Buffer`](editor_analysis::Buffer) to an analysis engine behind
//! the [`AnalysisEngine`] trait:
//!
//! - [`EditSynchronizer`] replays each buffer event as exactly one offset edit on the engine's
//!   copy of the document.
//! - [`AnalysisSession`] owns an engine for one buffer and drives completion, tooltips, occurrence
//!   highlighting, go-to-definition, smart indentation and error markers from it.
//! - [`AnalysisWorker`] runs an engine on a background thread with debounced re-analysis.
//! - [`LexicalEngine`] is a self-contained, regex-based engine useful for tests and plain-text
//!   fallbacks.
//!
//! # Example
//!
//! ```rust
//! use editor_analysis::{Buffer, Coordinate};
//! use editor_analysis_service::{AnalysisConfig, AnalysisEngine, AnalysisSession, LexicalEngine};
//!
//! let mut buffer = Buffer::from_lines(["var count = 1;", ""]);
//! let mut session = AnalysisSession::new(LexicalEngine::new(), AnalysisConfig::default());
//! session.enable(&buffer);
//!
//! let event = buffer.insert_text(Coordinate::new(1, 0), "cou");
//! session.on_buffer_change(&buffer, &event);
//!
//! assert_eq!(
//!     session.engine().document_text("temp.ts").as_deref(),
//!     Some("var count = 1;\ncou")
//! );
//! let names: Vec<String> = session
//!     .completions(&buffer, Coordinate::new(1, 3))
//!     .into_iter()
//!     .map(|entry| entry.name)
//!     .collect();
//! assert!(names.contains(&"count".to_string()));
//! ```
//!
//! # Module Description
//!
//! - [`engine`] - engine trait and query result types
//! - [`script`] - script host (documents and libraries)
//! - [`lexical`] - regex-based reference engine
//! - [`sync`] - buffer event → engine edit synchronization
//! - [`completion`] - completion requests and popup state
//! - [`tooltip`] - type tooltips
//! - [`occurrences`] - occurrences, rename ranges, go-to-definition
//! - [`indent`] - smart indentation
//! - [`debounce`] - deadline-based debouncing
//! - [`worker`] - background analysis thread
//! - [`session`] - per-buffer session
//! - [`config`] - configuration
//! - [`error`] - error types

pub mod completion;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod indent;
pub mod lexical;
pub mod occurrences;
pub mod script;
pub mod session;
pub mod sync;
pub mod tooltip;
pub mod worker;

pub use completion::{
    AutoComplete, CompletionEdit, CompletionRequest, RefreshTarget, completion_request,
    fetch_completions, filter_and_sort,
};
pub use config::AnalysisConfig;
pub use debounce::{DEFAULT_REANALYSIS_DELAY_MS, Debouncer};
pub use engine::{
    AnalysisEngine, CompletionEntry, CompletionInfo, DefinitionInfo, MemberName, NavigateToItem,
    ReferenceEntry, SignatureInfo, TypeInfo,
};
pub use error::{ConfigError, EngineError, SyncError, WorkerError};
pub use indent::{IndentAction, indent_action};
pub use lexical::LexicalEngine;
pub use occurrences::{DefinitionTarget, OccurrenceState, definition_target, occurrence_ranges};
pub use script::{ScriptHost, ScriptInfo};
pub use session::{AnalysisSession, PollOutcome};
pub use sync::{EditSynchronizer, SyncOutcome};
pub use tooltip::{Tooltip, TooltipState, tooltip_text};
pub use worker::{AnalysisWorker, Query, QueryResult, WorkerEvent, WorkerRequest};

//! Grading session controller.
//!
//! One `GradingSession` instance per open document, constructed with the
//! host's rubric configuration and storage backend. It composes the mark
//! store, tool selector, gesture engine and rubric into a single
//! persistable unit; there are no ambient singletons.

use crate::gesture::{GestureEngine, GestureOutcome};
use crate::input::PointerEvent;
use crate::mark::{Mark, MarkId, MarkKind};
use crate::rubric::{Rubric, RubricCriterion, RubricError};
use crate::storage::{AutoSaveManager, Storage, StorageError};
use crate::store::{MarkStore, MarkTally, StoreError};
use crate::tools::ToolSelector;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("the grading session is closed")]
    Closed,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Rubric(#[from] RubricError),
}

/// Lifecycle state of a session. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Open,
    Closed,
}

/// Immutable serialized view of a session at a point in time, used for
/// autosave and final submission. Round-trips losslessly through JSON;
/// transient flags are not part of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingRecord {
    pub document_id: String,
    pub marks: Vec<Mark>,
    pub criteria: Vec<RubricCriterion>,
    pub overall_comment: String,
    /// Caller-supplied timestamp, milliseconds since the epoch.
    pub timestamp: u64,
}

impl GradingRecord {
    /// Serialize the record to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a record from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

type PersistErrorHandler = Box<dyn Fn(&StorageError) + Send + Sync>;

/// Controller for one document's grading pass.
pub struct GradingSession<S: Storage> {
    document_id: String,
    marks: MarkStore,
    tools: ToolSelector,
    gestures: GestureEngine,
    rubric: Rubric,
    overall_comment: String,
    state: SessionState,
    autosave: AutoSaveManager<S>,
    on_persist_error: Option<PersistErrorHandler>,
}

impl<S: Storage> GradingSession<S> {
    /// Open a session over a document with host-supplied rubric
    /// configuration and storage backend.
    pub fn new(document_id: impl Into<String>, rubric: Rubric, storage: Arc<S>) -> Self {
        let document_id = document_id.into();
        let mut autosave = AutoSaveManager::new(storage);
        autosave.set_document_id(Some(document_id.clone()));
        Self {
            document_id,
            marks: MarkStore::new(),
            tools: ToolSelector::new(),
            gestures: GestureEngine::new(),
            rubric,
            overall_comment: String::new(),
            state: SessionState::Open,
            autosave,
            on_persist_error: None,
        }
    }

    /// Install a callback for persistence failures. Autosave errors are
    /// reported here and swallowed; they never interrupt grading.
    pub fn set_persist_error_handler(
        &mut self,
        handler: impl Fn(&StorageError) + Send + Sync + 'static,
    ) {
        self.on_persist_error = Some(Box::new(handler));
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Open => Ok(()),
            SessionState::Closed => Err(SessionError::Closed),
        }
    }

    fn report_persist_error(&self, err: &StorageError) {
        log::warn!("persistence failed for {}: {err}", self.document_id);
        if let Some(handler) = &self.on_persist_error {
            handler(err);
        }
    }

    /// The document being graded.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session still accepts mutations.
    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    // --- pointer surface -------------------------------------------------

    /// Feed a pointer event from the host surface through the gesture
    /// engine. Never errors; after the session closes, events are
    /// ignored.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> GestureOutcome {
        if !self.is_open() {
            log::debug!("pointer event on closed session ignored");
            return GestureOutcome::None;
        }
        let outcome = self.gestures.handle(event, &mut self.marks, &self.tools);
        match outcome {
            GestureOutcome::Dragged(_)
            | GestureOutcome::Created(_)
            | GestureOutcome::Removed(_) => self.autosave.mark_dirty(),
            GestureOutcome::None | GestureOutcome::Grabbed(_) | GestureOutcome::Released(_) => {}
        }
        outcome
    }

    /// Select or toggle the active tool.
    pub fn select_tool(&mut self, kind: MarkKind) {
        self.tools.select(kind);
    }

    /// The currently active tool.
    pub fn current_tool(&self) -> Option<MarkKind> {
        self.tools.current()
    }

    // --- marks -----------------------------------------------------------

    /// Place a mark directly, outside the gesture path.
    pub fn add_mark(
        &mut self,
        kind: MarkKind,
        origin: Point,
        extent: Option<Size>,
    ) -> Result<MarkId, SessionError> {
        self.ensure_open()?;
        let id = self.marks.add(kind, origin, extent)?;
        self.autosave.mark_dirty();
        Ok(id)
    }

    /// Delete a mark directly.
    pub fn remove_mark(&mut self, id: MarkId) -> Result<Mark, SessionError> {
        self.ensure_open()?;
        let mark = self.marks.remove(id)?;
        self.autosave.mark_dirty();
        Ok(mark)
    }

    /// Read access to the marks on the document.
    pub fn marks(&self) -> &MarkStore {
        &self.marks
    }

    /// Per-kind mark counts for UI badges.
    pub fn tally(&self) -> MarkTally {
        self.marks.tally()
    }

    // --- rubric ----------------------------------------------------------

    /// Select a level for a criterion, or `None` to unscore it.
    pub fn set_level(&mut self, criterion_id: &str, level: Option<usize>) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.rubric.set_level(criterion_id, level)?;
        self.autosave.mark_dirty();
        Ok(())
    }

    /// Replace a criterion's comment.
    pub fn set_comment(
        &mut self,
        criterion_id: &str,
        text: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.rubric.set_comment(criterion_id, text)?;
        self.autosave.mark_dirty();
        Ok(())
    }

    /// Apply a criterion's precomputed hint as its selection.
    pub fn accept_suggestion(&mut self, criterion_id: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.rubric.accept_suggestion(criterion_id)?;
        self.autosave.mark_dirty();
        Ok(())
    }

    /// Replace the document-level comment.
    pub fn set_overall_comment(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.overall_comment = text.into();
        self.autosave.mark_dirty();
        Ok(())
    }

    /// The document-level comment.
    pub fn overall_comment(&self) -> &str {
        &self.overall_comment
    }

    /// Read access to the rubric.
    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }

    // --- persistence -----------------------------------------------------

    /// Produce a record of the current state. Pure and deterministic
    /// given the state and the caller-supplied timestamp.
    pub fn snapshot(&self, timestamp: u64) -> GradingRecord {
        GradingRecord {
            document_id: self.document_id.clone(),
            marks: self.marks.to_vec(),
            criteria: self.rubric.to_vec(),
            overall_comment: self.overall_comment.clone(),
            timestamp,
        }
    }

    /// Host-driven autosave tick. Saves when the session is open, has
    /// unsaved changes and the interval has elapsed. Persistence errors
    /// go to the error handler and are swallowed. Returns whether a save
    /// happened.
    pub fn autosave_tick(&mut self, timestamp: u64) -> bool {
        if !self.is_open() || !self.autosave.should_save() {
            return false;
        }
        let record = self.snapshot(timestamp);
        match self.autosave.save(&record) {
            Ok(()) => true,
            Err(err) => {
                self.report_persist_error(&err);
                false
            }
        }
    }

    /// Explicit save/submit. Produces the final record, persists it and
    /// closes the session; afterwards every mutation fails with
    /// `Closed`. Persistence failures are reported through the error
    /// handler; the record is returned to the caller either way.
    pub fn finalize(&mut self, timestamp: u64) -> Result<GradingRecord, SessionError> {
        self.ensure_open()?;
        let record = self.snapshot(timestamp);
        if let Err(err) = self.autosave.save(&record) {
            self.report_persist_error(&err);
        }
        self.state = SessionState::Closed;
        Ok(record)
    }

    /// Host teardown: stop scheduling autosaves without submitting.
    /// An in-flight persistence call is not cancelled.
    pub fn detach(&mut self) {
        self.autosave.set_enabled(false);
    }

    /// Rehydrate marks, comments and rubric selections from a saved
    /// record. Criteria that no longer exist in the configured rubric
    /// are skipped.
    pub fn apply_record(&mut self, record: &GradingRecord) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.marks.clear();
        for mark in &record.marks {
            self.marks.restore(mark.clone())?;
        }
        self.overall_comment = record.overall_comment.clone();
        for criterion in &record.criteria {
            if self.rubric.criterion(&criterion.id).is_none() {
                log::debug!("skipping unknown criterion {} from record", criterion.id);
                continue;
            }
            self.rubric.set_level(&criterion.id, criterion.selected_level)?;
            self.rubric.set_comment(&criterion.id, criterion.comment.clone())?;
        }
        Ok(())
    }

    /// The autosave manager, for interval tuning and record listing.
    pub fn autosave(&self) -> &AutoSaveManager<S> {
        &self.autosave
    }

    /// Mutable access to the autosave manager.
    pub fn autosave_mut(&mut self) -> &mut AutoSaveManager<S> {
        &mut self.autosave
    }
}

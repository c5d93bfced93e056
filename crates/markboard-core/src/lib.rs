//! Markboard Core Library
//!
//! Platform-agnostic logic for the Markboard grading canvas: spatial
//! marks over a student document, pointer gesture interpretation,
//! weighted rubric scoring and session persistence. The host supplies a
//! rendering surface, surface-local pointer coordinates and a storage
//! backend; everything else lives here.

pub mod gesture;
pub mod input;
pub mod mark;
pub mod rubric;
pub mod session;
pub mod storage;
pub mod store;
pub mod tools;

pub use gesture::{GestureEngine, GestureOutcome, GesturePhase, GRAB_TOLERANCE};
pub use input::{ActivationTracker, PointerEvent};
pub use mark::{Mark, MarkId, MarkKind};
pub use rubric::{BilingualLabel, Rubric, RubricCriterion, RubricError, RubricLevel};
pub use session::{GradingRecord, GradingSession, SessionError, SessionState};
pub use storage::{AutoSaveManager, MemoryStorage, Storage, StorageError};
pub use store::{MarkStore, MarkTally, StoreError};
pub use tools::ToolSelector;

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;

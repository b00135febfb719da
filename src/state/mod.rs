/// State management module
///
/// This module handles all editing state, including:
/// - Adjustment values and non-destructive editing (edit.rs)
/// - Shared data structures (data.rs)
/// - Single-image undo/redo with batch commits (history.rs)
/// - Multi-image history with selection-scoped undo/redo (batch.rs)
/// - Saved sessions in the SQLite catalog (library.rs)

pub mod edit;
pub mod data;
pub mod history;
pub mod batch;
pub mod library;

pub use batch::{BatchHistoryInfo, SelectiveBatchHistory};
pub use data::{BatchAdjustmentState, ImageConfig, ImageId, SavedTimeline};
pub use edit::{AdjustmentField, AdjustmentPatch, AdjustmentSnapshot};
pub use history::{BatchMode, HistoryInfo, LinearHistory};
pub use library::SessionStore;

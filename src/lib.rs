//! Editing state core for the RAW editor.
//!
//! - [`state`]: adjustment values, single-image undo/redo with batch
//!   commits, multi-image selective history and the session store.
//! - [`raw`]: the priority render queue in front of the image engine.
//! - [`config`]: on-disk editor configuration.
//!
//! The history engines are plain synchronous state machines. Each editing
//! surface owns its own instance; nothing here is global.

pub mod config;
pub mod error;
pub mod raw;
pub mod state;

pub use config::{BatchOptions, EditorConfig, HistoryOptions, QueueOptions};
pub use error::{ConfigError, QueueError, StoreError};
pub use raw::{ProcessingQueue, QueueStatus, RenderOutput, RenderTask};
pub use state::{
    AdjustmentField, AdjustmentPatch, AdjustmentSnapshot, BatchAdjustmentState, ImageConfig,
    LinearHistory, SelectiveBatchHistory, SessionStore,
};

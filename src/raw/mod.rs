/// Render request plumbing
///
/// This module handles:
/// - Describing preview render requests (task.rs)
/// - Serializing requests into the one-at-a-time image engine (queue.rs)
/// - Running blocking engines off the async workers (preview.rs)

pub mod task;
pub mod queue;
pub mod preview;

pub use queue::{ListenerId, ProcessFuture, ProcessingQueue, Processor, QueueStatus};
pub use task::{RenderOutput, RenderTask};

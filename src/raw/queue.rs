//! Priority render queue in front of the image engine.
//!
//! The engine can only render one preview at a time, so every request goes
//! through this queue:
//! - Requests are ordered by priority (highest first), then by arrival
//! - A short debounce window absorbs bursts before draining starts
//! - One drain loop runs at a time; it awaits the engine for each task and
//!   yields to the runtime between tasks
//!
//! # Usage
//!
//! ```ignore
//! let queue = ProcessingQueue::new();
//! queue.set_processor(|task: RenderTask| async move { engine.render(task).await });
//!
//! let preview = queue
//!     .request_processing(RenderTask::new(id, path).with_priority(5))
//!     .await?;
//! ```
//!
//! Must be used from inside a tokio runtime.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::task::{RenderOutput, RenderTask};
use crate::config::QueueOptions;
use crate::error::QueueError;

/// Boxed future returned by a processor
pub type ProcessFuture = Pin<Box<dyn Future<Output = Result<RenderOutput, String>> + Send>>;

/// The engine's render function, called for one task at a time
pub type Processor = Arc<dyn Fn(RenderTask) -> ProcessFuture + Send + Sync>;

/// Callback fired whenever the queue status may have changed
pub type StatusListener = Arc<dyn Fn(QueueStatus) + Send + Sync>;

type Reply = oneshot::Sender<Result<RenderOutput, QueueError>>;
type Pending = oneshot::Receiver<Result<RenderOutput, QueueError>>;

/// Snapshot of the queue for diagnostics and spinners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub queue_length: usize,
    pub is_processing: bool,
    pub has_processor: bool,
}

/// Handle returned by [`ProcessingQueue::on_status_change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A task waiting in the heap
struct QueuedRequest {
    task: RenderTask,
    priority: i32,
    sequence: u64,
    enqueued_at: Instant,
    reply: Reply,
}

impl Ord for QueuedRequest {
    /// Higher priority first; among equals the older request wins.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueuedRequest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedRequest {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for QueuedRequest {}

#[derive(Default)]
struct Inner {
    heap: BinaryHeap<QueuedRequest>,
    processor: Option<Processor>,
    is_processing: bool,
    next_sequence: u64,
    debounce: Option<JoinHandle<()>>,
    listeners: Vec<(ListenerId, StatusListener)>,
    next_listener: u64,
}

impl Inner {
    fn status(&self) -> QueueStatus {
        QueueStatus {
            queue_length: self.heap.len(),
            is_processing: self.is_processing,
            has_processor: self.processor.is_some(),
        }
    }
}

struct Shared {
    inner: Mutex<Inner>,
    debounce: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Serializes render requests into a single engine.
///
/// Cloning gives another handle to the same queue.
#[derive(Clone)]
pub struct ProcessingQueue {
    shared: Arc<Shared>,
}

impl ProcessingQueue {
    pub fn new() -> Self {
        Self::with_options(QueueOptions::default())
    }

    pub fn with_options(options: QueueOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner::default()),
                debounce: Duration::from_millis(options.debounce_ms),
            }),
        }
    }

    /// Install the engine's render function.
    ///
    /// Errors returned by `render` are turned into
    /// [`QueueError::Failed`] for the task that caused them. If work is
    /// already waiting, draining starts right away.
    pub fn set_processor<F, Fut, E>(&self, render: F)
    where
        F: Fn(RenderTask) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RenderOutput, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let processor: Processor = Arc::new(move |task: RenderTask| -> ProcessFuture {
            let pending = render(task);
            Box::pin(async move { pending.await.map_err(|e| e.to_string()) })
        });

        let has_work = {
            let mut inner = self.shared.lock();
            inner.processor = Some(processor);
            !inner.heap.is_empty()
        };
        log::debug!("Render processor installed");
        self.notify();

        if has_work {
            match Handle::try_current() {
                Ok(runtime) => {
                    let queue = self.clone();
                    runtime.spawn(async move { queue.process_queue().await });
                }
                Err(_) => log::warn!("No tokio runtime, render queue drain deferred"),
            }
        }
    }

    /// Queue a task and wait for its result.
    ///
    /// The task is queued when this is called, not when the future is
    /// first polled. Without a processor the future resolves to
    /// [`QueueError::NotReady`] and nothing is queued.
    pub fn request_processing(
        &self,
        task: RenderTask,
    ) -> impl Future<Output = Result<RenderOutput, QueueError>> + Send + 'static {
        let queued = self.enqueue(task);
        async move {
            match queued {
                Ok(receiver) => receiver.await.unwrap_or(Err(QueueError::Dropped)),
                Err(e) => Err(e),
            }
        }
    }

    /// Drain the heap, one task at a time.
    ///
    /// Returns immediately if another drain is running, the heap is empty
    /// or there is no processor. Normally started by the debounce timer.
    pub async fn process_queue(&self) {
        {
            let mut inner = self.shared.lock();
            if inner.is_processing || inner.heap.is_empty() || inner.processor.is_none() {
                return;
            }
            inner.is_processing = true;
        }
        self.notify();

        loop {
            let next = {
                let mut inner = self.shared.lock();
                let next = match inner.processor.clone() {
                    Some(processor) => inner.heap.pop().map(|request| (request, processor)),
                    None => None,
                };
                if next.is_none() {
                    inner.is_processing = false;
                }
                next
            };
            let Some((request, processor)) = next else {
                break;
            };
            self.notify();

            let QueuedRequest {
                task,
                priority,
                enqueued_at,
                reply,
                ..
            } = request;
            let id = task.id.clone();
            let started = Instant::now();

            let result = run_processor(processor, task).await;

            match &result {
                Ok(_) => log::debug!(
                    "Rendered {} (priority {}) in {:?}, waited {:?}",
                    id,
                    priority,
                    started.elapsed(),
                    started.duration_since(enqueued_at)
                ),
                Err(e) => log::warn!("Render of {id} failed: {e}"),
            }
            // The caller may have stopped waiting; that's fine.
            let _ = reply.send(result);
            self.notify();

            tokio::task::yield_now().await;
        }

        self.notify();
    }

    /// Drop every queued task; their callers get [`QueueError::Cleared`].
    pub fn clear_queue(&self) {
        let pending: Vec<QueuedRequest> = {
            let mut inner = self.shared.lock();
            inner.heap.drain().collect()
        };
        if !pending.is_empty() {
            log::debug!("Render queue cleared: {} tasks dropped", pending.len());
        }
        for request in pending {
            let _ = request.reply.send(Err(QueueError::Cleared));
        }
        self.notify();
    }

    /// Cancel the pending debounce, clear the queue and drop all listeners.
    pub fn cleanup(&self) {
        let timer = self.shared.lock().debounce.take();
        if let Some(timer) = timer {
            timer.abort();
        }
        self.clear_queue();
        self.shared.lock().listeners.clear();
    }

    pub fn get_queue_status(&self) -> QueueStatus {
        self.shared.lock().status()
    }

    /// Register a callback fired on enqueue, dequeue, settle and clear.
    pub fn on_status_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(QueueStatus) + Send + Sync + 'static,
    {
        let mut inner = self.shared.lock();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, Arc::new(listener)));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) {
        self.shared
            .lock()
            .listeners
            .retain(|(listener_id, _)| *listener_id != id);
    }

    fn enqueue(&self, task: RenderTask) -> Result<Pending, QueueError> {
        let (reply, receiver) = oneshot::channel();
        {
            let mut inner = self.shared.lock();
            if inner.processor.is_none() {
                log::warn!("Render request {} rejected: no processor installed", task.id);
                return Err(QueueError::NotReady);
            }
            let sequence = inner.next_sequence;
            inner.next_sequence += 1;
            inner.heap.push(QueuedRequest {
                priority: task.priority,
                task,
                sequence,
                enqueued_at: Instant::now(),
                reply,
            });
        }
        self.notify();
        self.schedule_drain();
        Ok(receiver)
    }

    /// (Re)start the debounce timer; when it fires, a drain task starts.
    fn schedule_drain(&self) {
        let Ok(runtime) = Handle::try_current() else {
            log::warn!("No tokio runtime, render queue drain deferred");
            return;
        };

        let queue = self.clone();
        let delay = self.shared.debounce;
        let timer = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so that a later debounce reset can't abort a drain.
            tokio::spawn(async move { queue.process_queue().await });
        });
        log::trace!("Render drain scheduled in {delay:?}");

        let previous = self.shared.lock().debounce.replace(timer);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Call every listener with the current status, outside the lock.
    fn notify(&self) {
        let (status, listeners) = {
            let inner = self.shared.lock();
            let listeners: Vec<StatusListener> = inner
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            (inner.status(), listeners)
        };
        for listener in listeners {
            listener(status);
        }
    }
}

impl Default for ProcessingQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one task on its own tokio task so a panicking engine only fails
/// that task.
async fn run_processor(
    processor: Processor,
    task: RenderTask,
) -> Result<RenderOutput, QueueError> {
    match tokio::spawn(async move { (*processor)(task).await }).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(message)) => Err(QueueError::Failed(message)),
        Err(join) => Err(QueueError::Failed(format!("processor panicked: {join}"))),
    }
}

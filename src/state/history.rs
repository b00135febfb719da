//! Single-image undo/redo history.
//!
//! One timeline of [`AdjustmentSnapshot`]s and a cursor into it:
//! - Pushing a new snapshot truncates the redo tail (new timeline branch)
//! - Batch mode defers commits so a slider drag becomes one undo step
//! - An optional maximum length drops the oldest entries
//!
//! # Usage
//!
//! ```ignore
//! let mut history = LinearHistory::new(AdjustmentSnapshot::default());
//!
//! history.push_state(history.current().with(AdjustmentField::Exposure, 20));
//! history.undo();
//!
//! // Slider drag: many updates, one history entry
//! history.set_batch_mode(true);
//! for value in 1..=30 {
//!     history.push_state(history.current().with(AdjustmentField::Contrast, value));
//! }
//! history.set_batch_mode(false);
//! ```
//!
//! Every operation is infallible. Out-of-range indices and empty inputs
//! are ignored (and logged when `dev_warnings` is on).

use std::fmt;
use std::mem;

use serde::Serialize;

use super::data::SavedTimeline;
use super::edit::AdjustmentSnapshot;
use crate::config::HistoryOptions;

/// Whether pushes are committed immediately or coalesced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    Idle,
    /// Pushes only update the current value; the timeline is untouched
    /// until the batch ends.
    Batching {
        baseline_index: usize,
        baseline: AdjustmentSnapshot,
    },
}

/// Read model for the history panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryInfo {
    pub can_undo: bool,
    pub can_redo: bool,
    pub history_length: usize,
    pub current_index: usize,
    pub is_batching: bool,
    /// Approximate bytes held by the timeline
    pub memory_estimate: usize,
}

/// Undo/redo engine for editing one image.
///
/// Invariants: the timeline is never empty, `index < timeline.len()`, and
/// outside batch mode `current == timeline[index]`.
#[derive(Debug, Clone)]
pub struct LinearHistory {
    timeline: Vec<AdjustmentSnapshot>,
    index: usize,
    current: AdjustmentSnapshot,
    mode: BatchMode,
    options: HistoryOptions,
}

impl LinearHistory {
    /// Create a history seeded with `initial` and default options.
    pub fn new(initial: AdjustmentSnapshot) -> Self {
        Self::with_options(initial, HistoryOptions::default())
    }

    pub fn with_options(initial: AdjustmentSnapshot, options: HistoryOptions) -> Self {
        let mut history = Self {
            timeline: vec![initial],
            index: 0,
            current: initial,
            mode: BatchMode::Idle,
            options,
        };
        history.mode = history.session_default_mode();
        history
    }

    /// The value the UI should display.
    pub fn current(&self) -> &AdjustmentSnapshot {
        &self.current
    }

    pub fn mode(&self) -> BatchMode {
        self.mode
    }

    pub fn is_batching(&self) -> bool {
        matches!(self.mode, BatchMode::Batching { .. })
    }

    pub fn options(&self) -> &HistoryOptions {
        &self.options
    }

    /// Record a new value.
    ///
    /// Equal values are ignored. Outside batch mode the redo tail is
    /// discarded and `next` becomes the new last entry; in batch mode only
    /// the current value changes.
    pub fn push_state(&mut self, next: AdjustmentSnapshot) {
        if next == self.current {
            return;
        }

        self.current = next;

        if self.is_batching() {
            return;
        }

        self.append(next);
        log::debug!(
            "History push: index {} of {}",
            self.index,
            self.timeline.len()
        );
    }

    /// Step back one entry. Always ends batch mode first, dropping any
    /// uncommitted batch.
    pub fn undo(&mut self) {
        if self.is_batching() {
            self.warn(format_args!("Discarding uncommitted batch before undo"));
            self.mode = BatchMode::Idle;
            self.current = self.timeline[self.index];
        }

        if self.index == 0 {
            return;
        }

        self.index -= 1;
        self.current = self.timeline[self.index];
        log::debug!("Undo: index {} of {}", self.index, self.timeline.len());
    }

    /// Step forward one entry. Batch mode stays on, rebased on the redone
    /// entry.
    pub fn redo(&mut self) {
        if self.index + 1 >= self.timeline.len() {
            return;
        }

        self.index += 1;
        self.current = self.timeline[self.index];
        if self.is_batching() {
            self.mode = BatchMode::Batching {
                baseline_index: self.index,
                baseline: self.current,
            };
        }
        log::debug!("Redo: index {} of {}", self.index, self.timeline.len());
    }

    /// Start over with a single entry. Batch mode returns to the session
    /// default.
    pub fn reset(&mut self, initial: AdjustmentSnapshot) {
        self.timeline = vec![initial];
        self.index = 0;
        self.current = initial;
        self.mode = self.session_default_mode();
        log::debug!("History reset");
    }

    /// Move the cursor to `index`. Ends batch mode.
    pub fn jump_to_index(&mut self, index: usize) {
        if index >= self.timeline.len() {
            self.warn(format_args!(
                "jump_to_index({index}) out of range (length {})",
                self.timeline.len()
            ));
            return;
        }

        self.mode = BatchMode::Idle;
        self.index = index;
        self.current = self.timeline[index];
    }

    /// Enter or leave batch mode.
    ///
    /// Leaving commits: if the current value differs from the value at
    /// batch start, the timeline is truncated after the batch start and
    /// the current value appended as a single entry.
    pub fn set_batch_mode(&mut self, enabled: bool) {
        match (enabled, self.mode) {
            (true, BatchMode::Idle) => {
                self.mode = BatchMode::Batching {
                    baseline_index: self.index,
                    baseline: self.current,
                };
                log::debug!("Batch started at index {}", self.index);
            }
            (
                false,
                BatchMode::Batching {
                    baseline_index,
                    baseline,
                },
            ) => {
                self.mode = BatchMode::Idle;
                if self.current == baseline {
                    log::debug!("Batch ended without changes");
                    return;
                }
                self.index = baseline_index;
                let committed = self.current;
                self.append(committed);
                log::debug!(
                    "Batch committed: index {} of {}",
                    self.index,
                    self.timeline.len()
                );
            }
            _ => {}
        }
    }

    /// Collapse the timeline to the current value.
    pub fn clear_history(&mut self) {
        self.timeline = vec![self.current];
        self.index = 0;
        if self.is_batching() {
            self.mode = BatchMode::Batching {
                baseline_index: 0,
                baseline: self.current,
            };
        }
        log::debug!("History cleared");
    }

    /// Keep only the newest `keep_last` entries, shifting the cursor.
    pub fn trim_history(&mut self, keep_last: usize) {
        if keep_last == 0 {
            self.warn(format_args!("trim_history(0) ignored: timeline can't be empty"));
            return;
        }
        if self.timeline.len() <= keep_last {
            return;
        }

        let dropped = self.timeline.len() - keep_last;
        self.timeline.drain(..dropped);
        self.index = self.index.saturating_sub(dropped);

        match &mut self.mode {
            BatchMode::Idle => self.current = self.timeline[self.index],
            BatchMode::Batching { baseline_index, .. } => {
                *baseline_index = baseline_index.saturating_sub(dropped);
            }
        }
        log::debug!("History trimmed: dropped {dropped} oldest entries");
    }

    /// Replace the whole timeline, e.g. when loading a saved session.
    /// The cursor goes to `target_index` if valid, otherwise to the last
    /// entry. Ends batch mode. Out-of-range values are clamped.
    pub fn sync_history(&mut self, states: Vec<AdjustmentSnapshot>, target_index: Option<usize>) {
        if states.is_empty() {
            self.warn(format_args!("sync_history called with no states, ignored"));
            return;
        }

        let last = states.len() - 1;
        self.index = match target_index {
            Some(index) if index <= last => index,
            Some(index) => {
                self.warn(format_args!(
                    "sync_history target {index} out of range, using {last}"
                ));
                last
            }
            None => last,
        };
        self.timeline = states.iter().map(AdjustmentSnapshot::clamped).collect();
        self.current = self.timeline[self.index];
        self.mode = BatchMode::Idle;
        log::debug!("History synced: {} entries", self.timeline.len());
    }

    /// Restore a timeline produced by [`LinearHistory::export`].
    pub fn restore(&mut self, saved: SavedTimeline<AdjustmentSnapshot>) {
        self.sync_history(saved.states, Some(saved.index));
    }

    pub fn export(&self) -> SavedTimeline<AdjustmentSnapshot> {
        SavedTimeline {
            states: self.timeline.clone(),
            index: self.index,
        }
    }

    /// The committed timeline.
    pub fn get_history(&self) -> &[AdjustmentSnapshot] {
        &self.timeline
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.timeline.len()
    }

    /// Number of steps `undo` can take.
    pub fn undo_count(&self) -> usize {
        self.index
    }

    /// Number of steps `redo` can take.
    pub fn redo_count(&self) -> usize {
        self.timeline.len() - 1 - self.index
    }

    pub fn info(&self) -> HistoryInfo {
        HistoryInfo {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            history_length: self.timeline.len(),
            current_index: self.index,
            is_batching: self.is_batching(),
            memory_estimate: self.timeline.len() * mem::size_of::<AdjustmentSnapshot>(),
        }
    }

    /// Truncate after the cursor, append, move the cursor to the tail.
    fn append(&mut self, snapshot: AdjustmentSnapshot) {
        self.timeline.truncate(self.index + 1);
        self.timeline.push(snapshot);
        self.index = self.timeline.len() - 1;

        if let Some(max) = self.options.max_size.filter(|&m| m > 0) {
            if self.timeline.len() > max {
                self.trim_history(max);
            }
        }
    }

    fn session_default_mode(&self) -> BatchMode {
        if self.options.batch_by_default {
            BatchMode::Batching {
                baseline_index: self.index,
                baseline: self.current,
            }
        } else {
            BatchMode::Idle
        }
    }

    fn warn(&self, message: fmt::Arguments<'_>) {
        if self.options.dev_warnings {
            log::warn!("{message}");
        }
    }
}

impl Default for LinearHistory {
    fn default() -> Self {
        Self::new(AdjustmentSnapshot::default())
    }
}

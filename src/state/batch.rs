//! Multi-image history with selection-scoped undo/redo.
//!
//! The timeline stores whole [`BatchAdjustmentState`] values, one per
//! committed bulk edit. Undo and redo only move the *selected* images:
//! their values are read from the neighbouring entry and spliced into a
//! copy of the current state. Unselected images keep their current values.
//! The spliced state then overwrites the timeline slot at the new cursor,
//! so a later redo or a re-selection sees what the user actually sees.
//! No other slot is ever rewritten.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::data::{AdjustmentMap, BatchAdjustmentState, ImageConfig, ImageId, SavedTimeline};
use super::edit::{AdjustmentPatch, AdjustmentSnapshot};
use crate::config::BatchOptions;

/// Read model for the bulk-edit panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchHistoryInfo {
    pub can_undo: bool,
    pub can_redo: bool,
    pub history_length: usize,
    pub current_index: usize,
    pub selected_count: usize,
    pub total_images: usize,
}

/// Undo/redo engine for editing many images at once.
#[derive(Debug, Clone)]
pub struct SelectiveBatchHistory {
    state: BatchAdjustmentState,
    selected_ids: Vec<ImageId>,
    all_image_ids: Vec<ImageId>,
    timeline: Vec<BatchAdjustmentState>,
    index: usize,
    options: BatchOptions,
}

impl SelectiveBatchHistory {
    pub fn new() -> Self {
        Self::with_options(BatchOptions::default())
    }

    pub fn with_options(options: BatchOptions) -> Self {
        Self {
            state: BatchAdjustmentState::default(),
            selected_ids: Vec::new(),
            all_image_ids: Vec::new(),
            timeline: vec![BatchAdjustmentState::default()],
            index: 0,
            options,
        }
    }

    /// The live state the UI renders.
    pub fn state(&self) -> &BatchAdjustmentState {
        &self.state
    }

    /// Selected ids, in selection order.
    pub fn selected_ids(&self) -> &[ImageId] {
        &self.selected_ids
    }

    /// Every id ever seen, in first-seen order.
    pub fn all_image_ids(&self) -> &[ImageId] {
        &self.all_image_ids
    }

    /// Stored value for one image, selected or not.
    pub fn get(&self, id: &str) -> Option<&AdjustmentSnapshot> {
        self.state.all_images.get(id)
    }

    /// Replace the selection.
    ///
    /// Known images come back with their stored values. New images are
    /// seeded from their config and remembered as initial states. Not an
    /// undo step.
    pub fn set_selection(&mut self, configs: &[ImageConfig]) {
        let mut next = self.state.clone();
        next.current_selection.clear();
        let mut selected = Vec::with_capacity(configs.len());

        for config in configs {
            let id = &config.image_id;
            if next.current_selection.contains_key(id) {
                continue;
            }
            let value = match next.all_images.get(id) {
                Some(stored) => *stored,
                None => {
                    let seed = config.seed();
                    next.initial_states.insert(id.clone(), seed);
                    next.all_images.insert(id.clone(), seed);
                    self.all_image_ids.push(id.clone());
                    seed
                }
            };
            next.current_selection.insert(id.clone(), value);
            selected.push(id.clone());
        }

        self.state = next;
        self.selected_ids = selected;
        log::debug!("Selection set: {} images", self.selected_ids.len());
    }

    /// Add `delta` to every selected image and record one undo step.
    pub fn adjust_selected(&mut self, delta: &AdjustmentPatch) {
        if self.selected_ids.is_empty() {
            self.warn(format_args!("adjust_selected with empty selection ignored"));
            return;
        }

        let mut next = self.state.clone();
        for id in &self.selected_ids {
            let Some(stored) = next.all_images.get(id) else {
                continue;
            };
            let adjusted = stored.offset(delta);
            next.all_images.insert(id.clone(), adjusted);
            next.current_selection.insert(id.clone(), adjusted);
        }

        if next == self.state {
            return;
        }

        self.commit(next);
        log::debug!(
            "Adjusted {} images: index {} of {}",
            self.selected_ids.len(),
            self.index,
            self.timeline.len()
        );
    }

    /// Step the selected images back one entry.
    pub fn undo(&mut self) {
        if self.selected_ids.is_empty() || self.index == 0 {
            return;
        }
        self.step_to(self.index - 1);
        log::debug!("Selective undo: index {} of {}", self.index, self.timeline.len());
    }

    /// Step the selected images forward one entry.
    pub fn redo(&mut self) {
        if self.selected_ids.is_empty() || self.index + 1 >= self.timeline.len() {
            return;
        }
        self.step_to(self.index + 1);
        log::debug!("Selective redo: index {} of {}", self.index, self.timeline.len());
    }

    /// Put `ids` (or the selection when `None`) back to the default values,
    /// plus any configured default overrides. Records one undo step.
    pub fn reset(&mut self, ids: Option<&[ImageId]>) {
        let targets: Vec<ImageId> = match ids {
            Some(ids) => ids.to_vec(),
            None => self.selected_ids.clone(),
        };
        if targets.is_empty() {
            return;
        }

        let value = AdjustmentSnapshot::default().merged(&self.options.default_overrides);
        let mut next = self.state.clone();
        for id in &targets {
            if !next.all_images.contains_key(id) {
                self.warn(format_args!("reset: unknown image {id} ignored"));
                continue;
            }
            next.all_images.insert(id.clone(), value);
            if next.current_selection.contains_key(id) {
                next.current_selection.insert(id.clone(), value);
            }
        }

        if next == self.state {
            return;
        }
        self.commit(next);
        log::debug!("Reset {} images", targets.len());
    }

    /// Select `id` if unselected, deselect it otherwise.
    pub fn toggle_selection(&mut self, id: &str) {
        if let Some(position) = self.selected_ids.iter().position(|s| s == id) {
            self.selected_ids.remove(position);
            self.state.current_selection.remove(id);
            return;
        }

        let value = match self.state.all_images.get(id) {
            Some(stored) => *stored,
            None => {
                let seed = AdjustmentSnapshot::default();
                self.state.initial_states.insert(id.to_string(), seed);
                self.state.all_images.insert(id.to_string(), seed);
                self.all_image_ids.push(id.to_string());
                seed
            }
        };
        self.state.current_selection.insert(id.to_string(), value);
        self.selected_ids.push(id.to_string());
    }

    /// Select every known image.
    pub fn select_all(&mut self) {
        self.selected_ids = self.all_image_ids.clone();
        self.state.current_selection = self.state.all_images.clone();
    }

    /// Deselect everything. Stored values are kept.
    pub fn clear_selection(&mut self) {
        self.selected_ids.clear();
        self.state.current_selection.clear();
    }

    /// Overwrite images with authoritative values and drop all history.
    pub fn sync_adjustment(&mut self, configs: &[ImageConfig]) {
        if configs.is_empty() {
            return;
        }

        for config in configs {
            let id = &config.image_id;
            let value = config.seed();
            if !self.state.all_images.contains_key(id) {
                self.all_image_ids.push(id.clone());
            }
            self.state.all_images.insert(id.clone(), value);
            self.state.initial_states.insert(id.clone(), value);
            if self.state.current_selection.contains_key(id) {
                self.state.current_selection.insert(id.clone(), value);
            }
        }

        self.timeline = vec![self.state.clone()];
        self.index = 0;
        log::debug!("Synced {} images, history cleared", configs.len());
    }

    /// Replace the whole state with `batch` and start a fresh timeline.
    ///
    /// Rejected when the selection references images missing from
    /// `all_images`. Out-of-range values are clamped.
    pub fn sync_batch(&mut self, batch: BatchAdjustmentState) {
        if !batch.is_consistent() {
            self.warn(format_args!(
                "sync_batch rejected: selection references unknown images"
            ));
            return;
        }

        self.replace_state(batch.clamped());
        self.timeline = vec![self.state.clone()];
        self.index = 0;
        log::debug!("Batch synced: {} images", self.all_image_ids.len());
    }

    /// [`SelectiveBatchHistory::sync_batch`] from JSON; malformed input
    /// (including a missing map) is ignored.
    pub fn sync_batch_json(&mut self, json: &str) {
        match BatchAdjustmentState::from_json(json) {
            Ok(batch) => self.sync_batch(batch),
            Err(e) => self.warn(format_args!("sync_batch rejected: {e}")),
        }
    }

    /// Replace the whole timeline, e.g. from [`SelectiveBatchHistory::export`].
    /// The cursor goes to `target_index` if valid, otherwise to the last
    /// entry. Out-of-range values are clamped.
    pub fn sync_history(
        &mut self,
        states: Vec<BatchAdjustmentState>,
        target_index: Option<usize>,
    ) {
        if states.is_empty() {
            self.warn(format_args!("sync_history called with no states, ignored"));
            return;
        }
        if let Some(bad) = states.iter().position(|s| !s.is_consistent()) {
            self.warn(format_args!("sync_history rejected: entry {bad} is inconsistent"));
            return;
        }

        let states: Vec<_> = states.iter().map(BatchAdjustmentState::clamped).collect();
        let last = states.len() - 1;
        let index = target_index.filter(|&i| i <= last).unwrap_or(last);
        self.replace_state(states[index].clone());
        self.timeline = states;
        self.index = index;
    }

    pub fn restore(&mut self, saved: SavedTimeline<BatchAdjustmentState>) {
        self.sync_history(saved.states, Some(saved.index));
    }

    pub fn export(&self) -> SavedTimeline<BatchAdjustmentState> {
        SavedTimeline {
            states: self.timeline.clone(),
            index: self.index,
        }
    }

    pub fn get_history(&self) -> &[BatchAdjustmentState] {
        &self.timeline
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn can_undo(&self) -> bool {
        !self.selected_ids.is_empty() && self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.selected_ids.is_empty() && self.index + 1 < self.timeline.len()
    }

    pub fn info(&self) -> BatchHistoryInfo {
        BatchHistoryInfo {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            history_length: self.timeline.len(),
            current_index: self.index,
            selected_count: self.selected_ids.len(),
            total_images: self.all_image_ids.len(),
        }
    }

    /// Splice the selected images' values from `target` into the current
    /// state, move there, and write the result into that slot.
    fn step_to(&mut self, target: usize) {
        let source = &self.timeline[target];
        let mut next = self.state.clone();

        for id in &self.selected_ids {
            // Entries older than the image's first selection don't know it.
            let restored = source
                .all_images
                .get(id)
                .or_else(|| self.state.initial_states.get(id))
                .or_else(|| self.state.all_images.get(id))
                .copied();
            let Some(value) = restored else {
                continue;
            };
            next.all_images.insert(id.clone(), value);
            next.current_selection.insert(id.clone(), value);
        }

        self.index = target;
        self.timeline[target] = next.clone();
        self.state = next;
    }

    /// Truncate after the cursor, append `next`, move to it.
    fn commit(&mut self, next: BatchAdjustmentState) {
        self.timeline.truncate(self.index + 1);
        self.timeline.push(next.clone());
        self.index = self.timeline.len() - 1;
        self.state = next;

        if let Some(max) = self.options.max_size.filter(|&m| m > 0) {
            if self.timeline.len() > max {
                let dropped = self.timeline.len() - max;
                self.timeline.drain(..dropped);
                self.index = self.index.saturating_sub(dropped);
            }
        }
    }

    /// Adopt `batch` and rebuild the id lists from its keys.
    ///
    /// Ids already known keep their order; new ones follow in key order.
    fn replace_state(&mut self, batch: BatchAdjustmentState) {
        self.all_image_ids = merge_order(&self.all_image_ids, &batch.all_images);
        self.selected_ids = merge_order(&self.selected_ids, &batch.current_selection);
        self.state = batch;
    }

    fn warn(&self, message: fmt::Arguments<'_>) {
        if self.options.dev_warnings {
            log::warn!("{message}");
        }
    }
}

/// Ids of `map`: those in `known` first, in that order, then the rest.
fn merge_order(known: &[ImageId], map: &AdjustmentMap) -> Vec<ImageId> {
    let mut seen = BTreeSet::new();
    known
        .iter()
        .filter(|id| map.contains_key(*id))
        .cloned()
        .chain(map.keys().cloned())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

impl Default for SelectiveBatchHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::edit::AdjustmentField;

    fn select(h: &mut SelectiveBatchHistory, ids: &[&str]) {
        let configs: Vec<ImageConfig> = ids.iter().map(|id| ImageConfig::new(*id)).collect();
        h.set_selection(&configs);
    }

    fn delta(field: AdjustmentField, value: i32) -> AdjustmentPatch {
        AdjustmentPatch::new().set(field, value)
    }

    #[test]
    fn selection_seeds_new_images() {
        let mut h = SelectiveBatchHistory::new();
        h.set_selection(&[
            ImageConfig::new("a"),
            ImageConfig::with_adjustment("b", delta(AdjustmentField::Tint, 12)),
        ]);

        assert_eq!(h.selected_ids(), &["a".to_string(), "b".to_string()]);
        assert_eq!(h.get("b").unwrap().tint, 12);
        assert_eq!(h.state().initial_states["b"].tint, 12);
        assert_eq!(h.get_history().len(), 1);
    }

    #[test]
    fn adjust_is_relative_and_recorded() {
        let mut h = SelectiveBatchHistory::new();
        h.set_selection(&[ImageConfig::with_adjustment(
            "a",
            delta(AdjustmentField::Exposure, 20),
        )]);

        h.adjust_selected(&delta(AdjustmentField::Exposure, 10));
        h.adjust_selected(&delta(AdjustmentField::Exposure, 5));

        assert_eq!(h.get("a").unwrap().exposure, 35);
        assert_eq!(h.state().current_selection["a"].exposure, 35);
        assert_eq!(h.get_history().len(), 3);
        assert_eq!(h.current_index(), 2);
    }

    #[test]
    fn adjust_without_selection_or_change_is_noop() {
        let mut h = SelectiveBatchHistory::new();
        h.adjust_selected(&delta(AdjustmentField::Exposure, 10));
        assert_eq!(h.get_history().len(), 1);

        select(&mut h, &["a"]);
        h.adjust_selected(&AdjustmentPatch::new());
        assert_eq!(h.get_history().len(), 1);
    }

    #[test]
    fn values_persist_across_selection() {
        let mut h = SelectiveBatchHistory::new();
        select(&mut h, &["a"]);
        h.adjust_selected(&delta(AdjustmentField::Shadows, 15));

        select(&mut h, &["b"]);
        h.adjust_selected(&delta(AdjustmentField::Shadows, -5));

        assert_eq!(h.get("a").unwrap().shadows, 15);
        assert_eq!(h.get("b").unwrap().shadows, -5);
        assert!(!h.state().current_selection.contains_key("a"));

        // Reselecting brings the stored value back.
        select(&mut h, &["a"]);
        assert_eq!(h.state().current_selection["a"].shadows, 15);
    }

    #[test]
    fn undo_only_touches_selection() {
        let mut h = SelectiveBatchHistory::new();
        select(&mut h, &["a", "b"]);
        h.adjust_selected(&delta(AdjustmentField::Exposure, 10));

        select(&mut h, &["a"]);
        h.adjust_selected(&delta(AdjustmentField::Contrast, 5));

        h.undo();

        let a = h.get("a").unwrap();
        assert_eq!(a.exposure, 10);
        assert_eq!(a.contrast, 0);
        let b = h.get("b").unwrap();
        assert_eq!(b.exposure, 10);
        assert_eq!(b.contrast, 0);
        assert_eq!(h.current_index(), 1);
    }

    #[test]
    fn undo_keeps_unselected_edits_made_later() {
        let mut h = SelectiveBatchHistory::new();
        select(&mut h, &["a"]);
        h.adjust_selected(&delta(AdjustmentField::Exposure, 10));

        select(&mut h, &["b"]);
        h.adjust_selected(&delta(AdjustmentField::Exposure, 30));

        select(&mut h, &["a"]);
        h.undo();
        h.undo();

        assert_eq!(h.get("a").unwrap().exposure, 0);
        assert_eq!(h.get("b").unwrap().exposure, 30);
        // The slot we moved to holds what is on screen.
        assert_eq!(&h.get_history()[0], h.state());
    }

    #[test]
    fn redo_restores_selection_values() {
        let mut h = SelectiveBatchHistory::new();
        select(&mut h, &["a"]);
        h.adjust_selected(&delta(AdjustmentField::Whites, 10));
        h.adjust_selected(&delta(AdjustmentField::Whites, 10));

        h.undo();
        h.undo();
        assert_eq!(h.get("a").unwrap().whites, 0);
        assert!(!h.can_undo());
        assert!(h.can_redo());

        h.redo();
        assert_eq!(h.get("a").unwrap().whites, 10);
        h.redo();
        assert_eq!(h.get("a").unwrap().whites, 20);
        assert!(!h.can_redo());
    }

    #[test]
    fn undo_past_first_selection_uses_initial_state() {
        let mut h = SelectiveBatchHistory::new();
        select(&mut h, &["a"]);
        h.adjust_selected(&delta(AdjustmentField::Blacks, -10));

        h.set_selection(&[ImageConfig::with_adjustment(
            "c",
            delta(AdjustmentField::Blacks, 40),
        )]);
        h.adjust_selected(&delta(AdjustmentField::Blacks, 10));
        assert_eq!(h.get("c").unwrap().blacks, 50);

        h.undo();
        assert_eq!(h.get("c").unwrap().blacks, 40);
        h.undo();
        assert_eq!(h.get("c").unwrap().blacks, 40);
        assert_eq!(h.get("a").unwrap().blacks, -10);
    }

    #[test]
    fn undo_without_selection_is_noop() {
        let mut h = SelectiveBatchHistory::new();
        select(&mut h, &["a"]);
        h.adjust_selected(&delta(AdjustmentField::Clarity, 10));
        h.clear_selection();

        h.undo();
        assert_eq!(h.current_index(), 1);
        assert_eq!(h.get("a").unwrap().clarity, 10);
        assert!(!h.can_undo());
    }

    #[test]
    fn new_adjustment_discards_redo() {
        let mut h = SelectiveBatchHistory::new();
        select(&mut h, &["a"]);
        h.adjust_selected(&delta(AdjustmentField::Vibrance, 10));
        h.adjust_selected(&delta(AdjustmentField::Vibrance, 10));
        h.undo();

        h.adjust_selected(&delta(AdjustmentField::Vibrance, 1));
        assert_eq!(h.get_history().len(), 3);
        assert!(!h.can_redo());
        assert_eq!(h.get("a").unwrap().vibrance, 11);
    }

    #[test]
    fn reset_applies_default_overrides() {
        let options = BatchOptions {
            default_overrides: delta(AdjustmentField::Sharpness, 25),
            ..BatchOptions::default()
        };
        let mut h = SelectiveBatchHistory::with_options(options);
        select(&mut h, &["a", "b"]);
        h.adjust_selected(&delta(AdjustmentField::Exposure, 10));

        h.reset(Some(&["b".to_string()]));
        let b = h.get("b").unwrap();
        assert_eq!(b.exposure, 0);
        assert_eq!(b.sharpness, 25);
        assert_eq!(h.get("a").unwrap().exposure, 10);
        assert_eq!(h.get_history().len(), 3);

        h.reset(None);
        assert_eq!(h.get("a").unwrap().sharpness, 25);
        assert_eq!(h.state().current_selection["a"].sharpness, 25);
    }

    #[test]
    fn selection_mutators() {
        let mut h = SelectiveBatchHistory::new();
        select(&mut h, &["a", "b"]);
        h.adjust_selected(&delta(AdjustmentField::Saturation, 5));

        h.toggle_selection("a");
        assert_eq!(h.selected_ids(), &["b".to_string()]);
        assert!(!h.state().current_selection.contains_key("a"));

        h.toggle_selection("c");
        assert_eq!(h.all_image_ids().len(), 3);
        assert!(h.get("c").unwrap().is_unedited());

        h.clear_selection();
        assert!(h.selected_ids().is_empty());
        assert!(h.state().current_selection.is_empty());
        assert_eq!(h.state().all_images.len(), 3);
        assert_eq!(h.state().initial_states.len(), 3);

        h.select_all();
        assert_eq!(h.selected_ids().len(), 3);
        assert_eq!(h.state().current_selection["a"].saturation, 5);
    }

    #[test]
    fn sync_adjustment_clears_history() {
        let mut h = SelectiveBatchHistory::new();
        select(&mut h, &["a"]);
        h.adjust_selected(&delta(AdjustmentField::Highlights, 10));
        h.adjust_selected(&delta(AdjustmentField::Highlights, 10));

        h.sync_adjustment(&[
            ImageConfig::with_adjustment("a", delta(AdjustmentField::Highlights, -40)),
            ImageConfig::new("z"),
        ]);

        assert_eq!(h.get_history().len(), 1);
        assert_eq!(h.current_index(), 0);
        assert_eq!(h.get("a").unwrap().highlights, -40);
        assert_eq!(h.state().current_selection["a"].highlights, -40);
        assert_eq!(h.state().initial_states["a"].highlights, -40);
        assert!(h.get("z").is_some());
        assert!(!h.state().current_selection.contains_key("z"));
    }

    #[test]
    fn sync_batch_rebuilds_ids() {
        let mut h = SelectiveBatchHistory::new();
        select(&mut h, &["old"]);

        let mut batch = BatchAdjustmentState::default();
        let value = AdjustmentSnapshot::default().with(AdjustmentField::Tint, 3);
        batch.all_images.insert("x".to_string(), value);
        batch.all_images.insert("y".to_string(), value);
        batch.initial_states.insert("x".to_string(), value);
        batch.current_selection.insert("y".to_string(), value);

        h.sync_batch(batch.clone());
        assert_eq!(h.state(), &batch);
        assert_eq!(h.selected_ids(), &["y".to_string()]);
        assert_eq!(h.all_image_ids(), &["x".to_string(), "y".to_string()]);
        assert_eq!(h.get_history().len(), 1);
    }

    #[test]
    fn sync_batch_rejects_malformed_input() {
        let mut h = SelectiveBatchHistory::new();
        select(&mut h, &["a"]);
        let before = h.state().clone();

        let mut bad = BatchAdjustmentState::default();
        bad.current_selection
            .insert("ghost".to_string(), AdjustmentSnapshot::default());
        h.sync_batch(bad);
        assert_eq!(h.state(), &before);

        h.sync_batch_json(r#"{"current_selection":{},"all_images":{}}"#);
        assert_eq!(h.state(), &before);
    }

    #[test]
    fn sync_paths_clamp_values() {
        let wild = AdjustmentSnapshot {
            temperature: 500,
            ..AdjustmentSnapshot::default()
        };
        let mut batch = BatchAdjustmentState::default();
        batch.all_images.insert("a".to_string(), wild);
        batch.current_selection.insert("a".to_string(), wild);
        batch.initial_states.insert("a".to_string(), wild);

        let mut h = SelectiveBatchHistory::new();
        h.sync_batch(batch.clone());
        assert_eq!(h.get("a").unwrap().temperature, 100);
        assert_eq!(h.state().initial_states["a"].temperature, 100);

        // Later relative edits start from the clamped value.
        h.adjust_selected(&delta(AdjustmentField::Exposure, 1));
        assert_eq!(h.get("a").unwrap().temperature, 100);

        let mut json_synced = SelectiveBatchHistory::new();
        json_synced.sync_batch_json(&batch.to_json().unwrap());
        assert_eq!(json_synced.state().current_selection["a"].temperature, 100);

        let mut restored = SelectiveBatchHistory::new();
        restored.sync_history(vec![BatchAdjustmentState::default(), batch], None);
        assert_eq!(restored.get("a").unwrap().temperature, 100);
        assert_eq!(restored.get_history()[1].all_images["a"].temperature, 100);
    }

    #[test]
    fn restore_keeps_selection_order() {
        let mut h = SelectiveBatchHistory::new();
        select(&mut h, &["c", "a", "b"]);
        h.adjust_selected(&delta(AdjustmentField::Exposure, 10));
        let saved = h.export();

        h.restore(saved.clone());
        assert_eq!(
            h.selected_ids(),
            &["c".to_string(), "a".to_string(), "b".to_string()]
        );

        // A fresh engine has no order to keep and falls back to id order.
        let mut fresh = SelectiveBatchHistory::new();
        fresh.restore(saved);
        assert_eq!(
            fresh.selected_ids(),
            &["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn export_restore_round_trip() {
        let mut h = SelectiveBatchHistory::new();
        select(&mut h, &["a", "b"]);
        h.adjust_selected(&delta(AdjustmentField::Exposure, 10));
        h.adjust_selected(&delta(AdjustmentField::Exposure, 10));
        h.undo();

        let json = serde_json::to_string(&h.export()).unwrap();
        let mut restored = SelectiveBatchHistory::new();
        restored.restore(serde_json::from_str(&json).unwrap());

        assert_eq!(restored.state(), h.state());
        assert_eq!(restored.info(), h.info());

        restored.redo();
        h.redo();
        assert_eq!(restored.state(), h.state());
    }

    #[test]
    fn max_size_bounds_timeline() {
        let options = BatchOptions {
            max_size: Some(2),
            ..BatchOptions::default()
        };
        let mut h = SelectiveBatchHistory::with_options(options);
        select(&mut h, &["a"]);
        for _ in 0..4 {
            h.adjust_selected(&delta(AdjustmentField::Contrast, 1));
        }

        assert_eq!(h.get_history().len(), 2);
        assert_eq!(h.current_index(), 1);
        assert_eq!(h.get("a").unwrap().contrast, 4);
    }

    #[test]
    fn zero_max_size_is_unbounded() {
        let options = BatchOptions {
            max_size: Some(0),
            ..BatchOptions::default()
        };
        let mut h = SelectiveBatchHistory::with_options(options);
        select(&mut h, &["a"]);
        for _ in 0..4 {
            h.adjust_selected(&delta(AdjustmentField::Contrast, 1));
        }

        assert_eq!(h.get_history().len(), 5);
    }
}

/// Shared data structures for the editing state
///
/// These structs represent the data model that flows between
/// the history engines, the session store and the UI layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::edit::{AdjustmentPatch, AdjustmentSnapshot};

/// Identifies one image in a bulk-editing session
pub type ImageId = String;

/// Adjustment values keyed by image
pub type AdjustmentMap = BTreeMap<ImageId, AdjustmentSnapshot>;

/// One image to select or sync, with optional starting values
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageConfig {
    pub image_id: ImageId,
    /// Absolute values merged over the all-zero default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<AdjustmentPatch>,
}

impl ImageConfig {
    pub fn new(image_id: impl Into<ImageId>) -> Self {
        Self {
            image_id: image_id.into(),
            adjustment: None,
        }
    }

    pub fn with_adjustment(image_id: impl Into<ImageId>, adjustment: AdjustmentPatch) -> Self {
        Self {
            image_id: image_id.into(),
            adjustment: Some(adjustment),
        }
    }

    /// The snapshot this config seeds: default + optional overrides
    pub fn seed(&self) -> AdjustmentSnapshot {
        match &self.adjustment {
            Some(patch) => AdjustmentSnapshot::default().merged(patch),
            None => AdjustmentSnapshot::default(),
        }
    }
}

/// The state of a bulk-editing session
///
/// Invariant: every key of `current_selection` is also a key of
/// `all_images`. `all_images` only grows.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchAdjustmentState {
    /// Images being edited right now
    pub current_selection: AdjustmentMap,
    /// Every image ever touched, kept after deselection
    pub all_images: AdjustmentMap,
    /// First-seen values per image
    pub initial_states: AdjustmentMap,
}

impl BatchAdjustmentState {
    /// Parse a batch; all three maps are required. Values are clamped.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(|batch| batch.clamped())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Copy with every stored value clamped to the valid range
    pub fn clamped(&self) -> Self {
        let clamp = |map: &AdjustmentMap| -> AdjustmentMap {
            map.iter()
                .map(|(id, snapshot)| (id.clone(), snapshot.clamped()))
                .collect()
        };
        Self {
            current_selection: clamp(&self.current_selection),
            all_images: clamp(&self.all_images),
            initial_states: clamp(&self.initial_states),
        }
    }

    /// Whether the selection-is-a-subset invariant holds
    pub fn is_consistent(&self) -> bool {
        self.current_selection
            .keys()
            .all(|id| self.all_images.contains_key(id))
    }
}

/// A whole timeline plus cursor, as exported for persistence
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SavedTimeline<T> {
    pub states: Vec<T>,
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::edit::AdjustmentField;

    #[test]
    fn test_seed_merges_over_default() {
        let config = ImageConfig::with_adjustment(
            "img-1",
            AdjustmentPatch::new().set(AdjustmentField::Exposure, 30),
        );
        let seed = config.seed();
        assert_eq!(seed.exposure, 30);
        assert_eq!(seed.contrast, 0);
        assert!(ImageConfig::new("img-2").seed().is_unedited());
    }

    #[test]
    fn test_batch_json_requires_all_maps() {
        let missing = r#"{"current_selection":{},"all_images":{}}"#;
        assert!(BatchAdjustmentState::from_json(missing).is_err());

        let full = r#"{"current_selection":{},"all_images":{},"initial_states":{}}"#;
        let batch = BatchAdjustmentState::from_json(full).unwrap();
        assert_eq!(batch, BatchAdjustmentState::default());
    }

    #[test]
    fn test_batch_json_clamps_values() {
        let wild = AdjustmentSnapshot {
            temperature: 500,
            tint: -300,
            ..AdjustmentSnapshot::default()
        };
        let mut batch = BatchAdjustmentState::default();
        batch.current_selection.insert("a".to_string(), wild);
        batch.all_images.insert("a".to_string(), wild);
        batch.initial_states.insert("a".to_string(), wild);

        let parsed = BatchAdjustmentState::from_json(&batch.to_json().unwrap()).unwrap();
        for map in [
            &parsed.current_selection,
            &parsed.all_images,
            &parsed.initial_states,
        ] {
            assert_eq!(map["a"].temperature, 100);
            assert_eq!(map["a"].tint, -100);
        }
        assert_eq!(parsed, batch.clamped());
    }

    #[test]
    fn test_consistency_check() {
        let mut batch = BatchAdjustmentState::default();
        batch
            .current_selection
            .insert("a".to_string(), AdjustmentSnapshot::default());
        assert!(!batch.is_consistent());

        batch
            .all_images
            .insert("a".to_string(), AdjustmentSnapshot::default());
        assert!(batch.is_consistent());
    }
}

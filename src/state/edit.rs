/// Non-destructive adjustment values for a single image
///
/// An `AdjustmentSnapshot` stores the twelve slider values of the develop
/// panel. Snapshots are plain values: they are never edited in place, every
/// change produces a new snapshot. They are serialized to JSON for the
/// session store and for history export.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lowest value any adjustment can take
pub const MIN_VALUE: i32 = -100;
/// Highest value any adjustment can take
pub const MAX_VALUE: i32 = 100;

/// Names of the twelve adjustments
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentField {
    Temperature,
    Tint,
    Vibrance,
    Saturation,
    Exposure,
    Highlights,
    Shadows,
    Whites,
    Blacks,
    Contrast,
    Clarity,
    Sharpness,
}

impl AdjustmentField {
    /// Every field, in panel order
    pub const ALL: [AdjustmentField; 12] = [
        AdjustmentField::Temperature,
        AdjustmentField::Tint,
        AdjustmentField::Vibrance,
        AdjustmentField::Saturation,
        AdjustmentField::Exposure,
        AdjustmentField::Highlights,
        AdjustmentField::Shadows,
        AdjustmentField::Whites,
        AdjustmentField::Blacks,
        AdjustmentField::Contrast,
        AdjustmentField::Clarity,
        AdjustmentField::Sharpness,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AdjustmentField::Temperature => "temperature",
            AdjustmentField::Tint => "tint",
            AdjustmentField::Vibrance => "vibrance",
            AdjustmentField::Saturation => "saturation",
            AdjustmentField::Exposure => "exposure",
            AdjustmentField::Highlights => "highlights",
            AdjustmentField::Shadows => "shadows",
            AdjustmentField::Whites => "whites",
            AdjustmentField::Blacks => "blacks",
            AdjustmentField::Contrast => "contrast",
            AdjustmentField::Clarity => "clarity",
            AdjustmentField::Sharpness => "sharpness",
        }
    }
}

/// All adjustment values for an image
///
/// Every value lives in `[-100, 100]` and 0 means "no adjustment".
/// Equality is structural: two snapshots are equal when all twelve
/// values match.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AdjustmentSnapshot {
    // ========== White Balance ==========
    /// Negative = cooler (more blue), positive = warmer
    pub temperature: i32,
    /// Negative = more green, positive = more magenta
    pub tint: i32,

    // ========== Color ==========
    /// Smart saturation that protects skin tones
    pub vibrance: i32,
    /// -100 = grayscale, 0 = original, +100 = maximum saturation
    pub saturation: i32,

    // ========== Exposure & Tone ==========
    pub exposure: i32,
    pub highlights: i32,
    pub shadows: i32,
    pub whites: i32,
    pub blacks: i32,
    pub contrast: i32,

    // ========== Detail ==========
    pub clarity: i32,
    pub sharpness: i32,
}

impl AdjustmentSnapshot {
    /// Create a snapshot with no adjustments
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one field
    pub fn get(&self, field: AdjustmentField) -> i32 {
        match field {
            AdjustmentField::Temperature => self.temperature,
            AdjustmentField::Tint => self.tint,
            AdjustmentField::Vibrance => self.vibrance,
            AdjustmentField::Saturation => self.saturation,
            AdjustmentField::Exposure => self.exposure,
            AdjustmentField::Highlights => self.highlights,
            AdjustmentField::Shadows => self.shadows,
            AdjustmentField::Whites => self.whites,
            AdjustmentField::Blacks => self.blacks,
            AdjustmentField::Contrast => self.contrast,
            AdjustmentField::Clarity => self.clarity,
            AdjustmentField::Sharpness => self.sharpness,
        }
    }

    /// Copy of this snapshot with one field replaced (clamped into range)
    pub fn with(mut self, field: AdjustmentField, value: i32) -> Self {
        let value = value.clamp(MIN_VALUE, MAX_VALUE);
        let slot = match field {
            AdjustmentField::Temperature => &mut self.temperature,
            AdjustmentField::Tint => &mut self.tint,
            AdjustmentField::Vibrance => &mut self.vibrance,
            AdjustmentField::Saturation => &mut self.saturation,
            AdjustmentField::Exposure => &mut self.exposure,
            AdjustmentField::Highlights => &mut self.highlights,
            AdjustmentField::Shadows => &mut self.shadows,
            AdjustmentField::Whites => &mut self.whites,
            AdjustmentField::Blacks => &mut self.blacks,
            AdjustmentField::Contrast => &mut self.contrast,
            AdjustmentField::Clarity => &mut self.clarity,
            AdjustmentField::Sharpness => &mut self.sharpness,
        };
        *slot = value;
        self
    }

    /// Copy with the patch values written over this snapshot (absolute)
    pub fn merged(&self, patch: &AdjustmentPatch) -> Self {
        patch
            .iter()
            .fold(*self, |snapshot, (field, value)| snapshot.with(field, value))
    }

    /// Copy with the patch values added to this snapshot (relative)
    pub fn offset(&self, delta: &AdjustmentPatch) -> Self {
        delta.iter().fold(*self, |snapshot, (field, value)| {
            let next = snapshot.get(field).saturating_add(value);
            snapshot.with(field, next)
        })
    }

    /// Copy with every value pulled back into `[-100, 100]`
    ///
    /// Deserialized data is not trusted to be in range.
    pub fn clamped(&self) -> Self {
        AdjustmentField::ALL
            .iter()
            .fold(*self, |snapshot, &field| snapshot.with(field, snapshot.get(field)))
    }

    /// Convert to JSON string for database storage
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON string (from database)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(|snapshot| snapshot.clamped())
    }

    /// Check if this represents an unedited image (all values at default)
    pub fn is_unedited(&self) -> bool {
        *self == Self::default()
    }
}

/// A partial set of adjustment values
///
/// Depending on the caller this is either a set of absolute overrides
/// (seeding an image, default overrides) or a set of relative offsets
/// (bulk "+10 exposure" edits).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct AdjustmentPatch(BTreeMap<AdjustmentField, i32>);

impl AdjustmentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn set(mut self, field: AdjustmentField, value: i32) -> Self {
        self.0.insert(field, value);
        self
    }

    pub fn get(&self, field: AdjustmentField) -> Option<i32> {
        self.0.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AdjustmentField, i32)> + '_ {
        self.0.iter().map(|(field, value)| (*field, *value))
    }
}

impl FromIterator<(AdjustmentField, i32)> for AdjustmentPatch {
    fn from_iter<I: IntoIterator<Item = (AdjustmentField, i32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Render requests and their results
///
/// A `RenderTask` asks the image engine to produce a preview for one
/// image, optionally for a specific frame and with temporary adjustment
/// overrides. The engine answers with a `RenderOutput` pointing at the
/// rendered file.

use serde::{Deserialize, Serialize};

use crate::state::edit::AdjustmentPatch;

/// One request for the image engine
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RenderTask {
    /// Image identifier, echoed back in the output
    pub id: String,
    /// Full path to the source file
    pub path: String,
    /// Frame to render, for multi-frame sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<u64>,
    /// Values overriding the stored adjustments for this render only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustments: Option<AdjustmentPatch>,
    /// Higher runs sooner. 0 = normal.
    #[serde(default)]
    pub priority: i32,
}

impl RenderTask {
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            frame: None,
            adjustments: None,
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_frame(mut self, frame: u64) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn with_adjustments(mut self, adjustments: AdjustmentPatch) -> Self {
        self.adjustments = Some(adjustments);
        self
    }
}

/// What the image engine hands back
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub id: String,
    /// Path to the rendered preview
    pub path: String,
}

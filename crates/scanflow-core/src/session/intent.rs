//! Scan intent types.

use serde::{Deserialize, Serialize};

/// The kind of artifact being captured.
///
/// Chosen once per session; selecting a new intent discards all
/// downstream-resolved state (target, capture, guard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanIntent {
    /// A machine-readable code identifying a test kit.
    Code,
    /// A photo of a physical test strip.
    Photo,
}

impl ScanIntent {
    /// Capture instructions shown at the confirmatory gate for this intent.
    pub fn instructions(&self) -> &'static [&'static str] {
        match self {
            Self::Code => &[
                "Make sure the code is clearly visible",
                "Hold the camera close enough to capture the entire code",
                "Ensure good lighting and avoid shadows",
                "Keep the camera steady to avoid blurry images",
                "The code should fill most of the screen",
            ],
            Self::Photo => &[
                "Place the test strip on a flat, well-lit surface",
                "Hold the camera directly above the strip",
                "Make sure the entire strip is visible in the frame",
                "Ensure good lighting and avoid shadows",
                "Keep the camera steady to avoid blurry images",
                "The strip should be clearly focused and readable",
            ],
        }
    }
}

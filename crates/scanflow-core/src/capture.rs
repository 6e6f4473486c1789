//! Device camera contract.
//!
//! The camera itself is an external collaborator. This module defines the
//! narrow seam the workflow depends on: permission query/request and photo
//! capture producing a local file reference. Barcode detections are pushed
//! into the coordinator as discrete events by the platform layer, so they do
//! not appear on this trait.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Camera permission state as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    /// Permission granted; the camera may be used.
    Granted,
    /// Permission explicitly denied.
    Denied,
    /// Permission has never been requested on this device.
    Unknown,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// A photo captured by the device camera, referenced by a local file URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoCapture {
    /// Local file reference produced by the camera (e.g. `file:///...`).
    pub uri: String,
}

/// The artifact produced by a capture. Immutable once produced.
///
/// A `Code` result may only be produced while the session intent is code;
/// same for `Photo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaptureResult {
    /// A decoded machine-readable code identifying a test kit.
    Code { value: String },
    /// A photo of a physical test strip.
    Photo { uri: String },
}

impl CaptureResult {
    pub fn is_code(&self) -> bool {
        matches!(self, Self::Code { .. })
    }

    pub fn is_photo(&self) -> bool {
        matches!(self, Self::Photo { .. })
    }
}

/// An abstract adapter over the device camera.
///
/// Implementations wrap the platform camera library. The workflow only uses
/// this contract; permission prompts, viewfinder rendering and the barcode
/// detector wiring stay on the platform side.
#[async_trait::async_trait]
pub trait CaptureAdapter: Send + Sync {
    /// Returns the current camera permission state without prompting.
    async fn query_permission(&self) -> PermissionStatus;

    /// Prompts the user for camera access.
    ///
    /// # Returns
    ///
    /// The resulting state; `Unknown` is not a valid answer to a request.
    async fn request_permission(&self) -> PermissionStatus;

    /// Captures a photo at the given quality (0.0 to 1.0).
    ///
    /// # Returns
    ///
    /// - `Ok(PhotoCapture)`: the local file reference of the captured image
    /// - `Err(ScanError::Capture)`: the device failed to produce an image
    async fn capture_photo(&self, quality: f32) -> Result<PhotoCapture>;
}

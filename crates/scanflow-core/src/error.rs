//! Error types for the scanflow workflow coordinator.

use thiserror::Error;

/// A shared error type for the scan workflow.
///
/// This provides typed, structured error variants so each layer can react to
/// exactly the failures it owns: permission and candidate-fetch failures are
/// handled locally by the step that produced them, while action failures are
/// surfaced to the user as an acknowledgeable notice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The device camera permission was denied by the user.
    #[error("camera permission denied")]
    PermissionDenied,

    /// Fetching a candidate list (patients or test kits) failed.
    ///
    /// The resolver degrades to an empty candidate display on this error;
    /// it never reaches the user as a blocking dialog.
    #[error("candidate fetch failed: {0}")]
    CandidateFetch(String),

    /// The irreversible server action (link or upload) failed.
    ///
    /// Surfaced to the user; acknowledging it resets the session.
    #[error("action failed: {0}")]
    Action(String),

    /// Transport-level failure talking to a remote service.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// An event arrived in a session step that cannot accept it.
    #[error("event '{event}' not allowed in step '{step}'")]
    InvalidTransition {
        step: &'static str,
        event: &'static str,
    },

    /// The photo capture itself failed on the device.
    #[error("capture failed: {0}")]
    Capture(String),

    /// No actor role is available from device storage.
    #[error("no actor role available")]
    RoleUnavailable,

    /// Internal error (should not happen in normal operation).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ScanError {
    /// Creates a CandidateFetch error.
    pub fn candidate_fetch(message: impl Into<String>) -> Self {
        Self::CandidateFetch(message.into())
    }

    /// Creates an Action error.
    pub fn action(message: impl Into<String>) -> Self {
        Self::Action(message.into())
    }

    /// Creates a Transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a Capture error.
    pub fn capture(message: impl Into<String>) -> Self {
        Self::Capture(message.into())
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Creates an InvalidTransition error.
    pub fn invalid_transition(step: &'static str, event: &'static str) -> Self {
        Self::InvalidTransition { step, event }
    }

    /// Check if this is a PermissionDenied error.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }

    /// Check if this is a CandidateFetch error.
    pub fn is_candidate_fetch(&self) -> bool {
        matches!(self, Self::CandidateFetch(_))
    }

    /// Check if this is an InvalidTransition error.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }

    /// Check if this error should be surfaced to the user as a blocking,
    /// acknowledgeable notice.
    ///
    /// Only action and transport failures qualify; everything else is handled
    /// locally by the step that owns it.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::Action(_) | Self::Transport { .. })
    }
}

/// Result type alias using [`ScanError`].
pub type Result<T> = std::result::Result<T, ScanError>;

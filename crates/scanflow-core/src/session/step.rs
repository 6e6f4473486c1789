//! Session step types.

use serde::{Deserialize, Serialize};

/// The discriminated state of a scan session.
///
/// Exactly one step is active at any time. A step implies which exactly-one
/// view or dialog is active on screen, which rules out combinatorially
/// invalid states such as two selection dialogs open at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStep {
    /// Initial step: the user picks what kind of artifact to capture.
    SelectingIntent,
    /// Professional only: picking which patient the action applies to.
    SelectingTarget,
    /// Confirmatory gate showing capture instructions for the chosen intent.
    AwaitingLaunch,
    /// The camera is active.
    Capturing,
    /// Code path only: yes/no prompt before the link action fires.
    ConfirmingLink,
    /// Photo path only: picking which open test kit the upload addresses.
    SelectingUploadTarget,
    /// The server action is in flight; the UI is non-interactive.
    Submitting,
}

impl SessionStep {
    /// Stable name used in transition errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectingIntent => "selecting_intent",
            Self::SelectingTarget => "selecting_target",
            Self::AwaitingLaunch => "awaiting_launch",
            Self::Capturing => "capturing",
            Self::ConfirmingLink => "confirming_link",
            Self::SelectingUploadTarget => "selecting_upload_target",
            Self::Submitting => "submitting",
        }
    }
}

//! Action execution.
//!
//! Given a fully-resolved intent, target and capture, performs the network
//! action exactly once and classifies the outcome. The executor itself is
//! stateless; duplicate-submission protection is the session's submission
//! guard one layer up.

use scanflow_core::capture::{CaptureResult, PhotoCapture};
use scanflow_core::gateway::Gateway;
use scanflow_core::session::{ResolvedTarget, ScanIntent};
use std::sync::Arc;

/// Result of one submission attempt.
///
/// There is no partial or automatic retry: every failure is terminal for
/// the current attempt and requires the user to restart the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server action completed.
    Success,
    /// The action failed (validation or transport). The message is shown to
    /// the user and the session resets to intent selection.
    RecoverableFailure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Performs the irreversible server action for a resolved session.
pub struct ActionExecutor {
    gateway: Arc<dyn Gateway>,
}

impl ActionExecutor {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Executes the single network action for this intent.
    ///
    /// - `Code` intent: associates the captured value with the target's
    ///   identity (self for a patient actor, the selected patient for a
    ///   professional).
    /// - `Photo` intent: uploads the captured image addressed by the
    ///   resolved kit's code to the analysis service.
    ///
    /// Any gateway error is classified as a [`Outcome::RecoverableFailure`];
    /// nothing below this boundary is retried.
    pub async fn execute(
        &self,
        intent: ScanIntent,
        target: &ResolvedTarget,
        capture: &CaptureResult,
    ) -> Outcome {
        let result = match (intent, capture) {
            (ScanIntent::Code, CaptureResult::Code { value }) => {
                tracing::info!(code = %value, "linking scanned code");
                self.gateway.link_code(&target.subject, value).await
            }
            (ScanIntent::Photo, CaptureResult::Photo { uri }) => {
                let Some(kit) = target.kit.as_ref() else {
                    return Outcome::RecoverableFailure(
                        "no test kit resolved for this upload".to_string(),
                    );
                };
                tracing::info!(kit = %kit.code, "uploading captured photo");
                self.gateway
                    .upload_photo(&kit.code, &PhotoCapture { uri: uri.clone() })
                    .await
            }
            _ => {
                return Outcome::RecoverableFailure(
                    "capture does not match the selected scan type".to_string(),
                );
            }
        };

        match result {
            Ok(()) => Outcome::Success,
            Err(err) => {
                tracing::warn!(error = %err, "submission failed");
                Outcome::RecoverableFailure(err.to_string())
            }
        }
    }
}

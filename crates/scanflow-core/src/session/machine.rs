//! The scan session state machine.
//!
//! `ScanSession` is the single source of truth for "what step are we on" and
//! "what data has been collected so far". It is purely synchronous: every
//! event is fully processed, including all state mutation, before the next
//! one is accepted. All I/O lives in the application layer.

use super::intent::ScanIntent;
use super::step::SessionStep;
use super::target::{ResolvedTarget, Subject};
use crate::actor::ActorRole;
use crate::capture::CaptureResult;
use crate::error::{Result, ScanError};
use crate::kit::TestKit;
use crate::patient::PatientRecord;

/// The core state machine driving a single capture attempt.
///
/// Created when the feature screen mounts, destroyed (all fields reset) when
/// the screen unmounts or a submission completes. No state persists across
/// sessions.
///
/// All fields other than `step` are projections of the history recorded
/// while passing through steps, not independent mutable state: re-entering
/// [`SessionStep::SelectingIntent`] always cascade-clears everything
/// downstream of the intent, so a stale patient or kit selection can never
/// silently attach to a later capture.
#[derive(Debug, Clone)]
pub struct ScanSession {
    /// The actor role, read once at session start. Immutable.
    actor: ActorRole,
    step: SessionStep,
    intent: Option<ScanIntent>,
    /// Patient selected by a professional actor. Always `None` for patients.
    patient: Option<PatientRecord>,
    /// Kit selected on the photo path.
    kit: Option<TestKit>,
    capture: Option<CaptureResult>,
    /// Set the instant a code capture is accepted for confirmation; cleared
    /// only on reset or an explicit re-scan. The barcode detector may fire
    /// several times for one physical code, so this flag alone makes the
    /// code path idempotent.
    submission_dispatched: bool,
}

impl ScanSession {
    /// Creates a fresh session for the given actor at the initial step.
    pub fn new(actor: ActorRole) -> Self {
        Self {
            actor,
            step: SessionStep::SelectingIntent,
            intent: None,
            patient: None,
            kit: None,
            capture: None,
            submission_dispatched: false,
        }
    }

    pub fn actor(&self) -> ActorRole {
        self.actor
    }

    pub fn step(&self) -> SessionStep {
        self.step
    }

    pub fn intent(&self) -> Option<ScanIntent> {
        self.intent
    }

    pub fn capture(&self) -> Option<&CaptureResult> {
        self.capture.as_ref()
    }

    pub fn selected_patient(&self) -> Option<&PatientRecord> {
        self.patient.as_ref()
    }

    pub fn selected_kit(&self) -> Option<&TestKit> {
        self.kit.as_ref()
    }

    pub fn submission_dispatched(&self) -> bool {
        self.submission_dispatched
    }

    /// The subject the eventual action applies to.
    ///
    /// Implicitly "self" for a patient actor; for a professional this is
    /// `None` until a patient has been resolved.
    pub fn subject(&self) -> Option<Subject> {
        match self.actor {
            ActorRole::Patient => Some(Subject::Slf),
            ActorRole::Professional => self
                .patient
                .clone()
                .map(|record| Subject::Patient { record }),
        }
    }

    /// The fully resolved target, if the session has one.
    pub fn resolved_target(&self) -> Option<ResolvedTarget> {
        self.subject().map(|subject| ResolvedTarget {
            subject,
            kit: self.kit.clone(),
        })
    }

    /// Picks the kind of artifact to capture.
    ///
    /// Professional actors move on to patient selection; patients go
    /// straight to the instructions gate. Re-selecting always discards any
    /// downstream-resolved state first.
    pub fn select_intent(&mut self, intent: ScanIntent) -> Result<()> {
        self.expect_step(SessionStep::SelectingIntent, "select_intent")?;
        self.clear_downstream_of_intent();
        self.intent = Some(intent);
        self.step = if self.actor.requires_target_selection() {
            SessionStep::SelectingTarget
        } else {
            SessionStep::AwaitingLaunch
        };
        Ok(())
    }

    /// Records the patient a professional resolved and moves to the gate.
    pub fn patient_resolved(&mut self, patient: PatientRecord) -> Result<()> {
        self.expect_step(SessionStep::SelectingTarget, "patient_resolved")?;
        self.patient = Some(patient);
        self.step = SessionStep::AwaitingLaunch;
        Ok(())
    }

    /// Cancels patient selection.
    ///
    /// This abandons the whole attempt: the session returns to intent
    /// selection with the intent cleared, not merely to the previous step.
    pub fn cancel_target_selection(&mut self) -> Result<()> {
        self.expect_step(SessionStep::SelectingTarget, "cancel_target_selection")?;
        self.reset();
        Ok(())
    }

    /// Launches the capture after the instructions gate.
    pub fn launch(&mut self) -> Result<()> {
        self.expect_step(SessionStep::AwaitingLaunch, "launch")?;
        if self.actor.requires_target_selection() && self.patient.is_none() {
            return Err(ScanError::internal(
                "professional reached launch without a resolved patient",
            ));
        }
        self.step = SessionStep::Capturing;
        Ok(())
    }

    /// Cancels at the instructions gate. Full cascade reset: a
    /// professional's already-chosen patient is cleared as well.
    pub fn cancel_launch(&mut self) -> Result<()> {
        self.expect_step(SessionStep::AwaitingLaunch, "cancel_launch")?;
        self.reset();
        Ok(())
    }

    /// Handles a decoded barcode event from the capture adapter.
    ///
    /// The guard is checked and set within this single synchronous call, so
    /// a second near-simultaneous event for the same physical code observes
    /// the guard already set and is dropped.
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: capture accepted, session moved to link confirmation
    /// - `Ok(false)`: duplicate event suppressed by the guard
    /// - `Err(_)`: the event arrived outside the capturing step or outside
    ///   the code intent
    pub fn barcode_detected(&mut self, value: impl Into<String>) -> Result<bool> {
        // Guard check first: a late duplicate of an already-accepted capture
        // is dropped silently even though the step has moved on.
        if self.submission_dispatched {
            return Ok(false);
        }
        if self.step != SessionStep::Capturing || self.intent != Some(ScanIntent::Code) {
            return Err(ScanError::invalid_transition(
                self.step.name(),
                "barcode_detected",
            ));
        }
        self.submission_dispatched = true;
        self.capture = Some(CaptureResult::Code {
            value: value.into(),
        });
        self.step = SessionStep::ConfirmingLink;
        Ok(true)
    }

    /// Records a captured photo and moves to upload-target selection.
    pub fn photo_captured(&mut self, uri: impl Into<String>) -> Result<()> {
        if self.step != SessionStep::Capturing || self.intent != Some(ScanIntent::Photo) {
            return Err(ScanError::invalid_transition(
                self.step.name(),
                "photo_captured",
            ));
        }
        self.capture = Some(CaptureResult::Photo { uri: uri.into() });
        self.step = SessionStep::SelectingUploadTarget;
        Ok(())
    }

    /// Declines the link confirmation and returns to capturing.
    ///
    /// Clears the guard and the stored capture so the user can re-scan.
    pub fn cancel_link_confirmation(&mut self) -> Result<()> {
        self.expect_step(SessionStep::ConfirmingLink, "cancel_link_confirmation")?;
        self.submission_dispatched = false;
        self.capture = None;
        self.step = SessionStep::Capturing;
        Ok(())
    }

    /// Confirms the link prompt; the session enters the in-flight state.
    pub fn confirm_link(&mut self) -> Result<()> {
        self.expect_step(SessionStep::ConfirmingLink, "confirm_link")?;
        self.step = SessionStep::Submitting;
        Ok(())
    }

    /// Records the kit the upload is addressed to; the session enters the
    /// in-flight state.
    pub fn kit_resolved(&mut self, kit: TestKit) -> Result<()> {
        self.expect_step(SessionStep::SelectingUploadTarget, "kit_resolved")?;
        if !kit.accepts_submission() {
            return Err(ScanError::internal(format!(
                "closed kit '{}' offered for submission",
                kit.code
            )));
        }
        self.kit = Some(kit);
        self.step = SessionStep::Submitting;
        Ok(())
    }

    /// Cancels upload-target selection.
    ///
    /// The capture is discarded and the session returns to the instructions
    /// gate so the user may recapture.
    pub fn cancel_kit_selection(&mut self) -> Result<()> {
        self.expect_step(SessionStep::SelectingUploadTarget, "cancel_kit_selection")?;
        self.capture = None;
        self.kit = None;
        self.step = SessionStep::AwaitingLaunch;
        Ok(())
    }

    /// Acknowledges the submission result, success or failure.
    ///
    /// Every attempt ends here: the session funnels through the same full
    /// reset regardless of outcome, so no field can be reused across
    /// attempts.
    pub fn acknowledge_result(&mut self) -> Result<()> {
        self.expect_step(SessionStep::Submitting, "acknowledge_result")?;
        self.reset();
        Ok(())
    }

    /// Resets the session to the initial step, clearing every collected
    /// field. Also invoked when the owning screen unmounts.
    pub fn reset(&mut self) {
        self.step = SessionStep::SelectingIntent;
        self.intent = None;
        self.clear_downstream_of_intent();
    }

    /// Clears everything recorded after intent selection: target, capture
    /// and the submission guard.
    fn clear_downstream_of_intent(&mut self) {
        self.patient = None;
        self.kit = None;
        self.capture = None;
        self.submission_dispatched = false;
    }

    fn expect_step(&self, expected: SessionStep, event: &'static str) -> Result<()> {
        if self.step != expected {
            return Err(ScanError::invalid_transition(self.step.name(), event));
        }
        Ok(())
    }
}

//! The scan workflow coordinator.
//!
//! `ScanCoordinator` owns a live [`ScanSession`] and sequences its async
//! collaborators: the camera adapter for permission and capture, the gateway
//! for candidate fetches, and the [`ActionExecutor`] for the terminal
//! submission. UI events arrive as method calls; every state mutation
//! happens inside one synchronous critical section, and every mutation that
//! follows an awaited call is gated on a liveness flag so a late-arriving
//! response never touches a torn-down session.

use crate::executor::{ActionExecutor, Outcome};
use crate::resolver::EntityResolver;
use scanflow_core::actor::{ActorRole, RoleStore};
use scanflow_core::capture::{CaptureAdapter, PermissionStatus};
use scanflow_core::error::{Result, ScanError};
use scanflow_core::gateway::Gateway;
use scanflow_core::kit::TestKit;
use scanflow_core::patient::PatientRecord;
use scanflow_core::session::{ScanIntent, ScanSession, SessionStep};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Drives one scan session per screen instance.
///
/// There is exactly one coordinator per mounted feature screen and no
/// cross-session sharing; the session behind the mutex is the only shared
/// mutable state, and each event is fully processed under the lock before
/// the next is accepted.
pub struct ScanCoordinator {
    session: Mutex<ScanSession>,
    gateway: Arc<dyn Gateway>,
    camera: Arc<dyn CaptureAdapter>,
    executor: ActionExecutor,
    /// Cleared when the owning screen unmounts. Checked after every await
    /// before any state update.
    alive: AtomicBool,
}

impl ScanCoordinator {
    /// Creates a coordinator for a known actor role.
    pub fn new(
        actor: ActorRole,
        gateway: Arc<dyn Gateway>,
        camera: Arc<dyn CaptureAdapter>,
    ) -> Self {
        Self {
            session: Mutex::new(ScanSession::new(actor)),
            executor: ActionExecutor::new(gateway.clone()),
            gateway,
            camera,
            alive: AtomicBool::new(true),
        }
    }

    /// Creates a coordinator reading the actor role from device storage.
    ///
    /// The role is read exactly once; it stays fixed for the session's
    /// lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::RoleUnavailable`] if no role is stored.
    pub async fn start(
        roles: Arc<dyn RoleStore>,
        gateway: Arc<dyn Gateway>,
        camera: Arc<dyn CaptureAdapter>,
    ) -> Result<Self> {
        let actor = roles.current_role().await?;
        tracing::debug!(?actor, "scan session starting");
        Ok(Self::new(actor, gateway, camera))
    }

    /// A point-in-time snapshot of the session, for rendering.
    pub fn session(&self) -> ScanSession {
        self.lock().clone()
    }

    pub fn step(&self) -> SessionStep {
        self.lock().step()
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Marks the owning screen as torn down and clears the session.
    ///
    /// Responses arriving after this point are discarded.
    pub fn detach(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.lock().reset();
    }

    // ------------------------------------------------------------------
    // Intent and target selection
    // ------------------------------------------------------------------

    /// The user picked what kind of artifact to capture.
    pub fn select_intent(&self, intent: ScanIntent) -> Result<()> {
        self.lock().select_intent(intent)
    }

    /// Fetches the professional's assigned patients and opens a fresh
    /// resolution attempt over them.
    ///
    /// A failed fetch degrades to an empty candidate list; the UI shows the
    /// same empty-result state either way, and re-opening the resolver
    /// re-fetches.
    pub async fn open_patient_selection(&self) -> Result<EntityResolver<PatientRecord>> {
        self.expect_step(SessionStep::SelectingTarget, "open_patient_selection")?;
        let candidates = match self.gateway.list_patients().await {
            Ok(patients) => patients,
            Err(err) => {
                tracing::warn!(error = %err, "patient fetch failed, presenting empty list");
                Vec::new()
            }
        };
        Ok(EntityResolver::open(candidates))
    }

    /// The professional confirmed a patient pick.
    pub fn confirm_patient(&self, patient: PatientRecord) -> Result<()> {
        self.lock().patient_resolved(patient)
    }

    /// The professional dismissed patient selection, abandoning the attempt.
    pub fn cancel_patient_selection(&self) -> Result<()> {
        self.lock().cancel_target_selection()
    }

    // ------------------------------------------------------------------
    // Instructions gate and capture
    // ------------------------------------------------------------------

    /// Ensures camera permission, prompting whenever access is not
    /// currently granted.
    ///
    /// A previous denial is not final: the gate keeps a grant prompt
    /// available, so both `Unknown` and `Denied` trigger a fresh request
    /// and a refusal can be reversed on a later attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::PermissionDenied`] when access is still refused
    /// after the prompt. The session stays at the gate; the user may retry
    /// on demand.
    pub async fn ensure_permission(&self) -> Result<PermissionStatus> {
        let status = match self.camera.query_permission().await {
            PermissionStatus::Granted => PermissionStatus::Granted,
            _ => self.camera.request_permission().await,
        };
        if status.is_granted() {
            Ok(status)
        } else {
            Err(ScanError::PermissionDenied)
        }
    }

    /// Confirms the instructions gate and activates the camera.
    ///
    /// Permission is (re-)checked first; on denial the session does not
    /// move, so the gate keeps prompting until access is granted.
    pub async fn launch(&self) -> Result<()> {
        self.expect_step(SessionStep::AwaitingLaunch, "launch")?;
        self.ensure_permission().await?;
        if !self.is_alive() {
            return Ok(());
        }
        self.lock().launch()
    }

    /// Cancels at the instructions gate (full cascade reset).
    pub fn cancel_launch(&self) -> Result<()> {
        self.lock().cancel_launch()
    }

    /// A barcode event from the viewfinder.
    ///
    /// The guard check-then-set happens synchronously under the session
    /// lock, before any asynchronous work, so duplicate events for one
    /// physical code collapse to a single accepted capture.
    ///
    /// # Returns
    ///
    /// `true` if the capture was accepted, `false` if it was a suppressed
    /// duplicate.
    pub fn barcode_detected(&self, value: impl Into<String>) -> Result<bool> {
        let accepted = self.lock().barcode_detected(value)?;
        if !accepted {
            tracing::debug!("duplicate barcode event dropped");
        }
        Ok(accepted)
    }

    /// Takes a photo via the capture adapter and records it.
    pub async fn capture_photo(&self, quality: f32) -> Result<()> {
        self.expect_step(SessionStep::Capturing, "capture_photo")?;
        let photo = self.camera.capture_photo(quality).await?;
        if !self.is_alive() {
            tracing::debug!("photo arrived after teardown, discarding");
            return Ok(());
        }
        self.lock().photo_captured(photo.uri)
    }

    // ------------------------------------------------------------------
    // Confirmation, upload-target selection and submission
    // ------------------------------------------------------------------

    /// Declines the link prompt; the guard clears and the camera reopens.
    pub fn cancel_link_confirmation(&self) -> Result<()> {
        self.lock().cancel_link_confirmation()
    }

    /// Fetches the open test kits for the session's subject and opens a
    /// fresh resolution attempt over them.
    ///
    /// Closed kits are excluded; kits always belong to the currently
    /// resolved patient (or to the user themselves). Fetch failures degrade
    /// to an empty list like patient selection.
    pub async fn open_kit_selection(&self) -> Result<EntityResolver<TestKit>> {
        self.expect_step(SessionStep::SelectingUploadTarget, "open_kit_selection")?;
        let subject = {
            let session = self.lock();
            session.subject().ok_or_else(|| {
                ScanError::internal("upload-target selection without a subject")
            })?
        };
        let candidates = match self.gateway.list_kits(&subject).await {
            Ok(kits) => kits
                .into_iter()
                .filter(TestKit::accepts_submission)
                .collect(),
            Err(err) => {
                tracing::warn!(error = %err, "kit fetch failed, presenting empty list");
                Vec::new()
            }
        };
        Ok(EntityResolver::open(candidates))
    }

    /// Confirms the link prompt and performs the link action.
    ///
    /// The session enters the non-interactive submitting state before the
    /// network call starts and stays there until the outcome is
    /// acknowledged.
    pub async fn submit_link(&self) -> Result<Outcome> {
        let (intent, target, capture) = {
            let mut session = self.lock();
            session.confirm_link()?;
            let intent = session
                .intent()
                .ok_or_else(|| ScanError::internal("submitting without an intent"))?;
            let target = session
                .resolved_target()
                .ok_or_else(|| ScanError::internal("submitting without a target"))?;
            let capture = session
                .capture()
                .cloned()
                .ok_or_else(|| ScanError::internal("submitting without a capture"))?;
            (intent, target, capture)
        };
        Ok(self.executor.execute(intent, &target, &capture).await)
    }

    /// Confirms a kit pick and performs the upload action.
    pub async fn submit_upload(&self, kit: TestKit) -> Result<Outcome> {
        let (intent, target, capture) = {
            let mut session = self.lock();
            session.kit_resolved(kit)?;
            let intent = session
                .intent()
                .ok_or_else(|| ScanError::internal("submitting without an intent"))?;
            let target = session
                .resolved_target()
                .ok_or_else(|| ScanError::internal("submitting without a target"))?;
            let capture = session
                .capture()
                .cloned()
                .ok_or_else(|| ScanError::internal("submitting without a capture"))?;
            (intent, target, capture)
        };
        Ok(self.executor.execute(intent, &target, &capture).await)
    }

    /// Dismisses upload-target selection; the capture is discarded and the
    /// user may recapture from the gate.
    pub fn cancel_kit_selection(&self) -> Result<()> {
        self.lock().cancel_kit_selection()
    }

    /// The user acknowledged the submission outcome (success or failure).
    /// The session funnels through the full reset either way.
    pub fn acknowledge(&self) -> Result<()> {
        if !self.is_alive() {
            return Ok(());
        }
        self.lock().acknowledge_result()
    }

    fn expect_step(&self, expected: SessionStep, event: &'static str) -> Result<()> {
        let step = self.step();
        if step != expected {
            return Err(ScanError::invalid_transition(step.name(), event));
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScanSession> {
        // A poisoned lock means an event handler panicked; the session state
        // is still structurally valid, so continue with it.
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

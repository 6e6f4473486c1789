use crate::coordinator::ScanCoordinator;
use crate::executor::Outcome;
use async_trait::async_trait;
use scanflow_core::actor::{ActorRole, RoleStore};
use scanflow_core::capture::{CaptureAdapter, PermissionStatus, PhotoCapture};
use scanflow_core::error::{Result, ScanError};
use scanflow_core::gateway::Gateway;
use scanflow_core::kit::{KitStatus, TestKit};
use scanflow_core::patient::PatientRecord;
use scanflow_core::session::{ScanIntent, SessionStep, Subject};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

fn patient(id: i64, name: &str) -> PatientRecord {
    PatientRecord {
        id,
        full_name: name.to_string(),
        email: format!("p{}@example.com", id),
        dob: None,
        gender: None,
    }
}

fn kit(id: i64, code: &str, status: KitStatus) -> TestKit {
    TestKit {
        id,
        code: code.to_string(),
        status,
        created_at: "2025-06-01T10:00:00Z".to_string(),
    }
}

// Mock Gateway recording every irreversible call.
#[derive(Default)]
struct MockGateway {
    patients: Vec<PatientRecord>,
    /// Kits keyed by subject patient id (`None` = self).
    kits: HashMap<Option<i64>, Vec<TestKit>>,
    fail_patients: bool,
    fail_kits: bool,
    fail_link: bool,
    fail_upload: bool,
    link_calls: Mutex<Vec<(Option<i64>, String)>>,
    upload_calls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Gateway for MockGateway {
    async fn list_patients(&self) -> Result<Vec<PatientRecord>> {
        if self.fail_patients {
            return Err(ScanError::candidate_fetch("boom"));
        }
        Ok(self.patients.clone())
    }

    async fn list_kits(&self, subject: &Subject) -> Result<Vec<TestKit>> {
        if self.fail_kits {
            return Err(ScanError::candidate_fetch("boom"));
        }
        Ok(self
            .kits
            .get(&subject.patient_id())
            .cloned()
            .unwrap_or_default())
    }

    async fn link_code(&self, subject: &Subject, code: &str) -> Result<()> {
        self.link_calls
            .lock()
            .unwrap()
            .push((subject.patient_id(), code.to_string()));
        if self.fail_link {
            return Err(ScanError::action("link rejected"));
        }
        Ok(())
    }

    async fn upload_photo(&self, kit_code: &str, photo: &PhotoCapture) -> Result<()> {
        self.upload_calls
            .lock()
            .unwrap()
            .push((kit_code.to_string(), photo.uri.clone()));
        if self.fail_upload {
            return Err(ScanError::action("analysis service unavailable"));
        }
        Ok(())
    }
}

// Mock CaptureAdapter with a settable permission state and an optional
// rendezvous used to interleave teardown with an in-flight capture.
struct MockCamera {
    permission: Mutex<PermissionStatus>,
    request_answer: PermissionStatus,
    request_calls: AtomicUsize,
    capture_entered: Option<Arc<Notify>>,
    capture_released: Option<Arc<Notify>>,
}

impl MockCamera {
    fn granted() -> Self {
        Self::with_permission(PermissionStatus::Granted, PermissionStatus::Granted)
    }

    fn with_permission(initial: PermissionStatus, request_answer: PermissionStatus) -> Self {
        Self {
            permission: Mutex::new(initial),
            request_answer,
            request_calls: AtomicUsize::new(0),
            capture_entered: None,
            capture_released: None,
        }
    }
}

#[async_trait]
impl CaptureAdapter for MockCamera {
    async fn query_permission(&self) -> PermissionStatus {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> PermissionStatus {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        *self.permission.lock().unwrap() = self.request_answer;
        self.request_answer
    }

    async fn capture_photo(&self, _quality: f32) -> Result<PhotoCapture> {
        if let (Some(entered), Some(released)) = (&self.capture_entered, &self.capture_released) {
            entered.notify_one();
            released.notified().await;
        }
        Ok(PhotoCapture {
            uri: "file:///tmp/strip.jpg".to_string(),
        })
    }
}

struct MockRoleStore {
    role: Option<ActorRole>,
}

#[async_trait]
impl RoleStore for MockRoleStore {
    async fn current_role(&self) -> Result<ActorRole> {
        self.role.ok_or(ScanError::RoleUnavailable)
    }
}

fn coordinator(actor: ActorRole, gateway: MockGateway) -> ScanCoordinator {
    ScanCoordinator::new(actor, Arc::new(gateway), Arc::new(MockCamera::granted()))
}

#[tokio::test]
async fn scenario_a_patient_links_scanned_code() {
    let gateway = Arc::new(MockGateway::default());
    let coordinator = ScanCoordinator::new(
        ActorRole::Patient,
        gateway.clone(),
        Arc::new(MockCamera::granted()),
    );

    coordinator.select_intent(ScanIntent::Code).unwrap();
    coordinator.launch().await.unwrap();
    assert!(coordinator.barcode_detected("KIT-42").unwrap());

    let outcome = coordinator.submit_link().await.unwrap();
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(
        *gateway.link_calls.lock().unwrap(),
        vec![(None, "KIT-42".to_string())]
    );

    coordinator.acknowledge().unwrap();
    assert_eq!(coordinator.step(), SessionStep::SelectingIntent);
    assert!(coordinator.session().capture().is_none());
}

#[tokio::test]
async fn duplicate_barcode_events_produce_exactly_one_link_call() {
    let gateway = Arc::new(MockGateway::default());
    let coordinator = ScanCoordinator::new(
        ActorRole::Patient,
        gateway.clone(),
        Arc::new(MockCamera::granted()),
    );

    coordinator.select_intent(ScanIntent::Code).unwrap();
    coordinator.launch().await.unwrap();

    assert!(coordinator.barcode_detected("KIT-42").unwrap());
    assert!(!coordinator.barcode_detected("KIT-42").unwrap());
    assert!(!coordinator.barcode_detected("KIT-42").unwrap());

    coordinator.submit_link().await.unwrap();
    assert_eq!(gateway.link_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn scenario_b_professional_photo_upload_failure_resets() {
    let mut gateway = MockGateway {
        patients: vec![patient(7, "Erika Muster")],
        fail_upload: true,
        ..Default::default()
    };
    gateway.kits.insert(
        Some(7),
        vec![kit(3, "K3", KitStatus::Ongoing), kit(9, "K9", KitStatus::Closed)],
    );
    let gateway = Arc::new(gateway);
    let coordinator = ScanCoordinator::new(
        ActorRole::Professional,
        gateway.clone(),
        Arc::new(MockCamera::granted()),
    );

    coordinator.select_intent(ScanIntent::Photo).unwrap();
    let resolver = coordinator.open_patient_selection().await.unwrap();
    assert_eq!(resolver.candidates().len(), 1);
    coordinator.confirm_patient(patient(7, "Erika Muster")).unwrap();

    coordinator.launch().await.unwrap();
    coordinator.capture_photo(0.8).await.unwrap();
    assert_eq!(coordinator.step(), SessionStep::SelectingUploadTarget);

    let resolver = coordinator.open_kit_selection().await.unwrap();
    let codes: Vec<_> = resolver.candidates().iter().map(|k| k.code.as_str()).collect();
    assert_eq!(codes, vec!["K3"]);

    let outcome = coordinator
        .submit_upload(kit(3, "K3", KitStatus::Ongoing))
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::RecoverableFailure(_)));
    assert_eq!(
        gateway.upload_calls.lock().unwrap()[0],
        ("K3".to_string(), "file:///tmp/strip.jpg".to_string())
    );

    coordinator.acknowledge().unwrap();
    let session = coordinator.session();
    assert_eq!(session.step(), SessionStep::SelectingIntent);
    assert!(session.selected_patient().is_none());
    assert!(session.selected_kit().is_none());
    assert!(session.capture().is_none());
}

#[tokio::test]
async fn scenario_c_cancelling_patient_selection_clears_intent() {
    let coordinator = coordinator(
        ActorRole::Professional,
        MockGateway {
            patients: vec![patient(7, "Erika Muster")],
            ..Default::default()
        },
    );

    coordinator.select_intent(ScanIntent::Code).unwrap();
    assert_eq!(coordinator.step(), SessionStep::SelectingTarget);

    coordinator.cancel_patient_selection().unwrap();
    let session = coordinator.session();
    assert_eq!(session.step(), SessionStep::SelectingIntent);
    assert_eq!(session.intent(), None);
}

#[tokio::test]
async fn patient_actor_never_enters_target_selection() {
    let coordinator = coordinator(ActorRole::Patient, MockGateway::default());
    coordinator.select_intent(ScanIntent::Code).unwrap();
    assert_eq!(coordinator.step(), SessionStep::AwaitingLaunch);
    assert!(coordinator.open_patient_selection().await.is_err());
}

#[tokio::test]
async fn patient_fetch_failure_degrades_to_empty_candidates() {
    let coordinator = coordinator(
        ActorRole::Professional,
        MockGateway {
            patients: vec![patient(7, "Erika Muster")],
            fail_patients: true,
            ..Default::default()
        },
    );
    coordinator.select_intent(ScanIntent::Photo).unwrap();
    let resolver = coordinator.open_patient_selection().await.unwrap();
    assert!(resolver.is_empty());
}

#[tokio::test]
async fn kit_fetch_failure_degrades_to_empty_candidates() {
    let coordinator = coordinator(
        ActorRole::Patient,
        MockGateway {
            fail_kits: true,
            ..Default::default()
        },
    );
    coordinator.select_intent(ScanIntent::Photo).unwrap();
    coordinator.launch().await.unwrap();
    coordinator.capture_photo(0.8).await.unwrap();
    let resolver = coordinator.open_kit_selection().await.unwrap();
    assert!(resolver.is_empty());
}

#[tokio::test]
async fn permission_denial_keeps_the_session_at_the_gate() {
    let camera = MockCamera::with_permission(PermissionStatus::Unknown, PermissionStatus::Denied);
    let coordinator = ScanCoordinator::new(
        ActorRole::Patient,
        Arc::new(MockGateway::default()),
        Arc::new(camera),
    );

    coordinator.select_intent(ScanIntent::Code).unwrap();
    let err = coordinator.launch().await.unwrap_err();
    assert!(err.is_permission_denied());
    // Not terminal: the gate stays up and launch can be retried.
    assert_eq!(coordinator.step(), SessionStep::AwaitingLaunch);
}

#[tokio::test]
async fn denied_permission_is_rerequested_at_the_gate() {
    let camera = Arc::new(MockCamera::with_permission(
        PermissionStatus::Denied,
        PermissionStatus::Granted,
    ));
    let coordinator = ScanCoordinator::new(
        ActorRole::Patient,
        Arc::new(MockGateway::default()),
        camera.clone(),
    );

    coordinator.select_intent(ScanIntent::Code).unwrap();
    coordinator.launch().await.unwrap();
    assert_eq!(coordinator.step(), SessionStep::Capturing);
    assert_eq!(camera.request_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn every_launch_retry_prompts_while_permission_stays_denied() {
    let camera = Arc::new(MockCamera::with_permission(
        PermissionStatus::Denied,
        PermissionStatus::Denied,
    ));
    let coordinator = ScanCoordinator::new(
        ActorRole::Patient,
        Arc::new(MockGateway::default()),
        camera.clone(),
    );

    coordinator.select_intent(ScanIntent::Code).unwrap();
    for _ in 0..3 {
        let err = coordinator.launch().await.unwrap_err();
        assert!(err.is_permission_denied());
    }
    assert_eq!(camera.request_calls.load(Ordering::SeqCst), 3);
    assert_eq!(coordinator.step(), SessionStep::AwaitingLaunch);
}

#[tokio::test]
async fn permission_request_is_made_when_state_is_unknown() {
    let camera = MockCamera::with_permission(PermissionStatus::Unknown, PermissionStatus::Granted);
    let coordinator = ScanCoordinator::new(
        ActorRole::Patient,
        Arc::new(MockGateway::default()),
        Arc::new(camera),
    );

    coordinator.select_intent(ScanIntent::Code).unwrap();
    coordinator.launch().await.unwrap();
    assert_eq!(coordinator.step(), SessionStep::Capturing);
}

#[tokio::test(flavor = "multi_thread")]
async fn photo_arriving_after_teardown_is_discarded() {
    let entered = Arc::new(Notify::new());
    let released = Arc::new(Notify::new());
    let camera = MockCamera {
        capture_entered: Some(entered.clone()),
        capture_released: Some(released.clone()),
        ..MockCamera::granted()
    };
    let coordinator = Arc::new(ScanCoordinator::new(
        ActorRole::Patient,
        Arc::new(MockGateway::default()),
        Arc::new(camera),
    ));

    coordinator.select_intent(ScanIntent::Photo).unwrap();
    coordinator.launch().await.unwrap();

    let worker = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.capture_photo(0.8).await })
    };

    // The screen unmounts while the camera is still producing the photo.
    entered.notified().await;
    coordinator.detach();
    released.notify_one();

    worker.await.unwrap().unwrap();
    let session = coordinator.session();
    assert_eq!(session.step(), SessionStep::SelectingIntent);
    assert!(session.capture().is_none());
}

#[tokio::test]
async fn kit_selection_cannot_open_before_a_capture_exists() {
    let mut gateway = MockGateway::default();
    gateway
        .kits
        .insert(None, vec![kit(3, "K3", KitStatus::Open)]);
    let coordinator = coordinator(ActorRole::Patient, gateway);

    coordinator.select_intent(ScanIntent::Photo).unwrap();
    // Still at the instructions gate; no photo has been taken yet.
    let err = coordinator.open_kit_selection().await.unwrap_err();
    assert!(err.is_invalid_transition());
    assert_eq!(coordinator.step(), SessionStep::AwaitingLaunch);
}

#[tokio::test]
async fn cancelling_kit_selection_returns_to_the_gate() {
    let coordinator = coordinator(ActorRole::Patient, MockGateway::default());
    coordinator.select_intent(ScanIntent::Photo).unwrap();
    coordinator.launch().await.unwrap();
    coordinator.capture_photo(0.8).await.unwrap();

    coordinator.cancel_kit_selection().unwrap();
    let session = coordinator.session();
    assert_eq!(session.step(), SessionStep::AwaitingLaunch);
    assert!(session.capture().is_none());
}

#[tokio::test]
async fn start_reads_the_role_once_from_storage() {
    let roles = Arc::new(MockRoleStore {
        role: Some(ActorRole::Professional),
    });
    let coordinator = ScanCoordinator::start(
        roles,
        Arc::new(MockGateway::default()),
        Arc::new(MockCamera::granted()),
    )
    .await
    .unwrap();
    assert_eq!(coordinator.session().actor(), ActorRole::Professional);
}

#[tokio::test]
async fn start_surfaces_a_missing_role() {
    let roles = Arc::new(MockRoleStore { role: None });
    let result = ScanCoordinator::start(
        roles,
        Arc::new(MockGateway::default()),
        Arc::new(MockCamera::granted()),
    )
    .await;
    assert_eq!(result.err(), Some(ScanError::RoleUnavailable));
}

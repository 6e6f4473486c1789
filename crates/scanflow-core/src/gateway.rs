//! Gateway trait.
//!
//! Defines the interface to the authenticated REST backends. Two logical
//! services hide behind one trait: the primary API (patients, kits, code
//! linking) and the analysis service on a separate host (photo uploads).
//! Token attachment, refresh and timeouts are the implementation's concern;
//! the workflow only depends on this request/response contract.

use crate::capture::PhotoCapture;
use crate::error::Result;
use crate::kit::TestKit;
use crate::patient::PatientRecord;
use crate::session::Subject;
use async_trait::async_trait;

/// An abstract client for the scan workflow's server actions.
///
/// Both server actions (`link_code`, `upload_photo`) are irreversible; the
/// caller is responsible for invoking each at most once per capture.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Lists the patients assigned to the authenticated professional.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<PatientRecord>)`: the assigned patients (possibly empty)
    /// - `Err(_)`: the fetch failed
    async fn list_patients(&self) -> Result<Vec<PatientRecord>>;

    /// Lists test kits for the given subject ("self" or a selected patient).
    ///
    /// Returns kits in any status; filtering out closed kits is the
    /// resolver's responsibility.
    async fn list_kits(&self, subject: &Subject) -> Result<Vec<TestKit>>;

    /// Associates a scanned code with the subject's profile.
    ///
    /// Irreversible. Must be invoked at most once per capture.
    async fn link_code(&self, subject: &Subject, code: &str) -> Result<()>;

    /// Uploads a captured photo for analysis against the kit with the given
    /// code. The analysis service lives on a separate host from the primary
    /// API.
    ///
    /// Irreversible. Must be invoked at most once per capture.
    async fn upload_photo(&self, kit_code: &str, photo: &PhotoCapture) -> Result<()>;
}

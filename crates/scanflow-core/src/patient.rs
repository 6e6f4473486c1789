//! Patient domain model.

use serde::{Deserialize, Serialize};

/// A patient record as presented during target resolution.
///
/// For a professional actor these are the professional's assigned patients;
/// a patient actor never sees these records (their target is implicitly
/// "self").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Server-side patient identifier.
    pub id: i64,
    /// Full display name.
    pub full_name: String,
    /// Contact email; also matched by resolver search.
    pub email: String,
    /// Date of birth (display only).
    #[serde(default)]
    pub dob: Option<String>,
    /// Gender (display only).
    #[serde(default)]
    pub gender: Option<String>,
}

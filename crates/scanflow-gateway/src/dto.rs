//! Wire DTOs for the primary API.
//!
//! The backend speaks in `qr_data`/`result_status` vocabulary; the domain
//! models use `code`/`status`. Conversions are lossless in the direction
//! the workflow needs.

use scanflow_core::kit::{KitStatus, TestKit};
use scanflow_core::patient::PatientRecord;
use serde::{Deserialize, Serialize};

/// A patient row as returned by `GET doctor/patients/`.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientDto {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

impl From<PatientDto> for PatientRecord {
    fn from(dto: PatientDto) -> Self {
        Self {
            id: dto.id,
            full_name: dto.full_name,
            email: dto.email,
            dob: dto.dob,
            gender: dto.gender,
        }
    }
}

/// A test-kit row as returned by `GET qr-codes/list/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TestKitDto {
    pub id: i64,
    pub qr_data: String,
    pub result_status: KitStatus,
    pub created_at: String,
}

impl From<TestKitDto> for TestKit {
    fn from(dto: TestKitDto) -> Self {
        Self {
            id: dto.id,
            code: dto.qr_data,
            status: dto.result_status,
            created_at: dto.created_at,
        }
    }
}

/// Body of `POST qr-codes/`, associating a scanned code with a profile.
///
/// `user_id` is omitted for a patient actor; the backend infers the
/// identity from the bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct LinkCodeRequest {
    pub qr_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

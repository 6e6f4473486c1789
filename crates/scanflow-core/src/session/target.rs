//! Resolved target types.
//!
//! The target is the entity an irreversible action applies to: the
//! authenticated user themselves, or a patient selected by a professional,
//! plus (photo path only) the test kit the upload is addressed to.

use crate::kit::TestKit;
use crate::patient::PatientRecord;
use serde::{Deserialize, Serialize};

/// The subject an action applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subject {
    /// The authenticated user. Never surfaced to the user as a choice.
    Slf,
    /// A patient selected by a professional actor.
    Patient { record: PatientRecord },
}

impl Subject {
    /// The server-side identifier the primary API scopes calls by, if any.
    ///
    /// `None` means "the authenticated user" — the backend infers the
    /// identity from the bearer token.
    pub fn patient_id(&self) -> Option<i64> {
        match self {
            Self::Slf => None,
            Self::Patient { record } => Some(record.id),
        }
    }

    /// Display name for confirmation prompts ("link this code to ...").
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Self::Slf => None,
            Self::Patient { record } => Some(&record.full_name),
        }
    }
}

/// A fully or partially resolved action target.
///
/// Invariant: the photo path cannot reach submission without `kit` set;
/// clearing the subject also clears the kit, since the kit is scoped to the
/// subject and becomes stale without it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    /// Who the action applies to.
    pub subject: Subject,
    /// The kit a photo upload is addressed to. Photo path only.
    pub kit: Option<TestKit>,
}

impl ResolvedTarget {
    /// A target pointing at the authenticated user with no kit resolved.
    pub fn slf() -> Self {
        Self {
            subject: Subject::Slf,
            kit: None,
        }
    }
}

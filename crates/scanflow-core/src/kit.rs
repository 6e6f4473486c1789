//! Test-kit domain model.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a test kit.
///
/// `Closed` is terminal: closed kits are excluded from the upload candidate
/// set, since no further result can be attached to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KitStatus {
    /// Registered, no result submitted yet.
    Open,
    /// A result submission is in progress.
    Ongoing,
    /// Result finalized; no further submissions accepted.
    Closed,
}

impl KitStatus {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// A test-kit record scoped to a single patient (or "self").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestKit {
    /// Server-side record identifier.
    pub id: i64,
    /// The machine-readable code printed on the physical kit. Uploads are
    /// addressed by this code; resolver search matches it.
    pub code: String,
    /// Current lifecycle status.
    pub status: KitStatus,
    /// Creation timestamp (ISO 8601, display only).
    pub created_at: String,
}

impl TestKit {
    /// Whether this kit can still receive a photo submission.
    pub fn accepts_submission(&self) -> bool {
        !self.status.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_kit_rejects_submission() {
        let kit = TestKit {
            id: 1,
            code: "KIT-1".to_string(),
            status: KitStatus::Closed,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        };
        assert!(!kit.accepts_submission());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&KitStatus::Ongoing).unwrap(),
            "\"ongoing\""
        );
    }
}

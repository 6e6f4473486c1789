//! Actor role types and the persisted role source.
//!
//! The role of the person driving a scan session (a patient, or a medical
//! professional acting on behalf of one) is read once when the session
//! starts and is immutable for the session's lifetime. It determines which
//! branches of the state machine are reachable.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// The role of the person driving a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// A patient acting on their own behalf. Targets resolve to "self".
    Patient,
    /// A medical professional acting on behalf of an assigned patient.
    /// Requires an explicit patient selection before any capture.
    Professional,
}

impl ActorRole {
    /// Whether this role must resolve a patient before capturing.
    pub fn requires_target_selection(&self) -> bool {
        matches!(self, Self::Professional)
    }
}

/// Source of the process-wide "current actor role" value.
///
/// The role is persisted on the device outside this crate's control; the
/// workflow only ever consumes it, never writes it.
#[async_trait::async_trait]
pub trait RoleStore: Send + Sync {
    /// Returns the currently persisted actor role.
    ///
    /// # Returns
    ///
    /// - `Ok(ActorRole)`: the persisted role
    /// - `Err(ScanError::RoleUnavailable)`: no role has been stored
    async fn current_role(&self) -> Result<ActorRole>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn professional_requires_target_selection() {
        assert!(ActorRole::Professional.requires_target_selection());
        assert!(!ActorRole::Patient.requires_target_selection());
    }
}

//! Session phases and fault classification.

use super::capabilities::{EngineFault, FaultKind};

/// Lifecycle phase of one playback session.
///
/// `Failed` and `Destroyed` are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Created, `start` not yet called
    Idle,
    /// Adaptive engine loading the manifest
    Attaching,
    /// Source attached and playing (or resumable by the viewer)
    Playing,
    /// Recovering from a transient engine fault
    Recovering,
    /// Unrecoverable fault; resources released, error surfaced
    Failed,
    /// Torn down; a destroyed session cannot be restarted
    Destroyed,
}

impl SessionPhase {
    /// Check if no further transitions can leave this phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Failed | SessionPhase::Destroyed)
    }

    /// Check if the session holds a live media source.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionPhase::Attaching | SessionPhase::Playing | SessionPhase::Recovering
        )
    }
}

/// What the controller does about a fatal engine fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Restart loading from the current manifest (same engine instance)
    RestartLoad,
    /// Attempt in-place media-error recovery (same engine instance)
    RecoverMedia,
    /// Unrecoverable: release resources and fail the session
    Abort,
}

/// Classifies an engine fault into a recovery decision.
///
/// Non-fatal faults return `None`: the engine self-heals and the
/// session phase must not change.
pub fn classify_fault(fault: &EngineFault) -> Option<RecoveryAction> {
    if !fault.fatal {
        return None;
    }

    Some(match fault.kind {
        FaultKind::Network => RecoveryAction::RestartLoad,
        FaultKind::Media => RecoveryAction::RecoverMedia,
        FaultKind::Other(_) => RecoveryAction::Abort,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_predicates() {
        assert!(!SessionPhase::Idle.is_terminal());
        assert!(!SessionPhase::Idle.is_active());

        assert!(SessionPhase::Attaching.is_active());
        assert!(SessionPhase::Playing.is_active());
        assert!(SessionPhase::Recovering.is_active());

        assert!(SessionPhase::Failed.is_terminal());
        assert!(SessionPhase::Destroyed.is_terminal());
        assert!(!SessionPhase::Failed.is_active());
    }

    #[test]
    fn test_non_fatal_faults_are_ignored() {
        assert_eq!(classify_fault(&EngineFault::non_fatal(FaultKind::Network)), None);
        assert_eq!(classify_fault(&EngineFault::non_fatal(FaultKind::Media)), None);
        assert_eq!(
            classify_fault(&EngineFault::non_fatal(FaultKind::Other("buffer stall".into()))),
            None
        );
    }

    #[test]
    fn test_fatal_fault_classification() {
        assert_eq!(
            classify_fault(&EngineFault::fatal(FaultKind::Network)),
            Some(RecoveryAction::RestartLoad)
        );
        assert_eq!(
            classify_fault(&EngineFault::fatal(FaultKind::Media)),
            Some(RecoveryAction::RecoverMedia)
        );
        assert_eq!(
            classify_fault(&EngineFault::fatal(FaultKind::Other("key system".into()))),
            Some(RecoveryAction::Abort)
        );
    }
}

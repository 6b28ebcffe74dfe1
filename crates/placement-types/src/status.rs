//! Application status workflow.
//!
//! ```text
//! PENDING ──► SHORTLISTED ──► ACCEPTED
//!    │             │
//!    │             └────────► REJECTED
//!    ├──────────────────────► ACCEPTED
//!    └──────────────────────► REJECTED
//! ```
//!
//! ACCEPTED and REJECTED are terminal. Nothing ever moves (back) to PENDING.

use thiserror::Error;

closed_enum! {
    pub enum ApplicationStatus as "status" {
        Pending => "PENDING",
        Shortlisted => "SHORTLISTED",
        Accepted => "ACCEPTED",
        Rejected => "REJECTED",
    }
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        ApplicationStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("application is already {from} and can no longer change")]
    Terminal { from: ApplicationStatus },

    #[error("cannot move an application from {from} back to {to}")]
    Backwards {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
}

/// Outcome of a permitted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    /// Target equals the current (non-terminal) status.
    Unchanged,
}

impl ApplicationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Accepted | ApplicationStatus::Rejected)
    }

    /// Validate a move from `self` to `to`.
    pub fn transition(self, to: ApplicationStatus) -> Result<Transition, TransitionError> {
        use ApplicationStatus::*;

        if self.is_terminal() {
            return Err(TransitionError::Terminal { from: self });
        }

        match (self, to) {
            (from, Pending) => Err(TransitionError::Backwards { from, to: Pending }),
            (from, to) if from == to => Ok(Transition::Unchanged),
            (Pending, Shortlisted) | (Pending | Shortlisted, Accepted | Rejected) => {
                Ok(Transition::Changed { from: self, to })
            }
            (from, to) => Err(TransitionError::Backwards { from, to }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus::*;
    use super::*;

    #[test]
    fn forward_paths_are_allowed() {
        assert_eq!(
            Pending.transition(Shortlisted),
            Ok(Transition::Changed { from: Pending, to: Shortlisted })
        );
        assert_eq!(
            Shortlisted.transition(Accepted),
            Ok(Transition::Changed { from: Shortlisted, to: Accepted })
        );
        assert_eq!(
            Shortlisted.transition(Rejected),
            Ok(Transition::Changed { from: Shortlisted, to: Rejected })
        );
    }

    #[test]
    fn pending_can_skip_the_shortlist() {
        assert!(matches!(Pending.transition(Accepted), Ok(Transition::Changed { .. })));
        assert!(matches!(Pending.transition(Rejected), Ok(Transition::Changed { .. })));
    }

    #[test]
    fn terminal_states_are_immutable() {
        for from in [Accepted, Rejected] {
            for to in ApplicationStatus::ALL.iter().copied() {
                assert_eq!(from.transition(to), Err(TransitionError::Terminal { from }));
            }
        }
    }

    #[test]
    fn nothing_returns_to_pending() {
        assert_eq!(
            Pending.transition(Pending),
            Err(TransitionError::Backwards { from: Pending, to: Pending })
        );
        assert_eq!(
            Shortlisted.transition(Pending),
            Err(TransitionError::Backwards { from: Shortlisted, to: Pending })
        );
    }

    #[test]
    fn repeating_a_live_status_is_a_no_op() {
        assert_eq!(Shortlisted.transition(Shortlisted), Ok(Transition::Unchanged));
    }

    #[test]
    fn status_parses_frontend_lowercase() {
        assert_eq!("accepted".parse::<ApplicationStatus>().unwrap(), Accepted);
        assert_eq!(serde_json::to_string(&Shortlisted).unwrap(), "\"SHORTLISTED\"");
    }
}

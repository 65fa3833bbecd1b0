/// Run phase definitions for the crawl scheduler
///
/// A run moves strictly forward through these phases; the scheduler rejects
/// any transition not listed in [`RunPhase::can_transition_to`].
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Root URL is being admitted and the worker pool created
    Seeding,

    /// Main loop is pulling items from the frontier and dispatching units
    Dispatching,

    /// No new dispatches; waiting for in-flight units to finish
    Draining,

    /// Drain grace expired; outstanding units are being aborted
    Cancelling,

    /// Run finished and its summary has been produced
    Terminated,
}

impl RunPhase {
    /// Returns true if new units may still be dispatched in this phase
    pub fn accepts_dispatch(&self) -> bool {
        matches!(self, Self::Dispatching)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        matches!(
            (self, next),
            (Self::Seeding, Self::Dispatching)
                | (Self::Dispatching, Self::Draining)
                | (Self::Draining, Self::Cancelling)
                | (Self::Draining, Self::Terminated)
                | (Self::Cancelling, Self::Terminated)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeding => "seeding",
            Self::Dispatching => "dispatching",
            Self::Draining => "draining",
            Self::Cancelling => "cancelling",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why the dispatch loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The completed-page budget was reached
    PageBudget,

    /// Nothing pending and nothing in flight; no more work can appear
    FrontierExhausted,

    /// Shutdown was requested from outside the run (e.g. Ctrl-C)
    Interrupted,
}

impl StopReason {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::PageBudget => "page budget reached",
            Self::FrontierExhausted => "no more URLs to crawl",
            Self::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RunPhase; 5] = [
        RunPhase::Seeding,
        RunPhase::Dispatching,
        RunPhase::Draining,
        RunPhase::Cancelling,
        RunPhase::Terminated,
    ];

    #[test]
    fn test_forward_transitions() {
        assert!(RunPhase::Seeding.can_transition_to(RunPhase::Dispatching));
        assert!(RunPhase::Dispatching.can_transition_to(RunPhase::Draining));
        assert!(RunPhase::Draining.can_transition_to(RunPhase::Terminated));
        assert!(RunPhase::Draining.can_transition_to(RunPhase::Cancelling));
        assert!(RunPhase::Cancelling.can_transition_to(RunPhase::Terminated));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!RunPhase::Seeding.can_transition_to(RunPhase::Draining));
        assert!(!RunPhase::Dispatching.can_transition_to(RunPhase::Terminated));
        assert!(!RunPhase::Draining.can_transition_to(RunPhase::Dispatching));
        assert!(!RunPhase::Cancelling.can_transition_to(RunPhase::Draining));
    }

    #[test]
    fn test_terminated_is_final() {
        for next in ALL {
            assert!(!RunPhase::Terminated.can_transition_to(next));
        }
    }

    #[test]
    fn test_no_self_transitions() {
        for phase in ALL {
            assert!(!phase.can_transition_to(phase), "{} -> {}", phase, phase);
        }
    }

    #[test]
    fn test_only_dispatching_accepts_work() {
        for phase in ALL {
            assert_eq!(phase.accepts_dispatch(), phase == RunPhase::Dispatching);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", RunPhase::Draining), "draining");
        assert_eq!(format!("{}", StopReason::PageBudget), "page budget reached");
    }
}

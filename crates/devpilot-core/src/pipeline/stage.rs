//! Pipeline stages and their legal transitions
//!
//! ```text
//! Classifying ─► Generating(1) ─► Reviewing(1) ─► ThresholdMet(1) ─► Testing ─► Done
//!      │              │                │                 └──────────────────────► Done
//!      ▼              ├─► Retry(1) ◄───┤
//!    Failed           │      └─► Generating(2) ─► ...
//!                     └─► Exhausted ◄──┘ (last attempt) ─► Done
//! ```

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum PipelineStage {
    Classifying,
    Generating { attempt: usize },
    Reviewing { attempt: usize },
    ThresholdMet { attempt: usize },
    Retry { attempt: usize },
    Exhausted,
    Testing,
    Done,
    /// Classification failed; the run ended without attempts
    Failed,
}

impl PipelineStage {
    /// Whether the state machine may move from `self` to `next`.
    ///
    /// A generation attempt that produced nothing skips `Reviewing` and goes
    /// straight to `Retry` or `Exhausted`.
    pub fn can_transition_to(&self, next: &PipelineStage) -> bool {
        use PipelineStage::*;

        if self.is_terminal() {
            return false;
        }
        match (*self, *next) {
            (Classifying, Generating { attempt }) => attempt == 1,
            (Classifying, Failed) => true,
            (Generating { attempt: a }, Reviewing { attempt: b }) => a == b,
            (Generating { attempt: a }, Retry { attempt: b }) => a == b,
            (Generating { .. }, Exhausted) => true,
            (Reviewing { attempt: a }, ThresholdMet { attempt: b }) => a == b,
            (Reviewing { attempt: a }, Retry { attempt: b }) => a == b,
            (Reviewing { .. }, Exhausted) => true,
            (Retry { attempt: a }, Generating { attempt: b }) => b == a + 1,
            (ThresholdMet { .. }, Testing | Done) => true,
            (Testing, Done) => true,
            (Exhausted, Done) => true,
            _ => false,
        }
    }

    /// `Done` and `Failed` have no outgoing transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Classifying => write!(f, "classifying"),
            PipelineStage::Generating { attempt } => write!(f, "generating (attempt {})", attempt),
            PipelineStage::Reviewing { attempt } => write!(f, "reviewing (attempt {})", attempt),
            PipelineStage::ThresholdMet { attempt } => {
                write!(f, "threshold met (attempt {})", attempt)
            }
            PipelineStage::Retry { attempt } => write!(f, "retry after attempt {}", attempt),
            PipelineStage::Exhausted => write!(f, "exhausted"),
            PipelineStage::Testing => write!(f, "testing"),
            PipelineStage::Done => write!(f, "done"),
            PipelineStage::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineStage::*;
    use super::*;

    #[test]
    fn test_happy_path_is_legal() {
        let path = [
            Classifying,
            Generating { attempt: 1 },
            Reviewing { attempt: 1 },
            Retry { attempt: 1 },
            Generating { attempt: 2 },
            Reviewing { attempt: 2 },
            ThresholdMet { attempt: 2 },
            Testing,
            Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(&pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!Classifying.can_transition_to(&Reviewing { attempt: 1 }));
        assert!(!Classifying.can_transition_to(&Generating { attempt: 2 }));
        assert!(!Reviewing { attempt: 1 }.can_transition_to(&ThresholdMet { attempt: 2 }));
        assert!(!Retry { attempt: 1 }.can_transition_to(&Generating { attempt: 1 }));
        assert!(!Exhausted.can_transition_to(&Testing));
        assert!(!Done.can_transition_to(&Classifying));
        assert!(!Failed.can_transition_to(&Done));
    }

    #[test]
    fn test_generation_failure_skips_review() {
        assert!(Generating { attempt: 2 }.can_transition_to(&Retry { attempt: 2 }));
        assert!(Generating { attempt: 3 }.can_transition_to(&Exhausted));
    }

    #[test]
    fn test_serializes_with_stage_tag() {
        let json = serde_json::to_value(Reviewing { attempt: 2 }).unwrap();
        assert_eq!(json["stage"], "reviewing");
        assert_eq!(json["attempt"], 2);
    }

    #[test]
    fn test_terminal_stages_have_no_exits() {
        assert!(Done.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!Exhausted.is_terminal());
        for next in [Classifying, Generating { attempt: 1 }, Testing, Done, Failed] {
            assert!(!Done.can_transition_to(&next), "done -> {}", next);
            assert!(!Failed.can_transition_to(&next), "failed -> {}", next);
        }
    }
}

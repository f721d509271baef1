//! Pure stage machine for the publish protocol
//!
//! One work item moves through a strictly sequential protocol; no stage is
//! skipped on success, and the cover stage only exists when cover handling
//! was requested. Each stage declares up front whether the UI step that
//! completes it is allowed to fail: the declaration lives here, in one
//! place, instead of being scattered across try/catch blocks in the
//! session.
//!
//! No I/O in this module; transitions are deterministic and fully tested.

/// Stages of publishing one work item, in protocol order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NotStarted,
    TitleFilled,
    ContentFilled,
    CoverHandled,
    PreviewRequested,
    ConfirmRequested,
    Done,
}

/// Whether failing the step that completes a stage dooms the work item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criticality {
    /// Failure aborts this work item's publish
    Mandatory,
    /// Failure degrades to a warning; the flow continues
    BestEffort,
}

impl Stage {
    /// The stage that must follow `self`.
    ///
    /// `cover_stage` states whether this item goes through cover handling;
    /// when false the protocol jumps straight from content to preview.
    /// `None` only from [`Stage::Done`].
    pub fn next(self, cover_stage: bool) -> Option<Stage> {
        match self {
            Stage::NotStarted => Some(Stage::TitleFilled),
            Stage::TitleFilled => Some(Stage::ContentFilled),
            Stage::ContentFilled => {
                if cover_stage {
                    Some(Stage::CoverHandled)
                } else {
                    Some(Stage::PreviewRequested)
                }
            }
            Stage::CoverHandled => Some(Stage::PreviewRequested),
            Stage::PreviewRequested => Some(Stage::ConfirmRequested),
            Stage::ConfirmRequested => Some(Stage::Done),
            Stage::Done => None,
        }
    }

    /// Criticality of the UI step that completes this stage.
    ///
    /// The asymmetry is deliberate and mirrors the portal's behavior: the
    /// initial publish click must land, but the confirmation dialog does
    /// not always exist (some variants auto-publish), and cover handling
    /// is cosmetic next to losing the article.
    pub fn criticality(self) -> Criticality {
        match self {
            Stage::TitleFilled | Stage::ContentFilled | Stage::PreviewRequested => {
                Criticality::Mandatory
            }
            Stage::CoverHandled | Stage::ConfirmRequested => Criticality::BestEffort,
            // Not completed by a UI step; Mandatory is the safe default.
            Stage::NotStarted | Stage::Done => Criticality::Mandatory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_order_with_cover() {
        let mut stage = Stage::NotStarted;
        let mut seen = vec![stage];
        while let Some(next) = stage.next(true) {
            stage = next;
            seen.push(stage);
        }

        assert_eq!(
            seen,
            vec![
                Stage::NotStarted,
                Stage::TitleFilled,
                Stage::ContentFilled,
                Stage::CoverHandled,
                Stage::PreviewRequested,
                Stage::ConfirmRequested,
                Stage::Done,
            ]
        );
    }

    #[test]
    fn test_cover_stage_skipped_without_cover() {
        assert_eq!(
            Stage::ContentFilled.next(false),
            Some(Stage::PreviewRequested)
        );
    }

    #[test]
    fn test_done_is_terminal() {
        assert_eq!(Stage::Done.next(true), None);
        assert_eq!(Stage::Done.next(false), None);
    }

    #[test]
    fn test_mandatory_stages() {
        assert_eq!(Stage::TitleFilled.criticality(), Criticality::Mandatory);
        assert_eq!(Stage::ContentFilled.criticality(), Criticality::Mandatory);
        assert_eq!(Stage::PreviewRequested.criticality(), Criticality::Mandatory);
    }

    #[test]
    fn test_best_effort_stages() {
        assert_eq!(Stage::CoverHandled.criticality(), Criticality::BestEffort);
        assert_eq!(Stage::ConfirmRequested.criticality(), Criticality::BestEffort);
    }
}

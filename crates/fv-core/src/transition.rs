//! Stage transitions.
//!
//! Both the board's drag-and-drop and the detail panel's stage buttons end up
//! in [`transition_lead_stage`]: one precondition (the stage actually
//! changes), one remote update, then a full list refresh.

use fv_api_types::ApiLead;

use crate::api::{ApiError, LeadApi};
use crate::store::fetch_all;
use crate::types::{LeadView, Stage};

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// Source and target stage were the same; nothing was sent.
    Unchanged,
    /// The server accepted the new stage. Carries the refreshed list.
    Moved { stage: Stage, leads: Vec<ApiLead> },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    /// The stage update itself was refused or never reached the server.
    #[error("could not move lead: {0}")]
    Update(ApiError),

    /// The update went through but the follow-up refresh failed; the local
    /// list is stale until the next refresh.
    #[error("lead moved but the list could not be refreshed: {0}")]
    Refresh(ApiError),
}

/// Move `lead_id` from `from` to `to`.
///
/// `from == to` is a no-op and issues no request. Otherwise exactly one stage
/// update is sent, and on success exactly one list fetch follows. Nothing is
/// applied locally before the server answers, so a failure needs no rollback.
pub async fn transition_lead_stage(
    api: &dyn LeadApi,
    lead_id: &str,
    from: Option<Stage>,
    to: Stage,
) -> Result<TransitionOutcome, TransitionError> {
    if from == Some(to) {
        tracing::debug!(lead_id, stage = %to, "drop onto current stage ignored");
        return Ok(TransitionOutcome::Unchanged);
    }

    let resp = api.update_stage(lead_id, to).await.map_err(|e| {
        tracing::warn!(lead_id, stage = %to, error = %e, "stage update failed");
        TransitionError::Update(e)
    })?;
    tracing::info!(lead_id, from = ?from, to = %to, server_stage = %resp.stage, "lead stage updated");

    let leads = fetch_all(api).await.map_err(TransitionError::Refresh)?;
    Ok(TransitionOutcome::Moved { stage: to, leads })
}

// ---------------------------------------------------------------------------
// Drag controller
// ---------------------------------------------------------------------------

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSource {
    pub lead_id: String,
    pub stage: Option<Stage>,
}

/// A drop that should become a stage update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageChange {
    pub lead_id: String,
    pub from: Option<Stage>,
    pub to: Stage,
}

/// Tracks the card under drag and turns drops into stage changes.
///
/// No locking between drags: a second drag may start while the first
/// transition is still in flight.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    dragging: Option<DragSource>,
    hover: Option<Stage>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_start(&mut self, lead: &ApiLead) {
        self.dragging = Some(DragSource { lead_id: lead.id.clone(), stage: lead.stage() });
        self.hover = None;
    }

    pub fn drag_over(&mut self, stage: Stage) {
        if self.dragging.is_some() {
            self.hover = Some(stage);
        }
    }

    pub fn drag_leave(&mut self, stage: Stage) {
        if self.hover == Some(stage) {
            self.hover = None;
        }
    }

    /// Drag cancelled or finished outside any lane.
    pub fn drag_end(&mut self) {
        self.dragging = None;
        self.hover = None;
    }

    pub fn dragging(&self) -> Option<&DragSource> {
        self.dragging.as_ref()
    }

    /// Lane currently highlighted as a drop target.
    pub fn hover(&self) -> Option<Stage> {
        self.hover
    }

    /// Drop on `target`. Ends the drag either way; returns a change only when
    /// the lane differs from the card's stage.
    pub fn drop_on(&mut self, target: Stage) -> Option<StageChange> {
        let source = self.dragging.take();
        self.hover = None;
        let source = source?;
        if source.stage == Some(target) {
            return None;
        }
        Some(StageChange { lead_id: source.lead_id, from: source.stage, to: target })
    }

    /// Drop then transition. A same-lane drop sends nothing.
    pub async fn drop_and_transition(
        &mut self,
        api: &dyn LeadApi,
        target: Stage,
    ) -> Result<TransitionOutcome, TransitionError> {
        match self.drop_on(target) {
            Some(change) => transition_lead_stage(api, &change.lead_id, change.from, change.to).await,
            None => Ok(TransitionOutcome::Unchanged),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{lead, Call, RecordingApi};

    #[tokio::test]
    async fn same_stage_sends_nothing() {
        let api = RecordingApi::with_leads(vec![lead("1", "A", "Enquiry")]);
        let out = transition_lead_stage(&api, "1", Some(Stage::Enquiry), Stage::Enquiry)
            .await
            .unwrap();
        assert_eq!(out, TransitionOutcome::Unchanged);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn move_sends_one_update_then_one_refresh() {
        let api = RecordingApi::with_leads(vec![lead("1", "A", "Enquiry")]);
        let out = transition_lead_stage(&api, "1", Some(Stage::Enquiry), Stage::Counselling)
            .await
            .unwrap();

        assert_eq!(
            api.calls(),
            vec![Call::Stage("1".into(), Stage::Counselling), Call::List]
        );
        match out {
            TransitionOutcome::Moved { stage, leads } => {
                assert_eq!(stage, Stage::Counselling);
                assert_eq!(leads[0].stage, "Counselling");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_failure_skips_refresh() {
        let api = RecordingApi::with_leads(vec![lead("1", "A", "Enquiry")]);
        api.fail_writes(ApiError::Rejected { status: 500, message: "db down".into() });

        let err = transition_lead_stage(&api, "1", Some(Stage::Enquiry), Stage::Admission)
            .await
            .unwrap_err();

        assert!(matches!(err, TransitionError::Update(ApiError::Rejected { status: 500, .. })));
        assert_eq!(api.count(|c| *c == Call::List), 0);
    }

    #[tokio::test]
    async fn unknown_source_stage_can_still_move() {
        let api = RecordingApi::with_leads(vec![lead("1", "A", "Legacy")]);
        let out = transition_lead_stage(&api, "1", None, Stage::Enquiry).await.unwrap();
        assert!(matches!(out, TransitionOutcome::Moved { .. }));
    }

    #[tokio::test]
    async fn backwards_moves_are_allowed() {
        let api = RecordingApi::with_leads(vec![lead("1", "A", "Admission")]);
        let out = transition_lead_stage(&api, "1", Some(Stage::Admission), Stage::Enquiry)
            .await
            .unwrap();
        assert!(matches!(out, TransitionOutcome::Moved { stage: Stage::Enquiry, .. }));
    }

    #[test]
    fn drop_on_own_lane_yields_nothing() {
        let mut drag = DragController::new();
        drag.drag_start(&lead("1", "A", "Counselling"));
        assert_eq!(drag.drop_on(Stage::Counselling), None);
        assert!(drag.dragging().is_none());
    }

    #[test]
    fn drop_without_drag_yields_nothing() {
        let mut drag = DragController::new();
        assert_eq!(drag.drop_on(Stage::Admission), None);
    }

    #[test]
    fn hover_tracks_lane_under_cursor() {
        let mut drag = DragController::new();
        drag.drag_over(Stage::FreeBatch);
        assert_eq!(drag.hover(), None, "no hover without a drag");

        drag.drag_start(&lead("1", "A", "Enquiry"));
        drag.drag_over(Stage::FreeBatch);
        assert_eq!(drag.hover(), Some(Stage::FreeBatch));
        drag.drag_leave(Stage::Counselling);
        assert_eq!(drag.hover(), Some(Stage::FreeBatch));
        drag.drag_leave(Stage::FreeBatch);
        assert_eq!(drag.hover(), None);
    }

    #[tokio::test]
    async fn drop_and_transition_on_other_lane() {
        let api = RecordingApi::with_leads(vec![lead("1", "A", "Enquiry")]);
        let mut drag = DragController::new();
        drag.drag_start(&lead("1", "A", "Enquiry"));

        let out = drag.drop_and_transition(&api, Stage::FreeBatch).await.unwrap();

        assert!(matches!(out, TransitionOutcome::Moved { stage: Stage::FreeBatch, .. }));
        assert_eq!(api.count(|c| matches!(c, Call::Stage(..))), 1);
    }
}

//! Lead detail / edit panel.
//!
//! ```text
//!   Viewing <──toggle──> Editing
//!      │                    │
//!      └──────> Saving <────┘
//!   success -> Viewing, failure -> back where the save started
//! ```
//!
//! Each write is split in two so reactive UIs can drive it without holding
//! the panel across an await: a synchronous `begin_*` that validates and
//! moves to `Saving`, then [`DetailPanel::finish`] with the outcome. The
//! `async` helpers at the bottom combine both for callers that can.

use fv_api_types::{ApiLead, LeadPayload};

use crate::api::{ApiError, LeadApi};
use crate::confirm::Confirm;
use crate::form::{LeadForm, ValidationError};
use crate::store::fetch_all;
use crate::transition::{transition_lead_stage, StageChange, TransitionError, TransitionOutcome};
use crate::types::{LeadView, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMode {
    Viewing,
    Editing,
    /// A request is in flight; inputs are disabled. `resume` is where a
    /// failure returns to.
    Saving { resume: Resume },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    Viewing,
    Editing,
}

/// Which write is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelWrite {
    Fields,
    Remark,
    Stage,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PanelError {
    #[error("another change is still being saved")]
    Busy,
    #[error("panel is not in edit mode")]
    NotEditing,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("{0}")]
    Api(ApiError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

#[derive(Debug, Clone)]
pub struct DetailPanel {
    lead: ApiLead,
    mode: PanelMode,
    draft: Option<LeadForm>,
    remark_input: String,
    error: Option<String>,
}

impl DetailPanel {
    /// Open bound to the given snapshot, in view mode.
    pub fn open(lead: ApiLead) -> Self {
        Self {
            lead,
            mode: PanelMode::Viewing,
            draft: None,
            remark_input: String::new(),
            error: None,
        }
    }

    pub fn lead(&self) -> &ApiLead {
        &self.lead
    }

    pub fn mode(&self) -> PanelMode {
        self.mode
    }

    /// Inline error from the last failed write or validation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.mode, PanelMode::Saving { .. })
    }

    pub fn draft(&self) -> Option<&LeadForm> {
        self.draft.as_ref()
    }

    /// Mutable draft, only while editing.
    pub fn draft_mut(&mut self) -> Option<&mut LeadForm> {
        match self.mode {
            PanelMode::Editing => self.draft.as_mut(),
            _ => None,
        }
    }

    pub fn remark_input(&self) -> &str {
        &self.remark_input
    }

    pub fn set_remark_input(&mut self, text: impl Into<String>) {
        if !self.is_busy() {
            self.remark_input = text.into();
        }
    }

    /// Viewing <-> Editing. Ignored while saving.
    pub fn toggle_edit(&mut self) {
        match self.mode {
            PanelMode::Viewing => {
                self.draft = Some(LeadForm::from_lead(&self.lead));
                self.error = None;
                self.mode = PanelMode::Editing;
            }
            PanelMode::Editing => {
                self.draft = None;
                self.error = None;
                self.mode = PanelMode::Viewing;
            }
            PanelMode::Saving { .. } => {}
        }
    }

    fn resume_point(&self) -> Result<Resume, PanelError> {
        match self.mode {
            PanelMode::Viewing => Ok(Resume::Viewing),
            PanelMode::Editing => Ok(Resume::Editing),
            PanelMode::Saving { .. } => Err(PanelError::Busy),
        }
    }

    /// Validate the draft and enter `Saving`. A validation failure keeps the
    /// draft open with the error shown.
    ///
    /// The payload always carries the lead's current stage label; stage moves
    /// go through [`DetailPanel::begin_stage_change`].
    pub fn begin_save(&mut self) -> Result<LeadPayload, PanelError> {
        if self.is_busy() {
            return Err(PanelError::Busy);
        }
        let draft = match (self.mode, &self.draft) {
            (PanelMode::Editing, Some(d)) => d,
            _ => return Err(PanelError::NotEditing),
        };
        match draft.validate() {
            Ok(mut payload) => {
                payload.stage.clone_from(&self.lead.stage);
                self.error = None;
                self.mode = PanelMode::Saving { resume: Resume::Editing };
                Ok(payload)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Trim the remark input and enter `Saving`. Blank input is rejected
    /// without any state change besides the inline error.
    pub fn begin_remark(&mut self) -> Result<String, PanelError> {
        let resume = self.resume_point()?;
        let text = self.remark_input.trim();
        if text.is_empty() {
            self.error = Some(ValidationError::EmptyRemark.to_string());
            return Err(ValidationError::EmptyRemark.into());
        }
        let text = text.to_string();
        self.error = None;
        self.mode = PanelMode::Saving { resume };
        Ok(text)
    }

    /// Stage button pressed. Returns `None` when the stage is unchanged or
    /// the user declines the confirmation; nothing is sent in either case.
    pub fn begin_stage_change(
        &mut self,
        to: Stage,
        confirm: &mut dyn Confirm,
    ) -> Result<Option<StageChange>, PanelError> {
        let resume = self.resume_point()?;
        let from = self.lead.stage();
        if from == Some(to) {
            return Ok(None);
        }
        let prompt = format!("Move {} to {}?", self.lead.full_name, to);
        if !confirm.confirm(&prompt) {
            return Ok(None);
        }
        self.error = None;
        self.mode = PanelMode::Saving { resume };
        Ok(Some(StageChange { lead_id: self.lead.id.clone(), from, to }))
    }

    /// Apply the outcome of the in-flight write.
    ///
    /// On success the panel rebinds to the refreshed copy of its lead and
    /// returns to view mode. On failure it goes back to where the write
    /// started, keeping any draft, and shows the error.
    pub fn finish(&mut self, write: PanelWrite, outcome: Result<&[ApiLead], String>) {
        let resume = match self.mode {
            PanelMode::Saving { resume } => resume,
            _ => return,
        };
        match outcome {
            Ok(leads) => {
                if let Some(fresh) = leads.iter().find(|l| l.id == self.lead.id) {
                    self.lead = fresh.clone();
                }
                if write == PanelWrite::Remark {
                    self.remark_input.clear();
                }
                self.draft = None;
                self.error = None;
                self.mode = PanelMode::Viewing;
            }
            Err(message) => {
                self.error = Some(message);
                self.mode = match resume {
                    Resume::Viewing => PanelMode::Viewing,
                    Resume::Editing => PanelMode::Editing,
                };
            }
        }
    }

    // -- async helpers ------------------------------------------------------

    /// Send the whole draft as `PUT /leads/:id`, then refresh.
    pub async fn save(&mut self, api: &dyn LeadApi) -> Result<Vec<ApiLead>, PanelError> {
        let payload = self.begin_save()?;
        let id = self.lead.id.clone();
        let result: Result<Vec<ApiLead>, ApiError> = async {
            api.update_lead(&id, &payload).await?;
            tracing::info!(lead_id = %id, "lead fields updated");
            fetch_all(api).await
        }
        .await;
        self.complete(PanelWrite::Fields, result)
    }

    /// `POST /leads/:id/remarks` with the trimmed input, then refresh.
    pub async fn add_remark(
        &mut self,
        api: &dyn LeadApi,
        author: &str,
    ) -> Result<Vec<ApiLead>, PanelError> {
        let text = self.begin_remark()?;
        let id = self.lead.id.clone();
        let result: Result<Vec<ApiLead>, ApiError> = async {
            api.add_remark(&id, &text, author).await?;
            tracing::info!(lead_id = %id, "remark added");
            fetch_all(api).await
        }
        .await;
        self.complete(PanelWrite::Remark, result)
    }

    /// Confirm, then run the shared stage transition.
    ///
    /// `Ok(None)` means nothing was sent (same stage or declined).
    pub async fn change_stage(
        &mut self,
        api: &dyn LeadApi,
        to: Stage,
        confirm: &mut dyn Confirm,
    ) -> Result<Option<Vec<ApiLead>>, PanelError> {
        let Some(change) = self.begin_stage_change(to, confirm)? else {
            return Ok(None);
        };
        match transition_lead_stage(api, &change.lead_id, change.from, change.to).await {
            Ok(TransitionOutcome::Moved { leads, .. }) => {
                self.finish(PanelWrite::Stage, Ok(leads.as_slice()));
                Ok(Some(leads))
            }
            Ok(TransitionOutcome::Unchanged) => {
                self.finish(PanelWrite::Stage, Ok(&[][..]));
                Ok(None)
            }
            Err(e) => {
                self.finish(PanelWrite::Stage, Err(e.to_string()));
                Err(e.into())
            }
        }
    }

    fn complete(
        &mut self,
        write: PanelWrite,
        result: Result<Vec<ApiLead>, ApiError>,
    ) -> Result<Vec<ApiLead>, PanelError> {
        match result {
            Ok(leads) => {
                self.finish(write, Ok(leads.as_slice()));
                Ok(leads)
            }
            Err(e) => {
                tracing::warn!(lead_id = %self.lead.id, ?write, error = %e, "panel write failed");
                self.finish(write, Err(e.to_string()));
                Err(PanelError::Api(e))
            }
        }
    }
}

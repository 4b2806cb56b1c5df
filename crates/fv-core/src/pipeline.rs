use fv_api_types::ApiLead;

use crate::types::{LeadView, Stage};

/// One column of the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub stage: Stage,
    pub leads: Vec<ApiLead>,
}

impl Lane {
    pub fn count(&self) -> usize {
        self.leads.len()
    }

    /// Header text, e.g. `Free Batch (3)`.
    pub fn header(&self) -> String {
        format!("{} ({})", self.stage, self.leads.len())
    }
}

/// Leads partitioned into the six fixed pipeline lanes.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineBoard {
    lanes: Vec<Lane>,
    unplaced: usize,
}

impl PipelineBoard {
    /// Single pass over `leads`; each lane keeps fetch order.
    ///
    /// A lead whose stage is not one of the six known values is left off
    /// every lane. It is only counted in [`PipelineBoard::unplaced`].
    pub fn from_leads<'a>(leads: impl IntoIterator<Item = &'a ApiLead>) -> Self {
        let mut lanes: Vec<Lane> = Stage::ALL
            .into_iter()
            .map(|stage| Lane { stage, leads: Vec::new() })
            .collect();
        let mut unplaced = 0;

        for lead in leads {
            match lead.stage() {
                Some(stage) => lanes[stage.index()].leads.push(lead.clone()),
                None => {
                    unplaced += 1;
                    tracing::debug!(lead_id = %lead.id, stage = %lead.stage, "lead has unrecognised stage, not shown on board");
                }
            }
        }

        Self { lanes, unplaced }
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn lane(&self, stage: Stage) -> &Lane {
        &self.lanes[stage.index()]
    }

    pub fn count(&self, stage: Stage) -> usize {
        self.lane(stage).count()
    }

    /// Leads rendered in some lane.
    pub fn placed(&self) -> usize {
        self.lanes.iter().map(Lane::count).sum()
    }

    /// Leads with an unrecognised stage.
    pub fn unplaced(&self) -> usize {
        self.unplaced
    }

    /// Which lane currently holds the lead, if any.
    pub fn stage_of(&self, lead_id: &str) -> Option<Stage> {
        self.lanes
            .iter()
            .find(|lane| lane.leads.iter().any(|l| l.id == lead_id))
            .map(|lane| lane.stage)
    }
}

use chrono::NaiveDate;
use fv_api_types::ApiLead;

use crate::types::{BatchType, LeadSource, LeadView, Stage};

/// Client-side lead filter. Empty / `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadFilter {
    /// Case-insensitive substring over name, mobile, email and city.
    pub search: String,
    pub stage: Option<Stage>,
    pub source: Option<LeadSource>,
    pub batch_type: Option<BatchType>,
    pub follow_up_on: Option<NaiveDate>,
}

impl LeadFilter {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.stage.is_none()
            && self.source.is_none()
            && self.batch_type.is_none()
            && self.follow_up_on.is_none()
    }

    pub fn matches(&self, lead: &ApiLead) -> bool {
        if let Some(stage) = self.stage {
            if lead.stage() != Some(stage) {
                return false;
            }
        }
        if let Some(source) = self.source {
            if lead.source() != Some(source) {
                return false;
            }
        }
        if let Some(batch) = self.batch_type {
            if lead.batch() != Some(batch) {
                return false;
            }
        }
        if let Some(day) = self.follow_up_on {
            if lead.follow_up_day() != Some(day) {
                return false;
            }
        }

        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let hay = [
            Some(lead.full_name.as_str()),
            Some(lead.mobile.as_str()),
            lead.email.as_deref(),
            lead.city.as_deref(),
        ];
        hay.into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Matching leads, in input order.
    pub fn apply<'a>(&self, leads: &'a [ApiLead]) -> Vec<&'a ApiLead> {
        leads.iter().filter(|l| self.matches(l)).collect()
    }
}

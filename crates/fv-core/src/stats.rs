use std::collections::BTreeMap;

use chrono::NaiveDate;
use fv_api_types::ApiLead;

use crate::types::{BatchType, LeadSource, LeadView, Stage};

/// `converted / past_counselling * 100`, rounded to a whole percent.
/// Zero when nobody has reached counselling yet.
pub fn conversion_rate(converted: usize, past_counselling: usize) -> u32 {
    if past_counselling == 0 {
        return 0;
    }
    ((converted as f64 / past_counselling as f64) * 100.0).round() as u32
}

/// Counts derived from the current (possibly filtered) lead list.
///
/// Pure function of its input; recompute whenever the list or filter changes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LeadStats {
    pub total: usize,
    pub by_stage: BTreeMap<Stage, usize>,
    pub by_source: BTreeMap<LeadSource, usize>,
    pub by_batch: BTreeMap<BatchType, usize>,
    pub converted: usize,
    /// Leads at Counselling or any later stage.
    pub past_counselling: usize,
    pub conversion_rate: u32,
    /// Follow-ups scheduled for the reference day.
    pub follow_ups_due: usize,
}

impl LeadStats {
    pub fn compute<'a>(leads: impl IntoIterator<Item = &'a ApiLead>, today: NaiveDate) -> Self {
        let mut stats = LeadStats {
            by_stage: Stage::ALL.into_iter().map(|s| (s, 0)).collect(),
            ..Default::default()
        };

        for lead in leads {
            stats.total += 1;
            let stage = lead.stage();
            if let Some(stage) = stage {
                *stats.by_stage.entry(stage).or_default() += 1;
                if stage >= Stage::Counselling {
                    stats.past_counselling += 1;
                }
            }
            if let Some(source) = lead.source() {
                *stats.by_source.entry(source).or_default() += 1;
            }
            if let Some(batch) = lead.batch() {
                *stats.by_batch.entry(batch).or_default() += 1;
            }
            if lead.is_converted() {
                stats.converted += 1;
            }
            if lead.follow_up_day() == Some(today) {
                stats.follow_ups_due += 1;
            }
        }

        stats.conversion_rate = conversion_rate(stats.converted, stats.past_counselling);
        stats
    }

    pub fn stage_count(&self, stage: Stage) -> usize {
        self.by_stage.get(&stage).copied().unwrap_or(0)
    }
}

/// One row of the MIS summary export.
#[derive(Debug, Clone, PartialEq)]
pub struct MisRow {
    pub metric: String,
    pub value: String,
}

/// Stage counts followed by the headline figures, in display order.
pub fn mis_rows(stats: &LeadStats) -> Vec<MisRow> {
    let mut rows: Vec<MisRow> = Stage::ALL
        .into_iter()
        .map(|s| MisRow { metric: s.to_string(), value: stats.stage_count(s).to_string() })
        .collect();
    rows.push(MisRow { metric: "Total Leads".into(), value: stats.total.to_string() });
    rows.push(MisRow { metric: "Converted".into(), value: stats.converted.to_string() });
    rows.push(MisRow {
        metric: "Conversion Rate".into(),
        value: format!("{}%", stats.conversion_rate),
    });
    rows
}

use chrono::NaiveDate;
use fv_core::filter::LeadFilter;
use fv_core::stats::LeadStats;
use fv_core::store::fetch_all;
use fv_core::types::Stage;

use super::leads::FilterArgs;
use super::{friendly_error, Context};

pub fn render(stats: &LeadStats) -> String {
    let mut out = String::from("Pipeline summary\n");
    out.push_str(&format!("{}\n", "-".repeat(32)));
    out.push_str(&format!("Total leads:        {}\n", stats.total));
    for stage in Stage::ALL {
        out.push_str(&format!("  {:<18}{}\n", format!("{stage}:"), stats.stage_count(stage)));
    }
    out.push_str(&format!("Converted:          {}\n", stats.converted));
    out.push_str(&format!("Conversion rate:    {}%\n", stats.conversion_rate));
    out.push_str(&format!("Follow-ups due:     {}\n", stats.follow_ups_due));
    if !stats.by_source.is_empty() {
        out.push_str("By source:\n");
        for (source, n) in &stats.by_source {
            out.push_str(&format!("  {:<18}{}\n", format!("{source}:"), n));
        }
    }
    if !stats.by_batch.is_empty() {
        out.push_str("By batch:\n");
        for (batch, n) in &stats.by_batch {
            out.push_str(&format!("  {:<18}{}\n", format!("{batch}:"), n));
        }
    }
    out
}

/// Counts over the (optionally filtered) lead list. Follow-ups are counted
/// for `day`.
pub async fn run(ctx: &Context, filter: &FilterArgs, day: NaiveDate) -> anyhow::Result<LeadStats> {
    let client = ctx.api_client()?;
    let leads = fetch_all(&client).await.map_err(friendly_error)?;
    let visible = LeadFilter::from(filter).apply(&leads);
    let stats = LeadStats::compute(visible, day);
    print!("{}", render(&stats));
    Ok(stats)
}

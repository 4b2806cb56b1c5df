use fv_core::csv_export::{export_filename, to_csv};
use fv_core::filter::LeadFilter;
use fv_core::stats::{mis_rows, LeadStats};
use fv_core::types::Stage;
use leptos::logging::log;
use leptos::prelude::*;

use crate::browser::{alert, download, today};
use crate::components::filter_bar::FilterBar;
use crate::components::stat_card::StatCard;
use crate::state::use_app_state;

/// Headline cards, in display order.
pub fn headline(stats: &LeadStats) -> Vec<(&'static str, String)> {
    vec![
        ("Total Leads", stats.total.to_string()),
        ("Converted", stats.converted.to_string()),
        ("Conversion Rate", format!("{}%", stats.conversion_rate)),
        ("Follow-ups Today", stats.follow_ups_due.to_string()),
    ]
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let state = use_app_state();
    let filter = RwSignal::new(LeadFilter::default());

    Effect::new(move |_| state.refresh_leads());

    // Recomputed whenever the list or the filter changes.
    let stats = Memo::new(move |_| {
        let day = today();
        filter.with(|f| state.leads.with(|s| LeadStats::compute(f.apply(s.leads()), day)))
    });

    let export_mis = move |_| {
        let rows = stats.with_untracked(mis_rows);
        let result = to_csv(rows.iter())
            .map_err(|e| e.to_string())
            .and_then(|csv| download(&export_filename("mis", today()), "text/csv", &csv));
        if let Err(e) = result {
            log!("MIS export failed: {}", e);
            alert(&format!("Export failed: {e}"));
        }
    };

    view! {
        <div class="page-header">
            <h2>"Dashboard"</h2>
            <div class="page-actions">
                <button class="btn" on:click=export_mis>"Export MIS"</button>
            </div>
        </div>

        <FilterBar filter=filter />

        {move || state.leads_error.get().map(|msg| view! { <div class="page-error">{msg}</div> })}

        <div class="stat-grid">
            {move || headline(&stats.get()).into_iter().map(|(label, value)| view! {
                <StatCard label=label.to_string() value=value />
            }).collect_view()}
        </div>

        <h3>"By Stage"</h3>
        <div class="stat-grid">
            {move || {
                let s = stats.get();
                Stage::ALL.into_iter().map(|stage| view! {
                    <StatCard label=stage.to_string() value=s.stage_count(stage).to_string() />
                }).collect_view()
            }}
        </div>

        <div class="stat-columns">
            <div class="stat-table">
                <h3>"By Source"</h3>
                <table>
                    <tbody>
                        {move || stats.get().by_source.into_iter().map(|(source, n)| view! {
                            <tr><td>{source.as_str()}</td><td>{n}</td></tr>
                        }).collect_view()}
                    </tbody>
                </table>
            </div>
            <div class="stat-table">
                <h3>"By Batch Type"</h3>
                <table>
                    <tbody>
                        {move || stats.get().by_batch.into_iter().map(|(batch, n)| view! {
                            <tr><td>{batch.as_str()}</td><td>{n}</td></tr>
                        }).collect_view()}
                    </tbody>
                </table>
            </div>
        </div>
    }
}

use fv_api_types::ApiLead;
use fv_core::csv_export::{export_filename, to_csv};
use fv_core::filter::LeadFilter;
use fv_core::pipeline::PipelineBoard;
use fv_core::transition::{transition_lead_stage, DragController, TransitionError, TransitionOutcome};
use fv_core::types::{LeadView, Stage};
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::DragEvent;

use crate::browser::{alert, download, today};
use crate::components::filter_bar::FilterBar;
use crate::components::lead_detail::LeadDetail;
use crate::components::new_lead_modal::NewLeadModal;
use crate::components::spinner::Spinner;
use crate::state::use_app_state;

fn lane_class(stage: Stage) -> &'static str {
    match stage {
        Stage::Enquiry => "lane-enquiry",
        Stage::Counselling => "lane-counselling",
        Stage::FreeBatch => "lane-free-batch",
        Stage::LeadConversion => "lane-lead-conversion",
        Stage::PaidBatch => "lane-paid-batch",
        Stage::Admission => "lane-admission",
    }
}

fn lead_card(
    lead: ApiLead,
    drag: RwSignal<DragController>,
    set_selected: WriteSignal<Option<ApiLead>>,
) -> impl IntoView {
    let id = lead.id.clone();
    let lead_drag = lead.clone();
    let lead_click = lead.clone();

    let on_dragstart = move |ev: DragEvent| {
        if let Some(dt) = ev.data_transfer() {
            let _ = dt.set_data("text/plain", &lead_drag.id);
            dt.set_drop_effect("move");
        }
        drag.update(|d| d.drag_start(&lead_drag));
    };
    let on_dragend = move |_ev: DragEvent| {
        drag.update(DragController::drag_end);
    };
    let card_class = move || {
        let dragging = drag.with(|d| d.dragging().is_some_and(|s| s.lead_id == id));
        if dragging {
            "lead-card dragging"
        } else {
            "lead-card"
        }
    };

    let follow_up = lead.follow_up_day().map(|d| d.format("%d %b").to_string());
    let converted = lead.is_converted();

    view! {
        <div
            class=card_class
            draggable="true"
            on:dragstart=on_dragstart
            on:dragend=on_dragend
            on:click=move |_| set_selected.set(Some(lead_click.clone()))
        >
            <div class="lead-card-header">
                <span class="lead-name">{lead.full_name.clone()}</span>
                {converted.then(|| view! { <span class="card-badge badge-converted">"Converted"</span> })}
            </div>
            <div class="lead-mobile">{lead.mobile.clone()}</div>
            <div class="lead-badges">
                <span class="card-badge badge-source">{lead.lead_source.clone()}</span>
                <span class="card-badge badge-course">{lead.course_category.clone()}</span>
                <span class="card-badge badge-batch">{lead.batch_type.clone()}</span>
            </div>
            {follow_up.map(|d| view! { <div class="lead-follow-up">"Follow-up: "{d}</div> })}
        </div>
    }
}

#[component]
pub fn PipelinePage() -> impl IntoView {
    let state = use_app_state();
    let filter = RwSignal::new(LeadFilter::default());
    let drag = RwSignal::new(DragController::new());
    let (selected, set_selected) = signal(None::<ApiLead>);
    let (new_lead_stage, set_new_lead_stage) = signal(None::<Stage>);
    let (move_error, set_move_error) = signal(None::<String>);

    Effect::new(move |_| state.refresh_leads());

    let board = Memo::new(move |_| {
        filter.with(|f| state.leads.with(|s| PipelineBoard::from_leads(f.apply(s.leads()))))
    });

    // One stage update then one refresh; the board only changes once the
    // refreshed list arrives.
    let drop_on = move |stage: Stage| {
        let mut change = None;
        drag.update(|d| change = d.drop_on(stage));
        let Some(change) = change else {
            return;
        };
        set_move_error.set(None);
        spawn_local(async move {
            let api = state.api();
            match transition_lead_stage(&api, &change.lead_id, change.from, change.to).await {
                Ok(TransitionOutcome::Moved { leads, .. }) => state.apply_leads(leads),
                Ok(TransitionOutcome::Unchanged) => {}
                Err(e) => {
                    log!("failed to move lead {}: {}", change.lead_id, e);
                    let (TransitionError::Update(api_err) | TransitionError::Refresh(api_err)) = &e;
                    state.report(api_err);
                    alert(&e.to_string());
                    set_move_error.set(Some(e.to_string()));
                }
            }
        });
    };

    let export_csv = move |_| {
        let csv = filter.with_untracked(|f| state.leads.with_untracked(|s| to_csv(f.apply(s.leads()))));
        let result = csv
            .map_err(|e| e.to_string())
            .and_then(|csv| download(&export_filename("leads", today()), "text/csv", &csv));
        if let Err(e) = result {
            log!("lead export failed: {}", e);
            alert(&format!("Export failed: {e}"));
        }
    };

    view! {
        <div class="page-header">
            <h2>"Lead Pipeline"</h2>
            <div class="page-actions">
                <button class="btn" on:click=export_csv>"Export CSV"</button>
                <button class="btn btn-primary" on:click=move |_| set_new_lead_stage.set(Some(Stage::Enquiry))>
                    "+ New Lead"
                </button>
            </div>
        </div>

        <FilterBar filter=filter />

        {move || state.leads_error.get().map(|msg| view! {
            <div class="page-error">
                {msg}
                <button class="btn btn-small" on:click=move |_| state.refresh_leads()>"Retry"</button>
            </div>
        })}
        {move || move_error.get().map(|msg| view! { <div class="page-error">{msg}</div> })}
        {move || (state.leads_loading.get() && state.leads.with(|s| s.is_empty())).then(|| view! {
            <Spinner size="lg" label="Loading leads..." />
        })}
        {move || {
            let hidden = board.with(PipelineBoard::unplaced);
            (hidden > 0).then(|| view! {
                <div class="page-note">{format!("{hidden} lead(s) with an unrecognised stage are not shown")}</div>
            })
        }}

        <div class="pipeline-board">
            {move || board.get().lanes().iter().map(|lane| {
                let stage = lane.stage;
                let column_class = move || {
                    if drag.with(|d| d.hover() == Some(stage)) {
                        format!("pipeline-lane {} drag-over", lane_class(stage))
                    } else {
                        format!("pipeline-lane {}", lane_class(stage))
                    }
                };
                let on_dragover = move |ev: DragEvent| {
                    ev.prevent_default();
                    if drag.with_untracked(|d| d.hover()) != Some(stage) {
                        drag.update(|d| d.drag_over(stage));
                    }
                };
                let on_dragleave = move |_ev: DragEvent| {
                    drag.update(|d| d.drag_leave(stage));
                };
                let on_drop = move |ev: DragEvent| {
                    ev.prevent_default();
                    drop_on(stage);
                };

                view! {
                    <div
                        class=column_class
                        on:dragover=on_dragover
                        on:dragleave=on_dragleave
                        on:drop=on_drop
                    >
                        <div class="lane-header">
                            <span class="lane-title">{lane.header()}</span>
                            <button
                                class="lane-add-btn"
                                title="Add lead to this stage"
                                on:click=move |_| set_new_lead_stage.set(Some(stage))
                            >
                                "+"
                            </button>
                        </div>
                        <div class="lane-cards">
                            {lane.leads.iter().cloned().map(|lead| lead_card(lead, drag, set_selected)).collect_view()}
                        </div>
                    </div>
                }
            }).collect_view()}
        </div>

        {move || selected.get().map(|lead| view! {
            <LeadDetail lead=lead on_close=Callback::new(move |_| set_selected.set(None)) />
        })}

        {move || new_lead_stage.get().map(|stage| view! {
            <NewLeadModal stage=stage on_close=Callback::new(move |_| set_new_lead_stage.set(None)) />
        })}
    }
}

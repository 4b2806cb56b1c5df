use fv_api_types::{ApiLead, ApiRemark};
use fv_core::api::{ApiError, LeadApi};
use fv_core::form::LeadForm;
use fv_core::panel::{DetailPanel, PanelMode, PanelWrite, Resume};
use fv_core::store::fetch_all;
use fv_core::transition::{transition_lead_stage, TransitionError, TransitionOutcome};
use fv_core::types::{LeadView, Stage};
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::browser::WindowConfirm;
use crate::components::lead_form::LeadFormFields;
use crate::state::{use_app_state, AppState};

/// "16 Oct 2026, 09:30" in local time, or blank.
pub fn remark_time(remark: &ApiRemark) -> String {
    remark
        .timestamp
        .map(|t| t.with_timezone(&chrono::Local).format("%d %b %Y, %H:%M").to_string())
        .unwrap_or_default()
}

fn finish(
    state: AppState,
    panel: RwSignal<DetailPanel>,
    write: PanelWrite,
    result: Result<Vec<ApiLead>, ApiError>,
) {
    match result {
        Ok(leads) => {
            panel.update(|p| p.finish(write, Ok(leads.as_slice())));
            state.apply_leads(leads);
        }
        Err(e) => {
            log!("{:?} failed: {}", write, e);
            panel.update(|p| p.finish(write, Err(e.to_string())));
            state.report(&e);
        }
    }
}

fn detail_row(label: &'static str, value: String) -> impl IntoView {
    view! {
        <div class="detail-row">
            <span class="detail-label">{label}</span>
            <span class="detail-value">{if value.is_empty() { "-".to_string() } else { value }}</span>
        </div>
    }
}

#[component]
pub fn LeadDetail(lead: ApiLead, on_close: Callback<()>) -> impl IntoView {
    let state = use_app_state();
    let panel = RwSignal::new(DetailPanel::open(lead));
    let draft = RwSignal::new(LeadForm::default());

    let busy = Signal::derive(move || panel.with(DetailPanel::is_busy));
    let editing = move || {
        panel.with(|p| {
            matches!(
                p.mode(),
                PanelMode::Editing | PanelMode::Saving { resume: Resume::Editing }
            )
        })
    };

    let toggle_edit = move |_| {
        panel.update(DetailPanel::toggle_edit);
        if let Some(d) = panel.with_untracked(|p| p.draft().cloned()) {
            draft.set(d);
        }
    };

    let save = move |_| {
        let mut begun = None;
        panel.update(|p| {
            if let Some(d) = p.draft_mut() {
                *d = draft.get_untracked();
            }
            begun = Some(p.begin_save());
        });
        let Some(Ok(payload)) = begun else {
            return;
        };
        let id = panel.with_untracked(|p| p.lead().id.clone());
        spawn_local(async move {
            let api = state.api();
            let result: Result<Vec<ApiLead>, ApiError> = async {
                api.update_lead(&id, &payload).await?;
                fetch_all(&api).await
            }
            .await;
            finish(state, panel, PanelWrite::Fields, result);
        });
    };

    let add_remark = move |_| {
        let mut begun = None;
        panel.update(|p| begun = Some(p.begin_remark()));
        let Some(Ok(text)) = begun else {
            return;
        };
        let id = panel.with_untracked(|p| p.lead().id.clone());
        let author = state.author_name();
        spawn_local(async move {
            let api = state.api();
            let result: Result<Vec<ApiLead>, ApiError> = async {
                api.add_remark(&id, &text, &author).await?;
                fetch_all(&api).await
            }
            .await;
            finish(state, panel, PanelWrite::Remark, result);
        });
    };

    let change_stage = move |to: Stage| {
        let mut begun = None;
        panel.update(|p| begun = Some(p.begin_stage_change(to, &mut WindowConfirm)));
        let Some(Ok(Some(change))) = begun else {
            return;
        };
        spawn_local(async move {
            let api = state.api();
            match transition_lead_stage(&api, &change.lead_id, change.from, change.to).await {
                Ok(TransitionOutcome::Moved { leads, .. }) => {
                    finish(state, panel, PanelWrite::Stage, Ok(leads));
                }
                Ok(TransitionOutcome::Unchanged) => {
                    panel.update(|p| p.finish(PanelWrite::Stage, Ok(&[][..])));
                }
                Err(e) => {
                    log!("stage change failed: {}", e);
                    panel.update(|p| p.finish(PanelWrite::Stage, Err(e.to_string())));
                    let (TransitionError::Update(api_err) | TransitionError::Refresh(api_err)) = &e;
                    state.report(api_err);
                }
            }
        });
    };

    view! {
        <div class="modal-overlay" on:click=move |_| on_close.run(())></div>
        <div class="modal lead-detail" role="dialog" aria-label="Lead details">
            <div class="lead-detail-header">
                <h2>{move || panel.with(|p| p.lead().full_name.clone())}</h2>
                <span class="stage-badge">{move || panel.with(|p| p.lead().stage.clone())}</span>
                <button class="modal-close" aria-label="Close" on:click=move |_| on_close.run(())>
                    "\u{00D7}"
                </button>
            </div>

            {move || panel.with(|p| p.error().map(str::to_string)).map(|msg| view! {
                <div class="form-error">{msg}</div>
            })}

            <div class="stage-buttons">
                {Stage::ALL.into_iter().map(|stage| {
                    let is_current = move || panel.with(|p| p.lead().stage() == Some(stage));
                    view! {
                        <button
                            class=move || if is_current() { "stage-btn current" } else { "stage-btn" }
                            prop:disabled=move || busy.get() || is_current()
                            on:click=move |_| change_stage(stage)
                        >
                            {stage.as_str()}
                        </button>
                    }
                }).collect_view()}
            </div>

            {move || if editing() {
                view! {
                    <div class="lead-edit">
                        <LeadFormFields form=draft disabled=busy />
                        <div class="modal-actions">
                            <button class="btn" on:click=toggle_edit prop:disabled=move || busy.get()>
                                "Cancel"
                            </button>
                            <button class="btn btn-primary" on:click=save prop:disabled=move || busy.get()>
                                {move || if busy.get() { "Saving..." } else { "Save" }}
                            </button>
                        </div>
                    </div>
                }.into_any()
            } else {
                let lead = panel.with(|p| p.lead().clone());
                view! {
                    <div class="lead-view">
                        {detail_row("Mobile", lead.mobile.clone())}
                        {detail_row("Email", lead.email.clone().unwrap_or_default())}
                        {detail_row("Age", lead.age.map(|a| a.to_string()).unwrap_or_default())}
                        {detail_row("Education", lead.education.clone().unwrap_or_default())}
                        {detail_row("City", lead.city.clone().unwrap_or_default())}
                        {detail_row("Occupation", lead.occupation.clone().unwrap_or_default())}
                        {detail_row("Source", lead.lead_source.clone())}
                        {detail_row("Course", lead.course_category.clone())}
                        {detail_row("Batch", format!("{} {}", lead.batch_type, lead.batch_section).trim().to_string())}
                        {detail_row(
                            "Follow-up",
                            lead.follow_up_day().map(|d| d.format("%d %b %Y").to_string()).unwrap_or_default(),
                        )}
                        <button class="btn" on:click=toggle_edit prop:disabled=move || busy.get()>
                            "Edit"
                        </button>
                    </div>
                }.into_any()
            }}

            <div class="remarks">
                <h3>"Remarks"</h3>
                {move || {
                    let remarks = panel.with(|p| p.lead().remarks.clone());
                    if remarks.is_empty() {
                        view! { <p class="remarks-empty">"No remarks yet."</p> }.into_any()
                    } else {
                        view! {
                            <ul class="remark-list">
                                {remarks.into_iter().map(|r| {
                                    let when = remark_time(&r);
                                    view! {
                                        <li class="remark">
                                            <div class="remark-text">{r.text}</div>
                                            <div class="remark-meta">{r.author}" "{when}</div>
                                        </li>
                                    }
                                }).collect_view()}
                            </ul>
                        }.into_any()
                    }
                }}
                <div class="remark-input">
                    <textarea
                        placeholder="Add a remark..."
                        prop:value=move || panel.with(|p| p.remark_input().to_string())
                        prop:disabled=move || busy.get()
                        on:input=move |ev| {
                            let v = event_target_value(&ev);
                            panel.update(|p| p.set_remark_input(v));
                        }
                    ></textarea>
                    <button class="btn btn-primary" on:click=add_remark prop:disabled=move || busy.get()>
                        "Add Remark"
                    </button>
                </div>
            </div>
        </div>
    }
}

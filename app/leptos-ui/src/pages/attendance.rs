use chrono::{DateTime, Utc};
use fv_api_types::AttendanceToday;
use fv_core::api::AttendanceApi;
use fv_core::attendance::{mark_attendance, precheck, AttendanceAction, AttendanceError, GeoOptions};
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::spinner::Spinner;
use crate::geo::BrowserGeolocator;
use crate::state::use_app_state;

/// Local wall-clock time of a check-in/out, or "Not yet".
pub fn format_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.with_timezone(&chrono::Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "Not yet".to_string())
}

#[component]
pub fn AttendancePage() -> impl IntoView {
    let state = use_app_state();
    let (today, set_today) = signal(None::<AttendanceToday>);
    let (loading, set_loading) = signal(true);
    let (busy, set_busy) = signal(false);
    let (message, set_message) = signal(None::<String>);
    let (error, set_error) = signal(None::<String>);

    Effect::new(move |_| {
        spawn_local(async move {
            let api = state.api();
            match api.today().await {
                Ok(t) => set_today.set(Some(t)),
                Err(e) => {
                    log!("failed to fetch attendance: {}", e);
                    set_error.set(Some(state.report(&e)));
                }
            }
            set_loading.set(false);
        });
    });

    // One position request per click; a failure waits for the next click.
    let mark = move |action: AttendanceAction| {
        if busy.get_untracked() {
            return;
        }
        set_busy.set(true);
        set_message.set(None);
        set_error.set(None);
        let last = today.get_untracked();
        spawn_local(async move {
            let api = state.api();
            let options = GeoOptions::default();
            let result = mark_attendance(&api, &BrowserGeolocator, &options, action, last.as_ref()).await;
            set_busy.set(false);
            match result {
                Ok(outcome) => {
                    set_message.set(Some(outcome.summary()));
                    if let Some(t) = outcome.today {
                        set_today.set(Some(t));
                    }
                }
                Err(e) => {
                    log!("{} failed: {}", action.label(), e);
                    if let AttendanceError::Api(api_err) = &e {
                        state.report(api_err);
                    }
                    set_error.set(Some(e.to_string()));
                }
            }
        });
    };

    let blocked = move |action: AttendanceAction| {
        busy.get() || today.with(|t| precheck(action, t.as_ref()).is_err())
    };

    view! {
        <div class="page-header">
            <h2>"Attendance"</h2>
        </div>

        <div class="attendance-card">
            {move || if loading.get() {
                view! { <Spinner label="Loading today's attendance..." /> }.into_any()
            } else {
                let t = today.get().unwrap_or_default();
                view! {
                    <div class="attendance-status">
                        <div class="detail-row">
                            <span class="detail-label">"Checked in"</span>
                            <span class="detail-value">{format_time(t.check_in_time)}</span>
                        </div>
                        <div class="detail-row">
                            <span class="detail-label">"Checked out"</span>
                            <span class="detail-value">{format_time(t.check_out_time)}</span>
                        </div>
                        {t.status.map(|s| view! {
                            <div class="detail-row">
                                <span class="detail-label">"Status"</span>
                                <span class="detail-value">{s}</span>
                            </div>
                        })}
                    </div>
                }.into_any()
            }}

            <div class="attendance-actions">
                <button
                    class="btn btn-primary"
                    prop:disabled=move || blocked(AttendanceAction::CheckIn)
                    on:click=move |_| mark(AttendanceAction::CheckIn)
                >
                    "Check In"
                </button>
                <button
                    class="btn"
                    prop:disabled=move || blocked(AttendanceAction::CheckOut)
                    on:click=move |_| mark(AttendanceAction::CheckOut)
                >
                    "Check Out"
                </button>
            </div>

            {move || busy.get().then(|| view! { <Spinner size="sm" label="Getting your location..." /> })}
            {move || message.get().map(|m| view! { <div class="attendance-message">{m}</div> })}
            {move || error.get().map(|m| view! { <div class="form-error">{m}</div> })}
        </div>
    }
}

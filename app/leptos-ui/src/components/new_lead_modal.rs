use fv_core::form::{create_lead, CreateLeadError, LeadForm};
use fv_core::types::Stage;
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::lead_form::LeadFormFields;
use crate::state::use_app_state;

#[component]
pub fn NewLeadModal(
    /// Lane the modal was opened from; the form starts in that stage.
    #[prop(optional)]
    stage: Option<Stage>,
    on_close: Callback<()>,
) -> impl IntoView {
    let state = use_app_state();
    let form = RwSignal::new(LeadForm {
        stage: stage.unwrap_or(Stage::Enquiry),
        ..Default::default()
    });
    let (saving, set_saving) = signal(false);
    let (error, set_error) = signal(None::<String>);

    let submit = move |_| {
        if saving.get_untracked() {
            return;
        }
        // Validation failures never reach the network.
        if let Err(e) = form.with_untracked(LeadForm::validate) {
            set_error.set(Some(e.to_string()));
            return;
        }
        set_saving.set(true);
        set_error.set(None);
        let draft = form.get_untracked();
        spawn_local(async move {
            let api = state.api();
            let result = create_lead(&api, &draft).await;
            set_saving.set(false);
            match result {
                Ok((created, leads)) => {
                    log!("lead {} created", created.id);
                    state.apply_leads(leads);
                    on_close.run(());
                }
                Err(e) => {
                    log!("lead creation failed: {}", e);
                    if let CreateLeadError::Create(api_err) | CreateLeadError::Refresh(api_err) = &e {
                        state.report(api_err);
                    }
                    // The record exists even if the refresh failed.
                    if matches!(e, CreateLeadError::Refresh(_)) {
                        state.refresh_leads();
                        on_close.run(());
                    } else {
                        set_error.set(Some(e.to_string()));
                    }
                }
            }
        });
    };

    view! {
        <div class="modal-overlay" on:click=move |_| on_close.run(())></div>
        <div class="modal new-lead-modal" role="dialog" aria-label="New lead">
            <h2>"New Lead"</h2>
            <LeadFormFields form=form disabled=saving show_stage=true />
            {move || error.get().map(|msg| view! { <div class="form-error">{msg}</div> })}
            <div class="modal-actions">
                <button class="btn" on:click=move |_| on_close.run(()) prop:disabled=move || saving.get()>
                    "Cancel"
                </button>
                <button class="btn btn-primary" on:click=submit prop:disabled=move || saving.get()>
                    {move || if saving.get() { "Saving..." } else { "Create Lead" }}
                </button>
            </div>
        </div>
    }
}

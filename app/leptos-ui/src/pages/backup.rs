use fv_core::backup::{
    backup_filename, download_backup, restore, BackupDocument, BackupError, RestoreOutcome,
};
use leptos::html::Input;
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::browser::{alert, download, read_selected_file, WindowConfirm};
use crate::state::use_app_state;

#[component]
pub fn BackupPage() -> impl IntoView {
    let state = use_app_state();
    let file_input: NodeRef<Input> = NodeRef::new();
    let (busy, set_busy) = signal(false);
    let (status, set_status) = signal(None::<String>);
    let (error, set_error) = signal(None::<String>);

    let fail = move |e: BackupError| {
        log!("backup operation failed: {}", e);
        if let BackupError::Api(api_err) = &e {
            state.report(api_err);
        }
        set_error.set(Some(e.to_string()));
    };

    let on_download = move |_| {
        if busy.get_untracked() {
            return;
        }
        set_busy.set(true);
        set_status.set(None);
        set_error.set(None);
        spawn_local(async move {
            let api = state.api();
            let result = download_backup(&api).await.and_then(|doc| doc.to_pretty_json());
            set_busy.set(false);
            match result {
                Ok(json) => {
                    let name = backup_filename(chrono::Local::now().naive_local());
                    match download(&name, "application/json", &json) {
                        Ok(()) => set_status.set(Some(format!("Saved {name}"))),
                        Err(e) => set_error.set(Some(format!("Could not save {name}: {e}"))),
                    }
                }
                Err(e) => fail(e),
            }
        });
    };

    let on_restore = move |_| {
        if busy.get_untracked() {
            return;
        }
        let Some(input) = file_input.get() else {
            return;
        };
        set_status.set(None);
        set_error.set(None);
        set_busy.set(true);
        spawn_local(async move {
            let text = match read_selected_file(&input).await {
                Ok(Some(text)) => text,
                Ok(None) => {
                    set_busy.set(false);
                    set_error.set(Some("Choose a backup file first.".to_string()));
                    return;
                }
                Err(e) => {
                    set_busy.set(false);
                    set_error.set(Some(format!("Could not read file: {e}")));
                    return;
                }
            };
            // A malformed file is rejected before any prompt or request.
            let doc = match BackupDocument::parse(&text) {
                Ok(doc) => doc,
                Err(e) => {
                    set_busy.set(false);
                    fail(e);
                    return;
                }
            };
            let api = state.api();
            let result = restore(&api, &doc, &mut WindowConfirm).await;
            set_busy.set(false);
            match result {
                Ok(RestoreOutcome::Cancelled) => set_status.set(Some("Restore cancelled.".to_string())),
                Ok(RestoreOutcome::Restored(resp)) => {
                    let msg = if resp.message.is_empty() {
                        "Restore completed.".to_string()
                    } else {
                        resp.message
                    };
                    alert(&msg);
                    set_status.set(Some(msg));
                    state.refresh_leads();
                }
                Err(e) => fail(e),
            }
        });
    };

    view! {
        <div class="page-header">
            <h2>"Backup & Restore"</h2>
        </div>

        <section class="backup-section">
            <h3>"Download backup"</h3>
            <p>"Saves every record as a JSON file."</p>
            <button class="btn btn-primary" on:click=on_download prop:disabled=move || busy.get()>
                "Download Backup"
            </button>
        </section>

        <section class="backup-section restore">
            <h3>"Restore from backup"</h3>
            <p class="warning">"Restoring replaces all current data and cannot be undone."</p>
            <input type="file" accept=".json,application/json" node_ref=file_input />
            <button class="btn btn-danger" on:click=on_restore prop:disabled=move || busy.get()>
                "Restore"
            </button>
        </section>

        {move || status.get().map(|m| view! { <div class="page-note">{m}</div> })}
        {move || error.get().map(|m| view! { <div class="page-error">{m}</div> })}
    }
}

use fv_core::session::{sign_in, Route};
use leptos::ev::SubmitEvent;
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::WebApi;
use crate::state::use_app_state;
use crate::storage::browser_session;

#[component]
pub fn LoginPage() -> impl IntoView {
    let state = use_app_state();
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (busy, set_busy) = signal(false);
    let (error, set_error) = signal(None::<String>);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        set_busy.set(true);
        set_error.set(None);
        let email = email.get_untracked();
        let password = password.get_untracked();
        spawn_local(async move {
            let api = WebApi::new(&state.api_base.get_value(), None);
            let result = match browser_session() {
                Ok(mut session) => sign_in(&api, &mut session, &email, &password)
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            set_busy.set(false);
            match result {
                Ok(Route::Login) => {
                    log!("signed in with a role that has no dashboard");
                    state.sign_out();
                    set_error.set(Some("This account has no dashboard in this app.".to_string()));
                }
                Ok(route) => {
                    log!("signed in, landing on {}", route.path());
                    set_password.set(String::new());
                    state.reload_session();
                }
                Err(msg) => set_error.set(Some(msg)),
            }
        });
    };

    view! {
        <div class="login-page">
            <form class="login-card" on:submit=on_submit>
                <h1>"FinVision"</h1>
                <p class="login-subtitle">"Sign in to continue"</p>
                <label class="form-field">
                    <span class="form-label">"Email"</span>
                    <input
                        type="email"
                        class="form-input"
                        autocomplete="username"
                        prop:value=move || email.get()
                        prop:disabled=move || busy.get()
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                    />
                </label>
                <label class="form-field">
                    <span class="form-label">"Password"</span>
                    <input
                        type="password"
                        class="form-input"
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        prop:disabled=move || busy.get()
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                    />
                </label>
                {move || error.get().map(|msg| view! { <div class="form-error">{msg}</div> })}
                <button type="submit" class="btn btn-primary" prop:disabled=move || busy.get()>
                    {move || if busy.get() { "Signing in..." } else { "Sign In" }}
                </button>
            </form>
        </div>
    }
}

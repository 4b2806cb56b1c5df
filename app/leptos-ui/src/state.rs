use fv_api_types::ApiUser;
use fv_core::api::ApiError;
use fv_core::session::{route_for, Route};
use fv_core::store::{fetch_all, LeadStore};
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{default_api_base, WebApi};
use crate::storage::browser_session;

/// Shared reactive state: the signed-in user and the lead list snapshot.
#[derive(Clone, Copy)]
pub struct AppState {
    pub api_base: StoredValue<String>,
    pub user: ReadSignal<Option<ApiUser>>,
    pub set_user: WriteSignal<Option<ApiUser>>,
    pub token: ReadSignal<Option<String>>,
    pub set_token: WriteSignal<Option<String>>,
    pub route: ReadSignal<Route>,
    pub set_route: WriteSignal<Route>,
    pub leads: ReadSignal<LeadStore>,
    pub set_leads: WriteSignal<LeadStore>,
    pub leads_loading: ReadSignal<bool>,
    pub set_leads_loading: WriteSignal<bool>,
    pub leads_error: ReadSignal<Option<String>>,
    pub set_leads_error: WriteSignal<Option<String>>,
}

impl AppState {
    /// API client carrying the current token.
    pub fn api(&self) -> WebApi {
        WebApi::new(&self.api_base.get_value(), self.token.get_untracked())
    }

    pub fn author_name(&self) -> String {
        self.user
            .get_untracked()
            .map(|u| u.name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Re-read the persisted session and route from it.
    pub fn reload_session(&self) {
        match browser_session() {
            Ok(session) => {
                self.set_token.set(session.token().map(str::to_string));
                self.set_user.set(session.current_user().cloned());
                self.set_route.set(route_for(&session));
            }
            Err(e) => {
                log!("session unavailable: {}", e);
                self.set_token.set(None);
                self.set_user.set(None);
                self.set_route.set(Route::Login);
            }
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut session) = browser_session() {
            if let Err(e) = session.logout() {
                log!("logout failed: {}", e);
            }
        }
        self.set_leads.set(LeadStore::new());
        self.reload_session();
    }

    /// Swap in a fresh list snapshot.
    pub fn apply_leads(&self, leads: Vec<fv_api_types::ApiLead>) {
        self.set_leads.update(|store| store.replace(leads));
        self.set_leads_error.set(None);
    }

    /// Record an API failure; an expired session sends the user back to login.
    pub fn report(&self, err: &ApiError) -> String {
        if *err == ApiError::Unauthorized {
            self.sign_out();
        }
        err.to_string()
    }

    /// `GET /leads` and replace the list. The previous snapshot stays on
    /// failure.
    pub fn refresh_leads(&self) {
        let state = *self;
        state.set_leads_loading.set(true);
        spawn_local(async move {
            let api = state.api();
            match fetch_all(&api).await {
                Ok(leads) => state.apply_leads(leads),
                Err(e) => {
                    log!("failed to fetch leads: {}", e);
                    let msg = state.report(&e);
                    state.set_leads_error.set(Some(msg));
                }
            }
            state.set_leads_loading.set(false);
        });
    }
}

pub fn provide_app_state() -> AppState {
    let (user, set_user) = signal(None::<ApiUser>);
    let (token, set_token) = signal(None::<String>);
    let (route, set_route) = signal(Route::Login);
    let (leads, set_leads) = signal(LeadStore::new());
    let (leads_loading, set_leads_loading) = signal(false);
    let (leads_error, set_leads_error) = signal(None::<String>);

    let state = AppState {
        api_base: StoredValue::new(default_api_base()),
        user,
        set_user,
        token,
        set_token,
        route,
        set_route,
        leads,
        set_leads,
        leads_loading,
        set_leads_loading,
        leads_error,
        set_leads_error,
    };
    state.reload_session();
    provide_context(state);
    state
}

pub fn use_app_state() -> AppState {
    expect_context::<AppState>()
}

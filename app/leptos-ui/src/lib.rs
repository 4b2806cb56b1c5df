use leptos::prelude::*;

pub mod api;
pub mod browser;
pub mod components;
pub mod geo;
pub mod pages;
pub mod state;
pub mod storage;

use components::nav_bar::{resolve_tab, NavBar, Tab};
use fv_core::session::Route;
use wasm_bindgen::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    let state = state::provide_app_state();
    let (current_tab, set_current_tab) = signal(Tab::Pipeline);

    view! {
        {move || match state.route.get() {
            Route::Login => view! { <pages::login::LoginPage /> }.into_any(),
            route => view! {
                <NavBar route=route current_tab=current_tab set_current_tab=set_current_tab />
                <div class="content">
                    {move || match resolve_tab(route, current_tab.get()) {
                        Some(Tab::Pipeline) => view! { <pages::pipeline::PipelinePage /> }.into_any(),
                        Some(Tab::Stats) => view! { <pages::dashboard::DashboardPage /> }.into_any(),
                        Some(Tab::Attendance) => view! { <pages::attendance::AttendancePage /> }.into_any(),
                        Some(Tab::Backup) => view! { <pages::backup::BackupPage /> }.into_any(),
                        None => ().into_any(),
                    }}
                </div>
            }.into_any(),
        }}
    }
}

#[wasm_bindgen(start)]
pub fn mount() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}

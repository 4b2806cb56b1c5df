use fv_core::session::Route;
use leptos::prelude::*;

use crate::state::use_app_state;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Pipeline,
    Stats,
    Attendance,
    Backup,
}

impl Tab {
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Pipeline => "Lead Pipeline",
            Tab::Stats => "Dashboard",
            Tab::Attendance => "Attendance",
            Tab::Backup => "Backup & Restore",
        }
    }
}

/// Tabs a dashboard offers, first one being the landing tab.
pub fn tabs_for(route: Route) -> &'static [Tab] {
    match route {
        Route::AdminDashboard => &[Tab::Pipeline, Tab::Stats, Tab::Backup],
        Route::StaffDashboard => &[Tab::Pipeline, Tab::Stats, Tab::Attendance],
        Route::StudentDashboard => &[Tab::Attendance],
        Route::Login => &[],
    }
}

/// `tab` if the dashboard offers it, else its landing tab.
pub fn resolve_tab(route: Route, tab: Tab) -> Option<Tab> {
    let tabs = tabs_for(route);
    if tabs.contains(&tab) {
        Some(tab)
    } else {
        tabs.first().copied()
    }
}

fn dashboard_title(route: Route) -> &'static str {
    match route {
        Route::AdminDashboard => "Admin",
        Route::StaffDashboard => "Staff",
        Route::StudentDashboard => "Student",
        Route::Login => "",
    }
}

#[component]
pub fn NavBar(
    route: Route,
    current_tab: ReadSignal<Tab>,
    set_current_tab: WriteSignal<Tab>,
) -> impl IntoView {
    let state = use_app_state();
    let active = move || resolve_tab(route, current_tab.get());

    view! {
        <aside class="sidebar" aria-label="Main navigation">
            <div class="sidebar-header">
                <div class="sidebar-brand">
                    <div class="sidebar-brand-icon" aria-hidden="true">"FV"</div>
                    <div>
                        <div class="sidebar-brand-name">"FinVision"</div>
                        <div class="sidebar-brand-badge">{dashboard_title(route)}</div>
                    </div>
                </div>
            </div>

            <nav class="sidebar-nav" aria-label="Page navigation">
                {tabs_for(route).iter().map(|&tab| view! {
                    <button
                        class="sidebar-item"
                        class:active=move || active() == Some(tab)
                        on:click=move |_| set_current_tab.set(tab)
                    >
                        <span class="sidebar-item-label">{tab.label()}</span>
                    </button>
                }).collect_view()}
            </nav>

            <div class="sidebar-footer">
                <div class="sidebar-user">
                    {move || state.user.get().map(|u| view! {
                        <span class="sidebar-user-name">{u.name}</span>
                        <span class="sidebar-user-role">{u.role}</span>
                    })}
                </div>
                <button class="sidebar-footer-link" on:click=move |_| state.sign_out()>
                    "Sign out"
                </button>
            </div>
        </aside>
    }
}

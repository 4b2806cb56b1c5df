use leptos::prelude::*;

#[component]
pub fn StatCard(
    label: String,
    value: String,
    #[prop(default = String::new())]
    hint: String,
) -> impl IntoView {
    let has_hint = !hint.is_empty();
    view! {
        <div class="stat-card">
            <div class="value">{value}</div>
            <div class="label">{label}</div>
            {has_hint.then(|| view! {
                <div class="hint">{hint.clone()}</div>
            })}
        </div>
    }
}

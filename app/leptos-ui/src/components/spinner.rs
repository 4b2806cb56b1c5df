use leptos::prelude::*;

/// Inline loading indicator. Sizes: "sm", "md", "lg".
#[component]
pub fn Spinner(
    #[prop(default = "md")] size: &'static str,
    #[prop(default = "")] label: &'static str,
) -> impl IntoView {
    let size_class = format!("spinner spinner-{}", size);
    view! {
        <div class="spinner-container" role="status" aria-live="polite">
            <span class={size_class} aria-hidden="true"></span>
            {(!label.is_empty()).then(|| view! {
                <span class="spinner-label">{label}</span>
            })}
        </div>
    }
}

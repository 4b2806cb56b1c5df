use chrono::NaiveDate;
use fv_core::filter::LeadFilter;
use fv_core::types::{BatchType, LeadSource, Stage};
use leptos::prelude::*;

/// `<select>` value back to an option; the blank "All" entry is `None`.
pub fn pick<T>(value: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    if value.is_empty() {
        None
    } else {
        parse(value)
    }
}

/// `<input type="date">` value, blank or malformed meaning "any day".
pub fn pick_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn options<T>(
    all: &'static [T],
    label: fn(&T) -> &'static str,
    current: impl Fn() -> Option<T> + Copy + Send + Sync + 'static,
) -> Vec<AnyView>
where
    T: Copy + Send + Sync + 'static,
{
    let mut items = vec![view! {
        <option value="" selected=move || current().is_none()>"All"</option>
    }
    .into_any()];
    items.extend(all.iter().map(|v| {
        let text = label(v);
        view! {
            <option value=text selected=move || current().map(|c| label(&c)) == Some(text)>
                {text}
            </option>
        }
        .into_any()
    }));
    items
}

#[component]
pub fn FilterBar(filter: RwSignal<LeadFilter>) -> impl IntoView {
    view! {
        <div class="filter-bar">
            <input
                type="text"
                class="filter-search"
                placeholder="Search name, mobile, email, city..."
                prop:value=move || filter.with(|f| f.search.clone())
                on:input=move |ev| {
                    let v = event_target_value(&ev);
                    filter.update(|f| f.search = v);
                }
            />
            <select
                class="filter-select"
                aria-label="Stage"
                on:change=move |ev| {
                    let v = pick(&event_target_value(&ev), Stage::parse);
                    filter.update(|f| f.stage = v);
                }
            >
                {options(&Stage::ALL, Stage::as_str, move || filter.with(|f| f.stage))}
            </select>
            <select
                class="filter-select"
                aria-label="Source"
                on:change=move |ev| {
                    let v = pick(&event_target_value(&ev), LeadSource::parse);
                    filter.update(|f| f.source = v);
                }
            >
                {options(LeadSource::ALL, LeadSource::as_str, move || filter.with(|f| f.source))}
            </select>
            <select
                class="filter-select"
                aria-label="Batch type"
                on:change=move |ev| {
                    let v = pick(&event_target_value(&ev), BatchType::parse);
                    filter.update(|f| f.batch_type = v);
                }
            >
                {options(BatchType::ALL, BatchType::as_str, move || filter.with(|f| f.batch_type))}
            </select>
            <input
                type="date"
                class="filter-date"
                aria-label="Follow-up date"
                prop:value=move || filter.with(|f| {
                    f.follow_up_on.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
                })
                on:change=move |ev| {
                    let v = pick_date(&event_target_value(&ev));
                    filter.update(|f| f.follow_up_on = v);
                }
            />
            {move || (!filter.with(LeadFilter::is_empty)).then(|| view! {
                <button class="filter-clear" on:click=move |_| filter.set(LeadFilter::default())>
                    "Clear"
                </button>
            })}
        </div>
    }
}

use fv_core::form::LeadForm;
use fv_core::types::{BatchType, CourseCategory, LeadSource, Stage};
use leptos::prelude::*;

fn text_field(
    label: &'static str,
    input_type: &'static str,
    form: RwSignal<LeadForm>,
    disabled: Signal<bool>,
    get: fn(&LeadForm) -> String,
    set: fn(&mut LeadForm, String),
) -> impl IntoView {
    view! {
        <label class="form-field">
            <span class="form-label">{label}</span>
            <input
                type=input_type
                class="form-input"
                prop:value=move || form.with(get)
                prop:disabled=move || disabled.get()
                on:input=move |ev| {
                    let v = event_target_value(&ev);
                    form.update(|f| set(f, v));
                }
            />
        </label>
    }
}

#[allow(clippy::too_many_arguments)]
fn select_field<T>(
    label: &'static str,
    all: &'static [T],
    form: RwSignal<LeadForm>,
    disabled: Signal<bool>,
    as_str: fn(&T) -> &'static str,
    parse: fn(&str) -> Option<T>,
    get: fn(&LeadForm) -> T,
    kept: fn(&LeadForm) -> Option<String>,
    set: fn(&mut LeadForm, T),
) -> impl IntoView
where
    T: Copy + Send + Sync + 'static,
{
    view! {
        <label class="form-field">
            <span class="form-label">{label}</span>
            <select
                class="form-select"
                prop:disabled=move || disabled.get()
                on:change=move |ev| {
                    if let Some(v) = parse(&event_target_value(&ev)) {
                        form.update(|f| set(f, v));
                    }
                }
            >
                // An unknown stored label stays selected until a real choice is made.
                {move || form.with(kept).map(|raw| view! {
                    <option value="" selected=true>{raw}</option>
                })}
                {all.iter().map(|v| {
                    let text = as_str(v);
                    view! {
                        <option
                            value=text
                            selected=move || form.with(|f| kept(f).is_none() && as_str(&get(f)) == text)
                        >
                            {text}
                        </option>
                    }
                }).collect_view()}
            </select>
        </label>
    }
}

/// Inputs for the lead fields, bound to `form`.
///
/// The stage select is only offered when creating a lead; existing leads
/// change stage through the stage buttons.
#[component]
pub fn LeadFormFields(
    form: RwSignal<LeadForm>,
    #[prop(into)] disabled: Signal<bool>,
    #[prop(optional)] show_stage: bool,
) -> impl IntoView {
    view! {
        <div class="lead-form">
            {text_field("Full name *", "text", form, disabled, |f| f.full_name.clone(), |f, v| f.full_name = v)}
            {text_field("Mobile *", "tel", form, disabled, |f| f.mobile.clone(), |f, v| f.mobile = v)}
            {text_field("Email", "email", form, disabled, |f| f.email.clone(), |f, v| f.email = v)}
            {text_field("Age", "number", form, disabled, |f| f.age.clone(), |f, v| f.age = v)}
            {text_field("Education", "text", form, disabled, |f| f.education.clone(), |f, v| f.education = v)}
            {text_field("City", "text", form, disabled, |f| f.city.clone(), |f, v| f.city = v)}
            {text_field("Occupation", "text", form, disabled, |f| f.occupation.clone(), |f, v| f.occupation = v)}
            {select_field(
                "Lead source",
                LeadSource::ALL,
                form,
                disabled,
                LeadSource::as_str,
                LeadSource::parse,
                |f| f.lead_source,
                |f| f.kept.lead_source.clone(),
                LeadForm::set_lead_source,
            )}
            {select_field(
                "Course",
                CourseCategory::ALL,
                form,
                disabled,
                CourseCategory::as_str,
                CourseCategory::parse,
                |f| f.course_category,
                |f| f.kept.course_category.clone(),
                LeadForm::set_course_category,
            )}
            {text_field("Batch section", "text", form, disabled, |f| f.batch_section.clone(), |f, v| f.batch_section = v)}
            {select_field(
                "Batch type",
                BatchType::ALL,
                form,
                disabled,
                BatchType::as_str,
                BatchType::parse,
                |f| f.batch_type,
                |f| f.kept.batch_type.clone(),
                LeadForm::set_batch_type,
            )}
            {text_field("Follow-up date", "date", form, disabled, |f| f.follow_up_date.clone(), |f, v| f.follow_up_date = v)}
            {show_stage.then(|| select_field(
                "Stage",
                &Stage::ALL,
                form,
                disabled,
                Stage::as_str,
                Stage::parse,
                |f| f.stage,
                |f| f.kept.stage.clone(),
                LeadForm::set_stage,
            ))}
        </div>
    }
}

//! Small wrappers over browser dialogs, downloads and file input.

use fv_core::confirm::Confirm;
use js_sys::Array;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, HtmlInputElement, Url};

/// Answers prompts with `window.confirm`. No window means "no".
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowConfirm;

impl Confirm for WindowConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(prompt).ok())
            .unwrap_or(false)
    }
}

pub fn alert(message: &str) {
    if let Some(w) = web_sys::window() {
        let _ = w.alert_with_message(message);
    }
}

/// Offer `contents` as a file download.
pub fn download(filename: &str, mime: &str, contents: &str) -> Result<(), String> {
    let parts = Array::of1(&JsValue::from_str(contents));
    let props = BlobPropertyBag::new();
    props.set_type(mime);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &props)
        .map_err(|e| format!("{e:?}"))?;
    let url = Url::create_object_url_with_blob(&blob).map_err(|e| format!("{e:?}"))?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document")?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|e| format!("{e:?}"))?
        .dyn_into()
        .map_err(|_| "not an anchor element".to_string())?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();
    let _ = Url::revoke_object_url(&url);
    Ok(())
}

/// Text of the first file picked in `input`, if any.
pub async fn read_selected_file(input: &HtmlInputElement) -> Result<Option<String>, String> {
    let Some(file) = input.files().and_then(|list| list.get(0)) else {
        return Ok(None);
    };
    let text = JsFuture::from(file.text()).await.map_err(|e| format!("{e:?}"))?;
    Ok(text.as_string())
}

/// Local calendar day.
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

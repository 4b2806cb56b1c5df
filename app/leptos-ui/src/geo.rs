use async_trait::async_trait;
use fv_api_types::CoordinatesRequest;
use fv_core::attendance::{GeoError, GeoOptions, Geolocator};
use js_sys::{Promise, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::PositionOptions;

/// `navigator.geolocation.getCurrentPosition`, wrapped in a promise so it can
/// be awaited once.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserGeolocator;

fn number(obj: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(obj, &JsValue::from_str(key)).ok()?.as_f64()
}

/// Coordinates out of a `GeolocationPosition`.
fn coordinates(position: &JsValue) -> Option<CoordinatesRequest> {
    let coords = Reflect::get(position, &JsValue::from_str("coords")).ok()?;
    Some(CoordinatesRequest {
        latitude: number(&coords, "latitude")?,
        longitude: number(&coords, "longitude")?,
    })
}

#[async_trait(?Send)]
impl Geolocator for BrowserGeolocator {
    async fn current_position(&self, options: &GeoOptions) -> Result<CoordinatesRequest, GeoError> {
        let window = web_sys::window().ok_or(GeoError::PositionUnavailable)?;
        // No geolocation object at all reads as "unavailable", not a denial.
        let geolocation = window
            .navigator()
            .geolocation()
            .map_err(|_| GeoError::PositionUnavailable)?;

        let opts = PositionOptions::new();
        opts.set_enable_high_accuracy(options.high_accuracy);
        opts.set_timeout(options.timeout_ms);
        opts.set_maximum_age(options.maximum_age_ms);

        let mut started = Ok(());
        let promise = Promise::new(&mut |resolve, reject| {
            started = geolocation.get_current_position_with_error_callback_and_options(
                &resolve,
                Some(&reject),
                &opts,
            );
        });
        if started.is_err() {
            return Err(GeoError::Unknown);
        }

        match JsFuture::from(promise).await {
            Ok(position) => coordinates(&position).ok_or(GeoError::PositionUnavailable),
            Err(err) => {
                let code = number(&err, "code").unwrap_or(0.0) as u16;
                Err(GeoError::from_code(code))
            }
        }
    }
}

//! WebAssembly entry point and platform-specific code.

use kurbo::Point;
use scrawl_core::canvas::TextPrompt;
use wasm_bindgen::prelude::*;

use crate::{App, AppConfig};

/// Read the `api` parameter from the page URL.
///
/// Supports `?api=http://host:port` and `#api=http://host:port`; the query
/// string wins when both are present.
pub fn get_api_param() -> Option<String> {
    let location = web_sys::window()?.location();
    location
        .search()
        .ok()
        .and_then(|search| parse_api_param(&search))
        .or_else(|| location.hash().ok().and_then(|hash| parse_api_param(&hash)))
}

fn parse_api_param(s: &str) -> Option<String> {
    let s = s.trim_start_matches(['?', '#']);
    s.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == "api" && !value.is_empty()).then(|| value.trim_end_matches('/').to_string())
    })
}

/// Base URL of the whiteboard server: the `api` URL parameter, otherwise the
/// page origin.
pub fn api_base_url() -> String {
    if let Some(api) = get_api_param() {
        return api;
    }
    web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .unwrap_or_default()
}

/// Text prompt backed by the browser's blocking `window.prompt`.
pub struct BrowserPrompt;

impl TextPrompt for BrowserPrompt {
    fn request_text(&mut self, message: &str, _position: Point) -> Option<String> {
        web_sys::window()?.prompt_with_message(message).ok().flatten()
    }
}

/// Offer `data` as a file download through a temporary anchor element.
pub fn download_binary_file(filename: &str, data: &[u8], mime_type: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let uint8_array = js_sys::Uint8Array::from(data);
    let blob_parts = js_sys::Array::new();
    blob_parts.push(&uint8_array);

    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime_type);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&blob_parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let a = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()?;
    a.set_href(&url);
    a.set_download(filename);
    a.click();

    web_sys::Url::revoke_object_url(&url).ok();
    Ok(())
}

/// Initialize and run the WASM application.
#[wasm_bindgen(start)]
pub async fn run_wasm() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to initialize logger");

    log::info!("Starting Scrawl (WASM)");

    let config = AppConfig::default().with_api_url(Some(api_base_url()));
    log::info!("Whiteboard server: {}", config.api_base_url);

    App::run(config).await;
}

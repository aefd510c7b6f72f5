//! Browser `fetch` client for WebAssembly.

use super::{parse_body, ApiConfig, ApiError, ApiResult, BoxFuture, SavePayload, WhiteboardApi};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

/// Client using the page's `fetch`.
///
/// The browser applies its own network timeout; `ApiConfig::timeout` is not
/// enforced here.
#[derive(Debug, Clone, Default)]
pub struct FetchApi {
    config: ApiConfig,
}

impl FetchApi {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Send one request and return status and body text.
    async fn request(&self, method: &str, url: &str, body: Option<String>) -> ApiResult<(u16, String)> {
        let window = web_sys::window()
            .ok_or_else(|| ApiError::Transport("No window object".to_string()))?;

        let opts = RequestInit::new();
        opts.set_method(method);
        if let Some(body) = body {
            opts.set_body(&JsValue::from_str(&body));
        }

        let request = Request::new_with_str_and_init(url, &opts)
            .map_err(|e| ApiError::InvalidUrl(format!("{url}: {e:?}")))?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_transport)?;

        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_transport)?;
        let response: Response = response.dyn_into().map_err(js_transport)?;
        let status = response.status();

        let text = JsFuture::from(response.text().map_err(js_transport)?)
            .await
            .map_err(js_transport)?;
        Ok((status, text.as_string().unwrap_or_default()))
    }
}

fn js_transport(e: JsValue) -> ApiError {
    ApiError::Transport(format!("{e:?}"))
}

impl WhiteboardApi for FetchApi {
    fn save(&self, payload: &SavePayload) -> BoxFuture<'_, ApiResult<serde_json::Value>> {
        let body = serde_json::to_string(payload);
        Box::pin(async move {
            let (status, response) = self.request("POST", &self.config.save_url(), Some(body?)).await?;
            if !(200..300).contains(&status) {
                return Err(ApiError::Status(status));
            }
            parse_body(&response)
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, ApiResult<SavePayload>> {
        let url = self.config.load_url(id);
        Box::pin(async move {
            let (status, response) = self.request("GET", &url, None).await?;
            if !(200..300).contains(&status) {
                return Err(ApiError::Status(status));
            }
            Ok(serde_json::from_str(&response)?)
        })
    }
}

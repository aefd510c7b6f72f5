//! Blocking HTTP client for native builds, backed by `ureq`.
//!
//! Requests block the calling thread; the app runs them on a worker.

use super::{parse_body, ApiConfig, ApiError, ApiResult, BoxFuture, SavePayload, WhiteboardApi};
use ureq::Agent;
use url::Url;

/// Native client talking to the whiteboard server.
#[derive(Clone)]
pub struct HttpApi {
    config: ApiConfig,
    agent: Agent,
}

impl Default for HttpApi {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

impl HttpApi {
    pub fn new(config: ApiConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build();
        Self {
            config,
            agent: Agent::new_with_config(agent),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Send one request and return status and body.
    fn request(&self, method: &str, url: &str, body: Option<&str>) -> ApiResult<(u16, String)> {
        Url::parse(url).map_err(|e| ApiError::InvalidUrl(format!("{url}: {e}")))?;

        let response = match body {
            Some(body) => self
                .agent
                .post(url)
                .header("Content-Type", "application/json")
                .header("Accept", "application/json")
                .send(body),
            None if method == "GET" => self.agent.get(url).header("Accept", "application/json").call(),
            None => return Err(ApiError::Transport(format!("Unsupported method {method}"))),
        };
        let mut response = response.map_err(map_ureq_error)?;

        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(map_ureq_error)?;
        Ok((status, text))
    }
}

fn map_ureq_error(e: ureq::Error) -> ApiError {
    match e {
        ureq::Error::StatusCode(code) => ApiError::Status(code),
        ureq::Error::BadUri(uri) => ApiError::InvalidUrl(uri),
        other => ApiError::Transport(other.to_string()),
    }
}

impl WhiteboardApi for HttpApi {
    fn save(&self, payload: &SavePayload) -> BoxFuture<'_, ApiResult<serde_json::Value>> {
        let body = serde_json::to_string(payload);
        Box::pin(async move {
            let body = body?;
            let (status, response) = self.request("POST", &self.config.save_url(), Some(&body))?;
            if !(200..300).contains(&status) {
                return Err(ApiError::Status(status));
            }
            parse_body(&response)
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, ApiResult<SavePayload>> {
        let url = self.config.load_url(id);
        Box::pin(async move {
            let (status, response) = self.request("GET", &url, None)?;
            if !(200..300).contains(&status) {
                return Err(ApiError::Status(status));
            }
            Ok(serde_json::from_str(&response)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    fn empty_payload() -> SavePayload {
        SavePayload {
            shapes: Vec::new(),
            timestamp: 7,
        }
    }

    /// Accept one connection, answer with `response` and hand back the request.
    fn serve_once(listener: TcpListener, response: &'static str) -> thread::JoinHandle<String> {
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            request
        })
    }

    #[test]
    fn test_save_against_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = serve_once(
            listener,
            "HTTP/1.1 200 OK\r\nContent-Length: 12\r\nConnection: close\r\n\r\n{\"id\":\"abc\"}",
        );

        let api = HttpApi::new(ApiConfig::new(format!("http://127.0.0.1:{port}")));
        let response = block_on(api.save(&empty_payload())).unwrap();
        assert_eq!(response["id"], "abc");

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/whiteboard/save HTTP/1.1"));
        assert!(request.ends_with("{\"shapes\":[],\"timestamp\":7}"));
    }

    #[test]
    fn test_save_to_ipv6_host() {
        let Ok(listener) = TcpListener::bind("[::1]:0") else {
            return;
        };
        let port = listener.local_addr().unwrap().port();
        let server = serve_once(
            listener,
            "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );

        let api = HttpApi::new(ApiConfig::new(format!("http://[::1]:{port}")));
        let response = block_on(api.save(&empty_payload())).unwrap();
        assert_eq!(response, serde_json::Value::Null);
        server.join().unwrap();
    }

    #[test]
    fn test_status_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = serve_once(
            listener,
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );

        let api = HttpApi::new(ApiConfig::new(format!("http://127.0.0.1:{port}")));
        let result = block_on(api.save(&empty_payload()));
        assert!(matches!(result, Err(ApiError::Status(500))));
        server.join().unwrap();
    }

    #[test]
    fn test_load_missing_board() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = serve_once(
            listener,
            "HTTP/1.1 404 Not Found\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
        );

        let api = HttpApi::new(ApiConfig::new(format!("http://127.0.0.1:{port}")));
        let result = block_on(api.load("nope"));
        assert!(matches!(result, Err(ApiError::Status(404))));

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /api/whiteboard/nope HTTP/1.1"));
    }

    #[test]
    fn test_connection_refused() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let api = HttpApi::new(ApiConfig::new(format!("http://127.0.0.1:{port}")));
        let result = block_on(api.save(&empty_payload()));
        assert!(matches!(result, Err(ApiError::Transport(_))));
    }

    #[test]
    fn test_invalid_base_url() {
        let api = HttpApi::new(ApiConfig::new("not a url"));
        let result = block_on(api.save(&empty_payload()));
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    /// Read headers plus a `Content-Length` body.
    fn read_request(stream: &mut TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap();
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw).to_string();
            if let Some((head, body)) = text.split_once("\r\n\r\n") {
                let length = head
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.trim()
                            .eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if body.len() >= length {
                    return text;
                }
            }
            if n == 0 {
                return text;
            }
        }
    }

    /// The futures here never return `Pending`, so one poll is enough.
    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        use std::task::{Context, Poll, Waker};
        let mut cx = Context::from_waker(Waker::noop());
        let mut f = std::pin::pin!(f);
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => result,
            Poll::Pending => panic!("future unexpectedly pending"),
        }
    }
}

// Request dispatch
//
// Wraps one HTTP exchange behind completion callbacks. A dispatch call
// validates and builds the request synchronously, then hands the exchange
// to a spawned task and returns a handle immediately. Expected runtime
// failures never surface as errors -- they are routed to the request's
// error callback or, for 401, to the transport's session expiry hook.

use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::config::{SessionExpiredHook, TransportConfig};
use crate::encode::form_urlencode;
use crate::error::Error;

/// Callback invoked with the response payload on HTTP 200.
pub type SuccessCallback = Box<dyn FnOnce(Payload) + Send>;

/// Callback invoked on any failed exchange. Carries no arguments: no
/// status code or body is surfaced, matching the wire contract this
/// transport wraps. The typed failure is logged instead.
pub type ErrorCallback = Box<dyn FnOnce() + Send>;

/// Callback invoked with a 0-100 percentage as the response body arrives.
/// Only fires when the response declares a total content length.
pub type ProgressCallback = Box<dyn Fn(f64) + Send>;

/// What the success callback receives.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Parsed body of a 200 response that declared a JSON content type.
    Json(Value),
    /// Raw body text: non-JSON content type, or a declared-JSON body that
    /// failed to parse (delivered as-is rather than failing).
    Text(String),
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

/// Describes one HTTP exchange: target, payload, headers, and callbacks.
///
/// Every field has a default: empty URL (rejected at dispatch), `GET`, no
/// data, no extra headers, `*/*` accept, form-encoded content type.
pub struct Request {
    url: String,
    method: Method,
    data: Option<Value>,
    headers: Vec<(String, String)>,
    accept: String,
    content_type: String,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
    on_progress: Option<ProgressCallback>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: Method::GET,
            data: None,
            headers: Vec::new(),
            accept: "*/*".into(),
            content_type: "application/x-www-form-urlencoded".into(),
            on_success: None,
            on_error: None,
            on_progress: None,
        }
    }
}

impl Request {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Attach request data, bracket-encoded into the body at dispatch.
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Add a caller header. Forced headers win on a name collision.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = accept.into();
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn on_success(mut self, callback: impl FnOnce(Payload) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn on_progress(mut self, callback: impl Fn(f64) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Assemble the final header map. Caller headers land first and forced
    /// headers second, so `Accept`, `Content-Type`, and `X-Requested-With`
    /// always win on collision.
    fn header_map(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();

        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::InvalidHeader { name: name.clone() })?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| Error::InvalidHeader { name: name.clone() })?;
            headers.insert(header_name, header_value);
        }

        let accept = HeaderValue::from_str(&self.accept).map_err(|_| Error::InvalidHeader {
            name: "accept".into(),
        })?;
        let content_type =
            HeaderValue::from_str(&self.content_type).map_err(|_| Error::InvalidHeader {
                name: "content-type".into(),
            })?;

        headers.insert(header::ACCEPT, accept);
        headers.insert(header::CONTENT_TYPE, content_type);
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );

        Ok(headers)
    }
}

/// Dispatches [`Request`]s and owns the session expiry handler.
///
/// Holds no per-exchange state: every dispatch is a fresh, independent
/// exchange, and concurrent dispatches complete in whatever order the
/// network produces. Cheap to clone; clones share the HTTP client and
/// the session expiry handler.
#[derive(Clone)]
pub struct Transport {
    http: reqwest::Client,
    session_expired: SessionExpiredHook,
}

impl Transport {
    /// Build a transport from a [`TransportConfig`].
    pub fn new(config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: config.build_client()?,
            session_expired: Arc::clone(&config.on_session_expired),
        })
    }

    /// Validate and launch a request, returning immediately with a handle.
    ///
    /// Completion is delivered through the request's callbacks, never
    /// through the returned handle:
    ///
    /// - HTTP 200 invokes the success callback, with [`Payload::Json`] when
    ///   the response declares a JSON content type and the body parses, and
    ///   [`Payload::Text`] otherwise.
    /// - HTTP 401 invokes the session expiry hook exactly once; neither
    ///   per-request callback runs, whatever the body contains.
    /// - Every other status (strictly: anything but 200), and any
    ///   connection-level failure, invokes the error callback.
    ///
    /// Request data is bracket-encoded into the body for every method, GET
    /// included. Must be called within a Tokio runtime.
    pub fn dispatch(&self, request: Request) -> Result<RequestHandle, Error> {
        let url = Url::parse(&request.url)?;
        let headers = request.header_map()?;
        let body = request.data.as_ref().map(form_urlencode);

        debug!("{} {url}", request.method);

        let mut builder = self.http.request(request.method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let task = tokio::spawn(run_exchange(
            builder,
            Arc::clone(&self.session_expired),
            request.on_success,
            request.on_error,
            request.on_progress,
        ));

        Ok(RequestHandle { task })
    }
}

/// Observes a dispatched request.
///
/// Dropping the handle does not cancel the exchange, and no cancellation
/// is exposed: an in-flight request always runs to completion.
#[derive(Debug)]
pub struct RequestHandle {
    task: JoinHandle<()>,
}

impl RequestHandle {
    /// Wait until the exchange has finished and its callbacks have run.
    pub async fn completed(self) {
        let _ = self.task.await;
    }

    /// Whether the exchange has already finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

// ── Exchange task ───────────────────────────────────────────────────

async fn run_exchange(
    builder: reqwest::RequestBuilder,
    session_expired: SessionExpiredHook,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
    on_progress: Option<ProgressCallback>,
) {
    let response = match builder.send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "request did not complete");
            fire_error(on_error);
            return;
        }
    };

    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        debug!("session expired (HTTP 401)");
        session_expired();
        return;
    }

    if status != StatusCode::OK {
        warn!(%status, "request rejected");
        fire_error(on_error);
        return;
    }

    let declared_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("json"));

    let body = match read_body(response, on_progress).await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "failed reading response body");
            fire_error(on_error);
            return;
        }
    };

    let payload = if declared_json {
        match serde_json::from_str(&body) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(body),
        }
    } else {
        Payload::Text(body)
    };

    if let Some(callback) = on_success {
        callback(payload);
    }
}

fn fire_error(on_error: Option<ErrorCallback>) {
    if let Some(callback) = on_error {
        callback();
    }
}

/// Drain the response body, reporting cumulative progress per chunk when
/// the total length is known up front.
async fn read_body(
    mut response: reqwest::Response,
    on_progress: Option<ProgressCallback>,
) -> Result<String, reqwest::Error> {
    let total = response.content_length().filter(|len| *len > 0);
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        buffer.extend_from_slice(&chunk);
        if let (Some(callback), Some(total)) = (on_progress.as_ref(), total) {
            callback(percentage(buffer.len(), total));
        }
    }

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[allow(clippy::as_conversions, clippy::cast_precision_loss)]
fn percentage(received: usize, total: u64) -> f64 {
    (received as f64) * 100.0 / (total as f64)
}

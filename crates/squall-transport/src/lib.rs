//! Callback-driven HTTP exchange wrapper for the squall workspace.
//!
//! Wraps single request/response cycles behind completion callbacks
//! instead of futures-of-results, preserving the contract of the
//! form-driven endpoints it talks to:
//!
//! - **[`Transport`]** — Dispatches [`Request`]s on spawned tasks.
//!   Strictly HTTP 200 is success; 401 routes to an injected session
//!   expiry hook; everything else reaches a no-argument error callback.
//!
//! - **[`Request`]** — Builder for one exchange: URL, method, data,
//!   headers, and success/error/progress callbacks, each with a default.
//!
//! - **[`Payload`]** — What the success callback receives: parsed JSON
//!   when the response declares it, raw text otherwise.
//!
//! - **[`form_urlencode`]** — The bracket-nested
//!   `application/x-www-form-urlencoded` body encoder
//!   (`{"a": {"b": 1}}` becomes `a%5Bb%5D=1`).
//!
//! Construction failures (bad URL, bad header) are the only [`Error`]s;
//! anything that fails after dispatch reaches the error callback instead.

pub mod config;
pub mod encode;
pub mod error;
pub mod request;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{SessionExpiredHook, TransportConfig};
pub use encode::form_urlencode;
pub use error::Error;
pub use request::{
    ErrorCallback, Payload, ProgressCallback, Request, RequestHandle, SuccessCallback, Transport,
};

// Re-export the HTTP method and cookie jar types callers configure with.
pub use reqwest::Method;
pub use reqwest::cookie::Jar;

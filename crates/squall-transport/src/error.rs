use thiserror::Error;

/// Top-level error type for the `squall-transport` crate.
///
/// Only request *construction* can fail with an `Error` -- a bad URL, a
/// header that cannot be encoded, or a client that cannot be built. Once a
/// request is in flight, every outcome is delivered through its callbacks:
/// the success callback, the no-argument error callback, or the session
/// expiry hook. See [`Transport::dispatch`](crate::Transport::dispatch).
#[derive(Debug, Error)]
pub enum Error {
    // ── Client construction ─────────────────────────────────────────
    /// HTTP client build or low-level transport error.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    // ── Request construction ────────────────────────────────────────
    /// URL parsing error (including the empty default URL).
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A caller-supplied header name or value was rejected.
    #[error("Invalid header: {name}")]
    InvalidHeader { name: String },
}

use thiserror::Error;

/// Top-level error type for the `squall-core` crate.
///
/// Expected runtime failures (a sync request that comes back non-200, a
/// refresh payload that does not deserialize) are callback-delivered or
/// logged, never returned as errors; these variants cover construction
/// problems only.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A sync was issued against a schema with no endpoint URL.
    #[error("Model schema declares no endpoint URL")]
    MissingEndpoint,

    /// Request construction failed in the transport layer.
    #[error(transparent)]
    Transport(#[from] squall_transport::Error),
}

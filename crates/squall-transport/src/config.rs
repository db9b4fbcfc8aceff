// Transport configuration for building reqwest::Client instances.
//
// The session expiry handler lives here as an injected dependency rather
// than process-wide mutable state: every Transport built from a config
// carries its own handler.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use tracing::warn;

use crate::error::Error;

/// Handler invoked whenever a response comes back with HTTP 401.
///
/// Shared by every request dispatched through the owning
/// [`Transport`](crate::Transport). The default handler only logs a warning.
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

/// Configuration for building a [`Transport`](crate::Transport).
#[derive(Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub cookie_jar: Option<Arc<Jar>>,
    pub on_session_expired: SessionExpiredHook,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            cookie_jar: None,
            on_session_expired: Arc::new(|| warn!("session expired (HTTP 401); no handler installed")),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("squall/0.1.0");

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder.build().map_err(Error::Transport)
    }

    /// Create a config with a fresh cookie jar (for cookie-based sessions).
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }

    /// Replace the session expiry handler.
    ///
    /// The handler runs once for every 401 response, instead of that
    /// request's success or error callback.
    pub fn with_session_expired(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Arc::new(hook);
        self
    }
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("timeout", &self.timeout)
            .field("cookie_jar", &self.cookie_jar.is_some())
            .finish_non_exhaustive()
    }
}

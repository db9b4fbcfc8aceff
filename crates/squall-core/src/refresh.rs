// ── Background collection refresh ───────────────────────────────────────
//
// A collection built with refresh settings owns a task that fetches the
// endpoint once at construction and then once per expiry period, swapping
// the contents wholesale on success. The task holds only a weak handle,
// so an abandoned collection tears its task down on the next tick.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use squall_transport::{Method, Payload, Request, Transport};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::collection::{Collection, CollectionInner, LOCK_POISONED};

/// Hook consulted before each refresh round; returning `false` skips it.
pub type ExpiryHook = Arc<dyn Fn() -> bool + Send + Sync>;

/// Where refreshed contents come from.
#[derive(Debug, Clone)]
pub struct SyncSpec {
    pub url: String,
    pub method: Method,
}

impl SyncSpec {
    /// A GET endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
        }
    }
}

/// When and how a collection refreshes itself.
#[derive(Clone, Default)]
pub struct RefreshSettings {
    /// Time between refreshes. Zero disables refreshing entirely.
    pub expiry: Duration,
    /// Endpoint to fetch from. `None` disables refreshing entirely.
    pub sync: Option<SyncSpec>,
    /// Consulted before each round; returning `false` skips that round.
    pub on_expiry: Option<ExpiryHook>,
}

impl RefreshSettings {
    /// Refresh from `sync` every `expiry_minutes` minutes.
    pub fn minutes(expiry_minutes: u64, sync: SyncSpec) -> Self {
        Self {
            expiry: Duration::from_secs(expiry_minutes.saturating_mul(60)),
            sync: Some(sync),
            on_expiry: None,
        }
    }
}

impl fmt::Debug for RefreshSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshSettings")
            .field("expiry", &self.expiry)
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}

impl<T> Collection<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    /// A collection that keeps itself current from a server endpoint.
    ///
    /// Contents arrive once right after construction and again once per
    /// expiry period. Refreshing is disabled when the settings name no
    /// endpoint or a zero expiry; the collection then behaves exactly
    /// like [`Collection::new`]. Must be called within a Tokio runtime
    /// when refreshing is enabled.
    pub fn with_refresh(transport: &Transport, settings: RefreshSettings) -> Self {
        let collection = Self::new();
        let Some(sync) = settings.sync else {
            return collection;
        };
        if settings.expiry.is_zero() {
            return collection;
        }

        spawn_refresh_task(
            Arc::downgrade(&collection.inner),
            transport.clone(),
            sync,
            settings.on_expiry,
            settings.expiry,
            collection.inner.cancel.clone(),
        );
        collection
    }
}

fn spawn_refresh_task<T>(
    inner: Weak<CollectionInner<T>>,
    transport: Transport,
    sync: SyncSpec,
    on_expiry: Option<ExpiryHook>,
    period: Duration,
    cancel: CancellationToken,
) where
    T: DeserializeOwned + Send + Sync + 'static,
{
    tokio::spawn(async move {
        // The first tick completes immediately, so contents arrive at
        // construction rather than one full period later.
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }
            let Some(collection) = inner.upgrade() else {
                break;
            };
            if let Some(hook) = &on_expiry {
                if !hook() {
                    debug!("refresh skipped by expiry hook");
                    continue;
                }
            }
            refresh_once(&collection, &transport, &sync).await;
        }
        debug!("collection refresh task stopped");
    });
}

async fn refresh_once<T>(
    collection: &Arc<CollectionInner<T>>,
    transport: &Transport,
    sync: &SyncSpec,
) where
    T: DeserializeOwned + Send + Sync + 'static,
{
    debug!(url = %sync.url, "collection refresh");
    let request = Request::new(&sync.url)
        .method(sync.method.clone())
        .on_success({
            let inner = Arc::clone(collection);
            move |payload| apply_refresh(&inner, payload)
        })
        .on_error(|| warn!("collection refresh request failed"));

    match transport.dispatch(request) {
        Ok(handle) => handle.completed().await,
        Err(error) => warn!(error = %error, "collection refresh dispatch failed"),
    }
}

/// Swap the collection contents for the payload: a JSON array becomes the
/// new items (malformed entries are skipped), any other JSON value a
/// single item.
fn apply_refresh<T>(inner: &Arc<CollectionInner<T>>, payload: Payload)
where
    T: DeserializeOwned,
{
    let Payload::Json(value) = payload else {
        warn!("refresh endpoint returned non-JSON contents, keeping current items");
        return;
    };

    let incoming = match value {
        Value::Array(entries) => {
            let mut items = Vec::with_capacity(entries.len());
            for entry in entries {
                match serde_json::from_value::<T>(entry) {
                    Ok(item) => items.push(item),
                    Err(error) => warn!(error = %error, "skipping malformed refresh item"),
                }
            }
            items
        }
        other => match serde_json::from_value::<T>(other) {
            Ok(item) => vec![item],
            Err(error) => {
                warn!(error = %error, "refresh payload did not match the item shape");
                return;
            }
        },
    };

    let count = incoming.len();
    {
        let mut items = inner.items.write().expect(LOCK_POISONED);
        items.clear();
        items.extend(incoming);
    }
    *inner.last_refresh.write().expect(LOCK_POISONED) = Some(Utc::now());
    debug!(count, "collection refreshed");
}

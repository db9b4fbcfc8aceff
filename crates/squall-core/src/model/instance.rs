// Model instances
//
// An instance owns its stored data behind a lock; everything declared
// (property kinds, endpoint, hooks) lives in the shared schema. Field
// listeners hold only a weak handle back to the instance, so binding a
// model never keeps it alive.

use std::sync::{Arc, RwLock, Weak};

use serde_json::Value;
use squall_transport::{Method, Payload, Request, RequestHandle, Transport};
use tracing::debug;

use crate::bind::{BindTarget, FieldListener, FieldMap, coerce_field_value};
use crate::error::CoreError;
use crate::model::schema::{Property, PropertyMap, Schema};

const LOCK_POISONED: &str = "model lock poisoned";

/// One instance of a [`Schema`]: per-instance stored data plus the shared
/// definition.
///
/// Cheap to clone; clones share the same data.
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

struct ModelInner {
    schema: Schema,
    data: RwLock<PropertyMap>,
    bindings: RwLock<FieldMap>,
}

impl Model {
    pub(crate) fn create(schema: Schema, settings: PropertyMap) -> Self {
        let mut data = PropertyMap::new();
        for (name, property) in schema.properties() {
            if let Property::Stored(default) = property {
                data.insert(name.clone(), default.clone());
            }
        }

        let model = Self {
            inner: Arc::new(ModelInner {
                schema,
                data: RwLock::new(data),
                bindings: RwLock::new(FieldMap::new()),
            }),
        };
        for (name, value) in &settings {
            model.set(name, value.clone());
        }
        if let Some(hook) = model.inner.schema.init_hook() {
            hook(&model, &settings);
        }
        model
    }

    /// The schema this instance was created from.
    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    // ── Property access ──────────────────────────────────────────────────

    /// Read one property.
    ///
    /// Computed properties go through their getter. Names the schema never
    /// declared read from ad-hoc data and yield `None` until first set.
    pub fn get(&self, name: &str) -> Option<Value> {
        let data = self.inner.data.read().expect(LOCK_POISONED);
        match self.inner.schema.properties().get(name) {
            Some(Property::Computed { get, .. }) => Some(get(&data)),
            Some(Property::Stored(_)) | None => data.get(name).cloned(),
        }
    }

    /// Snapshot every property: declared ones in declaration order, then
    /// ad-hoc entries in first-set order.
    pub fn get_all(&self) -> PropertyMap {
        let data = self.inner.data.read().expect(LOCK_POISONED);
        let mut all = PropertyMap::new();
        for (name, property) in self.inner.schema.properties() {
            match property {
                Property::Stored(_) => {
                    if let Some(value) = data.get(name) {
                        all.insert(name.clone(), value.clone());
                    }
                }
                Property::Computed { get, .. } => {
                    all.insert(name.clone(), get(&data));
                }
            }
        }
        for (name, value) in &*data {
            if !all.contains_key(name) {
                all.insert(name.clone(), value.clone());
            }
        }
        all
    }

    /// Write one property and return its resulting value.
    ///
    /// Computed properties route through their setter; without one the
    /// write is ignored and the current computed value comes back. Unknown
    /// names become ad-hoc stored entries.
    pub fn set(&self, name: &str, value: Value) -> Option<Value> {
        {
            let mut data = self.inner.data.write().expect(LOCK_POISONED);
            match self.inner.schema.properties().get(name) {
                Some(Property::Computed { set, .. }) => {
                    if let Some(setter) = set {
                        setter(&mut data, value);
                    }
                }
                Some(Property::Stored(_)) | None => {
                    data.insert(name.to_owned(), value);
                }
            }
        }
        self.get(name)
    }

    /// Apply several writes in map order; returns each property's
    /// resulting value.
    pub fn set_many(&self, values: PropertyMap) -> PropertyMap {
        values
            .into_iter()
            .map(|(name, value)| {
                let result = self.set(&name, value).unwrap_or(Value::Null);
                (name, result)
            })
            .collect()
    }

    // ── Server sync ──────────────────────────────────────────────────────

    /// GET the schema's endpoint, sending the full property snapshot.
    ///
    /// Must be called within a Tokio runtime; the exchange runs in the
    /// background and exactly one of the callbacks fires (none on session
    /// expiry, which goes to the transport's hook instead).
    pub fn sync(
        &self,
        transport: &Transport,
        on_success: impl FnOnce(Payload) + Send + 'static,
        on_error: impl FnOnce() + Send + 'static,
    ) -> Result<RequestHandle, CoreError> {
        self.sync_as(transport, Method::GET, on_success, on_error)
    }

    /// POST variant of [`sync`](Self::sync).
    pub fn post(
        &self,
        transport: &Transport,
        on_success: impl FnOnce(Payload) + Send + 'static,
        on_error: impl FnOnce() + Send + 'static,
    ) -> Result<RequestHandle, CoreError> {
        self.sync_as(transport, Method::POST, on_success, on_error)
    }

    /// PUT variant of [`sync`](Self::sync).
    pub fn put(
        &self,
        transport: &Transport,
        on_success: impl FnOnce(Payload) + Send + 'static,
        on_error: impl FnOnce() + Send + 'static,
    ) -> Result<RequestHandle, CoreError> {
        self.sync_as(transport, Method::PUT, on_success, on_error)
    }

    /// DELETE variant of [`sync`](Self::sync).
    pub fn delete(
        &self,
        transport: &Transport,
        on_success: impl FnOnce(Payload) + Send + 'static,
        on_error: impl FnOnce() + Send + 'static,
    ) -> Result<RequestHandle, CoreError> {
        self.sync_as(transport, Method::DELETE, on_success, on_error)
    }

    /// Exchange the full property snapshot with the schema's endpoint
    /// using an explicit method. The snapshot rides in the body for every
    /// method, GET included.
    pub fn sync_as(
        &self,
        transport: &Transport,
        method: Method,
        on_success: impl FnOnce(Payload) + Send + 'static,
        on_error: impl FnOnce() + Send + 'static,
    ) -> Result<RequestHandle, CoreError> {
        let url = self.inner.schema.url().ok_or(CoreError::MissingEndpoint)?;
        let data = Value::Object(self.get_all().into_iter().collect());
        debug!(%method, url, "model sync");

        let request = Request::new(url)
            .method(method)
            .data(data)
            .on_success(on_success)
            .on_error(on_error);
        Ok(transport.dispatch(request)?)
    }

    // ── Form binding ─────────────────────────────────────────────────────

    /// Bind form fields to this instance's properties.
    ///
    /// Each resolved field gets a change listener that coerces the field's
    /// raw text and writes it to the mapping key (the field's own name for
    /// the selector and group forms), then runs the schema's change hook.
    /// A target that resolves to no fields changes nothing; otherwise the
    /// retained mapping is replaced.
    pub fn bind(&self, target: BindTarget) {
        let fields = target.resolve();
        if fields.is_empty() {
            debug!("bind target resolved to no named fields");
            return;
        }

        for (property, field) in &fields {
            field.subscribe(self.change_listener(property.clone()));
        }
        *self.inner.bindings.write().expect(LOCK_POISONED) = fields;
    }

    /// The currently retained property-to-field mapping.
    pub fn bound_fields(&self) -> FieldMap {
        self.inner.bindings.read().expect(LOCK_POISONED).clone()
    }

    fn change_listener(&self, property: String) -> FieldListener {
        let inner: Weak<ModelInner> = Arc::downgrade(&self.inner);
        Box::new(move |field| {
            let Some(inner) = inner.upgrade() else { return };
            let model = Self { inner };
            model.set(&property, coerce_field_value(&field.value()));
            if let Some(hook) = model.inner.schema.change_hook() {
                hook(&model, field);
            }
        })
    }
}

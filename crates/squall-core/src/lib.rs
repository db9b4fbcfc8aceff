//! Schema-driven models, self-refreshing collections, and form binding
//! for the squall workspace.
//!
//! This crate owns the data layer: declarative model definitions, their
//! server sync, and the in-memory collections UI code consumes:
//!
//! - **[`Schema`]** — Declarative model definition: stored properties
//!   with defaults, computed accessor pairs, a sync endpoint, and
//!   `init` / `on_change` lifecycle hooks. Built once, shared by every
//!   instance it creates.
//!
//! - **[`Model`]** — One instance of a schema with its own data.
//!   `get` / `set` route through the declared property kinds, `sync` and
//!   friends exchange the full property snapshot with the endpoint, and
//!   [`bind`](Model::bind) wires form fields to properties through the
//!   [`bind`] traits.
//!
//! - **[`Collection`]** — Shared, ordered item sequence with typed edit
//!   helpers, truthiness-filtered [`select`](Collection::select), and an
//!   optional background refresh task that replaces the contents from a
//!   server endpoint once per expiry period.
//!
//! - **[`Debouncer`]** — Trailing-edge debounce slot: a burst of
//!   schedules runs exactly one callback, the last.
//!
//! HTTP itself lives in `squall-transport`; its callback contract
//! (strict 200 success, no-argument error callbacks, session expiry to a
//! configured hook) is what the sync operations here inherit.

pub mod bind;
pub mod collection;
pub mod debounce;
pub mod error;
pub mod model;
pub mod refresh;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bind::{BindTarget, FieldGroup, FieldListener, FieldMap, FieldResolver, FormField};
pub use collection::Collection;
pub use debounce::Debouncer;
pub use error::CoreError;
pub use model::{
    ChangeHook, Getter, InitHook, Model, Property, PropertyMap, Schema, SchemaBuilder, Setter,
};
pub use refresh::{ExpiryHook, RefreshSettings, SyncSpec};

// Transport types that appear in this crate's public API.
pub use squall_transport::{Method, Payload, Request, RequestHandle, Transport, TransportConfig};

// ── Schema-driven models ────────────────────────────────────────────────
//
// `Schema` declares properties, endpoint, and hooks once; `Model` is one
// instance of that declaration with its own data.

mod instance;
mod schema;

pub use instance::Model;
pub use schema::{
    ChangeHook, Getter, InitHook, Property, PropertyMap, Schema, SchemaBuilder, Setter,
};

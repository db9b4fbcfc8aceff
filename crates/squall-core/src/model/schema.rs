// Model schemas
//
// A schema declares properties once; instances hold only data. Property
// kinds are fixed at definition time: a slot is either a stored value
// with a default, or a computed accessor pair. There is no runtime type
// sniffing to decide which.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::bind::FormField;
use crate::model::instance::Model;

/// Stored property data for one model instance, in declaration order.
pub type PropertyMap = IndexMap<String, Value>;

/// Computed property getter: reads the instance's stored data.
pub type Getter = Arc<dyn Fn(&PropertyMap) -> Value + Send + Sync>;

/// Computed property setter: writes into the instance's stored data.
pub type Setter = Arc<dyn Fn(&mut PropertyMap, Value) + Send + Sync>;

/// Hook run after construction, with the instance and its original
/// settings.
pub type InitHook = Arc<dyn Fn(&Model, &PropertyMap) + Send + Sync>;

/// Hook run after a bound field writes a value, with the instance and the
/// field that fired.
pub type ChangeHook = Arc<dyn Fn(&Model, &dyn FormField) + Send + Sync>;

/// One property slot, tagged at definition time.
#[derive(Clone)]
pub enum Property {
    /// A plain value with its declared default.
    Stored(Value),
    /// An accessor pair. Without a setter, writes to the property are
    /// ignored.
    Computed { get: Getter, set: Option<Setter> },
}

/// A model definition: ordered property declarations, an optional sync
/// endpoint, and lifecycle hooks.
///
/// Immutable once built. Cheap to clone; every instance created from a
/// schema shares it.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

struct SchemaInner {
    properties: IndexMap<String, Property>,
    url: Option<String>,
    init: Option<InitHook>,
    on_change: Option<ChangeHook>,
}

impl Schema {
    /// Start declaring a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// The sync endpoint, when one was declared.
    pub fn url(&self) -> Option<&str> {
        self.inner.url.as_deref()
    }

    /// Construct an instance: declared defaults overlaid entry-by-entry
    /// by `settings`, then the `init` hook runs with the instance and the
    /// original settings.
    ///
    /// A settings entry naming a computed property routes through its
    /// setter (and is ignored without one); kinds never change after
    /// definition, so settings cannot demote an accessor to a plain value.
    pub fn create(&self, settings: PropertyMap) -> Model {
        Model::create(self.clone(), settings)
    }

    pub(crate) fn properties(&self) -> &IndexMap<String, Property> {
        &self.inner.properties
    }

    pub(crate) fn init_hook(&self) -> Option<&InitHook> {
        self.inner.init.as_ref()
    }

    pub(crate) fn change_hook(&self) -> Option<&ChangeHook> {
        self.inner.on_change.as_ref()
    }
}

/// Declares a [`Schema`]: stored defaults, computed accessors, the sync
/// endpoint, and lifecycle hooks.
#[derive(Default)]
pub struct SchemaBuilder {
    properties: IndexMap<String, Property>,
    url: Option<String>,
    init: Option<InitHook>,
    on_change: Option<ChangeHook>,
}

impl SchemaBuilder {
    /// Declare a stored property with its default value.
    pub fn stored(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.properties
            .insert(name.into(), Property::Stored(default.into()));
        self
    }

    /// Declare several stored properties at once, in map order.
    pub fn defaults(mut self, defaults: PropertyMap) -> Self {
        for (name, value) in defaults {
            self.properties.insert(name, Property::Stored(value));
        }
        self
    }

    /// Declare a read-only computed property.
    pub fn computed(
        mut self,
        name: impl Into<String>,
        get: impl Fn(&PropertyMap) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.properties.insert(
            name.into(),
            Property::Computed {
                get: Arc::new(get),
                set: None,
            },
        );
        self
    }

    /// Declare a computed property with a custom setter.
    pub fn computed_with_setter(
        mut self,
        name: impl Into<String>,
        get: impl Fn(&PropertyMap) -> Value + Send + Sync + 'static,
        set: impl Fn(&mut PropertyMap, Value) + Send + Sync + 'static,
    ) -> Self {
        self.properties.insert(
            name.into(),
            Property::Computed {
                get: Arc::new(get),
                set: Some(Arc::new(set)),
            },
        );
        self
    }

    /// Endpoint used by the sync operations.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Hook run after each construction. A schema without one defaults to
    /// a no-op.
    pub fn init(mut self, hook: impl Fn(&Model, &PropertyMap) + Send + Sync + 'static) -> Self {
        self.init = Some(Arc::new(hook));
        self
    }

    /// Hook run after a bound field writes a value.
    pub fn on_change(
        mut self,
        hook: impl Fn(&Model, &dyn FormField) + Send + Sync + 'static,
    ) -> Self {
        self.on_change = Some(Arc::new(hook));
        self
    }

    /// Freeze the declaration.
    pub fn build(self) -> Schema {
        Schema {
            inner: Arc::new(SchemaInner {
                properties: self.properties,
                url: self.url,
                init: self.init,
                on_change: self.on_change,
            }),
        }
    }
}

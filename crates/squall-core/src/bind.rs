// Form binding seam
//
// The UI toolkit stays behind small traits: something that resolves named
// fields, and the fields themselves. The core never touches a real widget
// tree; adapters implement these traits and models wire change listeners
// through them.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

/// Listener attached to a field. The field passes itself back on change.
pub type FieldListener = Box<dyn Fn(&dyn FormField) + Send + Sync>;

/// Property-name-to-field mapping produced by target resolution.
pub type FieldMap = IndexMap<String, Arc<dyn FormField>>;

/// A named, value-bearing input field.
pub trait FormField: Send + Sync {
    /// The field's binding name.
    fn name(&self) -> &str;

    /// The field's current raw string value.
    fn value(&self) -> String;

    /// Register a change listener. The adapter invokes every registered
    /// listener, in order, whenever the field's value changes.
    fn subscribe(&self, listener: FieldListener);
}

/// Resolves a selector string to zero or more named fields.
pub trait FieldResolver: Send + Sync {
    fn named_fields(&self, selector: &str) -> Vec<Arc<dyn FormField>>;
}

/// A pre-resolved container of named fields (an element handle analogue:
/// "every named descendant of this node").
pub trait FieldGroup: Send + Sync {
    fn named_fields(&self) -> Vec<Arc<dyn FormField>>;
}

/// What a model can bind to, by explicit tag.
///
/// The selector and group forms key each discovered field by its own
/// name; the mapping form is the caller's explicit property-to-field
/// association. A later duplicate name replaces the earlier field.
pub enum BindTarget {
    /// A selector string, resolved through the supplied resolver.
    Selector {
        selector: String,
        resolver: Arc<dyn FieldResolver>,
    },
    /// A pre-resolved group; each field supplies its own name.
    Group(Arc<dyn FieldGroup>),
    /// An explicit property-to-field mapping.
    Mapping(FieldMap),
}

impl BindTarget {
    pub fn selector(selector: impl Into<String>, resolver: Arc<dyn FieldResolver>) -> Self {
        Self::Selector {
            selector: selector.into(),
            resolver,
        }
    }

    /// Resolve to the final property-to-field mapping. May be empty.
    pub(crate) fn resolve(self) -> FieldMap {
        match self {
            Self::Selector { selector, resolver } => keyed_by_name(resolver.named_fields(&selector)),
            Self::Group(group) => keyed_by_name(group.named_fields()),
            Self::Mapping(mapping) => mapping,
        }
    }
}

fn keyed_by_name(fields: Vec<Arc<dyn FormField>>) -> FieldMap {
    fields
        .into_iter()
        .map(|field| (field.name().to_owned(), field))
        .collect()
}

/// Coerce raw field text: numeric text becomes a number (integers kept
/// exact), anything else is trimmed.
pub(crate) fn coerce_field_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if float.is_finite() {
            return Value::from(float);
        }
    }
    Value::from(trimmed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_text_becomes_an_integer() {
        assert_eq!(coerce_field_value("42"), json!(42));
        assert_eq!(coerce_field_value(" -7 "), json!(-7));
    }

    #[test]
    fn decimal_text_becomes_a_float() {
        assert_eq!(coerce_field_value("2.5"), json!(2.5));
        assert_eq!(coerce_field_value("1e3"), json!(1000.0));
    }

    #[test]
    fn non_numeric_text_is_trimmed() {
        assert_eq!(coerce_field_value("  brisk  "), json!("brisk"));
        assert_eq!(coerce_field_value("NaN"), json!("NaN"));
        assert_eq!(coerce_field_value(""), json!(""));
    }
}

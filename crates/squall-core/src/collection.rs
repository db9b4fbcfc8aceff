// ── Item collections ────────────────────────────────────────────────────
//
// A shared, lock-guarded sequence with typed edit helpers. Background
// refresh (see `refresh`) periodically replaces the contents from a
// server endpoint.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

pub(crate) const LOCK_POISONED: &str = "collection lock poisoned";

/// A shared, ordered collection of items.
///
/// Clones share contents. Typed helpers cover the common edits; [`items`]
/// and [`items_mut`] expose the live sequence directly for anything else.
/// Dropping the last clone cancels any background refresh task.
///
/// [`items`]: Self::items
/// [`items_mut`]: Self::items_mut
pub struct Collection<T> {
    pub(crate) inner: Arc<CollectionInner<T>>,
}

pub(crate) struct CollectionInner<T> {
    pub(crate) items: RwLock<Vec<T>>,
    pub(crate) last_refresh: RwLock<Option<DateTime<Utc>>>,
    pub(crate) cancel: CancellationToken,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for CollectionInner<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<T> Collection<T> {
    /// An empty collection with no refresh behavior.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CollectionInner {
                items: RwLock::new(Vec::new()),
                last_refresh: RwLock::new(None),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Append one item.
    pub fn add(&self, item: T) {
        self.inner.items.write().expect(LOCK_POISONED).push(item);
    }

    /// Append every item the iterator yields, in order.
    pub fn insert(&self, items: impl IntoIterator<Item = T>) {
        self.inner.items.write().expect(LOCK_POISONED).extend(items);
    }

    /// Remove the first item equal to `item`. Returns whether one was
    /// found.
    pub fn remove(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        let mut items = self.inner.items.write().expect(LOCK_POISONED);
        let Some(index) = items.iter().position(|existing| existing == item) else {
            return false;
        };
        items.remove(index);
        true
    }

    /// Remove and return the item at `index`, or `None` past the end.
    pub fn remove_at(&self, index: usize) -> Option<T> {
        let mut items = self.inner.items.write().expect(LOCK_POISONED);
        (index < items.len()).then(|| items.remove(index))
    }

    /// Swap the first item equal to `old` for `new`, in place. Returns
    /// whether one was found.
    pub fn replace(&self, old: &T, new: T) -> bool
    where
        T: PartialEq,
    {
        let mut items = self.inner.items.write().expect(LOCK_POISONED);
        let Some(index) = items.iter().position(|existing| existing == old) else {
            return false;
        };
        items[index] = new;
        true
    }

    /// Drop every item.
    pub fn clear(&self) {
        self.inner.items.write().expect(LOCK_POISONED).clear();
    }

    pub fn len(&self) -> usize {
        self.inner.items.read().expect(LOCK_POISONED).len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.read().expect(LOCK_POISONED).is_empty()
    }

    /// Read access to the live sequence.
    pub fn items(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.inner.items.read().expect(LOCK_POISONED)
    }

    /// Write access to the live sequence, for edits the typed helpers
    /// don't cover. Holding the guard blocks refresh replacement.
    pub fn items_mut(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.inner.items.write().expect(LOCK_POISONED)
    }

    /// Clones of every item the predicate accepts, in order.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T>
    where
        T: Clone,
    {
        self.inner
            .items
            .read()
            .expect(LOCK_POISONED)
            .iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    /// Map every item and keep the truthy results, in order. Results that
    /// map to null, false, zero, or empty text drop out.
    pub fn select(&self, mapper: impl Fn(&T) -> Value) -> Vec<Value> {
        self.inner
            .items
            .read()
            .expect(LOCK_POISONED)
            .iter()
            .map(mapper)
            .filter(is_truthy)
            .collect()
    }

    /// When the contents last came back from the refresh endpoint.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_refresh.read().expect(LOCK_POISONED)
    }

    /// Permanently stop the background refresh task, if one is running.
    pub fn stop_refresh(&self) {
        self.inner.cancel.cancel();
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        // NaN and both zeros read false.
        Value::Number(number) => number.as_f64().is_some_and(|number| number.abs() > 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn insert_keeps_iterator_order() {
        let collection = Collection::new();
        collection.add("first".to_owned());
        collection.insert(["second".to_owned(), "third".to_owned()]);

        assert_eq!(*collection.items(), ["first", "second", "third"]);
    }

    #[test]
    fn remove_drops_the_first_match_only() {
        let collection = Collection::new();
        collection.insert([1, 2, 1, 3]);

        assert!(collection.remove(&1));
        assert_eq!(*collection.items(), [2, 1, 3]);
        assert!(!collection.remove(&9));
    }

    #[test]
    fn remove_at_checks_bounds() {
        let collection = Collection::new();
        collection.insert(["a".to_owned(), "b".to_owned()]);

        assert_eq!(collection.remove_at(1), Some("b".to_owned()));
        assert_eq!(collection.remove_at(5), None);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn replace_swaps_in_place() {
        let collection = Collection::new();
        collection.insert([10, 20, 30]);

        assert!(collection.replace(&20, 25));
        assert_eq!(*collection.items(), [10, 25, 30]);
        assert!(!collection.replace(&99, 1));
    }

    #[test]
    fn filter_clones_matching_items() {
        let collection = Collection::new();
        collection.insert([1, 2, 3, 4]);

        assert_eq!(collection.filter(|item| item % 2 == 0), [2, 4]);
    }

    #[test]
    fn select_keeps_only_truthy_results() {
        let collection = Collection::new();
        collection.insert([0, 1, 2, 3]);

        let picked = collection.select(|item| {
            if item % 2 == 0 {
                json!(*item)
            } else {
                Value::Null
            }
        });

        // Odd items map to null; zero maps to a falsy number. Both drop.
        assert_eq!(picked, [json!(2)]);
    }

    #[test]
    fn select_drops_empty_text_and_false() {
        let collection = Collection::new();
        collection.insert(["keep".to_owned(), String::new()]);

        let picked = collection.select(|item| Value::from(item.as_str()));
        assert_eq!(picked, [json!("keep")]);
    }

    #[test]
    fn items_mut_edits_the_live_sequence() {
        let collection = Collection::new();
        collection.insert([1, 2, 3]);

        collection.items_mut().retain(|item| item % 2 == 1);
        assert_eq!(*collection.items(), [1, 3]);
    }

    #[test]
    fn clear_empties_the_collection() {
        let collection = Collection::new();
        collection.insert([1, 2]);
        assert!(!collection.is_empty());

        collection.clear();
        assert!(collection.is_empty());
        assert_eq!(collection.len(), 0);
    }
}

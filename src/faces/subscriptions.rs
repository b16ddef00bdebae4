//! Two-tier listener registry.
//!
//! Exact listeners hear about one face key; prefix listeners hear about
//! every key that starts with their prefix. Each registration gets its own
//! id, so the same closure can be registered under several keys and
//! removing one registration never touches the others.
//!
//! Listener lists are kept in insertion order, and a list that becomes
//! empty is removed from its map. Prefixes are visited in lexicographic
//! order, so a crag prefix runs before the area prefixes inside it.

use super::keys::FaceKey;
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Zero-argument change callback.
pub type Listener = Rc<dyn Fn()>;

/// Identifies one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Which map a registration lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Exact,
    Prefix,
}

type ListenerList = Vec<(ListenerId, Listener)>;

/// One registration captured for a fan-out.
///
/// Carries enough to ask the registry whether it is still live right
/// before the listener is invoked.
#[derive(Clone)]
pub struct Registered {
    pub tier: Tier,
    pub key: String,
    pub id: ListenerId,
    pub listener: Listener,
}

/// Exact and prefix listener maps.
#[derive(Default)]
pub struct SubscriptionRegistry {
    next_id: u64,
    exact: BTreeMap<FaceKey, ListenerList>,
    prefix: BTreeMap<String, ListenerList>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register a listener for one exact key.
    pub fn add_exact(&mut self, key: FaceKey, listener: Listener) -> ListenerId {
        let id = self.allocate_id();
        self.exact.entry(key).or_default().push((id, listener));
        id
    }

    /// Register a listener for every key starting with `prefix`.
    pub fn add_prefix(&mut self, prefix: String, listener: Listener) -> ListenerId {
        let id = self.allocate_id();
        self.prefix.entry(prefix).or_default().push((id, listener));
        id
    }

    /// Remove one registration. Returns false if it was already gone.
    pub fn remove(&mut self, tier: Tier, key: &str, id: ListenerId) -> bool {
        match tier {
            Tier::Exact => remove_listener(&mut self.exact, key, id),
            Tier::Prefix => remove_listener(&mut self.prefix, key, id),
        }
    }

    /// Whether a registration has not been removed yet.
    pub fn contains(&self, tier: Tier, key: &str, id: ListenerId) -> bool {
        let list = match tier {
            Tier::Exact => self.exact.get(key),
            Tier::Prefix => self.prefix.get(key),
        };
        list.is_some_and(|list| list.iter().any(|(listener_id, _)| *listener_id == id))
    }

    /// Snapshot of the listeners registered exactly under `key`.
    pub fn exact_listeners(&self, key: &str) -> Vec<Registered> {
        self.exact
            .get(key)
            .map(|list| snapshot(Tier::Exact, key, list).collect())
            .unwrap_or_default()
    }

    /// Snapshot of the listeners whose prefix `key` starts with.
    ///
    /// Matching uses only the key's string form; the key does not need to
    /// be known to the registry.
    pub fn prefix_listeners_for(&self, key: &str) -> Vec<Registered> {
        self.prefix
            .iter()
            .filter(|(prefix, _)| key.starts_with(prefix.as_str()))
            .flat_map(|(prefix, list)| snapshot(Tier::Prefix, prefix, list))
            .collect()
    }

    /// Keys with at least one exact listener that start with `prefix`.
    pub fn exact_keys_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a FaceKey> {
        self.exact.keys().filter(move |key| key.starts_with(prefix))
    }

    /// Number of live exact registrations.
    pub fn exact_count(&self) -> usize {
        self.exact.values().map(Vec::len).sum()
    }

    /// Number of live prefix registrations.
    pub fn prefix_count(&self) -> usize {
        self.prefix.values().map(Vec::len).sum()
    }

    /// Number of keys and prefixes that currently have listeners.
    pub fn entry_count(&self) -> usize {
        self.exact.len() + self.prefix.len()
    }
}

fn snapshot<'a>(
    tier: Tier,
    key: &'a str,
    list: &'a ListenerList,
) -> impl Iterator<Item = Registered> + 'a {
    list.iter().map(move |(id, listener)| Registered {
        tier,
        key: key.to_string(),
        id: *id,
        listener: listener.clone(),
    })
}

fn remove_listener<K>(map: &mut BTreeMap<K, ListenerList>, key: &str, id: ListenerId) -> bool
where
    K: Borrow<str> + Ord,
{
    let Some(list) = map.get_mut(key) else {
        return false;
    };
    let before = list.len();
    list.retain(|(listener_id, _)| *listener_id != id);
    let removed = list.len() != before;
    if list.is_empty() {
        map.remove(key);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, Listener) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, Rc::new(move || c.set(c.get() + 1)))
    }

    #[test]
    fn test_empty_lists_are_removed() {
        let mut registry = SubscriptionRegistry::new();
        let (_, listener) = counter();

        let id = registry.add_exact(FaceKey::from("c1/a1/f1"), listener.clone());
        let pid = registry.add_prefix("c1/".to_string(), listener);
        assert_eq!(registry.entry_count(), 2);

        assert!(registry.remove(Tier::Exact, "c1/a1/f1", id));
        assert!(registry.remove(Tier::Prefix, "c1/", pid));
        assert_eq!(registry.entry_count(), 0);
        assert_eq!(registry.exact_count(), 0);
        assert_eq!(registry.prefix_count(), 0);
    }

    #[test]
    fn test_remove_only_touches_one_registration() {
        let mut registry = SubscriptionRegistry::new();
        let (_, listener) = counter();

        let first = registry.add_exact(FaceKey::from("c1/a1/f1"), listener.clone());
        registry.add_exact(FaceKey::from("c1/a1/f1"), listener.clone());
        registry.add_exact(FaceKey::from("c1/a1/f2"), listener);

        assert!(registry.remove(Tier::Exact, "c1/a1/f1", first));
        assert_eq!(registry.exact_listeners("c1/a1/f1").len(), 1);
        assert_eq!(registry.exact_listeners("c1/a1/f2").len(), 1);

        // Second removal of the same id is a no-op
        assert!(!registry.remove(Tier::Exact, "c1/a1/f1", first));
        // Wrong tier is a no-op
        assert!(!registry.remove(Tier::Prefix, "c1/a1/f1", first));
    }

    #[test]
    fn test_prefix_matching_uses_key_string() {
        let mut registry = SubscriptionRegistry::new();
        let (_, listener) = counter();
        registry.add_prefix("c1/".to_string(), listener.clone());
        registry.add_prefix("c1/a1/".to_string(), listener.clone());
        registry.add_prefix("c2/".to_string(), listener);

        assert_eq!(registry.prefix_listeners_for("c1/a1/f1").len(), 2);
        assert_eq!(registry.prefix_listeners_for("c1/a2/f1").len(), 1);
        assert_eq!(registry.prefix_listeners_for("c3/a1/f1").len(), 0);
    }

    #[test]
    fn test_listeners_keep_insertion_order() {
        let mut registry = SubscriptionRegistry::new();
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));
        for n in 0..3 {
            let order = order.clone();
            registry.add_exact(FaceKey::from("k"), Rc::new(move || order.borrow_mut().push(n)));
        }

        for entry in registry.exact_listeners("k") {
            (entry.listener)();
        }
        assert_eq!(*std::cell::RefCell::borrow(&order), vec![0, 1, 2]);
    }

    #[test]
    fn test_prefixes_are_visited_in_lexicographic_order() {
        let mut registry = SubscriptionRegistry::new();
        let (_, listener) = counter();
        registry.add_prefix("c1/a1/".to_string(), listener.clone());
        registry.add_prefix("c1/".to_string(), listener.clone());
        registry.add_prefix("c".to_string(), listener);

        let prefixes: Vec<String> = registry
            .prefix_listeners_for("c1/a1/f1")
            .into_iter()
            .map(|entry| entry.key)
            .collect();
        assert_eq!(prefixes, vec!["c", "c1/", "c1/a1/"]);
    }

    #[test]
    fn test_contains_tracks_removal() {
        let mut registry = SubscriptionRegistry::new();
        let (_, listener) = counter();
        let a = registry.add_exact(FaceKey::from("c1/a1/f1"), listener.clone());
        let b = registry.add_exact(FaceKey::from("c1/a1/f1"), listener);

        let snapshot = registry.exact_listeners("c1/a1/f1");
        assert_eq!(snapshot.len(), 2);
        assert!(registry.remove(Tier::Exact, "c1/a1/f1", b));

        assert!(registry.contains(Tier::Exact, "c1/a1/f1", a));
        assert!(!registry.contains(snapshot[1].tier, &snapshot[1].key, snapshot[1].id));
        assert!(!registry.contains(Tier::Prefix, "c1/a1/f1", a));
    }
}

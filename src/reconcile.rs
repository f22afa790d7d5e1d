//! Keyed-collection reconciliation.
//!
//! Environment variables, secrets, storages, and ports are unordered sets
//! keyed by a natural key. Updates never assume positional stability: the
//! plan and state memberships are diffed by key, producing the create/
//! update/delete sets the domain services act on.

use std::collections::HashMap;
use std::hash::Hash;

/// The outcome of diffing a keyed collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedDiff<T> {
    /// Present in the plan, absent from state.
    pub to_create: Vec<T>,
    /// Present in both, but with a different value in the plan.
    pub to_update: Vec<T>,
    /// Present in state, absent from the plan.
    pub to_delete: Vec<T>,
}

impl<T> Default for KeyedDiff<T> {
    fn default() -> Self {
        Self {
            to_create: Vec::new(),
            to_update: Vec::new(),
            to_delete: Vec::new(),
        }
    }
}

impl<T> KeyedDiff<T> {
    /// Whether the diff contains no work.
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Diff `plan` against `state` by the key extracted with `key_of`.
///
/// Order-independent: only membership and per-key equality matter.
pub fn diff_by_key<T, K, F>(state: &[T], plan: &[T], key_of: F) -> KeyedDiff<T>
where
    T: Clone + PartialEq,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let state_by_key: HashMap<K, &T> = state.iter().map(|item| (key_of(item), item)).collect();
    let mut diff = KeyedDiff::default();
    let mut seen = Vec::with_capacity(plan.len());

    for item in plan {
        let key = key_of(item);
        match state_by_key.get(&key) {
            None => diff.to_create.push(item.clone()),
            Some(existing) if *existing != item => diff.to_update.push(item.clone()),
            Some(_) => {}
        }
        seen.push(key);
    }

    for item in state {
        if !seen.contains(&key_of(item)) {
            diff.to_delete.push(item.clone());
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Var {
        key: String,
        value: String,
    }

    fn var(key: &str, value: &str) -> Var {
        Var {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn add_update_remove_by_key() {
        let state = vec![var("key1", "v1"), var("key2", "v2")];
        let plan = vec![var("key2", "v2-updated"), var("key3", "v3")];

        let diff = diff_by_key(&state, &plan, |v| v.key.clone());

        assert_eq!(diff.to_create, vec![var("key3", "v3")]);
        assert_eq!(diff.to_update, vec![var("key2", "v2-updated")]);
        assert_eq!(diff.to_delete, vec![var("key1", "v1")]);
    }

    #[test]
    fn order_is_not_significant() {
        let state = vec![var("a", "1"), var("b", "2")];
        let plan = vec![var("b", "2"), var("a", "1")];

        let diff = diff_by_key(&state, &plan, |v| v.key.clone());
        assert!(diff.is_empty());
    }

    #[test]
    fn empty_state_creates_everything() {
        let plan = vec![var("a", "1")];
        let diff = diff_by_key(&[], &plan, |v| v.key.clone());
        assert_eq!(diff.to_create.len(), 1);
        assert!(diff.to_update.is_empty());
        assert!(diff.to_delete.is_empty());
    }

    #[test]
    fn empty_plan_deletes_everything() {
        let state = vec![var("a", "1"), var("b", "2")];
        let diff = diff_by_key(&state, &[], |v| v.key.clone());
        assert_eq!(diff.to_delete.len(), 2);
    }
}

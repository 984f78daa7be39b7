//! The parameter cache: one keyed map shared by names and path prefixes.
//!
//! All resolution state funnels through this map. Keys are either fully
//! qualified parameter names or path prefixes; values are tagged so readers
//! match the three states exhaustively instead of probing. The cache is
//! owned exclusively by the resolution worker, whose strictly sequential
//! execution is the concurrency control, so no locking is needed here.

use std::collections::HashMap;

use provar_types::{ParameterEntry, ParameterName, PathPrefix, ResolveError};

/// State remembered for one cache key.
#[derive(Debug, Clone)]
pub enum CacheSlot {
    /// A resolved parameter.
    Entry(ParameterEntry),
    /// Resolution of this name failed; re-resolution re-raises the same
    /// error instead of re-prompting.
    Failed(ResolveError),
    /// This prefix has been fully enumerated. Absence of a name under it is
    /// authoritative, not missing data.
    Loaded,
}

/// Monotonic mapping from parameter names and path prefixes to their state.
///
/// Keys are write-once: the first write wins and nothing is ever evicted for
/// the lifetime of the process. A prefix key appears only after every entry
/// under it has been written.
#[derive(Debug, Default)]
pub struct ParameterCache {
    slots: HashMap<String, CacheSlot>,
}

impl ParameterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, key: &str) -> Option<&CacheSlot> {
        self.slots.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    pub fn insert_entry(&mut self, entry: ParameterEntry) {
        let key = entry.name.as_str().to_string();
        self.insert_once(key, CacheSlot::Entry(entry));
    }

    pub fn record_failure(&mut self, name: &ParameterName, error: ResolveError) {
        self.insert_once(name.as_str().to_string(), CacheSlot::Failed(error));
    }

    pub fn mark_loaded(&mut self, prefix: &PathPrefix) {
        self.insert_once(prefix.as_str().to_string(), CacheSlot::Loaded);
    }

    fn insert_once(&mut self, key: String, slot: CacheSlot) {
        self.slots.entry(key).or_insert(slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_write_wins() {
        let mut cache = ParameterCache::new();
        let name = ParameterName::new("/app/key");
        cache.insert_entry(ParameterEntry::plain(name.clone(), "first"));
        cache.insert_entry(ParameterEntry::plain(name.clone(), "second"));

        match cache.slot("/app/key") {
            Some(CacheSlot::Entry(entry)) => assert_eq!(entry.value, "first"),
            other => panic!("expected entry slot, got {:?}", other),
        }
    }

    #[test]
    fn failure_does_not_replace_an_entry() {
        let mut cache = ParameterCache::new();
        let name = ParameterName::new("/app/key");
        cache.insert_entry(ParameterEntry::plain(name.clone(), "value"));
        cache.record_failure(&name, ResolveError::MissingValue { name: name.clone() });

        assert!(matches!(cache.slot("/app/key"), Some(CacheSlot::Entry(_))));
    }

    #[test]
    fn prefix_marker_and_entries_share_the_map() {
        let mut cache = ParameterCache::new();
        let name = ParameterName::new("/app/key");
        cache.insert_entry(ParameterEntry::plain(name.clone(), "value"));
        cache.mark_loaded(&name.parent_prefix());

        assert!(matches!(cache.slot("/app/key"), Some(CacheSlot::Entry(_))));
        assert!(matches!(cache.slot("/app"), Some(CacheSlot::Loaded)));
        assert!(cache.slot("/other").is_none());
    }
}

//! Session storage for session-scoped objects

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::value::Instance;

/// Storage that outlives a single request
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Instance>;
    fn put(&self, key: &str, value: Instance);
    fn remove(&self, key: &str) -> Option<Instance>;
}

/// Session store kept in process memory
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: Mutex<FxHashMap<String, Instance>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> Option<Instance> {
        self.entries.lock().get(key).cloned()
    }

    fn put(&self, key: &str, value: Instance) {
        self.entries.lock().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) -> Option<Instance> {
        self.entries.lock().remove(key)
    }
}

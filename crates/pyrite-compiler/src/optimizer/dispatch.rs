//! Dispatch by key with an optional fallback

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Handler table keyed by a dispatch key
#[derive(Debug, Clone)]
pub struct Dispatcher<K, H> {
    handlers: HashMap<K, H>,
    fallback: Option<H>,
}

impl<K: Eq + Hash, H> Dispatcher<K, H> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            fallback: None,
        }
    }

    pub fn with_handler(mut self, key: K, handler: H) -> Self {
        self.handlers.insert(key, handler);
        self
    }

    pub fn with_fallback(mut self, handler: H) -> Self {
        self.fallback = Some(handler);
        self
    }

    pub fn register(&mut self, key: K, handler: H) {
        self.handlers.insert(key, handler);
    }

    /// Handler for `key`, the fallback if none is registered
    pub fn lookup<Q>(&self, key: &Q) -> Option<&H>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.handlers.get(key).or(self.fallback.as_ref())
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.handlers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<K: Eq + Hash, H> Default for Dispatcher<K, H> {
    fn default() -> Self {
        Self::new()
    }
}

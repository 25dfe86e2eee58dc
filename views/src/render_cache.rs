use crate::{Result, View};
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

/**
Memoizes resolved views by logical name for the lifetime of an
application. Entries are never evicted.
*/
#[derive(Debug, Default)]
pub struct RenderCache(RwLock<HashMap<String, Arc<View>>>);

impl RenderCache {
    /// builds an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// the cached view for this name, if any
    pub fn get(&self, name: &str) -> Option<Arc<View>> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// caches a view under a name, replacing any previous entry
    pub fn insert(&self, name: impl Into<String>, view: Arc<View>) {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), view);
    }

    /// the number of cached views
    pub fn len(&self) -> usize {
        self.0.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// true if nothing has been cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// drops every cached view
    pub fn clear(&self) {
        self.0.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /**
    Returns the cached view for `name` when `enabled`, otherwise calls
    `resolve`. A successfully resolved view is cached when `enabled`.
    Failures are never cached.
    */
    pub fn get_or_resolve<F>(&self, name: &str, enabled: bool, resolve: F) -> Result<Arc<View>>
    where
        F: FnOnce() -> Result<View>,
    {
        if enabled {
            if let Some(view) = self.get(name) {
                log::debug!("render cache hit for {name}");
                return Ok(view);
            }
        }

        let view = Arc::new(resolve()?);

        if enabled {
            log::debug!("caching view {name}");
            self.insert(name, Arc::clone(&view));
        }

        Ok(view)
    }
}

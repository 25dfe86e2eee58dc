use crate::BoxError;
use serde_json::Value;
use std::{
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};

/**
A template engine: renders the file at `path` with the merged render
options.

Any `Fn(&Path, &Value) -> Result<String, BoxError>` is an engine.
*/
pub trait Engine: Send + Sync + 'static {
    /// render the template at `path`
    fn render(&self, path: &Path, options: &Value) -> Result<String, BoxError>;
}

impl<F> Engine for F
where
    F: Fn(&Path, &Value) -> Result<String, BoxError> + Send + Sync + 'static,
{
    fn render(&self, path: &Path, options: &Value) -> Result<String, BoxError> {
        self(path, options)
    }
}

/**
Supplies engines for extensions that have not been registered.

The extension is passed in normalized form, with a leading dot.
Returning `None` means that no usable engine exists.
*/
pub trait EngineLoader: Send + Sync + 'static {
    /// find an engine for this extension
    fn load(&self, extension: &str) -> Option<Arc<dyn Engine>>;
}

impl<F> EngineLoader for F
where
    F: Fn(&str) -> Option<Arc<dyn Engine>> + Send + Sync + 'static,
{
    fn load(&self, extension: &str) -> Option<Arc<dyn Engine>> {
        self(extension)
    }
}

/// ensures an extension starts with a `.`
///
/// ```
/// assert_eq!(espalier_views::normalize_extension("hbs"), ".hbs");
/// assert_eq!(espalier_views::normalize_extension(".hbs"), ".hbs");
/// ```
pub fn normalize_extension(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    }
}

/**
The extension → engine table owned by an application.

A table may have a parent. Lookups that miss locally fall through to
the parent, and registration always writes locally, so a mounted
application sees its parent's engines until it registers its own.
*/
#[derive(Default)]
pub struct Engines {
    own: RwLock<HashMap<String, Arc<dyn Engine>>>,
    parent: RwLock<Option<Arc<Engines>>>,
}

impl Engines {
    /// builds an empty table with no parent
    pub fn new() -> Self {
        Self::default()
    }

    /// registers an engine for an extension, with or without the
    /// leading dot
    pub fn register(&self, extension: &str, engine: impl Engine) {
        self.register_arc(extension, Arc::new(engine));
    }

    /// registers an already shared engine
    pub fn register_arc(&self, extension: &str, engine: Arc<dyn Engine>) {
        let extension = normalize_extension(extension);
        log::debug!("registered view engine for {extension}");
        self.own
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(extension, engine);
    }

    /// looks up the engine for an extension, here or in any parent
    pub fn get(&self, extension: &str) -> Option<Arc<dyn Engine>> {
        let extension = normalize_extension(extension);
        if let Some(engine) = self
            .own
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&extension)
        {
            return Some(Arc::clone(engine));
        }

        let parent = self
            .parent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        parent.and_then(|parent| parent.get(&extension))
    }

    /// true if an engine is available for this extension
    pub fn contains(&self, extension: &str) -> bool {
        self.get(extension).is_some()
    }

    /// the extensions registered directly on this table, sorted
    pub fn extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self
            .own
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        extensions.sort();
        extensions
    }

    /// links this table to a parent table for fallthrough lookups
    pub fn set_parent(&self, parent: Arc<Engines>) {
        *self.parent.write().unwrap_or_else(PoisonError::into_inner) = Some(parent);
    }
}

impl Debug for Engines {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engines")
            .field("extensions", &self.extensions())
            .field(
                "parent",
                &self
                    .parent
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(_: &Path, _: &Value) -> Result<String, BoxError> {
        Ok(String::from("first"))
    }

    fn second(_: &Path, _: &Value) -> Result<String, BoxError> {
        Ok(String::from("second"))
    }

    fn render(engine: Arc<dyn Engine>) -> String {
        engine.render(Path::new("x"), &Value::Null).unwrap()
    }

    #[test]
    fn extensions_are_normalized() {
        let engines = Engines::new();
        engines.register("txt", first);
        assert!(engines.contains(".txt"));
        assert!(engines.contains("txt"));
        assert_eq!(engines.extensions(), [".txt"]);
    }

    #[test]
    fn children_fall_through_to_parents() {
        let parent = Arc::new(Engines::new());
        parent.register(".a", first);

        let child = Engines::new();
        child.set_parent(Arc::clone(&parent));
        assert_eq!(render(child.get(".a").unwrap()), "first");

        child.register(".a", second);
        assert_eq!(render(child.get(".a").unwrap()), "second");
        assert_eq!(render(parent.get(".a").unwrap()), "first");

        parent.register(".b", second);
        assert!(child.contains(".b"));
        assert!(child.extensions().contains(&String::from(".a")));
        assert!(!child.extensions().contains(&String::from(".b")));
    }
}

use crate::{
    Error, Result, Setting, Settings,
    settings::VIEW_CACHE,
};
use espalier_views::{Engine, EngineLoader, Engines, RenderCache, ViewResolver};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{
    fmt::{self, Debug, Formatter},
    sync::{Arc, PoisonError, RwLock},
};

struct AppInner {
    settings: Arc<Settings>,
    engines: Arc<Engines>,
    cache: RenderCache,
    locals: RwLock<Map<String, Value>>,
    mountpath: RwLock<String>,
    parent: RwLock<Option<App>>,
    loader: RwLock<Option<Arc<dyn EngineLoader>>>,
}

/**
An application: a settings store, a set of view engines, a render
cache and application-wide template locals.

`App` is a cheap handle; clones share the same state.

```
use espalier::App;
# fn main() -> espalier::Result<()> {
let app = App::new();
app.set("subdomain offset", 3)?;
assert_eq!(app.settings().subdomain_offset(), 3);

let admin = App::new();
app.mount("/admin", &admin);
assert_eq!(admin.path(), "/admin");
# Ok(()) }
```
*/
#[derive(Clone)]
pub struct App(Arc<AppInner>);

impl Debug for App {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("settings", &self.0.settings)
            .field("engines", &self.0.engines)
            .field("mountpath", &self.mountpath())
            .field("render_cache_len", &self.0.cache.len())
            .finish_non_exhaustive()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// a new application with default settings
    pub fn new() -> Self {
        Self(Arc::new(AppInner {
            settings: Arc::new(Settings::with_defaults()),
            engines: Arc::new(Engines::new()),
            cache: RenderCache::new(),
            locals: RwLock::new(Map::new()),
            mountpath: RwLock::new(String::from("/")),
            parent: RwLock::new(None),
            loader: RwLock::new(None),
        }))
    }

    /// this application's settings store
    pub fn settings(&self) -> &Settings {
        &self.0.settings
    }

    /// reads a setting, see [`Settings::get`]
    pub fn get(&self, key: &str) -> Option<Setting> {
        self.0.settings.get(key)
    }

    /// writes a setting, see [`Settings::set`]
    pub fn set(&self, key: &str, value: impl Into<Setting>) -> Result<&Self> {
        self.0.settings.set(key, value)?;
        Ok(self)
    }

    /// sets `key` to `true`
    pub fn enable(&self, key: &str) -> Result<&Self> {
        self.set(key, true)
    }

    /// sets `key` to `false`
    pub fn disable(&self, key: &str) -> Result<&Self> {
        self.set(key, false)
    }

    /// whether `key` is set to a truthy value
    pub fn enabled(&self, key: &str) -> bool {
        self.0.settings.enabled(key)
    }

    /// whether `key` is unset or falsy
    pub fn disabled(&self, key: &str) -> bool {
        self.0.settings.disabled(key)
    }

    /**
    registers a render engine for files with `extension`. The leading
    dot is optional.
    */
    pub fn engine(&self, extension: &str, engine: impl Engine) -> &Self {
        self.0.engines.register(extension, engine);
        self
    }

    /// the engines registered on this application and its ancestors
    pub fn engines(&self) -> &Arc<Engines> {
        &self.0.engines
    }

    /**
    sets the collaborator consulted for extensions with no registered
    engine. Mounted applications without their own loader use their
    parent's.
    */
    pub fn with_engine_loader(&self, loader: impl EngineLoader) -> &Self {
        *self.0.loader.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(loader));
        self
    }

    fn engine_loader(&self) -> Option<Arc<dyn EngineLoader>> {
        let own = self
            .0
            .loader
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        own.or_else(|| self.parent().and_then(|parent| parent.engine_loader()))
    }

    /// a copy of the application-wide template locals
    pub fn locals(&self) -> Map<String, Value> {
        self.0
            .locals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// sets an application-wide template local
    pub fn set_local(&self, key: &str, value: impl Serialize) -> Result<&Self> {
        let value = serde_json::to_value(value)?;
        self.0
            .locals
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(self)
    }

    /**
    Mounts `child` beneath this application at `path`.

    The child's settings and engines fall through to this
    application's. If the child never set `trust proxy`, it adopts
    this application's policy.
    */
    pub fn mount(&self, path: &str, child: &App) -> &Self {
        *child.0.mountpath.write().unwrap_or_else(PoisonError::into_inner) = path.to_string();
        *child.0.parent.write().unwrap_or_else(PoisonError::into_inner) = Some(self.clone());
        child.0.settings.inherit_from(Arc::clone(&self.0.settings));
        child.0.engines.set_parent(Arc::clone(&self.0.engines));
        log::debug!("mounted app at {path}");
        self
    }

    /// the path this application was mounted at, `/` if never mounted
    pub fn mountpath(&self) -> String {
        self.0
            .mountpath
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// the application this one is mounted on
    pub fn parent(&self) -> Option<App> {
        self.0
            .parent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// the full mount path from the root application, empty for the root
    pub fn path(&self) -> String {
        match self.parent() {
            Some(parent) => parent.path() + &self.mountpath(),
            None => String::new(),
        }
    }

    /// the cache of resolved views
    pub fn render_cache(&self) -> &RenderCache {
        &self.0.cache
    }

    /// a view resolver configured from the `views` and `view engine`
    /// settings
    pub fn view_resolver(&self) -> ViewResolver {
        let settings = self.settings();
        let mut resolver =
            ViewResolver::new(Arc::clone(&self.0.engines)).with_roots(settings.view_roots());

        if let Some(extension) = settings.view_engine() {
            resolver = resolver.with_default_engine(extension);
        }

        if let Some(loader) = self.engine_loader() {
            resolver = resolver.with_loader(loader);
        }

        resolver
    }

    /**
    Renders the view `name`.

    `options` must serialize to a map (or to nothing, like `()`). It
    is merged over the application locals and handed to the engine.
    A boolean `cache` option overrides the `view cache` setting for
    this call. When caching, a view resolved once is reused for later
    renders of the same name.
    */
    pub fn render(&self, name: &str, options: impl Serialize) -> Result<String> {
        let mut merged = self.locals();
        match serde_json::to_value(options)? {
            Value::Object(options) => merged.extend(options),
            Value::Null => {}
            Value::Bool(_) => return Err(Error::RenderOptions("a boolean")),
            Value::Number(_) => return Err(Error::RenderOptions("a number")),
            Value::String(_) => return Err(Error::RenderOptions("a string")),
            Value::Array(_) => return Err(Error::RenderOptions("an array")),
        }

        let cache = match merged.get("cache") {
            Some(Value::Bool(cache)) => *cache,
            _ => self.enabled(VIEW_CACHE),
        };
        merged.insert(String::from("cache"), Value::Bool(cache));

        let view = self
            .0
            .cache
            .get_or_resolve(name, cache, || self.view_resolver().resolve(name))?;

        log::trace!("rendering {}", view.path().display());
        Ok(view.render(&Value::Object(merged))?)
    }
}

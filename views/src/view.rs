use crate::{BoxError, Engine, EngineLoader, Engines, Error, Result, normalize_extension};
use serde_json::Value;
use std::{
    any::Any,
    ffi::OsStr,
    fmt::{self, Debug, Formatter},
    fs,
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
    sync::Arc,
};

/**
A resolved template: a file on disk bound to the engine for its
extension. Views are immutable once resolved.
*/
#[derive(Clone)]
pub struct View {
    name: String,
    extension: String,
    roots: Vec<PathBuf>,
    path: PathBuf,
    engine: Arc<dyn Engine>,
}

impl View {
    /// the logical name this view was resolved from
    pub fn name(&self) -> &str {
        &self.name
    }

    /// the extension, with a leading dot, that selected the engine
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// the roots that were searched
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// the absolute path of the template file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// the bound engine
    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    /**
    Renders this view with the given options.

    Errors returned by the engine, and panics raised inside it, are
    both surfaced as [`Error::EngineRuntime`]; neither crosses this
    boundary any other way.
    */
    pub fn render(&self, options: &Value) -> Result<String> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.engine.render(&self.path, options))) {
            Ok(Ok(rendered)) => Ok(rendered),
            Ok(Err(error)) => Err(Error::EngineRuntime(error)),
            Err(panic) => {
                let message = panic_message(panic);
                log::warn!("view engine panicked rendering {:?}: {message}", self.path);
                Err(Error::EngineRuntime(BoxError::from(message)))
            }
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        String::from(*s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("view engine panicked")
    }
}

impl Debug for View {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("name", &self.name)
            .field("extension", &self.extension)
            .field("roots", &self.roots)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/**
Finds template files for logical view names.

A resolver is cheap to build; an application builds one per render
from its current settings.
*/
#[derive(Clone)]
pub struct ViewResolver {
    roots: Vec<PathBuf>,
    default_engine: Option<String>,
    engines: Arc<Engines>,
    loader: Option<Arc<dyn EngineLoader>>,
}

impl ViewResolver {
    /// builds a resolver with no roots that binds engines from
    /// `engines`
    pub fn new(engines: Arc<Engines>) -> Self {
        Self {
            roots: Vec::new(),
            default_engine: None,
            engines,
            loader: None,
        }
    }

    /// appends a root directory to search
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// appends several root directories to search, in order
    pub fn with_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.roots.extend(roots.into_iter().map(Into::into));
        self
    }

    /// sets the extension used for names without one, with or
    /// without a leading dot
    pub fn with_default_engine(mut self, extension: impl Into<String>) -> Self {
        self.default_engine = Some(extension.into());
        self
    }

    /// sets a loader consulted for extensions with no registered
    /// engine. Loaded engines are registered for later lookups.
    pub fn with_loader(mut self, loader: Arc<dyn EngineLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// the roots that will be searched, in order
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// resolves a logical view name to a [`View`]
    pub fn resolve(&self, name: &str) -> Result<View> {
        let name_extension = Path::new(name)
            .extension()
            .and_then(OsStr::to_str)
            .filter(|extension| !extension.is_empty())
            .map(normalize_extension);

        let (extension, file_name) = match (name_extension, &self.default_engine) {
            (Some(extension), _) => (extension, name.to_string()),
            (None, Some(default_engine)) => {
                let extension = normalize_extension(default_engine);
                let file_name = format!("{name}{extension}");
                (extension, file_name)
            }
            (None, None) => return Err(Error::NoExtension),
        };

        let engine = self.bind_engine(&extension)?;

        let path = self
            .lookup(&file_name, &extension)?
            .ok_or_else(|| Error::ViewNotFound {
                name: name.to_string(),
                roots: self.roots.clone(),
            })?;

        log::debug!("resolved view {name} to {path:?}");

        Ok(View {
            name: name.to_string(),
            extension,
            roots: self.roots.clone(),
            path,
            engine,
        })
    }

    fn bind_engine(&self, extension: &str) -> Result<Arc<dyn Engine>> {
        if let Some(engine) = self.engines.get(extension) {
            return Ok(engine);
        }

        let engine = self
            .loader
            .as_ref()
            .and_then(|loader| loader.load(extension))
            .ok_or_else(|| Error::EngineLoad(extension.to_string()))?;

        log::debug!("loaded view engine for {extension}");
        self.engines.register_arc(extension, Arc::clone(&engine));
        Ok(engine)
    }

    fn lookup(&self, file_name: &str, extension: &str) -> Result<Option<PathBuf>> {
        let cwd = std::env::current_dir()?;

        for root in &self.roots {
            let location = cwd.join(root).join(file_name);
            let (Some(dir), Some(file)) = (location.parent(), location.file_name()) else {
                continue;
            };

            if let Some(path) = resolve_in(dir, file, extension) {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }
}

fn resolve_in(dir: &Path, file: &OsStr, extension: &str) -> Option<PathBuf> {
    let path = dir.join(file);
    if is_file(&path) {
        return Some(path);
    }

    let file = file.to_string_lossy();
    let stem = file
        .strip_suffix(extension)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(&*file);
    let path = dir.join(stem).join(format!("index{extension}"));
    if is_file(&path) {
        return Some(path);
    }

    None
}

fn is_file(path: &Path) -> bool {
    let found = fs::metadata(path).is_ok_and(|metadata| metadata.is_file());
    log::trace!("{path:?} {}", if found { "found" } else { "not found" });
    found
}

impl Debug for ViewResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewResolver")
            .field("roots", &self.roots)
            .field("default_engine", &self.default_engine)
            .field("engines", &self.engines)
            .field("loader", &self.loader.is_some())
            .finish()
    }
}

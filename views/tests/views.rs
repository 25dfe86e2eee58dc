use espalier_views::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::{
    fs,
    path::Path,
    result::Result,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tempfile::TempDir;

fn echo(path: &Path, options: &Value) -> Result<String, BoxError> {
    let template = fs::read_to_string(path)?;
    let name = options["name"].as_str().unwrap_or("nobody");
    Ok(template.replace("{name}", name))
}

fn failing(_: &Path, _: &Value) -> Result<String, BoxError> {
    Err("template syntax error".into())
}

fn panicking(_: &Path, _: &Value) -> Result<String, BoxError> {
    panic!("engine exploded")
}

fn tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, contents) in files {
        let path = dir.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    dir
}

fn engines() -> Arc<Engines> {
    let engines = Engines::new();
    engines.register("txt", echo);
    Arc::new(engines)
}

#[test]
fn explicit_extension() {
    let dir = tree(&[("hello.txt", "hello {name}")]);
    let view = ViewResolver::new(engines())
        .with_root(dir.path())
        .resolve("hello.txt")
        .unwrap();

    assert_eq!(view.name(), "hello.txt");
    assert_eq!(view.extension(), ".txt");
    assert_eq!(view.path(), dir.path().join("hello.txt"));
    assert_eq!(view.render(&json!({ "name": "tobi" })).unwrap(), "hello tobi");
}

#[test]
fn default_engine_extension_is_appended() {
    let dir = tree(&[("users/show.txt", "user {name}")]);
    let view = ViewResolver::new(engines())
        .with_root(dir.path())
        .with_default_engine(".txt")
        .resolve("users/show")
        .unwrap();

    assert_eq!(view.path(), dir.path().join("users").join("show.txt"));
    assert_eq!(view.extension(), ".txt");
}

#[test]
fn missing_extension_without_default_engine() {
    let dir = tree(&[("hello.txt", "hello")]);
    let error = ViewResolver::new(engines())
        .with_root(dir.path())
        .resolve("hello")
        .unwrap_err();

    assert!(matches!(error, Error::NoExtension));
}

#[test]
fn directory_index_fallback() {
    let dir = tree(&[("foo/index.txt", "index of foo")]);
    let resolver = ViewResolver::new(engines())
        .with_root(dir.path())
        .with_default_engine("txt");

    let view = resolver.resolve("foo").unwrap();
    assert_eq!(view.path(), dir.path().join("foo").join("index.txt"));

    let view = resolver.resolve("foo.txt").unwrap();
    assert_eq!(view.path(), dir.path().join("foo").join("index.txt"));
}

#[test]
fn direct_file_wins_over_index() {
    let dir = tree(&[("foo.txt", "direct"), ("foo/index.txt", "index")]);
    let view = ViewResolver::new(engines())
        .with_root(dir.path())
        .resolve("foo.txt")
        .unwrap();

    assert_eq!(view.path(), dir.path().join("foo.txt"));
}

#[test]
fn roots_are_searched_in_order() {
    let a = tree(&[("only-in-a.txt", "a")]);
    let b = tree(&[("only-in-b.txt", "b"), ("only-in-a.txt", "b")]);
    let resolver = ViewResolver::new(engines()).with_roots([a.path(), b.path()]);

    let view = resolver.resolve("only-in-b.txt").unwrap();
    assert!(view.path().starts_with(b.path()));

    let view = resolver.resolve("only-in-a.txt").unwrap();
    assert!(view.path().starts_with(a.path()));
}

#[test]
fn directories_are_not_views() {
    let dir = tree(&[("nested.txt/placeholder", "")]);
    let error = ViewResolver::new(engines())
        .with_root(dir.path())
        .resolve("nested.txt")
        .unwrap_err();

    assert!(matches!(error, Error::ViewNotFound { .. }));
}

#[test]
fn not_found_reports_roots() {
    let a = tree(&[]);
    let b = tree(&[]);
    let error = ViewResolver::new(engines())
        .with_roots([a.path(), b.path()])
        .resolve("missing.txt")
        .unwrap_err();

    match error {
        Error::ViewNotFound { name, roots } => {
            assert_eq!(name, "missing.txt");
            assert_eq!(roots, [a.path(), b.path()]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unknown_extension_without_loader() {
    let dir = tree(&[("page.hbs", "")]);
    let error = ViewResolver::new(engines())
        .with_root(dir.path())
        .resolve("page.hbs")
        .unwrap_err();

    assert!(matches!(error, Error::EngineLoad(extension) if extension == ".hbs"));
}

#[test]
fn loaders_supply_and_register_engines() {
    let dir = tree(&[("page.hbs", "loaded {name}")]);
    let engines = engines();
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    let loader = move |extension: &str| -> Option<Arc<dyn Engine>> {
        counter.fetch_add(1, Ordering::SeqCst);
        (extension == ".hbs").then(|| Arc::new(echo) as Arc<dyn Engine>)
    };

    let resolver = ViewResolver::new(Arc::clone(&engines))
        .with_root(dir.path())
        .with_loader(Arc::new(loader));

    let view = resolver.resolve("page.hbs").unwrap();
    assert_eq!(view.render(&json!({ "name": "hbs" })).unwrap(), "loaded hbs");
    assert!(engines.contains(".hbs"));

    resolver.resolve("page.hbs").unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    let error = resolver.resolve("page.pug").unwrap_err();
    assert!(matches!(error, Error::EngineLoad(_)));
}

#[test]
fn engine_errors_are_runtime_errors() {
    let dir = tree(&[("broken.txt", "")]);
    let engines = Arc::new(Engines::new());
    engines.register(".txt", failing);
    let view = ViewResolver::new(engines)
        .with_root(dir.path())
        .resolve("broken.txt")
        .unwrap();

    let error = view.render(&Value::Null).unwrap_err();
    assert_eq!(error.to_string(), "view engine failed: template syntax error");
}

#[test]
fn engine_panics_are_caught() {
    let dir = tree(&[("explodes.txt", "")]);
    let engines = Arc::new(Engines::new());
    engines.register(".txt", panicking);
    let view = ViewResolver::new(engines)
        .with_root(dir.path())
        .resolve("explodes.txt")
        .unwrap();

    let error = view.render(&Value::Null).unwrap_err();
    assert!(matches!(error, Error::EngineRuntime(_)));
    assert_eq!(error.to_string(), "view engine failed: engine exploded");
}

#[test]
fn cache_resolves_once_when_enabled() {
    let dir = tree(&[("hello.txt", "hello")]);
    let resolver = ViewResolver::new(engines()).with_root(dir.path());
    let cache = RenderCache::new();
    let resolutions = AtomicUsize::new(0);

    let resolve = || {
        resolutions.fetch_add(1, Ordering::SeqCst);
        resolver.resolve("hello.txt")
    };

    let first = cache.get_or_resolve("hello.txt", true, resolve).unwrap();
    let second = cache.get_or_resolve("hello.txt", true, resolve).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(resolutions.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn cache_is_bypassed_when_disabled() {
    let dir = tree(&[("hello.txt", "hello")]);
    let resolver = ViewResolver::new(engines()).with_root(dir.path());
    let cache = RenderCache::new();
    let resolutions = AtomicUsize::new(0);

    let resolve = || {
        resolutions.fetch_add(1, Ordering::SeqCst);
        resolver.resolve("hello.txt")
    };

    cache.get_or_resolve("hello.txt", false, resolve).unwrap();
    cache.get_or_resolve("hello.txt", false, resolve).unwrap();
    assert_eq!(resolutions.load(Ordering::SeqCst), 2);
    assert!(cache.is_empty());

    fs::remove_file(dir.path().join("hello.txt")).unwrap();
    assert!(cache.get_or_resolve("hello.txt", false, resolve).is_err());
}

#[test]
fn failures_are_not_cached() {
    let dir = tree(&[]);
    let resolver = ViewResolver::new(engines()).with_root(dir.path());
    let cache = RenderCache::new();

    assert!(cache.get_or_resolve("late.txt", true, || resolver.resolve("late.txt")).is_err());
    fs::write(dir.path().join("late.txt"), "made it").unwrap();
    let view = cache.get_or_resolve("late.txt", true, || resolver.resolve("late.txt")).unwrap();
    assert_eq!(view.render(&Value::Null).unwrap(), "made it");
}

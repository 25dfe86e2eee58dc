/*!
# Views for espalier

A [`ViewResolver`] turns a logical view name such as `"users/show"`
into a [`View`]: a concrete template file found under one of several
root directories, bound to the [`Engine`] registered for its
extension. A [`RenderCache`] memoizes resolved views by name.

Resolution for each root, in order, first match wins:

1. `<root>/<name>` if it is a regular file
2. `<root>/<name without extension>/index<ext>` if it is a regular file

If `name` has no extension, the resolver's default engine extension
is appended before lookup.

```
use espalier_views::{BoxError, Engines, ViewResolver};
use serde_json::{Value, json};
use std::{path::Path, sync::Arc};

fn shout(path: &Path, options: &Value) -> Result<String, BoxError> {
    let template = std::fs::read_to_string(path)?;
    Ok(template.replace("{name}", options["name"].as_str().unwrap_or_default()).to_uppercase())
}

# fn main() -> Result<(), Box<dyn std::error::Error>> {
let dir = tempfile::tempdir()?;
std::fs::write(dir.path().join("hello.txt"), "hello {name}")?;

let engines = Arc::new(Engines::new());
engines.register(".txt", shout);

let view = ViewResolver::new(engines)
    .with_root(dir.path())
    .with_default_engine("txt")
    .resolve("hello")?;

assert_eq!(view.render(&json!({ "name": "espalier" }))?, "HELLO ESPALIER");
# Ok(()) }
```
*/
#![forbid(unsafe_code)]
#![deny(
    missing_copy_implementations,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    unused_qualifications
)]

mod error;
pub use error::{BoxError, Error, Result};

mod engine;
pub use engine::{Engine, EngineLoader, Engines, normalize_extension};

mod view;
pub use view::{View, ViewResolver};

mod render_cache;
pub use render_cache::RenderCache;

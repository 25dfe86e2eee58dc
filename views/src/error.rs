use std::path::PathBuf;
use thiserror::Error;

/// the error type engines return
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors resolving or rendering a view
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// the view name had no extension and no default engine was
    /// configured
    #[error("No default engine was specified and no extension was provided.")]
    NoExtension,

    /// no engine was registered for this extension and none could be
    /// loaded
    #[error("no view engine is registered for \"{0}\" and none could be loaded")]
    EngineLoad(String),

    /// no template file matched in any of the roots
    #[error("Failed to lookup view \"{name}\" in {}", describe_roots(.roots))]
    ViewNotFound {
        /// the logical view name
        name: String,
        /// every root that was searched, in order
        roots: Vec<PathBuf>,
    },

    /// the engine returned an error or panicked while rendering
    #[error("view engine failed: {0}")]
    EngineRuntime(#[source] BoxError),

    /// the working directory needed to resolve relative roots could
    /// not be determined
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// this crate's result type
pub type Result<T> = std::result::Result<T, Error>;

fn describe_roots(roots: &[PathBuf]) -> String {
    match roots {
        [] => String::from("views directory \"\""),
        [root] => format!("views directory \"{}\"", root.display()),
        [init @ .., last] => format!(
            "views directories \"{}\" or \"{}\"",
            init.iter()
                .map(|root| root.display().to_string())
                .collect::<Vec<_>>()
                .join("\", \""),
            last.display()
        ),
    }
}

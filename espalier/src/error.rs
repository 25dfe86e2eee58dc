use thiserror::Error;

/// Errors surfaced by espalier settings and rendering
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// a setting was given a value it cannot be compiled from, or a
    /// derived setting was written directly
    #[error("invalid value for setting \"{key}\": {reason}")]
    InvalidSetting {
        /// the setting key
        key: String,
        /// why the value was rejected
        reason: String,
    },

    /// a trust proxy list contained an invalid entry
    #[error(transparent)]
    Forwarding(#[from] espalier_forwarding::Error),

    /// a view could not be resolved or rendered
    #[error(transparent)]
    View(#[from] espalier_views::Error),

    /// render options or locals could not be serialized
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// render options must serialize to a map
    #[error("render options must be a map, not {0}")]
    RenderOptions(&'static str),
}

/// this crate's result type
pub type Result<T> = std::result::Result<T, Error>;

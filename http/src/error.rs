use thiserror::Error;

/// Concrete errors that occur when building espalier http primitives
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// we were unable to parse this http method
    #[error("unsupported or unrecognized http method {0}")]
    UnrecognizedMethod(String),

    /// status codes must be in the range 100..=999
    #[error("unrecognized http status code {0}")]
    UnrecognizedStatusCode(u16),
}

/// this crate's result type
pub type Result<T> = std::result::Result<T, Error>;

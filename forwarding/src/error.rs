use thiserror::Error;

/// Errors building a [`TrustProxy`](crate::TrustProxy)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// a trust list entry was not an ip address, a cidr range, or
    /// one of `loopback`, `linklocal` or `uniquelocal`
    #[error("invalid trusted proxy address \"{0}\"")]
    InvalidTrustAddress(String),
}

/// this crate's result type
pub type Result<T> = std::result::Result<T, Error>;

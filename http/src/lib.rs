#![forbid(unsafe_code)]
#![deny(
    missing_copy_implementations,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    nonstandard_style,
    unused_qualifications
)]
//! The small set of http primitives that espalier derives request
//! state from.
//!
//! Nothing in this crate touches a socket. [`Headers`] is a
//! case-insensitive, multi-valued header map; [`Method`] and
//! [`Status`] are the request method and response status as seen by
//! the freshness and rendering code.

mod error;
pub use error::{Error, Result};

mod header_name;
pub use header_name::HeaderName;

mod known_header_name;
pub use known_header_name::KnownHeaderName;

mod headers;
pub use headers::Headers;

mod method;
pub use method::Method;

mod status;
pub use status::Status;

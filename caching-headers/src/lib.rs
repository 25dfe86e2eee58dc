/*!
# Entity tags and freshness for espalier

This crate provides [`EtagFn`], the compiled form of the `etag`
setting, [`is_fresh`], the conditional-request evaluator behind
`Conn::is_fresh`, and a [`CachingHeadersExt`] that extends
[`espalier_http::Headers`] with parsed caching-header accessors.
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

mod etag_fn;
pub use etag_fn::{EtagFn, strong_etag, weak_etag};
pub use ::etag::EntityTag;

mod cache_control;
pub use cache_control::{CacheControlDirective, CacheControlHeader};

mod caching_headers_ext;
pub use caching_headers_ext::CachingHeadersExt;

mod fresh;
pub use fresh::is_fresh;

use crate::CacheControlHeader;
use espalier_http::{Headers, KnownHeaderName};
use etag::EntityTag;
use std::time::SystemTime;

/// Provides an extension trait for [`espalier_http::Headers`] for
/// setting and getting various parsed caching headers.
pub trait CachingHeadersExt {
    /// returns the raw `ETag` header value, if any
    fn etag_str(&self) -> Option<&str>;
    /// returns an [`EntityTag`] if these headers contain a parsable `ETag` header.
    fn etag(&self) -> Option<EntityTag>;
    /// sets an etag header
    fn set_etag(&mut self, etag: impl Into<String>);

    /// returns a parsed timestamp if these headers contain a `Last-Modified` header.
    fn last_modified(&self) -> Option<SystemTime>;
    /// sets a formatted `Last-Modified` header from a timestamp.
    fn set_last_modified(&mut self, system_time: SystemTime);

    /// returns a parsed [`CacheControlHeader`] if these headers
    /// include a `Cache-Control` header.
    fn cache_control(&self) -> Option<CacheControlHeader>;

    /// returns a parsed `If-Modified-Since` header if one exists and
    /// is a valid http date
    fn if_modified_since(&self) -> Option<SystemTime>;
    /// returns the raw `If-None-Match` header value, which may be a
    /// comma-separated list or `*`
    fn if_none_match(&self) -> Option<&str>;
}

impl CachingHeadersExt for Headers {
    fn etag_str(&self) -> Option<&str> {
        self.get_str(KnownHeaderName::Etag)
    }

    fn etag(&self) -> Option<EntityTag> {
        self.etag_str().and_then(|etag| etag.parse().ok())
    }

    fn set_etag(&mut self, etag: impl Into<String>) {
        self.insert(KnownHeaderName::Etag, etag);
    }

    fn last_modified(&self) -> Option<SystemTime> {
        self.get_str(KnownHeaderName::LastModified)
            .and_then(|x| httpdate::parse_http_date(x).ok())
    }

    fn set_last_modified(&mut self, system_time: SystemTime) {
        self.insert(
            KnownHeaderName::LastModified,
            httpdate::fmt_http_date(system_time),
        );
    }

    fn cache_control(&self) -> Option<CacheControlHeader> {
        self.get_joined(KnownHeaderName::CacheControl)
            .and_then(|cc| cc.parse().ok())
    }

    fn if_modified_since(&self) -> Option<SystemTime> {
        self.get_str(KnownHeaderName::IfModifiedSince)
            .and_then(|h| httpdate::parse_http_date(h).ok())
    }

    fn if_none_match(&self) -> Option<&str> {
        self.get_str(KnownHeaderName::IfNoneMatch)
    }
}

use crate::CachingHeadersExt;
use espalier_http::{Headers, KnownHeaderName};
use etag::EntityTag;

/**
Evaluates whether the representation a client holds is still fresh,
given the request's conditional headers and the response's validators.

* Without `If-None-Match` or `If-Modified-Since`, nothing is fresh.
* A request `Cache-Control: no-cache` is never fresh.
* `If-None-Match` (other than `*`) must weakly match the response `ETag`.
* `If-Modified-Since` must be no earlier than the response `Last-Modified`.

Method and status gating is left to the caller.

```
use espalier_caching_headers::is_fresh;
use espalier_http::Headers;

let request: Headers = [("if-none-match", "\"abc\"")].into_iter().collect();
let response: Headers = [("etag", "W/\"abc\"")].into_iter().collect();
assert!(is_fresh(&request, &response));
```
*/
pub fn is_fresh(request: &Headers, response: &Headers) -> bool {
    let if_none_match = request
        .if_none_match()
        .filter(|header| !header.trim().is_empty());
    let if_modified_since = request
        .get_str(KnownHeaderName::IfModifiedSince)
        .filter(|header| !header.trim().is_empty());

    if if_none_match.is_none() && if_modified_since.is_none() {
        return false;
    }

    if request.cache_control().is_some_and(|cc| cc.is_no_cache()) {
        log::trace!("request cache-control: no-cache, not fresh");
        return false;
    }

    if let Some(if_none_match) = if_none_match.filter(|inm| inm.trim() != "*") {
        let Some(etag) = response.etag_str() else {
            return false;
        };

        if !if_none_match
            .split(',')
            .map(str::trim)
            .any(|candidate| etag_matches(candidate, etag))
        {
            return false;
        }
    }

    if if_modified_since.is_some() {
        match (response.last_modified(), request.if_modified_since()) {
            (Some(last_modified), Some(if_modified_since))
                if last_modified <= if_modified_since => {}
            _ => return false,
        }
    }

    true
}

fn etag_matches(candidate: &str, etag: &str) -> bool {
    match (candidate.parse::<EntityTag>(), etag.parse::<EntityTag>()) {
        (Ok(candidate), Ok(etag)) => candidate.weak_eq(&etag),
        _ => {
            candidate == etag
                || candidate.strip_prefix("W/") == Some(etag)
                || etag.strip_prefix("W/") == Some(candidate)
        }
    }
}

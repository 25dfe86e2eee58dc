use etag::EntityTag;
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// generates a weak entity tag, `W/"..."`, from a response body
pub fn weak_etag(body: &[u8]) -> String {
    format!("W/{}", EntityTag::from_data(body))
}

/// generates a strong entity tag, `"..."`, from a response body
pub fn strong_etag(body: &[u8]) -> String {
    EntityTag::from_data(body).to_string()
}

/**
An entity tag generator: the compiled form of the `etag` setting.

```
use espalier_caching_headers::EtagFn;

let weak = EtagFn::weak();
assert!(weak.generate(b"hello").starts_with("W/\""));

let strong = EtagFn::strong();
assert!(strong.generate(b"hello").starts_with('"'));

let custom = EtagFn::new(|body| format!("\"{}\"", body.len()));
assert_eq!(custom.generate(b"hello"), "\"5\"");
```
*/
#[derive(Clone)]
pub struct EtagFn(Arc<dyn Fn(&[u8]) -> String + Send + Sync + 'static>);

impl EtagFn {
    /// wraps any body-to-etag function
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[u8]) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// the weak generator, [`weak_etag`]
    pub fn weak() -> Self {
        Self::new(weak_etag)
    }

    /// the strong generator, [`strong_etag`]
    pub fn strong() -> Self {
        Self::new(strong_etag)
    }

    /// produces an etag header value for this body
    pub fn generate(&self, body: &[u8]) -> String {
        (self.0)(body)
    }
}

impl Debug for EtagFn {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EtagFn").field(&"..").finish()
    }
}

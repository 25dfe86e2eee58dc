use crate::{Error, QueryParser, Result, Setting};
use espalier_caching_headers::EtagFn;
use espalier_forwarding::TrustProxy;

fn unknown(key: &str, kind: &str, value: &Setting) -> Error {
    Error::InvalidSetting {
        key: key.to_string(),
        reason: format!("unknown value for {kind}: {value}"),
    }
}

/**
Compiles an `etag` setting value into a generator.

`true` and `"weak"` produce weak tags, `"strong"` produces strong
tags and `false` disables generation, returning `None`. A compiled
[`EtagFn`] passes through unchanged.

```
# use espalier::{compile_etag, Setting};
let weak = compile_etag(&Setting::from(true)).unwrap().unwrap();
assert!(weak.generate(b"hello").starts_with("W/\""));
assert!(compile_etag(&Setting::from(false)).unwrap().is_none());
assert!(compile_etag(&Setting::from("sometimes")).is_err());
```
*/
pub fn compile_etag(value: &Setting) -> Result<Option<EtagFn>> {
    match value {
        Setting::Etag(etag_fn) => Ok(Some(etag_fn.clone())),
        Setting::Bool(true) => Ok(Some(EtagFn::weak())),
        Setting::Bool(false) => Ok(None),
        Setting::String(value) if value == "weak" => Ok(Some(EtagFn::weak())),
        Setting::String(value) if value == "strong" => Ok(Some(EtagFn::strong())),
        other => Err(unknown("etag", "etag function", other)),
    }
}

/**
Compiles a `query parser` setting value into a parser.

`true` and `"simple"` select the flat parser, `"extended"` selects
the nested parser and `false` selects a parser that always yields an
empty map. A compiled [`QueryParser`] passes through unchanged.
*/
pub fn compile_query_parser(value: &Setting) -> Result<QueryParser> {
    match value {
        Setting::QueryParser(parser) => Ok(parser.clone()),
        Setting::Bool(true) => Ok(QueryParser::simple()),
        Setting::Bool(false) => Ok(QueryParser::disabled()),
        Setting::String(value) if value == "simple" => Ok(QueryParser::simple()),
        Setting::String(value) if value == "extended" => Ok(QueryParser::extended()),
        other => Err(unknown("query parser", "query parser function", other)),
    }
}

/**
Compiles a `trust proxy` setting value into a trust policy.

* `true` trusts every hop and `false` trusts none
* a number trusts that many hops nearest the server; negative
  numbers trust nothing
* a string is a comma or whitespace separated list of addresses,
  subnets and the names `loopback`, `linklocal` and `uniquelocal`
* a list holds the same kinds of entries, one per element
* a compiled [`TrustProxy`] passes through unchanged

```
# use espalier::{compile_trust, Setting};
let trust = compile_trust(&Setting::from(2)).unwrap();
assert!(trust.is_trusted("203.0.113.1", 1));
assert!(!trust.is_trusted("203.0.113.1", 2));

let trust = compile_trust(&Setting::from("loopback, 10.0.0.0/8")).unwrap();
assert!(trust.is_trusted("10.1.2.3", 0));
assert!(!trust.is_trusted("192.168.1.1", 0));
```
*/
pub fn compile_trust(value: &Setting) -> Result<TrustProxy> {
    match value {
        Setting::TrustProxy(trust) => Ok(trust.clone()),
        Setting::Bool(true) => Ok(TrustProxy::always()),
        Setting::Bool(false) => Ok(TrustProxy::never()),
        Setting::Number(count) => Ok(TrustProxy::hops(usize::try_from(*count).unwrap_or(0))),
        Setting::String(list) => Ok(TrustProxy::parse(list)?),
        Setting::List(entries) => Ok(TrustProxy::trust_ips(entries)?),
        other => Err(unknown("trust proxy", "trust proxy function", other)),
    }
}

use crate::QueryParser;
use espalier_caching_headers::EtagFn;
use espalier_forwarding::TrustProxy;
use std::fmt::{self, Display, Formatter};

/**
A single setting value.

Settings hold plain values as a user would write them (booleans,
strings, numbers and lists of strings) as well as the compiled
closures derived from them. Plain values convert into a `Setting`
with [`From`], so `app.set("subdomain offset", 3)` and
`app.set("trust proxy", ["loopback", "10.0.0.0/8"])` both work.
*/
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Setting {
    /// a boolean flag
    Bool(bool),
    /// a string value
    String(String),
    /// an integer value
    Number(i64),
    /// a list of strings
    List(Vec<String>),
    /// a compiled trust policy
    TrustProxy(TrustProxy),
    /// a compiled entity tag generator
    Etag(EtagFn),
    /// a compiled query string parser
    QueryParser(QueryParser),
}

impl Setting {
    /**
    Whether this value counts as enabled. `false`, the empty string
    and zero are falsy. Lists and compiled functions are always
    truthy, even when empty.

    ```
    # use espalier::Setting;
    assert!(Setting::from(true).is_truthy());
    assert!(!Setting::from("").is_truthy());
    assert!(!Setting::from(0).is_truthy());
    assert!(Setting::from(Vec::<String>::new()).is_truthy());
    ```
    */
    pub fn is_truthy(&self) -> bool {
        match self {
            Setting::Bool(value) => *value,
            Setting::String(value) => !value.is_empty(),
            Setting::Number(value) => *value != 0,
            Setting::List(_)
            | Setting::TrustProxy(_)
            | Setting::Etag(_)
            | Setting::QueryParser(_) => true,
        }
    }

    /// the boolean value, if this is a [`Setting::Bool`]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Setting::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// the string value, if this is a [`Setting::String`]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Setting::String(value) => Some(value),
            _ => None,
        }
    }

    /// the integer value, if this is a [`Setting::Number`]
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Setting::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// the list value, if this is a [`Setting::List`]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Setting::List(value) => Some(value),
            _ => None,
        }
    }

    /// the compiled trust policy, if this is a [`Setting::TrustProxy`]
    pub fn as_trust_proxy(&self) -> Option<&TrustProxy> {
        match self {
            Setting::TrustProxy(value) => Some(value),
            _ => None,
        }
    }

    /// the compiled etag generator, if this is a [`Setting::Etag`]
    pub fn as_etag_fn(&self) -> Option<&EtagFn> {
        match self {
            Setting::Etag(value) => Some(value),
            _ => None,
        }
    }

    /// the compiled query parser, if this is a [`Setting::QueryParser`]
    pub fn as_query_parser(&self) -> Option<&QueryParser> {
        match self {
            Setting::QueryParser(value) => Some(value),
            _ => None,
        }
    }
}

impl Display for Setting {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Bool(value) => Display::fmt(value, f),
            Setting::String(value) => f.write_str(value),
            Setting::Number(value) => Display::fmt(value, f),
            Setting::List(values) => f.write_str(&values.join(",")),
            Setting::TrustProxy(_) => f.write_str("[trust proxy function]"),
            Setting::Etag(_) => f.write_str("[etag function]"),
            Setting::QueryParser(_) => f.write_str("[query parser function]"),
        }
    }
}

impl From<bool> for Setting {
    fn from(value: bool) -> Self {
        Setting::Bool(value)
    }
}

impl From<&str> for Setting {
    fn from(value: &str) -> Self {
        Setting::String(value.to_string())
    }
}

impl From<String> for Setting {
    fn from(value: String) -> Self {
        Setting::String(value)
    }
}

impl From<i64> for Setting {
    fn from(value: i64) -> Self {
        Setting::Number(value)
    }
}

impl From<i32> for Setting {
    fn from(value: i32) -> Self {
        Setting::Number(value.into())
    }
}

impl From<u32> for Setting {
    fn from(value: u32) -> Self {
        Setting::Number(value.into())
    }
}

impl From<usize> for Setting {
    fn from(value: usize) -> Self {
        Setting::Number(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<Vec<String>> for Setting {
    fn from(value: Vec<String>) -> Self {
        Setting::List(value)
    }
}

impl From<Vec<&str>> for Setting {
    fn from(value: Vec<&str>) -> Self {
        Setting::List(value.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Setting {
    fn from(value: [&str; N]) -> Self {
        Setting::List(value.into_iter().map(String::from).collect())
    }
}

impl From<TrustProxy> for Setting {
    fn from(value: TrustProxy) -> Self {
        Setting::TrustProxy(value)
    }
}

impl From<EtagFn> for Setting {
    fn from(value: EtagFn) -> Self {
        Setting::Etag(value)
    }
}

impl From<QueryParser> for Setting {
    fn from(value: QueryParser) -> Self {
        Setting::QueryParser(value)
    }
}

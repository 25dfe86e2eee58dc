use std::{
    convert::Infallible,
    fmt::{self, Display, Formatter, Write},
    ops::Deref,
    str::FromStr,
    time::Duration,
};
use CacheControlDirective::*;

/**
The subset of
[`Cache-Control`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Cache-Control)
directives that matter to freshness evaluation, plus a catch-all for
anything else.
*/
#[derive(Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum CacheControlDirective {
    /// `immutable`
    Immutable,

    /// `max-age=<seconds>`
    MaxAge(Duration),

    /// `must-revalidate`
    MustRevalidate,

    /// `no-cache`
    NoCache,

    /// `no-store`
    NoStore,

    /// `private`
    Private,

    /// `public`
    Public,

    /// any directive not listed above, or one with an unparsable
    /// argument, kept verbatim
    UnknownDirective(String),
}

/// A parsed `Cache-Control` header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheControlHeader(Vec<CacheControlDirective>);

impl CacheControlHeader {
    /// returns true if this header contains a `no-cache` directive
    pub fn is_no_cache(&self) -> bool {
        self.contains(&NoCache)
    }

    /// returns true if this header contains a `no-store` directive
    pub fn is_no_store(&self) -> bool {
        self.contains(&NoStore)
    }

    /// returns a duration if one of the directives is `max-age`
    pub fn max_age(&self) -> Option<Duration> {
        self.iter().find_map(|d| match d {
            MaxAge(d) => Some(*d),
            _ => None,
        })
    }
}

impl FromIterator<CacheControlDirective> for CacheControlHeader {
    fn from_iter<T: IntoIterator<Item = CacheControlDirective>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<CacheControlDirective> for CacheControlHeader {
    fn from(directive: CacheControlDirective) -> Self {
        Self(vec![directive])
    }
}

impl Deref for CacheControlHeader {
    type Target = [CacheControlDirective];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for CacheControlHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, directive) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_char(',')?;
            }

            match directive {
                Immutable => f.write_str("immutable"),
                MaxAge(d) => write!(f, "max-age={}", d.as_secs()),
                MustRevalidate => f.write_str("must-revalidate"),
                NoCache => f.write_str("no-cache"),
                NoStore => f.write_str("no-store"),
                Private => f.write_str("private"),
                Public => f.write_str("public"),
                UnknownDirective(directive) => f.write_str(directive),
            }?;
        }

        Ok(())
    }
}

impl FromStr for CacheControlHeader {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.split(',')
            .map(str::trim)
            .filter(|directive| !directive.is_empty())
            .map(|directive| match &*directive.to_ascii_lowercase() {
                "immutable" => Immutable,
                "must-revalidate" => MustRevalidate,
                "no-cache" => NoCache,
                "no-store" => NoStore,
                "private" => Private,
                "public" => Public,
                other => match other
                    .split_once('=')
                    .filter(|(name, _)| *name == "max-age")
                    .and_then(|(_, seconds)| seconds.parse().ok())
                {
                    Some(seconds) => MaxAge(Duration::from_secs(seconds)),
                    None => UnknownDirective(String::from(directive)),
                },
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse() {
        let header: CacheControlHeader = "private, No-Cache,max-age=0,pre-check=0, max-age=x"
            .parse()
            .unwrap();

        assert_eq!(
            header,
            CacheControlHeader::from_iter([
                Private,
                NoCache,
                MaxAge(Duration::ZERO),
                UnknownDirective("pre-check=0".to_string()),
                UnknownDirective("max-age=x".to_string()),
            ])
        );
        assert!(header.is_no_cache());
        assert_eq!(header.max_age(), Some(Duration::ZERO));
        assert_eq!(
            header.to_string(),
            "private,no-cache,max-age=0,pre-check=0,max-age=x"
        );
    }

    #[test]
    fn no_cache_must_be_a_whole_directive() {
        let header: CacheControlHeader = "no-cache-please".parse().unwrap();
        assert!(!header.is_no_cache());
    }
}

use crate::KnownHeaderName;
use std::{
    borrow::{Borrow, Cow},
    fmt::{self, Display, Formatter},
};

/// The name of a http header.
///
/// Header names are case insensitive, so a `HeaderName` always holds
/// the ascii-lowercased form. Borrowed input that is already
/// lowercase is not copied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeaderName<'a>(Cow<'a, str>);

impl HeaderName<'_> {
    /// the lowercased header name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// detaches this header name from any borrowed input
    pub fn into_owned(self) -> HeaderName<'static> {
        HeaderName(Cow::Owned(self.0.into_owned()))
    }
}

impl<'a> From<&'a str> for HeaderName<'a> {
    fn from(name: &'a str) -> Self {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            Self(Cow::Owned(name.to_ascii_lowercase()))
        } else {
            Self(Cow::Borrowed(name))
        }
    }
}

impl<'a> From<&'a String> for HeaderName<'a> {
    fn from(name: &'a String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<String> for HeaderName<'static> {
    fn from(mut name: String) -> Self {
        name.make_ascii_lowercase();
        Self(Cow::Owned(name))
    }
}

impl From<KnownHeaderName> for HeaderName<'static> {
    fn from(known: KnownHeaderName) -> Self {
        Self(Cow::Borrowed(known.as_lower_str()))
    }
}

impl Borrow<str> for HeaderName<'_> {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for HeaderName<'_> {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for HeaderName<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<KnownHeaderName> for HeaderName<'_> {
    fn eq(&self, other: &KnownHeaderName) -> bool {
        self.as_str() == other.as_lower_str()
    }
}

impl PartialEq<&str> for HeaderName<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str().eq_ignore_ascii_case(other)
    }
}

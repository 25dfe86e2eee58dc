use crate::HeaderName;
use std::collections::HashMap;

/// A case-insensitive, multi-valued header map.
///
/// Values are kept in arrival order, which matters for headers like
/// `X-Forwarded-For` that may be repeated across several lines.
#[derive(Debug, Clone, Default)]
pub struct Headers(HashMap<HeaderName<'static>, Vec<String>>);

impl Headers {
    /// builds an empty header map
    pub fn new() -> Self {
        Self::default()
    }

    /// the number of distinct header names
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// true if there are no headers
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// iterates over every header name and its values
    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName<'static>, &[String])> {
        self.0.iter().map(|(name, values)| (name, values.as_slice()))
    }

    /// adds a value to this header, keeping any existing values
    pub fn append(&mut self, name: impl Into<HeaderName<'static>>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(value.into());
    }

    /// replaces any values for this header with a single value
    pub fn insert(&mut self, name: impl Into<HeaderName<'static>>, value: impl Into<String>) {
        self.0.insert(name.into(), vec![value.into()]);
    }

    /// sets this header only if it is not already present
    pub fn try_insert(&mut self, name: impl Into<HeaderName<'static>>, value: impl Into<String>) {
        self.0
            .entry(name.into())
            .or_insert_with(|| vec![value.into()]);
    }

    /// removes a header, returning its values if there were any
    pub fn remove<'a>(&mut self, name: impl Into<HeaderName<'a>>) -> Option<Vec<String>> {
        self.0.remove(name.into().as_str())
    }

    /// every value received for this header, in arrival order
    pub fn get_values<'a>(&self, name: impl Into<HeaderName<'a>>) -> Option<&[String]> {
        self.0.get(name.into().as_str()).map(Vec::as_slice)
    }

    /// the first value received for this header
    pub fn get_str<'a>(&self, name: impl Into<HeaderName<'a>>) -> Option<&str> {
        self.get_values(name)
            .and_then(<[String]>::first)
            .map(String::as_str)
    }

    /// all values for this header joined with `", "`, the way a
    /// proxy folds repeated header lines
    pub fn get_joined<'a>(&self, name: impl Into<HeaderName<'a>>) -> Option<String> {
        self.get_values(name).map(|values| values.join(", "))
    }

    /// true if this header has at least one value
    pub fn has_header<'a>(&self, name: impl Into<HeaderName<'a>>) -> bool {
        self.0.contains_key(name.into().as_str())
    }

    /// compares the first value of this header with `needle`,
    /// ignoring ascii case
    pub fn eq_ignore_ascii_case<'a>(&self, name: impl Into<HeaderName<'a>>, needle: &str) -> bool {
        self.get_str(name)
            .is_some_and(|value| value.eq_ignore_ascii_case(needle))
    }
}

impl<HN, HV> Extend<(HN, HV)> for Headers
where
    HN: Into<HeaderName<'static>>,
    HV: Into<String>,
{
    fn extend<T: IntoIterator<Item = (HN, HV)>>(&mut self, iter: T) {
        for (name, value) in iter {
            self.append(name, value);
        }
    }
}

impl<HN, HV> FromIterator<(HN, HV)> for Headers
where
    HN: Into<HeaderName<'static>>,
    HV: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (HN, HV)>>(iter: T) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KnownHeaderName;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookups_ignore_case() {
        let mut headers = Headers::new();
        headers.insert("X-Forwarded-For", "10.0.0.1");
        assert_eq!(headers.get_str("x-forwarded-for"), Some("10.0.0.1"));
        assert_eq!(headers.get_str(KnownHeaderName::XforwardedFor), Some("10.0.0.1"));
        assert!(headers.has_header("X-FORWARDED-FOR"));
    }

    #[test]
    fn repeated_lines_keep_arrival_order() {
        let headers: Headers = [
            ("x-forwarded-for", "10.0.0.1, 10.0.0.2"),
            ("X-Forwarded-For", "10.0.0.3"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            headers.get_values("x-forwarded-for").unwrap(),
            ["10.0.0.1, 10.0.0.2", "10.0.0.3"]
        );
        assert_eq!(
            headers.get_joined(KnownHeaderName::XforwardedFor).as_deref(),
            Some("10.0.0.1, 10.0.0.2, 10.0.0.3")
        );
    }

    #[test]
    fn insert_replaces_and_try_insert_does_not() {
        let mut headers = Headers::new();
        headers.append("etag", "\"a\"");
        headers.append("etag", "\"b\"");
        headers.insert(KnownHeaderName::Etag, "\"c\"");
        assert_eq!(headers.get_values("etag").unwrap(), ["\"c\""]);

        headers.try_insert("ETag", "\"d\"");
        assert_eq!(headers.get_str("etag"), Some("\"c\""));

        assert_eq!(headers.remove("ETAG"), Some(vec![String::from("\"c\"")]));
        assert!(headers.is_empty());
    }
}

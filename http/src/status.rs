use crate::Error;
use std::fmt::{self, Display, Formatter};

/// A response status code.
///
/// Any three digit code can be represented; the associated constants
/// name the ones espalier itself sets or inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Status(u16);

impl Status {
    /// `200 OK`
    pub const OK: Self = Self(200);
    /// `204 No Content`
    pub const NO_CONTENT: Self = Self(204);
    /// `304 Not Modified`
    pub const NOT_MODIFIED: Self = Self(304);
    /// `404 Not Found`
    pub const NOT_FOUND: Self = Self(404);
    /// `500 Internal Server Error`
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    /// the numeric status code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// true for `2xx` codes
    pub const fn is_success(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// true for `3xx` codes
    pub const fn is_redirection(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::OK
    }
}

impl TryFrom<u16> for Status {
    type Error = Error;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        if (100..=999).contains(&code) {
            Ok(Self(code))
        } else {
            Err(Error::UnrecognizedStatusCode(code))
        }
    }
}

impl From<Status> for u16 {
    fn from(status: Status) -> Self {
        status.0
    }
}

impl PartialEq<u16> for Status {
    fn eq(&self, other: &u16) -> bool {
        self.0 == *other
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Status;

    #[test]
    fn ranges() {
        assert!(Status::OK.is_success());
        assert!(!Status::NOT_MODIFIED.is_success());
        assert!(Status::NOT_MODIFIED.is_redirection());
        assert_eq!(Status::try_from(299).unwrap(), 299);
        assert!(Status::try_from(42).is_err());
    }
}

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

macro_rules! known_headers {
    (
        $(
            ($capitalized:literal, $lower:literal, $variant:tt)
        ),+
    ) => {
        /// The headers that espalier reads or writes while deriving
        /// request state. Any other header can be addressed with a
        /// `&str` or `String`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[non_exhaustive]
        pub enum KnownHeaderName {
            $(
                #[doc = concat!("The `", $capitalized, "` header.")]
                $variant,
            )+
        }

        impl KnownHeaderName {
            /// the canonical capitalization of this header
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $capitalized, )+
                }
            }

            /// the lowercased form used for lookups
            pub fn as_lower_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $lower, )+
                }
            }
        }

        impl FromStr for KnownHeaderName {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($lower) {
                        return Ok(Self::$variant);
                    }
                )+

                Err(())
            }
        }
    }
}

known_headers! {
    ("Cache-Control", "cache-control", CacheControl),
    ("Content-Length", "content-length", ContentLength),
    ("Content-Type", "content-type", ContentType),
    ("ETag", "etag", Etag),
    ("Host", "host", Host),
    ("If-Modified-Since", "if-modified-since", IfModifiedSince),
    ("If-None-Match", "if-none-match", IfNoneMatch),
    ("Last-Modified", "last-modified", LastModified),
    ("Referer", "referer", Referer),
    ("Referrer", "referrer", Referrer),
    ("Transfer-Encoding", "transfer-encoding", TransferEncoding),
    ("X-Forwarded-For", "x-forwarded-for", XforwardedFor),
    ("X-Forwarded-Host", "x-forwarded-host", XforwardedHost),
    ("X-Forwarded-Proto", "x-forwarded-proto", XforwardedProto),
    ("X-Powered-By", "x-powered-by", XpoweredBy),
    ("X-Requested-With", "x-requested-with", XrequestedWith)
}

impl Display for KnownHeaderName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for KnownHeaderName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

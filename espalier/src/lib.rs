#![forbid(unsafe_code)]
#![deny(
    missing_debug_implementations,
    nonstandard_style,
    missing_copy_implementations,
    unused_qualifications
)]
//! Welcome to espalier!
//!
//! This crate compiles a handful of human-supplied settings (which
//! reverse proxies to trust, how to generate entity tags, how to
//! parse query strings) into fast closures, derives request-level
//! facts from them on a [`Conn`], and resolves and renders views for
//! an [`App`].
//!
//! ```
//! use espalier::{App, Conn, Method};
//!
//! # fn main() -> espalier::Result<()> {
//! let app = App::new();
//! app.set("trust proxy", "loopback")?;
//!
//! let conn = Conn::new(&app, Method::Get, "/")
//!     .with_peer_ip("127.0.0.1")
//!     .with_request_header("X-Forwarded-For", "203.0.113.7")
//!     .with_request_header("X-Forwarded-Proto", "https")
//!     .with_request_header("Host", "tobi.ferrets.example.com");
//!
//! assert_eq!(conn.ip(), Some("203.0.113.7"));
//! assert!(conn.is_secure());
//! assert_eq!(conn.subdomains(), ["ferrets", "tobi"]);
//! # Ok(()) }
//! ```

mod error;
pub use error::{Error, Result};

mod setting;
pub use setting::Setting;

mod compile;
pub use compile::{compile_etag, compile_query_parser, compile_trust};

mod query;
pub use query::QueryParser;

pub mod settings;
pub use settings::Settings;

mod app;
pub use app::App;

mod conn;
pub use conn::Conn;

pub use espalier_caching_headers::EtagFn;
pub use espalier_forwarding::{ProxyChain, TrustProxy};
pub use espalier_http::{Headers, KnownHeaderName, Method, Status};
pub use espalier_views::{BoxError, Engine, EngineLoader, Engines, RenderCache, View, ViewResolver};
pub use serde_json::{Map, Value};

/*!
A layered store of named settings.

Each store holds its own values and optionally falls through to a
parent store, which is how a mounted sub-application inherits from
the application it is mounted on. Three settings are compiled when
written: [`ETAG`], [`QUERY_PARSER`] and [`TRUST_PROXY`] each store a
derived closure alongside the raw value, and the derived keys cannot
be written directly.
*/

use crate::{
    Error, QueryParser, Result, Setting, compile_etag, compile_query_parser, compile_trust,
};
use espalier_caching_headers::EtagFn;
use espalier_forwarding::TrustProxy;
use std::{
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    path::PathBuf,
    sync::{
        Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicBool, Ordering},
    },
};

/// the application environment, read from `ESPALIER_ENV`
pub const ENV: &str = "env";
/// whether responses carry an `X-Powered-By` header
pub const X_POWERED_BY: &str = "x-powered-by";
/// entity tag generation: `true`, `false`, `"weak"`, `"strong"` or a function
pub const ETAG: &str = "etag";
/// derived from [`ETAG`]
pub const ETAG_FN: &str = "etag fn";
/// query string parsing: `true`, `false`, `"simple"`, `"extended"` or a function
pub const QUERY_PARSER: &str = "query parser";
/// derived from [`QUERY_PARSER`]
pub const QUERY_PARSER_FN: &str = "query parser fn";
/// which proxies may declare forwarding headers
pub const TRUST_PROXY: &str = "trust proxy";
/// derived from [`TRUST_PROXY`]
pub const TRUST_PROXY_FN: &str = "trust proxy fn";
/// how many trailing hostname labels are not subdomains
pub const SUBDOMAIN_OFFSET: &str = "subdomain offset";
/// the view root directory, or a list of them
pub const VIEWS: &str = "views";
/// the extension appended to view names that have none
pub const VIEW_ENGINE: &str = "view engine";
/// whether resolved views are cached by name
pub const VIEW_CACHE: &str = "view cache";
/// the default JSONP callback parameter
pub const JSONP_CALLBACK_NAME: &str = "jsonp callback name";

const DERIVED: [&str; 3] = [ETAG_FN, QUERY_PARSER_FN, TRUST_PROXY_FN];
const ENV_VAR: &str = "ESPALIER_ENV";
const DEFAULT_SUBDOMAIN_OFFSET: usize = 2;

type Entries = HashMap<String, Option<Setting>>;

/**
A layered settings store.

An entry of `None` records a key that was explicitly cleared, which
shadows any value in the parent. This is how `etag = false` hides an
inherited `etag fn`.
*/
pub struct Settings {
    own: RwLock<Entries>,
    parent: RwLock<Option<Arc<Settings>>>,
    trust_proxy_default: AtomicBool,
}

impl Debug for Settings {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("own", &*self.read())
            .field("has_parent", &self.parent().is_some())
            .field(
                "trust_proxy_default",
                &self.trust_proxy_default.load(Ordering::SeqCst),
            )
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Settings {
    /// an empty store with no parent
    pub fn new() -> Self {
        Self {
            own: RwLock::new(HashMap::new()),
            parent: RwLock::new(None),
            trust_proxy_default: AtomicBool::new(false),
        }
    }

    /**
    a store populated with the application defaults:

    | key                   | default                               |
    |-----------------------|---------------------------------------|
    | `env`                 | `$ESPALIER_ENV`, else `"development"` |
    | `x-powered-by`        | `true`                                |
    | `etag`                | `"weak"`                              |
    | `query parser`        | `"simple"`                            |
    | `subdomain offset`    | `2`                                   |
    | `trust proxy`         | `false`                               |
    | `views`               | `<current directory>/views`           |
    | `jsonp callback name` | `"callback"`                          |
    | `view cache`          | `true` only in production             |
    */
    pub fn with_defaults() -> Self {
        let settings = Self::new();
        let env = std::env::var(ENV_VAR).unwrap_or_else(|_| String::from("development"));
        let views = std::env::current_dir()
            .map(|cwd| cwd.join("views"))
            .unwrap_or_else(|_| PathBuf::from("views"));

        {
            let mut own = settings.write();
            let mut init = |key: &str, value: Setting| {
                own.insert(key.to_string(), Some(value));
            };
            init(X_POWERED_BY, true.into());
            init(ETAG, "weak".into());
            init(ETAG_FN, EtagFn::weak().into());
            init(QUERY_PARSER, "simple".into());
            init(QUERY_PARSER_FN, QueryParser::simple().into());
            init(SUBDOMAIN_OFFSET, DEFAULT_SUBDOMAIN_OFFSET.into());
            init(TRUST_PROXY, false.into());
            init(TRUST_PROXY_FN, TrustProxy::never().into());
            init(VIEWS, views.to_string_lossy().into_owned().into());
            init(JSONP_CALLBACK_NAME, "callback".into());
            init(VIEW_CACHE, (env == "production").into());
            init(ENV, env.clone().into());
        }

        settings.trust_proxy_default.store(true, Ordering::SeqCst);
        log::debug!("booting in {env} mode");
        settings
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.own.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.own.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// the store this one falls through to, if any
    pub fn parent(&self) -> Option<Arc<Settings>> {
        self.parent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /**
    Reads a setting, falling through to the parent when this store
    has no entry for `key`.

    ```
    # use espalier::Settings;
    let settings = Settings::with_defaults();
    assert_eq!(settings.get("subdomain offset").and_then(|s| s.as_number()), Some(2));
    assert!(settings.get("not a setting").is_none());
    ```
    */
    pub fn get(&self, key: &str) -> Option<Setting> {
        if let Some(value) = self.read().get(key) {
            return value.clone();
        }
        self.parent().and_then(|parent| parent.get(key))
    }

    /**
    Writes a setting.

    Writing `etag`, `query parser` or `trust proxy` compiles the value
    and stores the result under the matching derived key in the same
    step. If compilation fails, the store is left unchanged. Writing a
    derived key directly is an error.

    ```
    # use espalier::Settings;
    let settings = Settings::new();
    settings.set("trust proxy", "loopback").unwrap();
    assert!(settings.trust_proxy().is_trusted("127.0.0.1", 0));
    assert!(settings.set("trust proxy", "not-an-ip").is_err());
    assert!(settings.trust_proxy().is_trusted("127.0.0.1", 0));
    assert!(settings.set("trust proxy fn", true).is_err());
    ```
    */
    pub fn set(&self, key: &str, value: impl Into<Setting>) -> Result<&Self> {
        if DERIVED.contains(&key) {
            return Err(Error::InvalidSetting {
                key: key.to_string(),
                reason: String::from("this setting is compiled from its primary setting"),
            });
        }

        let value = value.into();
        let derived = match key {
            ETAG => Some((ETAG_FN, compile_etag(&value)?.map(Setting::Etag))),
            QUERY_PARSER => Some((
                QUERY_PARSER_FN,
                Some(Setting::QueryParser(compile_query_parser(&value)?)),
            )),
            TRUST_PROXY => Some((
                TRUST_PROXY_FN,
                Some(Setting::TrustProxy(compile_trust(&value)?)),
            )),
            _ => None,
        };

        log::debug!("set {key:?} to {value}");

        let mut own = self.write();
        own.insert(key.to_string(), Some(value));
        if let Some((derived_key, compiled)) = derived {
            own.insert(derived_key.to_string(), compiled);
        }
        drop(own);

        if key == TRUST_PROXY {
            self.trust_proxy_default.store(false, Ordering::SeqCst);
        }

        Ok(self)
    }

    /// whether `key` is set to a truthy value
    pub fn enabled(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| value.is_truthy())
    }

    /// whether `key` is unset or falsy
    pub fn disabled(&self, key: &str) -> bool {
        !self.enabled(key)
    }

    /// sets `key` to `true`
    pub fn enable(&self, key: &str) -> Result<&Self> {
        self.set(key, true)
    }

    /// sets `key` to `false`
    pub fn disable(&self, key: &str) -> Result<&Self> {
        self.set(key, false)
    }

    /// true if `trust proxy` has not been written since the defaults
    /// were applied
    pub fn is_trust_proxy_default(&self) -> bool {
        self.trust_proxy_default.load(Ordering::SeqCst)
    }

    /**
    Makes `parent` the fallback for this store.

    If this store's `trust proxy` is still the untouched default, the
    local `trust proxy` entries are removed so that the parent's
    policy shows through.
    */
    pub fn inherit_from(&self, parent: Arc<Settings>) {
        if self.is_trust_proxy_default() {
            let mut own = self.write();
            own.remove(TRUST_PROXY);
            own.remove(TRUST_PROXY_FN);
            log::trace!("inheriting trust proxy from parent settings");
        }

        *self.parent.write().unwrap_or_else(PoisonError::into_inner) = Some(parent);
    }

    /// the compiled trust policy, trusting nothing if none is set
    pub fn trust_proxy(&self) -> TrustProxy {
        self.get(TRUST_PROXY_FN)
            .and_then(|setting| setting.as_trust_proxy().cloned())
            .unwrap_or_default()
    }

    /// the compiled entity tag generator, if generation is enabled
    pub fn etag_fn(&self) -> Option<EtagFn> {
        self.get(ETAG_FN)
            .and_then(|setting| setting.as_etag_fn().cloned())
    }

    /// the compiled query parser, if one is set
    pub fn query_parser(&self) -> Option<QueryParser> {
        self.get(QUERY_PARSER_FN)
            .and_then(|setting| setting.as_query_parser().cloned())
    }

    /// the subdomain offset, `2` if unset or negative
    pub fn subdomain_offset(&self) -> usize {
        self.get(SUBDOMAIN_OFFSET)
            .and_then(|setting| setting.as_number())
            .and_then(|offset| usize::try_from(offset).ok())
            .unwrap_or(DEFAULT_SUBDOMAIN_OFFSET)
    }

    /// the view root directories, in lookup order
    pub fn view_roots(&self) -> Vec<PathBuf> {
        match self.get(VIEWS) {
            Some(Setting::String(root)) => vec![PathBuf::from(root)],
            Some(Setting::List(roots)) => roots.into_iter().map(PathBuf::from).collect(),
            _ => Vec::new(),
        }
    }

    /// the default view engine extension, if set
    pub fn view_engine(&self) -> Option<String> {
        self.get(VIEW_ENGINE)
            .and_then(|setting| setting.as_str().map(String::from))
            .filter(|engine| !engine.is_empty())
    }

    /// whether resolved views are cached
    pub fn view_cache(&self) -> bool {
        self.enabled(VIEW_CACHE)
    }

    /// the application environment
    pub fn env(&self) -> Option<String> {
        self.get(ENV).and_then(|setting| setting.as_str().map(String::from))
    }
}

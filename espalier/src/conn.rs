use crate::App;
use espalier_caching_headers::is_fresh;
use espalier_forwarding::{ProxyChain, TrustProxy};
use espalier_http::{
    Headers,
    KnownHeaderName::{
        ContentLength, ContentType, Etag, Host, Referer, Referrer, TransferEncoding,
        XforwardedHost, XforwardedProto, XpoweredBy, XrequestedWith,
    },
    Method, Status,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::net::IpAddr;

/**
The state of one request and its response.

A `Conn` is built from the request facts a server would supply (the
method, the request target, headers, the peer address and whether the
transport was encrypted). Everything else (the client address, the
effective protocol, the hostname, subdomains, freshness and the parsed
query) is derived on demand from the app's current settings, so
changing a setting between two reads changes the second answer.

```
use espalier::{App, Conn, Method};

let app = App::new();
let conn = Conn::new(&app, Method::Get, "/search?q=tobi")
    .with_request_header("Host", "example.com:3000")
    .with_peer_ip("10.0.0.1");

assert_eq!(conn.protocol(), "http");
assert_eq!(conn.hostname(), Some("example.com"));
assert_eq!(conn.ip(), Some("10.0.0.1"));
assert_eq!(conn.query()["q"], "tobi");
```
*/
#[derive(Debug)]
pub struct Conn {
    app: App,
    method: Method,
    path: String,
    querystring: String,
    request_headers: Headers,
    response_headers: Headers,
    status: Option<Status>,
    peer_ip: Option<String>,
    secure: bool,
    body: Option<String>,
}

impl Conn {
    /// starts a conn for `method` and `target` (a path with an
    /// optional query string) against `app`
    pub fn new(app: &App, method: Method, target: &str) -> Self {
        let (path, querystring) = target.split_once('?').unwrap_or((target, ""));

        let mut response_headers = Headers::new();
        if app.enabled(crate::settings::X_POWERED_BY) {
            response_headers.insert(XpoweredBy, "Espalier");
        }

        Self {
            app: app.clone(),
            method,
            path: path.to_string(),
            querystring: querystring.to_string(),
            request_headers: Headers::new(),
            response_headers,
            status: None,
            peer_ip: None,
            secure: false,
            body: None,
        }
    }

    /// appends a request header
    pub fn with_request_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.request_headers.append(name.to_string(), value);
        self
    }

    /// sets the address of the directly connected peer
    pub fn with_peer_ip(mut self, peer_ip: impl Into<String>) -> Self {
        self.peer_ip = Some(peer_ip.into());
        self
    }

    /// marks the transport as encrypted
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// sets the response status
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// sets a response header, replacing any previous value
    pub fn with_response_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.response_headers.insert(name.to_string(), value);
        self
    }

    /// sets the response body without any of the processing [`Conn::send`] applies
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// the app this conn belongs to
    pub fn app(&self) -> &App {
        &self.app
    }

    /// the request method
    pub fn method(&self) -> Method {
        self.method
    }

    /// the request path, without the query string
    pub fn path(&self) -> &str {
        &self.path
    }

    /// the raw query string, without the leading `?`
    pub fn querystring(&self) -> &str {
        &self.querystring
    }

    /// the request headers
    pub fn request_headers(&self) -> &Headers {
        &self.request_headers
    }

    /// the request headers, mutably
    pub fn request_headers_mut(&mut self) -> &mut Headers {
        &mut self.request_headers
    }

    /// the response headers
    pub fn response_headers(&self) -> &Headers {
        &self.response_headers
    }

    /// the response headers, mutably
    pub fn response_headers_mut(&mut self) -> &mut Headers {
        &mut self.response_headers
    }

    /// the response status, if one has been set
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// sets the response status
    pub fn set_status(&mut self, status: Status) {
        self.status = Some(status);
    }

    /// the response body, if one has been set
    pub fn response_body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// the address of the directly connected peer, if known
    pub fn peer_ip(&self) -> Option<&str> {
        self.peer_ip.as_deref()
    }

    fn peer(&self) -> &str {
        self.peer_ip.as_deref().unwrap_or_default()
    }

    fn trust(&self) -> TrustProxy {
        self.app.settings().trust_proxy()
    }

    fn trusts_peer(&self) -> bool {
        self.trust().is_trusted(self.peer(), 0)
    }

    /**
    `"https"` or `"http"`. When the peer is trusted, the first entry
    of a non-empty `X-Forwarded-Proto` wins over the transport.
    */
    pub fn protocol(&self) -> &str {
        let transport = if self.secure { "https" } else { "http" };
        if !self.trusts_peer() {
            return transport;
        }

        match self
            .request_headers
            .get_str(XforwardedProto)
            .filter(|header| !header.is_empty())
        {
            Some(header) => header.split(',').next().unwrap_or(header).trim(),
            None => transport,
        }
    }

    /// true if [`Conn::protocol`] is `https`
    pub fn is_secure(&self) -> bool {
        self.protocol() == "https"
    }

    /// the resolved chain of addresses, from the peer back to the
    /// client
    pub fn proxy_chain(&self) -> ProxyChain<'_> {
        ProxyChain::from_headers(self.peer(), &self.request_headers, &self.trust())
    }

    /// the client address: the furthest trusted address in the
    /// forwarding chain
    pub fn ip(&self) -> Option<&str> {
        Some(self.proxy_chain().client()).filter(|ip| !ip.is_empty())
    }

    /// the trusted forwarded addresses, client first, excluding the
    /// peer
    pub fn ips(&self) -> Vec<&str> {
        self.proxy_chain().ips()
    }

    /**
    The host as declared by the request, including any port. When the
    peer is trusted, the first entry of a non-empty `X-Forwarded-Host`
    wins over `Host`.
    */
    pub fn host(&self) -> Option<&str> {
        let forwarded = self
            .request_headers
            .get_str(XforwardedHost)
            .filter(|host| !host.is_empty());

        let host = match forwarded {
            Some(host) if self.trusts_peer() => match host.split_once(',') {
                Some((first, _)) => first.trim_end(),
                None => host,
            },
            _ => self.request_headers.get_str(Host)?,
        };

        Some(host).filter(|host| !host.is_empty())
    }

    /// [`Conn::host`] without the port. IPv6 literals keep their
    /// brackets.
    pub fn hostname(&self) -> Option<&str> {
        let host = self.host()?;

        let offset = if host.starts_with('[') {
            host.find(']').map_or(0, |index| index + 1)
        } else {
            0
        };

        let hostname = match host[offset..].find(':') {
            Some(index) => &host[..offset + index],
            None => host,
        };

        Some(hostname).filter(|hostname| !hostname.is_empty())
    }

    /**
    The labels of the hostname left of the last `subdomain offset`
    labels, nearest the root first. An IP literal hostname is treated
    as a single label.
    */
    pub fn subdomains(&self) -> Vec<&str> {
        let Some(hostname) = self.hostname() else {
            return Vec::new();
        };
        let offset = self.app.settings().subdomain_offset();

        if is_ip_literal(hostname) {
            return [hostname].into_iter().skip(offset).collect();
        }

        hostname.split('.').rev().skip(offset).collect()
    }

    /**
    true when a cached representation held by the client is still
    current. Only `GET` and `HEAD` requests whose response status is
    2xx or 304 can be fresh. An unset status counts as 200.
    */
    pub fn is_fresh(&self) -> bool {
        if !matches!(self.method, Method::Get | Method::Head) {
            return false;
        }

        let status = self.status.unwrap_or_default();
        if !status.is_success() && status != Status::NOT_MODIFIED {
            return false;
        }

        is_fresh(&self.request_headers, &self.response_headers)
    }

    /// the negation of [`Conn::is_fresh`]
    pub fn is_stale(&self) -> bool {
        !self.is_fresh()
    }

    /// a request header by case-insensitive name. `Referer` and
    /// `Referrer` are interchangeable, preferring `Referrer`.
    pub fn header(&self, name: &str) -> Option<&str> {
        if name.eq_ignore_ascii_case("referer") || name.eq_ignore_ascii_case("referrer") {
            self.request_headers
                .get_str(Referrer)
                .or_else(|| self.request_headers.get_str(Referer))
        } else {
            self.request_headers.get_str(name)
        }
    }

    /// true if `X-Requested-With` is `XMLHttpRequest`
    pub fn xhr(&self) -> bool {
        self.request_headers
            .eq_ignore_ascii_case(XrequestedWith, "xmlhttprequest")
    }

    /// the query string parsed with the app's current `query parser`
    pub fn query(&self) -> Map<String, Value> {
        self.app
            .settings()
            .query_parser()
            .map(|parser| parser.parse(&self.querystring))
            .unwrap_or_default()
    }

    /**
    Sends `body` as the response.

    Sets a `Content-Type` of html if none is present, generates an
    `ETag` with the app's `etag fn` unless one is already set, and
    answers `304 Not Modified` without a body when the request is
    fresh. `HEAD` responses keep their headers but carry no body.
    */
    pub fn send(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.status.get_or_insert(Status::OK);

        self.response_headers
            .try_insert(ContentType, "text/html; charset=utf-8");

        if !self.response_headers.has_header(Etag) {
            if let Some(etag_fn) = self.app.settings().etag_fn() {
                self.response_headers
                    .insert(Etag, etag_fn.generate(body.as_bytes()));
            }
        }

        self.response_headers
            .insert(ContentLength, body.len().to_string());

        if self.is_fresh() {
            log::trace!("{} {} is fresh", self.method, self.path);
            self.status = Some(Status::NOT_MODIFIED);
        }

        if matches!(self.status, Some(Status::NO_CONTENT | Status::NOT_MODIFIED)) {
            self.response_headers.remove(ContentType);
            self.response_headers.remove(ContentLength);
            self.response_headers.remove(TransferEncoding);
            self.body = Some(String::new());
        } else if self.method == Method::Head {
            self.body = Some(String::new());
        } else {
            self.body = Some(body);
        }

        self
    }

    /// renders the view `name` with `options` merged over the app
    /// locals and sends it. A failure is logged and becomes a 500
    /// response. The error detail is only sent outside production.
    pub fn render(self, name: &str, options: impl Serialize) -> Self {
        match self.app.render(name, options) {
            Ok(html) => self.send(html),
            Err(error) => {
                log::error!("failed to render {name}: {error}");
                let body = if self.app.settings().env().as_deref() == Some("production") {
                    String::from("Internal Server Error")
                } else {
                    error.to_string()
                };
                self.with_status(Status::INTERNAL_SERVER_ERROR)
                    .with_body(body)
            }
        }
    }
}

fn is_ip_literal(hostname: &str) -> bool {
    let unbracketed = hostname
        .strip_prefix('[')
        .and_then(|hostname| hostname.strip_suffix(']'))
        .unwrap_or(hostname);
    unbracketed.parse::<IpAddr>().is_ok()
}

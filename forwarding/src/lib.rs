/*!
# Trusted proxies and `x-forwarded-for` chains

A [`TrustProxy`] decides whether a given network hop may be believed.
A [`ProxyChain`] walks the `X-Forwarded-For` header from the socket
peer outward, stopping at the first hop that the policy does not
trust. The last address in the chain is the client address.

There are several ways of specifying when to trust a hop, and the
narrowest possible trust rules should be used for a given deployment
so as to decrease the chance for a threat actor to generate a request
with forwarded headers that we mistakenly trust.

```
use espalier_forwarding::{ProxyChain, TrustProxy};

let trust = TrustProxy::trust_ips(["10.0.0.0/8"]).unwrap();
let chain = ProxyChain::resolve("10.0.0.2", ["203.0.113.7, 10.0.0.1"], &trust);
assert_eq!(chain.client(), "203.0.113.7");
assert_eq!(chain.ips(), ["203.0.113.7", "10.0.0.1"]);
```
*/
#![forbid(unsafe_code)]
#![deny(
    missing_copy_implementations,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    unused_qualifications
)]

mod error;
pub use error::{Error, Result};

mod parse_utils;

mod trust_proxy;
pub use trust_proxy::TrustProxy;

mod proxy_chain;
pub use proxy_chain::ProxyChain;

use crate::{TrustProxy, parse_utils::split_list};
use espalier_http::{Headers, KnownHeaderName};

/**
The ordered chain of addresses from the socket peer outward to the
farthest trusted hop.

The first element is always the socket peer. Each following element
is the next unconsumed `X-Forwarded-For` entry, read right to left,
appended only while the previous element is trusted at its hop
index. The walk stops at the first untrusted element, which is kept
as the final element, or when the header runs out.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyChain<'a> {
    addresses: Vec<&'a str>,
}

impl<'a> ProxyChain<'a> {
    /// walks `forwarded_for`, a sequence of forwarding header lines in
    /// arrival order, starting from the socket `peer`
    pub fn resolve<I>(peer: &'a str, forwarded_for: I, trust: &TrustProxy) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let forwarded: Vec<&'a str> = forwarded_for.into_iter().flat_map(split_list).collect();

        let mut addresses = Vec::with_capacity(forwarded.len() + 1);
        addresses.push(peer);

        for (hop, next) in forwarded.into_iter().rev().enumerate() {
            let current = addresses[hop];
            if !trust.is_trusted(current, hop) {
                log::trace!("hop {hop} ({current}) is not trusted, stopping");
                break;
            }

            log::trace!("hop {hop} ({current}) is trusted, forwarded for {next}");
            addresses.push(next);
        }

        Self { addresses }
    }

    /// walks the `X-Forwarded-For` lines in `headers`
    pub fn from_headers(peer: &'a str, headers: &'a Headers, trust: &TrustProxy) -> Self {
        let lines = headers
            .get_values(KnownHeaderName::XforwardedFor)
            .unwrap_or_default();
        Self::resolve(peer, lines.iter().map(String::as_str), trust)
    }

    /// the socket peer
    pub fn peer(&self) -> &'a str {
        self.addresses[0]
    }

    /// the farthest trusted hop, or the socket peer if nothing is
    /// trusted
    pub fn client(&self) -> &'a str {
        self.addresses[self.addresses.len() - 1]
    }

    /// the chain without the socket peer, farthest first
    pub fn ips(&self) -> Vec<&'a str> {
        self.addresses[1..].iter().rev().copied().collect()
    }

    /// the whole chain, socket peer first
    pub fn addresses(&self) -> &[&'a str] {
        &self.addresses
    }

    /// the number of addresses in the chain, including the socket
    /// peer. This is never zero.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// always false; a chain contains at least the socket peer
    pub fn is_empty(&self) -> bool {
        false
    }
}

use crate::{
    Error, Result,
    parse_utils::{netmask_len, network, parse_ip, split_trust_list},
};
use cidr::AnyIpCidr;
use std::{
    fmt::{self, Debug, Formatter},
    net::IpAddr,
    ops::Deref,
    sync::Arc,
};

const LOOPBACK: &[&str] = &["127.0.0.1/8", "::1/128"];
const LINKLOCAL: &[&str] = &["169.254.0.0/16", "fe80::/10"];
const UNIQUELOCAL: &[&str] = &["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16", "fc00::/7"];

#[derive(Clone, Debug, Default)]
enum Rule {
    Always,
    #[default]
    Never,
    Hops(usize),
    Cidr(Arc<[AnyIpCidr]>),
    Function(TrustFn),
}

#[derive(Clone)]
struct TrustFn(Arc<dyn Fn(&str, usize) -> bool + Send + Sync + 'static>);

impl Debug for TrustFn {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TrustFn").field(&"..").finish()
    }
}

impl Deref for TrustFn {
    type Target = dyn Fn(&str, usize) -> bool + Send + Sync + 'static;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

/**
A compiled trust policy.

`is_trusted(address, hop)` answers whether the hop at index `hop`
(the socket peer is hop `0`) with the given address may be believed
when it declares forwarding information. It never panics, and any
address that does not parse is simply untrusted by the address-list
policies.

```
use espalier_forwarding::TrustProxy;

let hops = TrustProxy::hops(2);
assert!(hops.is_trusted("203.0.113.1", 0));
assert!(hops.is_trusted("203.0.113.1", 1));
assert!(!hops.is_trusted("203.0.113.1", 2));

let list = TrustProxy::parse("loopback, 10.0.0.0/8").unwrap();
assert!(list.is_trusted("127.0.0.1", 7));
assert!(list.is_trusted("10.20.30.40", 0));
assert!(!list.is_trusted("192.0.2.1", 0));
```
*/
#[derive(Clone, Debug, Default)]
pub struct TrustProxy(Rule);

impl TrustProxy {
    /// trusts every hop. This should only be used when the
    /// application is only ever reachable through a reverse proxy
    /// that always overwrites forwarding headers, as it allows any
    /// other client to forge them.
    pub fn always() -> Self {
        Self(Rule::Always)
    }

    /// trusts nothing. This is the default.
    pub fn never() -> Self {
        Self(Rule::Never)
    }

    /// trusts the first `count` hops from the socket, irrespective
    /// of their addresses: `is_trusted(_, hop) ⇔ hop < count`
    pub fn hops(count: usize) -> Self {
        Self(Rule::Hops(count))
    }

    /**
    builds a policy that trusts any hop whose address matches one of
    the provided entries, irrespective of hop index. Entries may be
    ip addresses, cidr ranges (`10.0.0.0/8`, `10.0.0.0/255.0.0.0`), or
    one of the named subnets `loopback`, `linklocal` and
    `uniquelocal`. An empty list trusts nothing.

    ```
    # use espalier_forwarding::TrustProxy;
    let trust = TrustProxy::trust_ips(["10.1.10.1", "192.168.0.0/16"]).unwrap();
    assert!(trust.is_trusted("192.168.4.4", 0));
    assert!(TrustProxy::trust_ips(["10.1.10"]).is_err());
    ```
    */
    pub fn trust_ips<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cidrs = Vec::new();
        for entry in entries {
            let entry = entry.as_ref().trim();
            match entry {
                "loopback" => cidrs.extend(named(LOOPBACK)?),
                "linklocal" => cidrs.extend(named(LINKLOCAL)?),
                "uniquelocal" => cidrs.extend(named(UNIQUELOCAL)?),
                other => cidrs.push(parse_cidr(other)?),
            }
        }

        if cidrs.is_empty() {
            Ok(Self::never())
        } else {
            log::debug!("trusting proxies in {cidrs:?}");
            Ok(Self(Rule::Cidr(cidrs.into())))
        }
    }

    /// splits `list` on commas and whitespace and builds an
    /// address-list policy from the entries, as in
    /// [`TrustProxy::trust_ips`]
    pub fn parse(list: &str) -> Result<Self> {
        Self::trust_ips(split_trust_list(list))
    }

    /**
    builds a policy from a predicate over the hop's address and hop
    index.

    ```
    # use espalier_forwarding::TrustProxy;
    let trust = TrustProxy::trust_fn(|address, hop| hop == 0 && address.starts_with("10."));
    assert!(trust.is_trusted("10.0.0.1", 0));
    assert!(!trust.is_trusted("10.0.0.1", 1));
    ```
    */
    pub fn trust_fn<F>(predicate: F) -> Self
    where
        F: Fn(&str, usize) -> bool + Send + Sync + 'static,
    {
        Self(Rule::Function(TrustFn(Arc::new(predicate))))
    }

    /// true if the hop at index `hop`, connecting from `address`, is
    /// trusted to declare forwarding information
    pub fn is_trusted(&self, address: &str, hop: usize) -> bool {
        match &self.0 {
            Rule::Always => true,
            Rule::Never => false,
            Rule::Hops(count) => hop < *count,
            Rule::Cidr(cidrs) => {
                parse_ip(address).is_some_and(|ip| cidrs.iter().any(|cidr| contains(cidr, ip)))
            }
            Rule::Function(predicate) => predicate(address, hop),
        }
    }

    /// true if this policy can never trust any hop
    pub fn is_never(&self) -> bool {
        matches!(self.0, Rule::Never)
    }
}

fn named(subnets: &[&str]) -> Result<Vec<AnyIpCidr>> {
    subnets.iter().map(|subnet| parse_cidr(subnet)).collect()
}

fn contains(cidr: &AnyIpCidr, ip: IpAddr) -> bool {
    if cidr.contains(&ip) {
        return true;
    }

    match ip {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .is_some_and(|v4| cidr.contains(&IpAddr::V4(v4))),
        IpAddr::V4(v4) => cidr.contains(&IpAddr::V6(v4.to_ipv6_mapped())),
    }
}

fn parse_cidr(entry: &str) -> Result<AnyIpCidr> {
    let invalid = || Error::InvalidTrustAddress(entry.to_string());

    let (address, range) = match entry.split_once('/') {
        Some((address, range)) => (address, Some(range)),
        None => (entry, None),
    };

    let mut ip: IpAddr = address.parse().map_err(|_| invalid())?;
    let max = if ip.is_ipv4() { 32 } else { 128 };

    let mut len = match range {
        None => max,
        Some(range) if !range.is_empty() && range.bytes().all(|b| b.is_ascii_digit()) => {
            range.parse::<u8>().map_err(|_| invalid())?
        }
        Some(netmask) if ip.is_ipv4() => netmask_len(netmask).ok_or_else(invalid)?,
        Some(_) => return Err(invalid()),
    };

    if len == 0 || len > max {
        return Err(invalid());
    }

    if let IpAddr::V6(v6) = ip {
        if let Some(v4) = v6.to_ipv4_mapped() {
            if len < 96 {
                return Err(invalid());
            }
            ip = IpAddr::V4(v4);
            len -= 96;
            if len == 0 {
                return Err(invalid());
            }
        }
    }

    format!("{}/{len}", network(ip, len))
        .parse()
        .map_err(|_| invalid())
}

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// splits one forwarding header line into its comma-separated
/// segments, trimmed, in header order. empty segments are skipped.
pub(crate) fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}

/// splits a trust setting string on commas and whitespace
pub(crate) fn split_trust_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|entry| !entry.is_empty())
}

/// parses an address as it appears in a header or socket, accepting
/// the bracketed ipv6 form
pub(crate) fn parse_ip(address: &str) -> Option<IpAddr> {
    let address = address.trim();
    let address = address
        .strip_prefix('[')
        .and_then(|a| a.strip_suffix(']'))
        .unwrap_or(address);
    address.parse().ok()
}

/// the prefix length of a contiguous ipv4 netmask like `255.255.0.0`
pub(crate) fn netmask_len(netmask: &str) -> Option<u8> {
    let mask = u32::from(netmask.parse::<Ipv4Addr>().ok()?);
    let len = mask.leading_ones();
    let expected = u32::MAX.checked_shl(32 - len).unwrap_or(0);
    (mask == expected).then(|| len as u8)
}

/// zeroes the host bits of `ip` beyond `len`
pub(crate) fn network(ip: IpAddr, len: u8) -> IpAddr {
    match ip {
        IpAddr::V4(v4) => {
            let mask = u32::MAX.checked_shl(32 - u32::from(len)).unwrap_or(0);
            IpAddr::V4(Ipv4Addr::from(u32::from(v4) & mask))
        }
        IpAddr::V6(v6) => {
            let mask = u128::MAX.checked_shl(128 - u32::from(len)).unwrap_or(0);
            IpAddr::V6(Ipv6Addr::from(u128::from(v6) & mask))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_segments_are_trimmed_and_empties_dropped() {
        assert_eq!(
            split_list(" 10.0.0.1 ,, 10.0.0.2,").collect::<Vec<_>>(),
            ["10.0.0.1", "10.0.0.2"]
        );
        assert_eq!(split_list(" ").count(), 0);
    }

    #[test]
    fn trust_lists_split_on_commas_and_spaces() {
        assert_eq!(
            split_trust_list("loopback, 10.0.0.1 192.168.0.0/16").collect::<Vec<_>>(),
            ["loopback", "10.0.0.1", "192.168.0.0/16"]
        );
    }

    #[test]
    fn bracketed_ipv6() {
        assert_eq!(parse_ip("[::1]"), Some(IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert_eq!(parse_ip("::1"), Some(IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert_eq!(parse_ip("[::1"), None);
        assert_eq!(parse_ip("not-an-ip"), None);
    }

    #[test]
    fn netmasks() {
        assert_eq!(netmask_len("255.255.0.0"), Some(16));
        assert_eq!(netmask_len("255.255.255.255"), Some(32));
        assert_eq!(netmask_len("255.0.255.0"), None);
    }

    #[test]
    fn host_bits_are_cleared() {
        assert_eq!(
            network("10.1.2.3".parse().unwrap(), 8),
            "10.0.0.0".parse::<IpAddr>().unwrap()
        );
        assert_eq!(
            network("fe80::1".parse().unwrap(), 10),
            "fe80::".parse::<IpAddr>().unwrap()
        );
    }
}

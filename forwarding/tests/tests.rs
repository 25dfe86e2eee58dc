use espalier_forwarding::*;
use espalier_http::Headers;
use pretty_assertions::assert_eq;

fn headers(forwarded_for: &[&str]) -> Headers {
    forwarded_for
        .iter()
        .map(|line| ("x-forwarded-for", *line))
        .collect()
}

#[test]
fn nothing_trusted() {
    let headers = headers(&["192.0.2.60, 10.0.0.1"]);
    let chain = ProxyChain::from_headers("10.0.0.2", &headers, &TrustProxy::never());
    assert_eq!(chain.addresses(), ["10.0.0.2"]);
    assert_eq!(chain.client(), "10.0.0.2");
    assert!(chain.ips().is_empty());
}

#[test]
fn always() {
    let headers = headers(&["192.0.2.60, 10.0.0.1"]);
    let chain = ProxyChain::from_headers("10.0.0.2", &headers, &TrustProxy::always());
    assert_eq!(chain.addresses(), ["10.0.0.2", "10.0.0.1", "192.0.2.60"]);
    assert_eq!(chain.client(), "192.0.2.60");
    assert_eq!(chain.ips(), ["192.0.2.60", "10.0.0.1"]);
}

#[test]
fn hop_count() {
    let headers = headers(&["203.0.113.9, 192.0.2.60, 10.0.0.1"]);

    let chain = ProxyChain::from_headers("10.0.0.2", &headers, &TrustProxy::hops(1));
    assert_eq!(chain.client(), "10.0.0.1");
    assert_eq!(chain.ips(), ["10.0.0.1"]);

    let chain = ProxyChain::from_headers("10.0.0.2", &headers, &TrustProxy::hops(2));
    assert_eq!(chain.client(), "192.0.2.60");
    assert_eq!(chain.ips(), ["192.0.2.60", "10.0.0.1"]);

    let chain = ProxyChain::from_headers("10.0.0.2", &headers, &TrustProxy::hops(10));
    assert_eq!(chain.client(), "203.0.113.9");
    assert_eq!(chain.len(), 4);
}

#[test]
fn stops_at_first_untrusted_hop() {
    let trust = TrustProxy::parse("10.0.0.0/8").unwrap();
    let headers = headers(&["198.51.100.1, 203.0.113.9, 10.0.0.1"]);
    let chain = ProxyChain::from_headers("10.0.0.2", &headers, &trust);
    assert_eq!(chain.addresses(), ["10.0.0.2", "10.0.0.1", "203.0.113.9"]);
    assert_eq!(chain.client(), "203.0.113.9");
}

#[test]
fn untrusted_peer_ignores_header() {
    let trust = TrustProxy::parse("10.0.0.0/8").unwrap();
    let headers = headers(&["192.0.2.60"]);
    let chain = ProxyChain::from_headers("192.0.2.200", &headers, &trust);
    assert_eq!(chain.client(), "192.0.2.200");
}

#[test]
fn malformed_entries_end_the_chain() {
    let trust = TrustProxy::parse("loopback, 10.0.0.0/8").unwrap();
    let headers = headers(&["192.0.2.60, not-an-ip, 10.0.0.1"]);
    let chain = ProxyChain::from_headers("127.0.0.1", &headers, &trust);
    assert_eq!(chain.addresses(), ["127.0.0.1", "10.0.0.1", "not-an-ip"]);
    assert_eq!(chain.client(), "not-an-ip");
}

#[test]
fn repeated_header_lines_form_one_list() {
    let headers = headers(&["192.0.2.60", "10.0.0.1"]);
    let chain = ProxyChain::from_headers("10.0.0.2", &headers, &TrustProxy::always());
    assert_eq!(chain.ips(), ["192.0.2.60", "10.0.0.1"]);
}

#[test]
fn bracketed_ipv6_hops() {
    let trust = TrustProxy::parse("loopback").unwrap();
    let headers = headers(&["2001:db8::1, [::1]"]);
    let chain = ProxyChain::from_headers("::1", &headers, &trust);
    assert_eq!(chain.client(), "2001:db8::1");
}

#[test]
fn missing_header() {
    let headers = Headers::new();
    let chain = ProxyChain::from_headers("10.0.0.2", &headers, &TrustProxy::always());
    assert_eq!(chain.peer(), "10.0.0.2");
    assert_eq!(chain.client(), "10.0.0.2");
}

#[test]
fn function_policies_see_hop_indices() {
    let trust = TrustProxy::trust_fn(|address, hop| hop == 0 || address == "a");
    let headers = headers(&["c, b, a"]);
    let chain = ProxyChain::from_headers("peer", &headers, &trust);
    assert_eq!(chain.addresses(), ["peer", "a", "b"]);
}

#[test]
fn empty_segments_are_not_hops() {
    let empty = headers(&[""]);
    for trust in [TrustProxy::always(), TrustProxy::hops(1)] {
        let chain = ProxyChain::from_headers("10.0.0.2", &empty, &trust);
        assert_eq!(chain.addresses(), ["10.0.0.2"]);
        assert_eq!(chain.client(), "10.0.0.2");
        assert!(chain.ips().is_empty());
    }

    let trailing = headers(&["203.0.113.7,"]);
    for trust in [TrustProxy::always(), TrustProxy::hops(1)] {
        let chain = ProxyChain::from_headers("10.0.0.2", &trailing, &trust);
        assert_eq!(chain.addresses(), ["10.0.0.2", "203.0.113.7"]);
        assert_eq!(chain.client(), "203.0.113.7");
        assert_eq!(chain.ips(), ["203.0.113.7"]);
    }

    let gap = headers(&["192.0.2.60,, 10.0.0.1"]);
    let chain = ProxyChain::from_headers("10.0.0.2", &gap, &TrustProxy::always());
    assert_eq!(chain.addresses(), ["10.0.0.2", "10.0.0.1", "192.0.2.60"]);
}

use espalier_forwarding::{ProxyChain, TrustProxy};

pub fn main() {
    env_logger::init();

    let trust = TrustProxy::parse("loopback, uniquelocal").expect("valid trust list");
    let chain = ProxyChain::resolve("127.0.0.1", ["198.51.100.7, 10.0.0.5"], &trust);

    println!("client: {}", chain.client());
    println!("ips: {:?}", chain.ips());
}

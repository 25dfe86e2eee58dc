use espalier_caching_headers::{CachingHeadersExt, EtagFn, is_fresh};
use espalier_http::Headers;

fn main() {
    let body = b"hello world";

    let mut response = Headers::new();
    response.set_etag(EtagFn::weak().generate(body));
    let etag = response.etag_str().unwrap_or_default().to_string();

    let mut request = Headers::new();
    request.insert("if-none-match", etag.clone());

    println!("etag {etag}, fresh: {}", is_fresh(&request, &response));
}

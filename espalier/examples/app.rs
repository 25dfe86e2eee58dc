use espalier::{App, BoxError, Conn, Method, Value};
use std::path::Path;

fn echo(path: &Path, options: &Value) -> Result<String, BoxError> {
    Ok(format!("{} rendered with {options}", path.display()))
}

pub fn main() -> espalier::Result<()> {
    env_logger::init();

    let app = App::new();
    app.set("trust proxy", "loopback")?
        .set("query parser", "extended")?
        .set("view engine", "html")?;
    app.engine("html", echo);
    app.set_local("site", "espalier")?;

    let conn = Conn::new(&app, Method::Get, "/pets?sort[by]=name")
        .with_peer_ip("127.0.0.1")
        .with_request_header("Host", "tobi.ferrets.example.com")
        .with_request_header("X-Forwarded-For", "203.0.113.7")
        .with_request_header("X-Forwarded-Proto", "https");

    println!("protocol: {}", conn.protocol());
    println!("ip: {:?}", conn.ip());
    println!("subdomains: {:?}", conn.subdomains());
    println!("query: {}", Value::Object(conn.query()));

    let conn = conn.render("index", ());
    println!("status: {:?}", conn.status());
    println!("body: {:?}", conn.response_body());

    Ok(())
}

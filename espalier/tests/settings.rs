use espalier::{App, Error, EtagFn, QueryParser, Setting, Settings, TrustProxy};
use pretty_assertions::assert_eq;

#[test]
fn defaults() {
    let settings = Settings::with_defaults();
    let expected_env = std::env::var("ESPALIER_ENV").unwrap_or_else(|_| "development".into());

    assert_eq!(settings.env().as_deref(), Some(expected_env.as_str()));
    assert!(settings.enabled("x-powered-by"));
    assert_eq!(settings.get("etag").unwrap().as_str(), Some("weak"));
    assert!(settings.etag_fn().unwrap().generate(b"x").starts_with("W/"));
    assert_eq!(settings.get("query parser").unwrap().as_str(), Some("simple"));
    assert_eq!(settings.subdomain_offset(), 2);
    assert_eq!(settings.get("trust proxy").unwrap().as_bool(), Some(false));
    assert!(settings.trust_proxy().is_never());
    assert!(settings.is_trust_proxy_default());
    assert_eq!(
        settings.get("jsonp callback name").unwrap().as_str(),
        Some("callback")
    );
    assert_eq!(settings.view_cache(), expected_env == "production");
    assert_eq!(
        settings.view_roots(),
        [std::env::current_dir().unwrap().join("views")]
    );
    assert!(settings.view_engine().is_none());
}

#[test]
fn enable_and_disable() {
    let app = App::new();
    assert!(app.disabled("tobi"));
    app.enable("tobi").unwrap();
    assert!(app.enabled("tobi"));
    app.disable("tobi").unwrap();
    assert!(app.disabled("tobi"));

    app.set("name", "").unwrap();
    assert!(app.disabled("name"));
    app.set("list", Vec::<String>::new()).unwrap();
    assert!(app.enabled("list"));
}

#[test]
fn writing_a_setting_recompiles_it() {
    let app = App::new();
    let settings = app.settings();

    app.set("etag", "strong").unwrap();
    assert!(settings.etag_fn().unwrap().generate(b"x").starts_with('"'));

    app.set("etag", false).unwrap();
    assert!(settings.etag_fn().is_none());
    assert!(app.get("etag fn").is_none());

    app.set("etag", EtagFn::new(|body| format!("\"{}\"", body.len())))
        .unwrap();
    assert_eq!(settings.etag_fn().unwrap().generate(b"four"), "\"4\"");

    app.set("query parser", "extended").unwrap();
    assert_eq!(
        settings.query_parser().unwrap().parse("a[b]=c")["a"]["b"],
        "c"
    );

    app.set("query parser", false).unwrap();
    assert!(settings.query_parser().unwrap().parse("a=b").is_empty());

    app.set("trust proxy", 1).unwrap();
    assert!(settings.trust_proxy().is_trusted("203.0.113.1", 0));
    assert!(!settings.trust_proxy().is_trusted("203.0.113.1", 1));
    assert!(!settings.is_trust_proxy_default());
}

#[test]
fn failed_writes_leave_the_store_unchanged() {
    let app = App::new();
    app.set("trust proxy", ["loopback"]).unwrap();

    let error = app.set("trust proxy", ["loopback", "10.0.0.0/40"]).unwrap_err();
    assert!(matches!(error, Error::Forwarding(_)));
    assert_eq!(
        app.get("trust proxy").unwrap().as_list(),
        Some(&["loopback".to_string()][..])
    );
    assert!(app.settings().trust_proxy().is_trusted("::1", 0));

    let error = app.set("etag", "medium").unwrap_err();
    assert!(matches!(error, Error::InvalidSetting { ref key, .. } if key == "etag"));
    assert_eq!(app.get("etag").unwrap().as_str(), Some("weak"));

    assert!(app.set("query parser", 7).is_err());
    assert_eq!(app.get("query parser").unwrap().as_str(), Some("simple"));
}

#[test]
fn derived_settings_cannot_be_written() {
    let app = App::new();
    for key in ["etag fn", "query parser fn", "trust proxy fn"] {
        let error = app.set(key, true).unwrap_err();
        assert!(matches!(error, Error::InvalidSetting { .. }), "{key}");
    }
    assert!(app.settings().trust_proxy().is_never());
}

#[test]
fn compiled_values_pass_through() {
    let app = App::new();
    app.set("trust proxy", TrustProxy::trust_fn(|address, _| address == "10.0.0.1"))
        .unwrap();
    assert!(app.settings().trust_proxy().is_trusted("10.0.0.1", 3));
    assert!(!app.settings().trust_proxy().is_trusted("10.0.0.2", 0));

    app.set(
        "query parser",
        QueryParser::custom(|_| serde_json::Map::new()),
    )
    .unwrap();
    assert!(matches!(
        app.get("query parser fn"),
        Some(Setting::QueryParser(_))
    ));
}

#[test]
fn mounted_apps_inherit_settings() {
    let parent = App::new();
    parent.set("title", "parent").unwrap();
    parent.set("subdomain offset", 3).unwrap();

    let child = App::new();
    child.set("subdomain offset", 1).unwrap();
    parent.mount("/blog", &child);

    assert_eq!(child.get("title").unwrap().as_str(), Some("parent"));
    assert_eq!(child.settings().subdomain_offset(), 1);

    parent.set("late", true).unwrap();
    assert!(child.enabled("late"));

    assert_eq!(child.mountpath(), "/blog");
    assert_eq!(child.path(), "/blog");
    assert_eq!(parent.path(), "");
    assert_eq!(parent.mountpath(), "/");
    assert!(child.parent().is_some());
}

#[test]
fn mounted_apps_inherit_an_untouched_trust_policy() {
    let parent = App::new();
    parent.set("trust proxy", true).unwrap();

    let child = App::new();
    parent.mount("/child", &child);

    assert_eq!(child.get("trust proxy").unwrap().as_bool(), Some(true));
    assert!(child.settings().trust_proxy().is_trusted("198.51.100.1", 7));
}

#[test]
fn mounted_apps_keep_an_explicit_trust_policy() {
    let parent = App::new();
    parent.set("trust proxy", true).unwrap();

    let child = App::new();
    child.set("trust proxy", false).unwrap();
    parent.mount("/child", &child);

    assert_eq!(child.get("trust proxy").unwrap().as_bool(), Some(false));
    assert!(child.settings().trust_proxy().is_never());
}

#[test]
fn nested_mount_paths() {
    let root = App::new();
    let blog = App::new();
    let admin = App::new();
    root.mount("/blog", &blog);
    blog.mount("/admin", &admin);
    assert_eq!(admin.path(), "/blog/admin");
}

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use promdecl_core::{Namespace, Registry};
use promdecl_exporter::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
exporter:
  port: 9394
  pathh: "/metrics" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.exporter.address, "0.0.0.0");
    assert_eq!(cfg.exporter.port, 9394);
    assert_eq!(cfg.exporter.path, "/metrics");
    assert!(!cfg.exporter.collect_http);
    assert!(cfg.push.is_none());
    assert!(cfg.declarations.is_empty());
}

#[test]
fn host_name_address_accepted() {
    let ok = r#"
version: 1
exporter:
  address: "localhost"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.exporter.address, "localhost");
}

#[test]
fn empty_address_rejected() {
    let bad = r#"
version: 1
exporter:
  address: ""
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn unsupported_version_rejected() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn bad_exporter_path_rejected() {
    let bad = r#"
version: 1
exporter:
  path: "metrics"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn push_job_with_slash_rejected() {
    let bad = r#"
version: 1
push:
  job: "a/b"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn push_section_builds_options() {
    let ok = r#"
version: 1
push:
  gateway: "http://pgw:9091"
  job: "nightly"
  interval_secs: 30
  grouping: { instance: "a" }
  basic_auth: { username: "u", password: "p" }
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    let push = cfg.push.expect("push section");
    assert_eq!(push.interval().as_secs(), 30);

    let opts = push.options();
    assert_eq!(opts.gateway, "http://pgw:9091");
    assert_eq!(opts.grouping.get("instance").map(String::as_str), Some("a"));
    assert_eq!(opts.basic_auth.expect("auth").username, "u");
}

#[test]
fn manifest_declares_nested_instruments() {
    let ok = r#"
version: 1
declarations:
  - counter: { id: "requests", docs: "Requests served.", labels: ["path"] }
  - with_presets:
      labels: { region: "eu" }
      body:
        - gauge: { id: "queue_depth" }
        - subsystem:
            name: "db_"
            inherit_presets: true
            presets: { role: "replica" }
            body:
              - histogram: { id: "lag", buckets: [0.1, 1.0] }
              - summary: { id: "query_seconds", labels: ["table"] }
"#;
    let cfg = config::load_from_str(ok).expect("must parse");

    let mut root = Namespace::new(Registry::new());
    config::apply(&mut root, &cfg.declarations).expect("apply");

    let requests = root.get("requests").expect("requests");
    assert_eq!(requests.name(), "requests");
    assert_eq!(requests.docs(), "Requests served.");

    let depth = root.get("queue_depth").expect("queue_depth");
    assert_eq!(depth.preset_labels().get("region").map(String::as_str), Some("eu"));

    let lag = root.resolve("db_.lag").expect("db_.lag");
    assert_eq!(lag.name(), "db_lag");
    assert_eq!(lag.preset_labels().len(), 2);

    let query = root.resolve("db_.query_seconds").expect("db_.query_seconds");
    assert_eq!(query.labels(), ["table", "region", "role"]);
}

#[test]
fn manifest_block_without_body_is_missing_block() {
    let bad = r#"
version: 1
declarations:
  - subsystem: { name: "db" }
"#;
    let cfg = config::load_from_str(bad).expect("must parse");
    let mut root = Namespace::new(Registry::new());

    let err = config::apply(&mut root, &cfg.declarations).expect_err("must fail");
    assert_eq!(err.code().as_str(), "MISSING_BLOCK");
    assert!(root.child("db").is_none());
}

#[test]
fn manifest_presets_without_labels_is_invalid_argument() {
    let bad = r#"
version: 1
declarations:
  - with_presets:
      body:
        - counter: { id: "hits" }
"#;
    let cfg = config::load_from_str(bad).expect("must parse");
    let mut root = Namespace::new(Registry::new());

    let err = config::apply(&mut root, &cfg.declarations).expect_err("must fail");
    assert_eq!(err.code().as_str(), "INVALID_ARGUMENT");
    assert!(root.get("hits").is_none());
}

#[test]
fn manifest_forbidden_identifier_is_colliding_name() {
    let bad = r#"
version: 1
declarations:
  - gauge: { id: "push" }
"#;
    let cfg = config::load_from_str(bad).expect("must parse");
    let mut root = Namespace::new(Registry::new());

    let err = config::apply(&mut root, &cfg.declarations).expect_err("must fail");
    assert_eq!(err.code().as_str(), "COLLIDING_NAME");
}

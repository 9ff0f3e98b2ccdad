//! Declaration composer behaviour: naming, presets, subsystems.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use promdecl_core::{
    label_map, Declare, InstrumentOptions, Kind, Namespace, Registry, SubsystemOptions,
    FORBIDDEN_IDENTIFIERS,
};

fn root() -> Namespace {
    Namespace::new(Registry::new())
}

#[test]
fn forbidden_identifiers_collide_for_every_kind() {
    let mut ns = root();
    for id in FORBIDDEN_IDENTIFIERS {
        for kind in [Kind::Counter, Kind::Gauge, Kind::Histogram, Kind::Summary] {
            let err = ns
                .declare(kind, id, "docs", InstrumentOptions::new())
                .expect_err("must collide");
            assert_eq!(err.code().as_str(), "COLLIDING_NAME");
            assert!(err.to_string().contains(id));
        }
    }
    assert!(ns.registry().gather().is_empty());
}

#[test]
fn simple_declaration_keeps_instrument_presets() {
    let mut ns = root();
    ns.counter(
        "counter1",
        "a counter",
        InstrumentOptions::new().labels(["label"]).preset("label", "label"),
    )
    .unwrap();

    let c = ns.get("counter1").unwrap();
    assert_eq!(c.kind(), Kind::Counter);
    assert_eq!(c.preset_labels().len(), 1);
    assert_eq!(c.preset_labels()["label"], "label");
    assert_eq!(c.labels(), ["label"]);
}

#[test]
fn options_provider_wins_over_literal_options() {
    let mut ns = root();
    ns.declare_with(
        Kind::Counter,
        "counter1",
        "a counter",
        InstrumentOptions::new().labels(["ignored"]),
        || InstrumentOptions::new().labels(["label"]).preset("label", "label"),
    )
    .unwrap();

    let c = ns.get("counter1").unwrap();
    assert_eq!(c.labels(), ["label"]);
    assert_eq!(c.preset_labels().len(), 1);
    assert_eq!(c.preset_labels()["label"], "label");
}

#[test]
fn empty_docs_fall_back_to_placeholder() {
    let mut ns = root();
    let g = ns.gauge("temperature", "", InstrumentOptions::new()).unwrap();
    assert_eq!(g.docs(), "...");
}

#[test]
fn presets_apply_only_inside_the_block() {
    let mut ns = root();
    ns.with_presets(label_map([("label", "label")]), |s| {
        s.counter("counter1", "a_counter", InstrumentOptions::new())?;
        Ok(())
    })
    .unwrap();
    ns.counter("counter2", "b_counter", InstrumentOptions::new())
        .unwrap();

    let c1 = ns.get("counter1").unwrap();
    assert_eq!(c1.labels().len(), 1);
    assert_eq!(c1.preset_labels()["label"], "label");

    let c2 = ns.get("counter2").unwrap();
    assert!(c2.labels().is_empty());
    assert!(ns.presets().is_empty());
}

#[test]
fn nested_presets_override_outer_keys() {
    let mut ns = root();
    ns.with_presets(label_map([("region", "eu"), ("tier", "web")]), |s| {
        s.with_presets(label_map([("region", "us")]), |s| {
            s.counter("hits", "hits", InstrumentOptions::new())?;
            Ok(())
        })?;
        assert_eq!(s.presets()["region"], "eu");
        Ok(())
    })
    .unwrap();

    let c = ns.get("hits").unwrap();
    assert_eq!(
        c.preset_labels(),
        &label_map([("region", "us"), ("tier", "web")])
    );
}

#[test]
fn with_presets_requires_labels() {
    let mut ns = root();
    let err = ns
        .with_presets(label_map::<&str, &str, _>([]), |_| Ok(()))
        .expect_err("empty presets must fail");
    assert_eq!(err.code().as_str(), "INVALID_ARGUMENT");
}

#[test]
fn subsystem_prefixes_names_and_applies_presets() {
    let mut ns = root();
    ns.subsystem(
        "subsys",
        SubsystemOptions::new().preset("some", "label"),
        |s| {
            s.counter("sub_counter", "sub_counter", InstrumentOptions::new())?;
            Ok(())
        },
    )
    .unwrap();

    assert!(ns.get("sub_counter").is_none());

    let sc = ns.child("subsys").unwrap().get("sub_counter").unwrap();
    assert_eq!(sc.name(), "subsys_sub_counter");
    assert_eq!(sc.labels().len(), 1);
    assert_eq!(sc.preset_labels().len(), 1);
    assert_eq!(sc.preset_labels()["some"], "label");
}

#[test]
fn nested_subsystems_do_not_inherit_presets_by_default() {
    let mut ns = root();
    ns.subsystem("outer", SubsystemOptions::new().preset("some", "label"), |s| {
        s.subsystem("inner", SubsystemOptions::new(), |s| {
            s.counter("counter1", "inner_counter", InstrumentOptions::new())?;
            Ok(())
        })
    })
    .unwrap();

    let ic = ns.resolve("outer.inner.counter1").unwrap();
    assert_eq!(ic.name(), "outer_inner_counter1");
    assert!(ic.labels().is_empty());
    assert!(ic.preset_labels().is_empty());
}

#[test]
fn nested_subsystems_inherit_presets_on_request() {
    let mut ns = root();
    ns.subsystem("outer", SubsystemOptions::new().preset("some", "label"), |s| {
        s.subsystem(
            "inner",
            SubsystemOptions::new()
                .inherit_presets(true)
                .preset("other", "label_2"),
            |s| {
                s.counter("counter1", "inner_counter", InstrumentOptions::new())?;
                Ok(())
            },
        )
    })
    .unwrap();

    let ic = ns.resolve("outer.inner.counter1").unwrap();
    assert_eq!(ic.name(), "outer_inner_counter1");
    assert_eq!(ic.preset_labels().len(), 2);
    assert_eq!(ic.preset_labels()["some"], "label");
    assert_eq!(ic.preset_labels()["other"], "label_2");
}

#[test]
fn presets_compose_across_three_levels() {
    let mut ns = root();
    ns.with_presets(label_map([("some", "label")]), |s| {
        s.subsystem("outer", SubsystemOptions::new().inherit_presets(true), |s| {
            s.subsystem("inner", SubsystemOptions::new().inherit_presets(true), |s| {
                s.with_presets(label_map([("other", "label2")]), |s| {
                    s.declare_with(
                        Kind::Counter,
                        "counter1",
                        "inner_counter",
                        InstrumentOptions::new(),
                        || {
                            InstrumentOptions::new()
                                .labels(["more"])
                                .preset("more", "label3")
                        },
                    )?;
                    Ok(())
                })
            })
        })
    })
    .unwrap();

    let ic = ns.resolve("outer.inner.counter1").unwrap();
    assert_eq!(ic.name(), "outer_inner_counter1");
    assert_eq!(ic.preset_labels().len(), 3);
    assert_eq!(ic.preset_labels()["some"], "label");
    assert_eq!(ic.preset_labels()["other"], "label2");
    assert_eq!(ic.preset_labels()["more"], "label3");
    assert_eq!(ic.labels().len(), 3);
}

#[test]
fn subsystem_presets_win_over_inherited_ones() {
    let mut ns = root();
    ns.with_presets(label_map([("op", "read")]), |s| {
        s.subsystem(
            "master",
            SubsystemOptions::new().inherit_presets(true).preset("op", "write"),
            |s| {
                s.counter("op_count", "ops", InstrumentOptions::new())?;
                Ok(())
            },
        )
    })
    .unwrap();

    let c = ns.resolve("master.op_count").unwrap();
    assert_eq!(c.preset_labels()["op"], "write");
}

#[test]
fn trailing_underscore_is_stripped_from_prefix_segment() {
    let mut ns = root();
    ns.subsystem("db_", SubsystemOptions::new(), |s| {
        s.subsystem("replica", SubsystemOptions::new(), |s| {
            assert_eq!(s.id_for("reads"), "db_replica_reads");
            s.gauge("lag", "replica lag", InstrumentOptions::new())?;
            Ok(())
        })
    })
    .unwrap();

    let lag = ns.resolve("db_.replica.lag").unwrap();
    assert_eq!(lag.name(), "db_replica_lag");
}

#[test]
fn redeclaring_a_name_surfaces_the_engine_error() {
    let mut ns = root();
    ns.counter("hits", "first", InstrumentOptions::new()).unwrap();
    let err = ns
        .counter("hits", "second", InstrumentOptions::new())
        .expect_err("duplicate name must fail");
    assert_eq!(err.code().as_str(), "REGISTRATION");
    assert_eq!(ns.get("hits").unwrap().descriptor().docs, "first");
}

#[test]
fn last_binding_wins_between_subsystem_and_instrument() {
    let mut ns = root();
    ns.subsystem("jobs", SubsystemOptions::new(), |s| {
        s.counter("done", "done", InstrumentOptions::new())?;
        Ok(())
    })
    .unwrap();
    ns.counter("jobs", "jobs", InstrumentOptions::new()).unwrap();

    assert!(ns.child("jobs").is_none());
    assert_eq!(ns.get("jobs").unwrap().name(), "jobs");
}

#[test]
fn failed_subsystem_body_is_not_bound() {
    let mut ns = root();
    let err = ns
        .subsystem("broken", SubsystemOptions::new(), |s| {
            s.counter("push", "reserved", InstrumentOptions::new())?;
            Ok(())
        })
        .expect_err("reserved identifier must fail");
    assert_eq!(err.code().as_str(), "COLLIDING_NAME");
    assert!(ns.child("broken").is_none());
}

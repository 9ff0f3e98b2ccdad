#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use promdecl_core::{label_map, InstrumentOptions, SubsystemOptions};

#[test]
fn merge_appends_preset_names_once() {
    let opts = InstrumentOptions::new()
        .labels(["path", "region", "path"])
        .merge_presets(&label_map([("region", "eu"), ("zone", "a")]));
    assert_eq!(opts.labels, vec!["path", "region", "zone"]);
    assert_eq!(opts.variable_labels(), vec!["path"]);
}

#[test]
fn instrument_presets_win_over_namespace() {
    let opts = InstrumentOptions::new()
        .preset("region", "us")
        .merge_presets(&label_map([("region", "eu"), ("zone", "a")]));
    assert_eq!(opts.preset_labels["region"], "us");
    assert_eq!(opts.preset_labels["zone"], "a");
    assert_eq!(opts.labels, vec!["region", "zone"]);
}

#[test]
fn subsystem_presets_win_over_inherited() {
    let parent = label_map([("op", "read"), ("db", "main")]);
    let resolved = SubsystemOptions::new()
        .inherit_presets(true)
        .preset("op", "write")
        .resolve(&parent);
    assert_eq!(resolved, label_map([("op", "write"), ("db", "main")]));

    let isolated = SubsystemOptions::new().resolve(&parent);
    assert!(isolated.is_empty());
}

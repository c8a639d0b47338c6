use croupier_core::{run, CroupierError, CroupierSettings, Tier};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("croupier-run-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_json(path: &Path, value: Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn settings(data_path: PathBuf) -> CroupierSettings {
    CroupierSettings {
        data_path,
        items_path: None,
        tier: Tier::Low,
        needs_gun: false,
        count: 1,
        seed: Some(7),
        output_path: None,
        pretty: false,
    }
}

#[test]
fn writes_seeded_report_from_mod_root() {
    let root = scratch_dir("root");
    let data = root.join("data");
    write_json(&data.join("constants.json"), json!({}));
    for tier in ["low", "mid", "top"] {
        write_json(
            &data.join(tier).join("backpacks.json"),
            json!([{ "id": "pack", "name": "Pack", "slot": "main" }]),
        );
        write_json(
            &data.join(tier).join("chestrigs.json"),
            json!([{ "id": "rig", "name": "Rig", "grid": [1, 1] }]),
        );
    }
    write_json(&root.join("items.json"), json!({ "pack": {}, "rig": {} }));

    let output = root.join("out").join("loadouts.json");
    let report = run(CroupierSettings {
        items_path: Some(root.join("items.json")),
        count: 3,
        output_path: Some(output.clone()),
        pretty: true,
        ..settings(root.clone())
    })
    .unwrap();

    assert_eq!(report.seed, 7);
    assert_eq!(report.loadouts.len(), 3);
    for loadout in &report.loadouts {
        let tpls: Vec<&str> = loadout.items.iter().map(|n| n.tpl.as_str()).collect();
        assert_eq!(tpls, vec!["pack", "rig"]);
    }

    let written: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["seed"], 7);
    assert_eq!(written["request"]["tier"], "low");
    assert_eq!(written["request"]["needsGun"], false);
    assert_eq!(written["loadouts"].as_array().unwrap().len(), 3);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn missing_data_path_is_a_config_error() {
    let err = run(settings(PathBuf::from("/definitely/not/here/croupier"))).unwrap_err();
    assert!(matches!(err, CroupierError::Config(_)));
}

#[test]
fn zero_count_is_rejected() {
    let dir = scratch_dir("zero");
    let err = run(CroupierSettings {
        count: 0,
        ..settings(dir.clone())
    })
    .unwrap_err();
    assert!(matches!(err, CroupierError::Config(_)));
    let _ = fs::remove_dir_all(&dir);
}

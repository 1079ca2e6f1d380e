use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

const TREE: &str = r#"
individuals:
  - id: I1
    name: Ada Smith
    father: I2
    mother: I3
    events:
      - tag: BIRT
        place: Newark, New Jersey, USA
        latitude: 40.0
        longitude: -74.0
  - id: I2
    name: John Smith
    father: I4
    events:
      - tag: BIRT
        place: <b>Scranton</b>, Pennsylvania, USA
        latitude: 41.0
        longitude: -75.0
  - id: I3
    name: Mary Jones
    events:
      - tag: BIRT
        place: Atlantis
  - id: I4
    name: Old Smith
    events:
      - tag: BIRT
        place: Leeds, England
  - id: I9
    name: Hidden
    private: true
"#;

fn run_cli(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pedigree-map"))
        .current_dir(dir)
        .env("HOME", dir.join("home"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("command runs")
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = run_cli(dir, args);
    assert!(
        output.status.success(),
        "command failed: args={args:?}\nstdout={}\nstderr={}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("json stdout")
}

fn run_error(dir: &Path, args: &[&str]) -> Value {
    let output = run_cli(dir, args);
    assert!(!output.status.success(), "command unexpectedly succeeded: {args:?}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    let last = stderr.lines().last().expect("error line");
    serde_json::from_str(last).expect("json stderr")
}

#[test]
fn map_command_emits_collection_with_status_and_etag() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path();
    fs::write(dir.join("tree.yml"), TREE).expect("write tree");

    let out = run_json(dir, &["map", "--tree", "tree.yml", "--subject", "I1"]);
    assert_eq!(out["status"], 200);
    assert_eq!(out["facts_considered"], 4);
    assert_eq!(out["request"]["generations"], 4);
    assert!(out["etag"].as_str().expect("etag").starts_with('"'));

    let features = out["geojson"]["features"].as_array().expect("features");
    assert_eq!(features.len(), 2);
    assert_eq!(features[1]["id"], 2);
    assert_eq!(features[1]["properties"]["tooltip"], "Scranton, Pennsylvania, USA");
    assert_eq!(features[1]["properties"]["summary"]["name"], "John Smith");
    assert_eq!(
        features[1]["properties"]["polyline"]["points"],
        serde_json::json!([[40.0, -74.0], [41.0, -75.0]])
    );

    let again = run_json(dir, &["map", "--tree", "tree.yml", "--subject", "I1"]);
    assert_eq!(again["etag"], out["etag"]);
}

#[test]
fn project_config_supplies_gazetteer_and_generations_flag_limits_depth() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path();
    fs::write(dir.join("tree.yml"), TREE).expect("write tree");
    fs::write(
        dir.join(".pedigree-map.yml"),
        "zoom: 6\nplaces:\n  - name: England\n    latitude: 52.5\n    longitude: -1.5\n",
    )
    .expect("write config");

    let deep = run_json(dir, &["map", "--tree", "tree.yml", "--subject", "I1"]);
    let features = deep["geojson"]["features"].as_array().expect("features");
    assert_eq!(features.len(), 3);
    assert_eq!(features[2]["id"], 4);
    assert_eq!(features[2]["properties"]["zoom"], 6);
    assert_eq!(features[2]["geometry"]["coordinates"], serde_json::json!([-1.5, 52.5]));

    let shallow = run_json(
        dir,
        &["map", "--tree", "tree.yml", "--subject", "I1", "--generations", "2"],
    );
    assert_eq!(shallow["facts_considered"], 3);
    assert_eq!(
        shallow["geojson"]["features"].as_array().expect("features").len(),
        2
    );
}

#[test]
fn unknown_and_private_subjects_fail_with_codes() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path();
    fs::write(dir.join("tree.yml"), TREE).expect("write tree");

    let missing = run_error(dir, &["map", "--tree", "tree.yml", "--subject", "I404"]);
    assert_eq!(missing["error"]["code"], "individual_not_found");

    let hidden = run_error(dir, &["map", "--tree", "tree.yml", "--subject", "I9"]);
    assert_eq!(hidden["error"]["code"], "access_denied");
}

#[test]
fn facts_command_distinguishes_empty_from_unmappable() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path();

    fs::write(dir.join("empty.yml"), "facts: []\n").expect("write");
    let empty = run_json(dir, &["facts", "--input", "empty.yml"]);
    assert_eq!(empty["status"], 204);
    assert_eq!(empty["geojson"]["features"], serde_json::json!([]));

    fs::write(
        dir.join("unmappable.yml"),
        "facts:\n  - number: 1\n    record: I1\n    tag: BIRT\n    place: Atlantis\n",
    )
    .expect("write");
    let unmappable = run_json(dir, &["facts", "--input", "unmappable.yml"]);
    assert_eq!(unmappable["status"], 200);
    assert_eq!(unmappable["geojson"]["features"], serde_json::json!([]));
}

#[test]
fn facts_command_rejects_bad_numbering() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path();
    fs::write(
        dir.join("facts.json"),
        r#"{"facts":[
            {"number":2,"record":"I2","tag":"BIRT","place":"a","coordinate":{"latitude":1.0,"longitude":1.0}},
            {"number":1,"record":"I1","tag":"BIRT","place":"b","coordinate":{"latitude":2.0,"longitude":2.0}}
        ]}"#,
    )
    .expect("write");
    let err = run_error(dir, &["facts", "--input", "facts.json"]);
    assert_eq!(err["error"]["code"], "invalid_facts");

    fs::write(
        dir.join("negative.yml"),
        "facts:\n  - number: -1\n    record: I1\n    tag: BIRT\n    place: a\n",
    )
    .expect("write");
    let err = run_error(dir, &["facts", "--input", "negative.yml"]);
    assert_eq!(err["error"]["code"], "invalid_facts");
}

#[test]
fn init_writes_default_config_once() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path();

    let first = run_json(dir, &["init"]);
    assert_eq!(first["status"], "ok");
    assert_eq!(first["created"], true);
    let written = fs::read_to_string(dir.join(".pedigree-map.yml")).expect("config");
    assert!(written.contains("resolvers:"));

    let second = run_json(dir, &["init"]);
    assert_eq!(second["created"], false);

    let global = run_json(dir, &["init", "--global"]);
    assert_eq!(global["created"], true);
    assert!(dir.join("home/.pedigree-map/config.yml").is_file());
}

#[test]
fn sosa_command_describes_a_number() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path();

    let out = run_json(dir, &["sosa", "13"]);
    assert_eq!(out["generation"], 3);
    assert_eq!(out["descendant"], 6);
    assert_eq!(out["father"], 26);
    assert_eq!(out["mother"], 27);
    assert_eq!(out["color"], "#FFB300");
    assert_eq!(out["relationship"], "maternal great-grandmother");

    let subject = run_json(dir, &["sosa", "1"]);
    assert!(subject["descendant"].is_null());

    let err = run_error(dir, &["sosa", "0"]);
    assert_eq!(err["error"]["code"], "invalid_number");
}

use std::{fs, path::Path, process::Command};

use serde_json::{Value, json};
use tempfile::TempDir;

fn write_map(dir: &Path, name: &str, map: &Value) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_vec(map).unwrap()).unwrap();
    path
}

fn chainstage() -> Command {
    Command::new(env!("CARGO_BIN_EXE_chainstage"))
}

fn fixture_maps() -> (Value, Value) {
    // mid.js 0:0 -> main.ts 2:4 (main)
    let upstream = json!({
        "version": 3,
        "file": "mid.js",
        "sources": ["main.ts"],
        "names": ["main"],
        "mappings": "AAEIA",
    });
    // out.js 0:6 -> mid.js 0:0
    let map = json!({
        "version": 3,
        "file": "out.js",
        "sources": ["mid.js"],
        "names": [],
        "mappings": "MAAA",
    });
    (map, upstream)
}

#[test]
fn test_compose_writes_chained_map() {
    let temp_dir = TempDir::new().unwrap();
    let (map, upstream) = fixture_maps();
    let map_path = write_map(temp_dir.path(), "out.js.map", &map);
    let upstream_path = write_map(temp_dir.path(), "mid.js.map", &upstream);
    let output_path = temp_dir.path().join("composed.map");

    let output = chainstage()
        .arg("compose")
        .arg(&map_path)
        .arg("--upstream")
        .arg(&upstream_path)
        .arg("--output")
        .arg(&output_path)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "compose failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let composed: Value = serde_json::from_slice(&fs::read(&output_path).unwrap()).unwrap();
    assert_eq!(composed["sources"], json!(["main.ts"]));
    assert_eq!(composed["names"], json!(["main"]));
    assert_eq!(composed["file"], "out.js");
    assert_eq!(composed["mappings"], "MAEIA");
}

#[test]
fn test_compose_honours_anchor_override() {
    let temp_dir = TempDir::new().unwrap();
    let (map, mut upstream) = fixture_maps();
    upstream["file"] = json!("something-else.js");
    let map_path = write_map(temp_dir.path(), "out.js.map", &map);
    let upstream_path = write_map(temp_dir.path(), "mid.js.map", &upstream);

    let output = chainstage()
        .arg("compose")
        .arg(&map_path)
        .arg("--upstream")
        .arg(&upstream_path)
        .arg("--anchor")
        .arg("mid.js")
        .output()
        .unwrap();
    assert!(output.status.success());

    let composed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(composed["sources"], json!(["main.ts"]));
}

#[test]
fn test_lookup_prints_original_location() {
    let temp_dir = TempDir::new().unwrap();
    let (_, upstream) = fixture_maps();
    let upstream_path = write_map(temp_dir.path(), "mid.js.map", &upstream);

    let output = chainstage()
        .arg("lookup")
        .arg(&upstream_path)
        .args(["--line", "1", "--column", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "main.ts:3:4 (main)\n");

    let output = chainstage()
        .arg("lookup")
        .arg(&upstream_path)
        .args(["--line", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "unmapped\n");
}

#[test]
fn test_missing_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let output = chainstage()
        .arg("lookup")
        .arg(temp_dir.path().join("nope.map"))
        .args(["--line", "1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read source map"));
}

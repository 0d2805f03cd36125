//! Integration tests for the mapview binary
//!
//! These tests spawn the built binary and verify JSON output end to end.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

fn mapview_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove 'deps' directory
    path.push("mapview");
    path
}

const DOCUMENT: &str = r#"{
    "MapShapes": [
        {
            "$type": "Planner.RoadShapeDto, Planner",
            "Name": "Haul North",
            "Points": [
                {"X": 0.0, "Y": 0.0},
                {"X": 0.0, "Y": 100.0},
                {"X": 8.0, "Y": 0.0},
                {"X": 8.0, "Y": 100.0}
            ],
            "SecondEdgeStartsAtIndex": 2
        },
        {
            "$type": "Planner.AozShapeDto, Planner",
            "Name": "Zone A",
            "Points": [
                {"X": 500.0, "Y": 500.0},
                {"X": 600.0, "Y": 500.0},
                {"X": 600.0, "Y": 600.0}
            ]
        },
        {"$type": "Planner.MysteryDto, Planner"},
        {"$type": "Planner.LoadShapeDto, Planner", "Points": "oops"}
    ]
}"#;

fn write_document() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(DOCUMENT.as_bytes()).unwrap();
    file
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let output = Command::new(mapview_bin())
        .args(args)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "Command should succeed: {:?}", output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

#[test]
fn test_inspect_json_counts() {
    let doc = write_document();
    let parsed = run_json(&["inspect", doc.path().to_str().unwrap(), "--json"]);

    assert_eq!(parsed["status"], "success");
    let data = &parsed["data"];
    assert_eq!(data["total"], 4);
    // One unknown discriminator, one record with wrong-typed geometry.
    assert_eq!(data["skipped"].as_array().unwrap().len(), 2);

    let road_count = data["categories"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["category"] == "Road")
        .map(|c| c["count"].as_u64().unwrap());
    assert_eq!(road_count, Some(1));
}

#[test]
fn test_analyze_json_flags_narrow_road() {
    let doc = write_document();
    let parsed = run_json(&["analyze", doc.path().to_str().unwrap(), "--narrow", "--json"]);

    let narrow = parsed["data"]["narrow_roads"].as_array().unwrap();
    assert_eq!(narrow.len(), 1);
    assert_eq!(narrow[0]["name"], "Haul North");
    assert_eq!(narrow[0]["min_width"], 8.0);
    // Unrequested passes stay out of the payload.
    assert!(parsed["data"].get("stale_references").is_none());
}

#[test]
fn test_frame_json_pads_document_bounds() {
    let doc = write_document();
    let parsed = run_json(&["frame", doc.path().to_str().unwrap(), "--json"]);

    let frame = &parsed["data"]["frame"];
    assert_eq!(frame["x"], -1000.0);
    assert_eq!(frame["y"], -1000.0);
    assert_eq!(frame["width"], 2600.0);
    assert_eq!(frame["height"], 2600.0);
}

#[test]
fn test_export_json_clips_to_region() {
    let doc = write_document();
    let parsed = run_json(&[
        "export",
        doc.path().to_str().unwrap(),
        "--min-x",
        "0",
        "--min-y",
        "0",
        "--width",
        "50",
        "--height",
        "200",
        "--name",
        "Haul",
        "--json",
    ]);

    let data = &parsed["data"];
    assert_eq!(data["file_name"], "Haul_Export.pdf");
    // Only the road intersects the region; the zone sits outside it.
    assert_eq!(data["kept"].as_array().unwrap().len(), 1);
}

#[test]
fn test_missing_file_fails() {
    let output = Command::new(mapview_bin())
        .args(["inspect", "/nonexistent/map.json"])
        .output()
        .expect("Failed to execute command");
    assert!(!output.status.success());
}

//! Host Integration Tests
//!
//! Runs the host loop against in-memory input and output:
//! - Document file loading and the initial selection push
//! - Inbound envelopes applied to the document
//! - Saving assignments back to disk

use std::time::Duration;

use mapper_core::{
    Curve, DocumentAdapter, MemoryDocument, ObjectId, Point3, Shape, SCHEMA_ATTRIBUTE,
};
use mapper_host::{open, serve, HostConfig, OutboundLine};

fn column_document() -> (MemoryDocument, ObjectId) {
    let mut doc = MemoryDocument::new();
    let id = doc.add_object(Shape::Curve(Curve::Line {
        start: Point3::new(1.0, 1.0, 0.0),
        end: Point3::new(1.0, 1.0, 3.5),
    }));
    doc.select(&[id]).expect("select");
    (doc, id)
}

fn parse_output(output: Vec<u8>) -> Vec<OutboundLine> {
    String::from_utf8(output)
        .expect("utf8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("event line"))
        .collect()
}

// ============================================================================
// Round trip
// ============================================================================

#[tokio::test]
async fn test_document_file_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("model.json");
    let (doc, id) = column_document();
    doc.save(&path).expect("save");

    let config = HostConfig {
        document: Some(path.clone()),
        ..HostConfig::default()
    };
    let (bridge, rx) = open(&config).expect("open");

    let input = format!(
        "{{\"action\":\"set-schema\",\"objectIds\":[\"{id}\"],\"schema\":{{\"name\":\"Column\",\"Structural\":true}}}}\n\n"
    );
    let (document, output) = serve(
        bridge,
        rx,
        input.as_bytes(),
        Vec::new(),
        Duration::from_millis(5),
    )
    .await
    .expect("serve");

    let events = parse_output(output);
    assert_eq!(
        events.first().map(|e| e.event.as_str()),
        Some("object-selection")
    );
    let names: Vec<_> = events[0].payload["schemas"]
        .as_array()
        .expect("schemas")
        .iter()
        .map(|s| s["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, ["Column", "Beam"]);

    let last = events.last().expect("events");
    assert_eq!(last.event, "object-schemas");
    assert_eq!(last.payload[0]["name"], "Column");
    assert_eq!(last.payload[0]["objectId"], id.to_string());

    document.save(&path).expect("save");
    let reopened = MemoryDocument::load(&path).expect("load");
    let stored = reopened
        .attribute(id, SCHEMA_ATTRIBUTE)
        .expect("assignment persisted");
    assert!(stored.contains("\"Structural\":true"));
}

#[tokio::test]
async fn test_garbage_lines_are_ignored() {
    let (bridge, rx) = open(&HostConfig::default()).expect("open");
    let input = "not json\n{\"action\":\"bogus\"}\n   \n";

    let (document, output) = serve(
        bridge,
        rx,
        input.as_bytes(),
        Vec::new(),
        Duration::from_millis(5),
    )
    .await
    .expect("serve");

    assert!(document.is_empty());
    let events = parse_output(output);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event, "object-selection");
    assert_eq!(events[0].payload["schemas"], serde_json::json!([]));
    assert_eq!(events[1].event, "object-schemas");
    assert_eq!(events[1].payload, serde_json::json!([]));
}

#[tokio::test]
async fn test_non_utf8_line_does_not_stop_the_host() {
    let (doc, id) = column_document();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("model.json");
    doc.save(&path).expect("save");
    let config = HostConfig {
        document: Some(path),
        ..HostConfig::default()
    };
    let (bridge, rx) = open(&config).expect("open");

    let mut input = b"\xff\xfe garbage\n".to_vec();
    input.extend_from_slice(
        format!(
            "{{\"action\":\"set-schema\",\"objectIds\":[\"{id}\"],\"schema\":{{\"name\":\"Beam\"}}}}"
        )
        .as_bytes(),
    );

    let (document, output) = serve(
        bridge,
        rx,
        input.as_slice(),
        Vec::new(),
        Duration::from_millis(5),
    )
    .await
    .expect("serve");

    let stored = document
        .attribute(id, SCHEMA_ATTRIBUTE)
        .expect("assignment written");
    assert!(stored.contains("\"name\":\"Beam\""));

    let events = parse_output(output);
    let last = events.last().expect("events");
    assert_eq!(last.event, "object-schemas");
    assert_eq!(last.payload[0]["name"], "Beam");
}

#[tokio::test]
async fn test_set_select_moves_document_selection() {
    let (mut doc, column) = column_document();
    let mesh = doc.add_object(Shape::Mesh);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("model.json");
    doc.save(&path).expect("save");
    let config = HostConfig {
        document: Some(path),
        ..HostConfig::default()
    };
    let (bridge, rx) = open(&config).expect("open");

    let input = format!("{{\"action\":\"set-select\",\"objectIds\":[\"{mesh}\"]}}\n");
    let (document, output) = serve(
        bridge,
        rx,
        input.as_bytes(),
        Vec::new(),
        Duration::from_millis(5),
    )
    .await
    .expect("serve");

    assert_eq!(document.selection(), &[mesh]);
    assert!(!document.selection().contains(&column));
    assert_eq!(document.zoom_count(), 1);

    let events = parse_output(output);
    let last_selection = events
        .iter()
        .rev()
        .find(|e| e.event == "object-selection")
        .expect("selection pushed");
    assert_eq!(last_selection.payload["objIds"][0], mesh.to_string());
    assert_eq!(last_selection.payload["schemas"][0]["name"], "DirectShape");
}

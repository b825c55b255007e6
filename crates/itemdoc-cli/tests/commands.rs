//! Integration tests for the subcommand implementations.

use std::fs;

use itemdoc_cli::commands::{
    Output, inspect_snapshot, load, run_extract, run_inspect, run_normalize, run_renumber,
    run_translate,
};
use itemdoc_model::{DocumentKind, Endpoint, IssueKind, Uid};
use itemdoc_xml::{load_file, parse_snapshot};
use tempfile::tempdir;

const BOARD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<document type="circuit" revision="1">
  <item id="r1" type="ec/resistor" x="16" y="24" angle="0" flip="0"/>
  <item id="r2" type="ec/resistor" x="64" y="24" angle="0" flip="0"/>
  <item type="ec/led" x="0" y="0"/>
  <connector id="w1" manual-route="1" route="2,3,8,3," start-node-is-child="1"
    start-node-cid="n1" start-node-parent="r1" end-node-is-child="0" end-node-id="j1"/>
  <node id="j1" x="40" y="24"/>
</document>
"#;

const REGION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<document type="circuit" revision="1">
  <item id="a" type="ec/external_connection" x="0" y="5">
    <data id="name" type="string" value="A"/>
  </item>
  <item id="b" type="ec/external_connection" x="0" y="20">
    <data id="name" type="string" value="B"/>
  </item>
  <item id="c" type="ec/external_connection" x="10" y="5">
    <data id="name" type="string" value="C"/>
  </item>
  <item id="d" type="ec/external_connection" x="10" y="20">
    <data id="name" type="string" value="D"/>
  </item>
  <item id="r1" type="ec/resistor" x="5" y="12"/>
  <connector id="w1" manual-route="0" route="" start-node-is-child="1"
    start-node-cid="n1" start-node-parent="r1" end-node-is-child="1"
    end-node-cid="p1" end-node-parent="a"/>
  <connector id="w2" manual-route="0" route="" start-node-is-child="1"
    start-node-cid="n2" start-node-parent="r1" end-node-is-child="1"
    end-node-cid="p1" end-node-parent="c"/>
</document>
"#;

fn write_fixture(dir: &tempfile::TempDir, name: &str, text: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, text).expect("write fixture");
    path.to_string_lossy().into_owned()
}

#[test]
fn test_inspect_json_shape() {
    let outcome = parse_snapshot(BOARD).unwrap();
    let result = inspect_snapshot("board.circuit".to_string(), &outcome.snapshot, outcome.report);

    insta::assert_json_snapshot!(result, @r###"
    {
      "source": "board.circuit",
      "kind": "circuit",
      "items": 2,
      "connectors": 1,
      "nodes": 1,
      "micro": null,
      "item_types": {
        "ec/resistor": 2
      },
      "report": {
        "issues": [
          {
            "kind": "missing_id",
            "severity": "error",
            "message": "<item> has no id and was dropped",
            "entity": "item"
          }
        ]
      }
    }
    "###);
}

#[test]
fn test_inspect_reports_errors() {
    let dir = tempdir().unwrap();
    let input = write_fixture(&dir, "board.circuit", BOARD);

    let result = run_inspect(&input).unwrap();
    assert!(result.has_errors());
    assert_eq!(result.report.count_of(IssueKind::MissingId), 1);
    assert_eq!(result.kind, DocumentKind::Circuit);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.circuit");
    let error = run_inspect(&missing.to_string_lossy()).unwrap_err();
    assert!(format!("{error:#}").contains("absent.circuit"));
}

#[cfg(not(feature = "remote"))]
#[test]
fn test_remote_input_needs_the_remote_feature() {
    assert!(load("https://example.invalid/board.circuit").is_err());
}

#[test]
fn test_normalize_to_file_round_trips() {
    let dir = tempdir().unwrap();
    let input = write_fixture(&dir, "board.circuit", BOARD);
    let out = dir.path().join("normalized").join("board.circuit");

    let result = run_normalize(&input, &Output::File(out.clone())).unwrap();
    assert_eq!(result.written.as_deref(), Some(out.as_path()));
    assert!(result.text.is_none());

    let reloaded = load_file(&out).unwrap();
    assert!(reloaded.report.is_empty());
    assert_eq!(reloaded.snapshot, result.snapshot);
}

#[test]
fn test_normalize_to_stdout_returns_text() {
    let dir = tempdir().unwrap();
    let input = write_fixture(&dir, "board.circuit", BOARD);

    let result = run_normalize(&input, &Output::Stdout).unwrap();
    let text = result.text.expect("document text");
    assert!(text.starts_with("<?xml"));
    assert_eq!(parse_snapshot(&text).unwrap().snapshot, result.snapshot);
}

#[test]
fn test_translate_moves_items_nodes_and_routes() {
    let dir = tempdir().unwrap();
    let input = write_fixture(&dir, "board.circuit", BOARD);

    let result = run_translate(&input, 80, 160, &Output::Stdout).unwrap();
    let snapshot = &result.snapshot;
    let r1 = &snapshot.items[&Uid::from("r1")];
    assert_eq!((r1.x, r1.y), (96, 184));
    let j1 = &snapshot.nodes[&Uid::from("j1")];
    assert_eq!((j1.x, j1.y), (120, 184));
    let route = &snapshot.connectors[&Uid::from("w1")].route;
    assert_eq!((route[0].x, route[0].y), (12, 23));
    assert_eq!((route[1].x, route[1].y), (18, 23));
}

#[test]
fn test_renumber_replaces_every_identifier() {
    let dir = tempdir().unwrap();
    let input = write_fixture(&dir, "board.circuit", BOARD);
    let before = parse_snapshot(BOARD).unwrap().snapshot;

    let result = run_renumber(&input, &Output::Stdout).unwrap();
    let after = &result.snapshot;
    assert_eq!(after.items.len(), before.items.len());
    assert_eq!(after.nodes.len(), before.nodes.len());
    assert_eq!(after.connectors.len(), before.connectors.len());
    for id in after
        .items
        .keys()
        .chain(after.nodes.keys())
        .chain(after.connectors.keys())
    {
        assert!(!before.items.contains_key(id), "item id {id} reused");
        assert!(!before.nodes.contains_key(id), "node id {id} reused");
        assert!(!before.connectors.contains_key(id), "connector id {id} reused");
    }

    let connector = after.connectors.values().next().unwrap();
    let Endpoint::Child { parent, .. } = &connector.start else {
        panic!("start should stay a child endpoint");
    };
    assert!(after.items.contains_key(parent));
    let Endpoint::Node(node) = &connector.end else {
        panic!("end should stay a plain node");
    };
    assert!(after.nodes.contains_key(node));
}

#[test]
fn test_extract_numbers_pins_counter_clockwise() {
    let dir = tempdir().unwrap();
    let input = write_fixture(&dir, "region.circuit", REGION);

    let result = run_extract(&input).unwrap();
    assert!(!result.has_errors(), "{:?}", result.report);
    assert_eq!(result.summary.pin_names, vec!["A", "B", "D", "C"]);
    assert_eq!(result.summary.items, 1);
    assert_eq!(result.summary.connectors, 2);
    assert_eq!(result.summary.nodes, 0);
}

#[test]
fn test_extract_rejects_flow_documents() {
    let dir = tempdir().unwrap();
    let input = write_fixture(
        &dir,
        "program.flowcode",
        r#"<document type="flowcode"><item id="s" type="flow/start" x="0" y="0"/></document>"#,
    );

    let error = run_extract(&input).unwrap_err();
    assert!(error.to_string().contains("flowcode"));
}

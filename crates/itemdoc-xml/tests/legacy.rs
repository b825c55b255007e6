//! Reading documents written by older releases.

use std::path::Path;

use itemdoc_model::{
    Color, DocumentKind, Endpoint, IssueKind, Orientation, PinDirection, PinMappingType, PinState,
    Point, Uid,
};
use itemdoc_xml::{DocumentError, Location, NoRemote, load_file, load_snapshot, parse_snapshot};

fn legacy_path() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/legacy.flowcode"))
}

#[test]
fn test_legacy_fixture_loads() {
    let outcome = load_file(legacy_path()).expect("Failed to read legacy.flowcode");
    let snapshot = &outcome.snapshot;

    assert_eq!(snapshot.kind, DocumentKind::FlowCode);
    assert_eq!(snapshot.items.len(), 3);
    assert_eq!(snapshot.nodes.len(), 1);
    assert_eq!(snapshot.connectors.len(), 1);
}

#[test]
fn test_nested_item_gets_enclosing_parent() {
    let snapshot = load_file(legacy_path()).unwrap().snapshot;

    let inner = &snapshot.items[&Uid::from("inner")];
    assert_eq!(inner.parent_id, Some(Uid::from("container")));
    assert_eq!(inner.data_number["ms"], 250.0);

    let container = &snapshot.items[&Uid::from("container")];
    assert_eq!(container.parent_id, None);
    assert_eq!(container.string("loop"), Some("x < 10"));
}

#[test]
fn test_item_attribute_defaults() {
    let snapshot = load_file(legacy_path()).unwrap().snapshot;

    let led = &snapshot.items[&Uid::from("led")];
    assert_eq!((led.x, led.y), (120, 120));
    assert_eq!(
        led.orientation,
        Orientation::Free {
            angle_degrees: 90,
            flipped: true
        }
    );
    assert!(led.buttons["push"]);
    assert_eq!(led.sliders["speed"], 0);
    assert!(led.data_color.is_empty());
}

#[test]
fn test_route_and_child_endpoint() {
    let snapshot = load_file(legacy_path()).unwrap().snapshot;

    let connector = &snapshot.connectors[&Uid::from("c1")];
    assert_eq!(connector.route, vec![Point::new(1, 2), Point::new(3, 4)]);
    assert_eq!(connector.start, Endpoint::node("n1"));
    assert_eq!(connector.end, Endpoint::child("inner", "in"));
}

#[test]
fn test_legacy_micro_settings() {
    let snapshot = load_file(legacy_path()).unwrap().snapshot;
    let micro = snapshot.micro.expect("micro settings");

    assert_eq!(micro.id, "P16F84");
    assert_eq!(micro.pin_mappings.len(), 1);
    let display = &micro.pin_mappings["display"];
    assert_eq!(display.mapping_type, PinMappingType::SevenSegment);
    assert_eq!(display.pins.len(), 7);

    assert_eq!(micro.pins["RA0"].direction, PinDirection::Output);
    assert_eq!(micro.pins["RA0"].state, PinState::On);
    assert_eq!(micro.pins["RA1"].direction, PinDirection::Input);
    assert_eq!(micro.pins["RA1"].state, PinState::Off);
    assert_eq!(micro.variables["count"], "3");
}

#[test]
fn test_unit_problems_are_reported_not_fatal() {
    let report = load_file(legacy_path()).unwrap().report;

    assert_eq!(report.count_of(IssueKind::MissingId), 4);
    // Only the item and the node without ids are errors.
    assert_eq!(report.error_count(), 2);
    assert_eq!(report.count_of(IssueKind::UnknownDataType), 1);
    assert_eq!(report.count_of(IssueKind::UnknownElement), 1);
}

#[test]
fn test_load_snapshot_with_file_url() {
    let location = Location::parse(&format!("file://{}", legacy_path().display()));
    let outcome = load_snapshot(&location, &NoRemote).unwrap();
    assert_eq!(outcome.snapshot.kind, DocumentKind::FlowCode);
}

#[test]
fn test_keyword_colors_are_accepted() {
    let outcome = parse_snapshot(
        r#"<document type="circuit">
             <item id="a" type="ec/led"><data id="c" type="color" value="Red"/></item>
           </document>"#,
    )
    .unwrap();
    assert_eq!(
        outcome.snapshot.items[&Uid::from("a")].data_color["c"],
        Color::rgb(255, 0, 0)
    );
}

#[test]
fn test_malformed_document_is_fatal() {
    let error = parse_snapshot("<document type=\"circuit\"><item id=\"a\">").unwrap_err();
    assert!(matches!(error, DocumentError::Format { .. }));
    assert!(error.user_message().contains("not valid XML"));
}

//! XML to snapshot.
//!
//! Only a document that is not well formed fails the parse. Every other
//! problem skips the affected element and is recorded in the returned
//! [`Report`].

use itemdoc_model::codec::{decode_bool, decode_int, decode_number};
use itemdoc_model::{
    Bits, Color, ConnectorRecord, DEFAULT_ITEM_POSITION, DEFAULT_ITEM_SIZE, DocumentKind,
    DocumentSnapshot, Endpoint, IssueKind, ItemRecord, MicroRecord, NodeRecord, Orientation,
    PinDirection, PinMapping, PinMappingType, PinRecord, PinState, Point, Rect, Report, Uid,
};

use crate::element::{Element, parse_tree};
use crate::error::Result;

/// A parsed snapshot together with the problems found while reading it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub snapshot: DocumentSnapshot,
    pub report: Report,
}

/// Parse document text into a snapshot.
pub fn parse_snapshot(text: &str) -> Result<ParseOutcome> {
    let root = parse_tree(text)?;
    let mut report = Report::new();
    let mut snapshot = DocumentSnapshot::default();

    match root.attr("type") {
        Some(name) => match DocumentKind::parse(name) {
            Some(kind) => snapshot.kind = kind,
            None => report.warn(
                IssueKind::UnknownDocumentType,
                Some(name),
                format!("unknown document type \"{name}\""),
            ),
        },
        None => tracing::debug!("document element has no type attribute"),
    }

    for child in &root.children {
        match child.name.as_str() {
            "item" => read_item(child, None, &mut snapshot, &mut report),
            "node" => read_node(child, &mut snapshot, &mut report),
            "connector" => read_connector(child, &mut snapshot, &mut report),
            "micro" | "pic-settings" => read_micro(child, &mut snapshot, &mut report),
            // Flow programs used to embed generated code; it is regenerated.
            "code" => {}
            other => report.warn(
                IssueKind::UnknownElement,
                Some(other),
                format!("ignoring unrecognised element <{other}>"),
            ),
        }
    }

    tracing::debug!(
        kind = %snapshot.kind,
        items = snapshot.items.len(),
        connectors = snapshot.connectors.len(),
        nodes = snapshot.nodes.len(),
        issues = report.issues.len(),
        "parsed snapshot"
    );
    Ok(ParseOutcome { snapshot, report })
}

fn required_id(element: &Element, report: &mut Report) -> Option<Uid> {
    match element.attr("id") {
        Some(id) if !id.is_empty() => Some(Uid::from(id)),
        _ => {
            report.error(
                IssueKind::MissingId,
                Some(element.name.as_str()),
                format!("<{}> has no id and was dropped", element.name),
            );
            None
        }
    }
}

fn read_item(
    element: &Element,
    forced_parent: Option<&Uid>,
    snapshot: &mut DocumentSnapshot,
    report: &mut Report,
) {
    let Some(id) = required_id(element, report) else {
        return;
    };

    let mut item = ItemRecord::new(
        element.attr_or("type", ""),
        decode_int(element.attr("x"), DEFAULT_ITEM_POSITION),
        decode_int(element.attr("y"), DEFAULT_ITEM_POSITION),
    );
    item.z = element.attr("z").map(|z| decode_int(Some(z), -1));

    if element.has_attr("width") || element.has_attr("height") {
        item.size = Some(Rect {
            x: decode_int(element.attr("offset-x"), 0),
            y: decode_int(element.attr("offset-y"), 0),
            width: decode_int(element.attr("width"), DEFAULT_ITEM_SIZE),
            height: decode_int(element.attr("height"), DEFAULT_ITEM_SIZE),
        });
    }

    item.orientation = Orientation::from_parts(
        decode_int(element.attr("orientation"), -1),
        decode_int(element.attr("angle"), 0),
        decode_bool(element.attr_or("flip", "0")),
    );

    item.parent_id = match forced_parent {
        Some(parent) => Some(parent.clone()),
        None => element
            .attr("parent")
            .filter(|parent| !parent.is_empty())
            .map(Uid::from),
    };

    for child in &element.children {
        match child.name.as_str() {
            "data" => read_data(child, &mut item, report),
            "button" => {
                if let Some(key) = property_id(child, report) {
                    item.buttons
                        .insert(key, decode_bool(child.attr_or("state", "0")));
                }
            }
            "slider" => {
                if let Some(key) = property_id(child, report) {
                    item.sliders.insert(key, decode_int(child.attr("value"), 0));
                }
            }
            // Older files nested children inside their container.
            "item" => read_item(child, Some(&id), snapshot, report),
            "child-node" => {}
            other => report.warn(
                IssueKind::UnknownElement,
                Some(other),
                format!("ignoring <{other}> inside item {id}"),
            ),
        }
    }

    snapshot.add_item(id, item, report);
}

fn property_id(element: &Element, report: &mut Report) -> Option<String> {
    match element.attr("id") {
        Some(id) if !id.is_empty() => Some(id.to_string()),
        _ => {
            report.warn(
                IssueKind::MissingId,
                Some(element.name.as_str()),
                format!("<{}> has no id and was dropped", element.name),
            );
            None
        }
    }
}

fn read_data(element: &Element, item: &mut ItemRecord, report: &mut Report) {
    let Some(key) = property_id(element, report) else {
        return;
    };
    let value = element.attr_or("value", "");
    match element.attr_or("type", "") {
        "string" | "multiline" => {
            item.data_string.insert(key, value.to_string());
        }
        "number" => {
            item.data_number.insert(key, decode_number(value));
        }
        "color" => {
            item.data_color.insert(key, Color::parse(value));
        }
        "raw" => {
            item.data_raw.insert(key, Bits::from_hex(value));
        }
        "bool" => {
            item.data_bool.insert(key, decode_bool(value));
        }
        other => report.warn(
            IssueKind::UnknownDataType,
            Some(key.as_str()),
            format!("unknown data type \"{other}\" for property {key}"),
        ),
    }
}

fn read_node(element: &Element, snapshot: &mut DocumentSnapshot, report: &mut Report) {
    let Some(id) = required_id(element, report) else {
        return;
    };
    let node = NodeRecord::new(
        decode_int(element.attr("x"), 0),
        decode_int(element.attr("y"), 0),
    );
    snapshot.add_node(id, node, report);
}

fn read_connector(element: &Element, snapshot: &mut DocumentSnapshot, report: &mut Report) {
    let Some(id) = required_id(element, report) else {
        return;
    };
    let mut connector = ConnectorRecord::new(
        read_endpoint(element, "start"),
        read_endpoint(element, "end"),
    );
    connector.manual_route = decode_bool(element.attr_or("manual-route", "0"));
    connector.route = parse_route(element.attr_or("route", ""));
    snapshot.add_connector(id, connector, report);
}

fn read_endpoint(element: &Element, prefix: &str) -> Endpoint {
    let attr = |suffix: &str| element.attr_or(&format!("{prefix}-node-{suffix}"), "").to_string();
    if decode_bool(&attr("is-child")) {
        Endpoint::child(attr("parent"), attr("cid"))
    } else {
        Endpoint::node(attr("id"))
    }
}

/// Parse `x,y,x,y,` into points; an unpaired trailing value is dropped.
fn parse_route(text: &str) -> Vec<Point> {
    let values: Vec<i32> = text
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| decode_int(Some(value), 0))
        .collect();
    values
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect()
}

fn read_micro(element: &Element, snapshot: &mut DocumentSnapshot, report: &mut Report) {
    let id = element
        .attr("id")
        .or_else(|| element.attr("pic"))
        .unwrap_or_default();
    if id.is_empty() {
        report.error(
            IssueKind::MissingId,
            Some(element.name.as_str()),
            "microcontroller settings have no id and were dropped",
        );
        return;
    }

    let mut micro = MicroRecord::new(id);
    for child in &element.children {
        match child.name.as_str() {
            "pinmap" => {
                let (Some(map_id), Some(kind)) = (child.attr("id"), child.attr("type")) else {
                    report.warn(
                        IssueKind::MissingId,
                        Some("pinmap"),
                        "pin mapping without id or type was dropped",
                    );
                    continue;
                };
                let pins = child
                    .attr_or("map", "")
                    .split_whitespace()
                    .map(str::to_string)
                    .collect();
                micro.pin_mappings.insert(
                    map_id.to_string(),
                    PinMapping::new(PinMappingType::parse(kind), pins),
                );
            }
            "pin" => {
                let Some(pin_id) = property_id(child, report) else {
                    continue;
                };
                let direction = match child.attr("type") {
                    Some("output") => PinDirection::Output,
                    _ => PinDirection::Input,
                };
                let state = match child.attr("state") {
                    Some("on") => PinState::On,
                    _ => PinState::Off,
                };
                micro.pins.insert(pin_id, PinRecord { direction, state });
            }
            "variable" => match child.attr("name") {
                Some(name) if !name.is_empty() => {
                    micro
                        .variables
                        .insert(name.to_string(), child.attr_or("value", "").to_string());
                }
                _ => report.warn(
                    IssueKind::MissingId,
                    Some("variable"),
                    "variable without a name was dropped",
                ),
            },
            other => report.warn(
                IssueKind::UnknownElement,
                Some(other),
                format!("ignoring <{other}> inside microcontroller settings"),
            ),
        }
    }
    snapshot.micro = Some(micro);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_coordinates_use_default_position() {
        let outcome = parse_snapshot(
            r#"<document type="circuit"><item id="a" type="ec/led"/></document>"#,
        )
        .unwrap();
        let item = &outcome.snapshot.items[&Uid::from("a")];
        assert_eq!((item.x, item.y), (120, 120));
        assert_eq!(item.z, None);
        assert_eq!(item.size, None);
        assert_eq!(item.orientation, Orientation::default());
    }

    #[test]
    fn malformed_coordinates_read_as_zero() {
        let outcome = parse_snapshot(
            r#"<document type="circuit"><item id="a" type="t" x="abc" y="4"/></document>"#,
        )
        .unwrap();
        let item = &outcome.snapshot.items[&Uid::from("a")];
        assert_eq!((item.x, item.y), (0, 4));
    }

    #[test]
    fn half_declared_size_uses_default_dimension() {
        let outcome = parse_snapshot(
            r#"<document type="circuit"><item id="a" type="t" width="40"/></document>"#,
        )
        .unwrap();
        let item = &outcome.snapshot.items[&Uid::from("a")];
        assert_eq!(
            item.size,
            Some(Rect {
                x: 0,
                y: 0,
                width: 40,
                height: 120
            })
        );
    }

    #[test]
    fn route_drops_unpaired_value() {
        assert_eq!(
            parse_route("1,2,3,4,5"),
            vec![Point::new(1, 2), Point::new(3, 4)]
        );
        assert!(parse_route("").is_empty());
    }

    #[test]
    fn child_endpoint_reads_parent_and_slot() {
        let outcome = parse_snapshot(
            r#"<document type="circuit">
                 <connector id="c" start-node-is-child="1" start-node-cid="p1"
                   start-node-parent="r1" end-node-is-child="0" end-node-id="n1"/>
               </document>"#,
        )
        .unwrap();
        let connector = &outcome.snapshot.connectors[&Uid::from("c")];
        assert_eq!(connector.start, Endpoint::child("r1", "p1"));
        assert_eq!(connector.end, Endpoint::node("n1"));
        assert!(!connector.manual_route);
    }

    #[test]
    fn unknown_document_type_is_reported() {
        let outcome = parse_snapshot(r#"<document type="banana"/>"#).unwrap();
        assert_eq!(outcome.snapshot.kind, DocumentKind::None);
        assert_eq!(outcome.report.count_of(IssueKind::UnknownDocumentType), 1);
    }

    #[test]
    fn legacy_pic_attribute_names_micro() {
        let outcome = parse_snapshot(
            r#"<document type="flowcode"><pic-settings pic="P16F84"/></document>"#,
        )
        .unwrap();
        assert_eq!(outcome.snapshot.micro.map(|micro| micro.id).as_deref(), Some("P16F84"));
    }
}

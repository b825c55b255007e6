//! Snapshot to XML.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use itemdoc_model::codec::{encode_bool, encode_number};
use itemdoc_model::{
    ConnectorRecord, DocumentKind, DocumentSnapshot, Endpoint, ItemRecord, MicroRecord,
    NodeRecord, Orientation, PinDirection, PinState, Uid,
};

use crate::error::{DocumentError, Result};
use crate::options::{REVISION, WriteOptions};

/// Serialize a snapshot into a string.
pub fn to_xml_string(snapshot: &DocumentSnapshot, options: &WriteOptions) -> Result<String> {
    let bytes = write_snapshot(Vec::new(), snapshot, options)?;
    String::from_utf8(bytes).map_err(|error| DocumentError::Write(std::io::Error::other(error)))
}

/// Serialize a snapshot into `inner`, returning it when done.
pub fn write_snapshot<W: Write>(
    inner: W,
    snapshot: &DocumentSnapshot,
    options: &WriteOptions,
) -> Result<W> {
    let mut xml = if options.indent > 0 {
        Writer::new_with_indent(inner, b' ', options.indent)
    } else {
        Writer::new(inner)
    };

    if options.declaration {
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    }

    let mut root = BytesStart::new("document");
    root.push_attribute(("type", snapshot.kind.as_str()));
    root.push_attribute(("revision", REVISION));
    xml.write_event(Event::Start(root))?;

    for (id, item) in &snapshot.items {
        write_item(&mut xml, id, item)?;
    }
    for (id, connector) in &snapshot.connectors {
        write_connector(&mut xml, id, connector)?;
    }
    for (id, node) in &snapshot.nodes {
        write_node(&mut xml, id, node)?;
    }
    if snapshot.kind == DocumentKind::FlowCode {
        if let Some(micro) = &snapshot.micro {
            write_micro(&mut xml, micro)?;
        }
    }

    xml.write_event(Event::End(BytesEnd::new("document")))?;
    tracing::debug!(
        items = snapshot.items.len(),
        connectors = snapshot.connectors.len(),
        nodes = snapshot.nodes.len(),
        "serialized snapshot"
    );
    Ok(xml.into_inner())
}

fn write_item<W: Write>(xml: &mut Writer<W>, id: &Uid, item: &ItemRecord) -> Result<()> {
    let mut element = BytesStart::new("item");
    element.push_attribute(("id", id.as_str()));
    element.push_attribute(("type", item.item_type.as_str()));
    element.push_attribute(("x", item.x.to_string().as_str()));
    element.push_attribute(("y", item.y.to_string().as_str()));
    if let Some(z) = item.z {
        element.push_attribute(("z", z.to_string().as_str()));
    }
    if let Some(size) = &item.size {
        element.push_attribute(("offset-x", size.x.to_string().as_str()));
        element.push_attribute(("offset-y", size.y.to_string().as_str()));
        element.push_attribute(("width", size.width.to_string().as_str()));
        element.push_attribute(("height", size.height.to_string().as_str()));
    }
    match item.orientation {
        Orientation::Fixed(index) => {
            element.push_attribute(("orientation", index.to_string().as_str()));
        }
        Orientation::Free {
            angle_degrees,
            flipped,
        } => {
            element.push_attribute(("angle", angle_degrees.to_string().as_str()));
            element.push_attribute(("flip", encode_bool(flipped)));
        }
    }
    if let Some(parent) = item.parent_id.as_ref().filter(|parent| !parent.is_empty()) {
        element.push_attribute(("parent", parent.as_str()));
    }

    let has_children = !(item.data_string.is_empty()
        && item.data_number.is_empty()
        && item.data_color.is_empty()
        && item.data_raw.is_empty()
        && item.data_bool.is_empty()
        && item.buttons.is_empty()
        && item.sliders.is_empty());
    if !has_children {
        xml.write_event(Event::Empty(element))?;
        return Ok(());
    }
    xml.write_event(Event::Start(element))?;

    for (key, value) in &item.data_string {
        write_data(xml, key, "string", value)?;
    }
    for (key, value) in &item.data_number {
        write_data(xml, key, "number", &encode_number(*value))?;
    }
    for (key, value) in &item.data_color {
        write_data(xml, key, "color", &value.name())?;
    }
    for (key, value) in &item.data_raw {
        write_data(xml, key, "raw", &value.to_hex())?;
    }
    for (key, value) in &item.data_bool {
        write_data(xml, key, "bool", encode_bool(*value))?;
    }
    for (key, state) in &item.buttons {
        let mut button = BytesStart::new("button");
        button.push_attribute(("id", key.as_str()));
        button.push_attribute(("state", encode_bool(*state)));
        xml.write_event(Event::Empty(button))?;
    }
    for (key, value) in &item.sliders {
        let mut slider = BytesStart::new("slider");
        slider.push_attribute(("id", key.as_str()));
        slider.push_attribute(("value", value.to_string().as_str()));
        xml.write_event(Event::Empty(slider))?;
    }

    xml.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn write_data<W: Write>(xml: &mut Writer<W>, key: &str, kind: &str, value: &str) -> Result<()> {
    let mut data = BytesStart::new("data");
    data.push_attribute(("id", key));
    data.push_attribute(("type", kind));
    data.push_attribute(("value", value));
    xml.write_event(Event::Empty(data))?;
    Ok(())
}

fn write_connector<W: Write>(
    xml: &mut Writer<W>,
    id: &Uid,
    connector: &ConnectorRecord,
) -> Result<()> {
    let mut element = BytesStart::new("connector");
    element.push_attribute(("id", id.as_str()));
    element.push_attribute(("manual-route", encode_bool(connector.manual_route)));

    let route: String = connector
        .route
        .iter()
        .map(|point| format!("{},{},", point.x, point.y))
        .collect();
    element.push_attribute(("route", route.as_str()));

    push_endpoint(&mut element, "start", &connector.start);
    push_endpoint(&mut element, "end", &connector.end);

    xml.write_event(Event::Empty(element))?;
    Ok(())
}

fn push_endpoint(element: &mut BytesStart<'_>, prefix: &str, endpoint: &Endpoint) {
    match endpoint {
        Endpoint::Child { parent, slot } => {
            element.push_attribute((format!("{prefix}-node-is-child").as_str(), "1"));
            element.push_attribute((format!("{prefix}-node-cid").as_str(), slot.as_str()));
            element.push_attribute((format!("{prefix}-node-parent").as_str(), parent.as_str()));
        }
        Endpoint::Node(id) => {
            element.push_attribute((format!("{prefix}-node-is-child").as_str(), "0"));
            element.push_attribute((format!("{prefix}-node-id").as_str(), id.as_str()));
        }
    }
}

fn write_node<W: Write>(xml: &mut Writer<W>, id: &Uid, node: &NodeRecord) -> Result<()> {
    let mut element = BytesStart::new("node");
    element.push_attribute(("id", id.as_str()));
    element.push_attribute(("x", node.x.to_string().as_str()));
    element.push_attribute(("y", node.y.to_string().as_str()));
    xml.write_event(Event::Empty(element))?;
    Ok(())
}

fn write_micro<W: Write>(xml: &mut Writer<W>, micro: &MicroRecord) -> Result<()> {
    let mut element = BytesStart::new("micro");
    element.push_attribute(("id", micro.id.as_str()));
    if micro.pin_mappings.is_empty() && micro.pins.is_empty() && micro.variables.is_empty() {
        xml.write_event(Event::Empty(element))?;
        return Ok(());
    }
    xml.write_event(Event::Start(element))?;

    for (id, mapping) in &micro.pin_mappings {
        let mut pinmap = BytesStart::new("pinmap");
        pinmap.push_attribute(("id", id.as_str()));
        pinmap.push_attribute(("type", mapping.mapping_type.as_str()));
        pinmap.push_attribute(("map", mapping.pins.join(" ").as_str()));
        xml.write_event(Event::Empty(pinmap))?;
    }
    for (id, pin) in &micro.pins {
        let mut element = BytesStart::new("pin");
        element.push_attribute(("id", id.as_str()));
        let direction = match pin.direction {
            PinDirection::Input => "input",
            PinDirection::Output => "output",
        };
        let state = match pin.state {
            PinState::Off => "off",
            PinState::On => "on",
        };
        element.push_attribute(("type", direction));
        element.push_attribute(("state", state));
        xml.write_event(Event::Empty(element))?;
    }
    for (name, value) in &micro.variables {
        let mut variable = BytesStart::new("variable");
        variable.push_attribute(("name", name.as_str()));
        variable.push_attribute(("value", value.as_str()));
        xml.write_event(Event::Empty(variable))?;
    }

    xml.write_event(Event::End(BytesEnd::new("micro")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use itemdoc_model::{Color, Point, Report};

    use super::*;

    fn compact(snapshot: &DocumentSnapshot) -> String {
        to_xml_string(snapshot, &WriteOptions::new().compact().with_declaration(false)).unwrap()
    }

    #[test]
    fn writes_root_type_and_revision() {
        let xml = compact(&DocumentSnapshot::new(DocumentKind::Mechanics));
        assert_eq!(xml, r#"<document type="mechanics" revision="1"></document>"#);
    }

    #[test]
    fn writes_item_attributes_and_data() {
        let mut snapshot = DocumentSnapshot::new(DocumentKind::Circuit);
        let mut item = ItemRecord::new("ec/led", 16, 24).with_string("name", "D1");
        item.data_color.insert("color".into(), Color::rgb(255, 0, 0));
        item.orientation = Orientation::Free {
            angle_degrees: 90,
            flipped: true,
        };
        snapshot.add_item(Uid::from("led1"), item, &mut Report::new());

        let xml = compact(&snapshot);
        assert!(xml.contains(
            r#"<item id="led1" type="ec/led" x="16" y="24" angle="90" flip="1">"#
        ));
        assert!(xml.contains(r#"<data id="name" type="string" value="D1"/>"#));
        assert!(xml.contains(r##"<data id="color" type="color" value="#ff0000"/>"##));
    }

    #[test]
    fn fixed_orientation_omits_angle_and_flip() {
        let mut snapshot = DocumentSnapshot::new(DocumentKind::FlowCode);
        let mut item = ItemRecord::new("flow/start", 0, 0);
        item.orientation = Orientation::Fixed(1);
        snapshot.items.insert(Uid::from("start"), item);
        let xml = compact(&snapshot);
        assert!(xml.contains(r#"orientation="1""#));
        assert!(!xml.contains("angle="));
    }

    #[test]
    fn writes_connector_endpoints_and_route() {
        let mut snapshot = DocumentSnapshot::new(DocumentKind::Circuit);
        snapshot.connectors.insert(
            Uid::from("wire"),
            ConnectorRecord::new(Endpoint::node("n1"), Endpoint::child("r1", "p2"))
                .with_route(vec![Point::new(1, 2), Point::new(3, 4)]),
        );
        let xml = compact(&snapshot);
        assert!(xml.contains(r#"route="1,2,3,4,""#));
        assert!(xml.contains(r#"start-node-is-child="0" start-node-id="n1""#));
        assert!(xml.contains(
            r#"end-node-is-child="1" end-node-cid="p2" end-node-parent="r1""#
        ));
    }

    #[test]
    fn micro_written_only_for_flowcode() {
        let mut snapshot = DocumentSnapshot::new(DocumentKind::Circuit);
        snapshot.micro = Some(MicroRecord::new("P16F84"));
        assert!(!compact(&snapshot).contains("<micro"));

        snapshot.kind = DocumentKind::FlowCode;
        assert!(compact(&snapshot).contains(r#"<micro id="P16F84"/>"#));
    }

    #[test]
    fn escapes_attribute_values() {
        let mut snapshot = DocumentSnapshot::new(DocumentKind::Circuit);
        snapshot.items.insert(
            Uid::from("t"),
            ItemRecord::new("dp/text", 0, 0).with_string("text", "a<b & \"c\""),
        );
        let xml = compact(&snapshot);
        assert!(xml.contains("a&lt;b &amp; &quot;c&quot;"));
    }
}

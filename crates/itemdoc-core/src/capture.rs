//! Live document to snapshot.

use itemdoc_model::{DocumentKind, DocumentSnapshot, Report};

use crate::live::LiveDocument;

/// Replace the contents of `snapshot` with the state of `document`.
///
/// Items off the canvas and the microcontroller placement item are
/// skipped. Graph-capable documents also contribute connectors whose ends
/// both resolve and every free-standing node; flow programs contribute
/// their microcontroller settings.
pub fn capture_from(snapshot: &mut DocumentSnapshot, document: &dyn LiveDocument) -> Report {
    let mut report = Report::new();
    snapshot.clear();
    let kind = document.kind();

    for id in document.item_ids() {
        let Some(item) = document.item(&id) else {
            continue;
        };
        if !item.is_on_canvas() {
            continue;
        }
        let record = item.item_data();
        if record.is_micro_item() {
            continue;
        }
        snapshot.add_item(id, record, &mut report);
    }

    if kind.is_graph_capable() {
        for id in document.connector_ids() {
            let Some(view) = document.connector(&id) else {
                continue;
            };
            if !view.on_canvas {
                continue;
            }
            match view.record {
                Some(record) => snapshot.add_connector(id, record, &mut report),
                None => tracing::debug!(connector = %id, "skipping connector with a missing end node"),
            }
        }

        for id in document.node_ids() {
            let Some(view) = document.node(&id) else {
                continue;
            };
            if view.on_canvas && !view.is_child {
                snapshot.add_node(id, view.record, &mut report);
            }
        }

        if kind == DocumentKind::FlowCode {
            snapshot.micro = document.micro_settings();
        }
    }

    snapshot.kind = kind;
    tracing::debug!(
        kind = %kind,
        items = snapshot.items.len(),
        connectors = snapshot.connectors.len(),
        nodes = snapshot.nodes.len(),
        "captured document"
    );
    report
}

/// Capture a document into a fresh snapshot.
pub fn capture(document: &dyn LiveDocument) -> (DocumentSnapshot, Report) {
    let mut snapshot = DocumentSnapshot::default();
    let report = capture_from(&mut snapshot, document);
    (snapshot, report)
}

#[cfg(test)]
mod tests {
    use itemdoc_model::{
        Capability, EntityRef, ItemRecord, MICRO_ITEM_TYPE, MicroRecord, NodeRecord, Uid,
    };

    use super::*;
    use crate::headless::{GenericItem, HeadlessDocument};
    use crate::live::Item;

    fn resistor(id: &str, x: i32, y: i32) -> Box<GenericItem> {
        let mut item = GenericItem::new(Uid::from(id), "ec/resistor").with_slots(["p1", "n1"]);
        item.move_to(x, y);
        Box::new(item)
    }

    #[test]
    fn skips_hidden_items_and_child_nodes() {
        let mut doc = HeadlessDocument::new(DocumentKind::Circuit);
        doc.add_item(resistor("r1", 8, 8)).unwrap();
        doc.add_item(resistor("r2", 16, 16)).unwrap();
        doc.hide_and_detach(&EntityRef::Item(Uid::from("r2")));
        doc.create_junction(&Uid::from("j1"), NodeRecord::new(4, 4), Capability::Electronic)
            .unwrap();

        let (snapshot, report) = capture(&doc);
        assert!(report.is_empty());
        assert_eq!(snapshot.kind, DocumentKind::Circuit);
        assert_eq!(snapshot.items.keys().map(Uid::as_str).collect::<Vec<_>>(), ["r1"]);
        assert_eq!(snapshot.nodes.keys().map(Uid::as_str).collect::<Vec<_>>(), ["j1"]);
    }

    #[test]
    fn captures_micro_only_for_flowcode() {
        let mut doc = HeadlessDocument::new(DocumentKind::FlowCode);
        doc.restore_micro(&MicroRecord::new("P16F84"));
        doc.add_item(Box::new(GenericItem::new(Uid::from("pic"), MICRO_ITEM_TYPE)))
            .unwrap();

        let (snapshot, _) = capture(&doc);
        assert_eq!(snapshot.micro.map(|micro| micro.id), Some("P16F84".to_string()));
        assert!(snapshot.items.is_empty());
    }

    #[test]
    fn mechanics_documents_capture_items_only() {
        let mut doc = HeadlessDocument::new(DocumentKind::Mechanics);
        doc.add_item(Box::new(GenericItem::new(Uid::from("m"), "mech/rect")))
            .unwrap();

        let mut snapshot = DocumentSnapshot::new(DocumentKind::Circuit);
        snapshot
            .nodes
            .insert(Uid::from("stale"), NodeRecord::new(0, 0));
        let report = capture_from(&mut snapshot, &doc);

        assert!(report.is_empty());
        assert_eq!(snapshot.kind, DocumentKind::Mechanics);
        assert!(snapshot.nodes.is_empty());
        assert_eq!(snapshot.items[&Uid::from("m")], ItemRecord::new("mech/rect", 0, 0));
    }
}

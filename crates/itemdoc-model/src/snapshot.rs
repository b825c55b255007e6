//! The storage-ready copy of a document's graph state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::Uid;
use crate::records::{ConnectorRecord, ItemRecord, MicroRecord, NodeRecord};
use crate::report::{IssueKind, Report};

/// Connector routes are stored at this fraction of item coordinates.
pub const ROUTE_SCALE: i32 = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Circuit,
    #[serde(rename = "flowcode")]
    FlowCode,
    Mechanics,
    #[default]
    None,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Circuit => "circuit",
            Self::FlowCode => "flowcode",
            Self::Mechanics => "mechanics",
            Self::None => "none",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "circuit" => Some(Self::Circuit),
            "flowcode" => Some(Self::FlowCode),
            "mechanics" => Some(Self::Mechanics),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// The node/connector flavor of graph-capable documents.
    pub fn capability(&self) -> Option<Capability> {
        match self {
            Self::Circuit => Some(Capability::Electronic),
            Self::FlowCode => Some(Capability::Flow),
            Self::Mechanics | Self::None => None,
        }
    }

    pub fn is_graph_capable(&self) -> bool {
        self.capability().is_some()
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete flavor of junctions and connectors a document builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Undirected wires between electronic nodes.
    Electronic,
    /// Directed links: the start node gains an output, the end node an input.
    Flow,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub kind: DocumentKind,
    pub items: BTreeMap<Uid, ItemRecord>,
    pub connectors: BTreeMap<Uid, ConnectorRecord>,
    pub nodes: BTreeMap<Uid, NodeRecord>,
    /// Only meaningful for flow-code documents.
    pub micro: Option<MicroRecord>,
}

impl DocumentSnapshot {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Drop all records and reset the document kind.
    pub fn clear(&mut self) {
        self.items.clear();
        self.connectors.clear();
        self.nodes.clear();
        self.micro = None;
        self.kind = DocumentKind::None;
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
            && self.connectors.is_empty()
            && self.nodes.is_empty()
            && self.micro.is_none()
    }

    /// Insert an item record, warning when it replaces an existing one.
    pub fn add_item(&mut self, id: Uid, record: ItemRecord, report: &mut Report) {
        if self.items.contains_key(&id) {
            report.warn(
                IssueKind::DuplicateId,
                Some(id.as_str()),
                format!("overwriting item {id}"),
            );
        }
        self.items.insert(id, record);
    }

    pub fn add_connector(&mut self, id: Uid, record: ConnectorRecord, report: &mut Report) {
        if self.connectors.contains_key(&id) {
            report.warn(
                IssueKind::DuplicateId,
                Some(id.as_str()),
                format!("overwriting connector {id}"),
            );
        }
        self.connectors.insert(id, record);
    }

    pub fn add_node(&mut self, id: Uid, record: NodeRecord, report: &mut Report) {
        if self.nodes.contains_key(&id) {
            report.warn(
                IssueKind::DuplicateId,
                Some(id.as_str()),
                format!("overwriting node {id}"),
            );
        }
        self.nodes.insert(id, record);
    }

    /// Offset all content, e.g. to place pasted or duplicated content.
    ///
    /// Items and nodes move by `(dx, dy)`; connector waypoints live on a
    /// coarser grid and move by `(dx / 8, dy / 8)`, truncating.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        for item in self.items.values_mut() {
            item.x = item.x.wrapping_add(dx);
            item.y = item.y.wrapping_add(dy);
        }
        for node in self.nodes.values_mut() {
            node.x = node.x.wrapping_add(dx);
            node.y = node.y.wrapping_add(dy);
        }
        let (route_dx, route_dy) = (dx / ROUTE_SCALE, dy / ROUTE_SCALE);
        for connector in self.connectors.values_mut() {
            for point in &mut connector.route {
                *point = point.offset(route_dx, route_dy);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Endpoint, Point};

    #[test]
    fn document_kind_names() {
        for kind in [
            DocumentKind::Circuit,
            DocumentKind::FlowCode,
            DocumentKind::Mechanics,
            DocumentKind::None,
        ] {
            assert_eq!(DocumentKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(DocumentKind::parse("text"), None);
        assert!(DocumentKind::Circuit.is_graph_capable());
        assert!(!DocumentKind::Mechanics.is_graph_capable());
    }

    #[test]
    fn translate_scales_routes() {
        let mut snapshot = DocumentSnapshot::new(DocumentKind::Circuit);
        let mut report = Report::new();
        snapshot.add_item(Uid::from("r1"), ItemRecord::new("ec/resistor", 8, 16), &mut report);
        snapshot.add_node(Uid::from("n1"), NodeRecord::new(40, 48), &mut report);
        snapshot.add_connector(
            Uid::from("c1"),
            ConnectorRecord::new(Endpoint::node("n1"), Endpoint::child("r1", "n0"))
                .with_route(vec![Point::new(1, 2), Point::new(3, 4)]),
            &mut report,
        );

        snapshot.translate(80, 160);

        assert_eq!((snapshot.items["r1"].x, snapshot.items["r1"].y), (88, 176));
        assert_eq!(snapshot.nodes["n1"], NodeRecord::new(120, 208));
        assert_eq!(
            snapshot.connectors["c1"].route,
            vec![Point::new(11, 22), Point::new(13, 24)]
        );
    }

    #[test]
    fn translate_truncates_route_offset() {
        let mut snapshot = DocumentSnapshot::new(DocumentKind::Circuit);
        snapshot.connectors.insert(
            Uid::from("c1"),
            ConnectorRecord::default().with_route(vec![Point::new(0, 0)]),
        );
        snapshot.translate(15, -15);
        assert_eq!(snapshot.connectors["c1"].route, vec![Point::new(1, -1)]);
    }

    #[test]
    fn translate_wraps_at_coordinate_limits() {
        let mut snapshot = DocumentSnapshot::new(DocumentKind::Circuit);
        let mut report = Report::new();
        snapshot.add_item(Uid::from("far"), ItemRecord::new("ec/led", 2_147_483_600, 0), &mut report);
        snapshot.add_node(Uid::from("low"), NodeRecord::new(0, i32::MIN), &mut report);
        snapshot.connectors.insert(
            Uid::from("c1"),
            ConnectorRecord::new(Endpoint::node("low"), Endpoint::node("low"))
                .with_route(vec![Point::new(i32::MAX, 0)]),
        );

        snapshot.translate(80, -8);

        let far = &snapshot.items[&Uid::from("far")];
        assert_eq!((far.x, far.y), (2_147_483_600_i32.wrapping_add(80), -8));
        assert_eq!(snapshot.nodes[&Uid::from("low")].y, i32::MAX - 7);
        assert_eq!(snapshot.connectors[&Uid::from("c1")].route, vec![Point::new(i32::MIN + 9, -1)]);
    }

    #[test]
    fn duplicate_capture_overwrites_with_warning() {
        let mut snapshot = DocumentSnapshot::new(DocumentKind::Circuit);
        let mut report = Report::new();
        snapshot.add_node(Uid::from("n1"), NodeRecord::new(0, 0), &mut report);
        snapshot.add_node(Uid::from("n1"), NodeRecord::new(5, 5), &mut report);
        assert_eq!(snapshot.nodes["n1"], NodeRecord::new(5, 5));
        assert_eq!(report.warning_count(), 1);
        assert!(!report.has_errors());
    }

    #[test]
    fn clear_resets_kind() {
        let mut snapshot = DocumentSnapshot::new(DocumentKind::FlowCode);
        snapshot.micro = Some(MicroRecord::new("P16F84"));
        snapshot.clear();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.kind, DocumentKind::None);
    }
}

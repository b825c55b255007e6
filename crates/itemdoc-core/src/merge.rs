//! Snapshot to live document.

use itemdoc_model::{
    DocumentKind, DocumentSnapshot, EntityRef, Endpoint, IssueKind, MICRO_ITEM_TYPE, Report, Uid,
};

use crate::live::LiveDocument;
use crate::registry::ItemRegistry;

/// Create everything in `snapshot` that `document` lacks and bring what
/// exists in line with the snapshot.
///
/// Nothing already in the document is removed. Units that cannot be built
/// are skipped and reported; the rest of the merge continues.
pub fn merge_into(
    snapshot: &DocumentSnapshot,
    document: &mut dyn LiveDocument,
    registry: &ItemRegistry,
    select_new: bool,
) -> Report {
    let mut report = Report::new();
    let capability = document.kind().capability();

    if let Some(capability) = capability {
        for (id, node) in &snapshot.nodes {
            if document.node(id).is_some() {
                continue;
            }
            if let Err(error) = document.create_junction(id, *node, capability) {
                report.error(
                    IssueKind::NodeRejected,
                    Some(id.as_str()),
                    format!("could not create node {id}: {error}"),
                );
            }
        }
        for (id, node) in &snapshot.nodes {
            if document.node(id).is_some() {
                document.move_node(id, node.x, node.y);
            }
        }
    }

    for (id, record) in &snapshot.items {
        if record.item_type.is_empty() || document.item(id).is_some() {
            continue;
        }
        let Some(item) = registry.create(&record.item_type, id) else {
            report.error(
                IssueKind::UnknownItemType,
                Some(id.as_str()),
                format!("no factory for item type \"{}\"", record.item_type),
            );
            continue;
        };
        if let Err(error) = document.add_item(item) {
            report.error(
                IssueKind::InvalidItem,
                Some(id.as_str()),
                format!("attempted to create invalid item: {error}"),
            );
            continue;
        }
        // Position first so restoring a parent does not drag children along.
        if let Some(item) = document.item_mut(id) {
            item.move_to(record.x, record.y);
        }
    }
    for (id, record) in &snapshot.items {
        let Some(item) = document.item_mut(id) else {
            continue;
        };
        item.restore_from_item_data(record);
        item.finish_creation();
        item.show();
        if select_new {
            document.select(EntityRef::Item(id.clone()));
        }
    }

    if let Some(capability) = capability {
        for (id, record) in &snapshot.connectors {
            if document.connector(id).is_some() {
                continue;
            }
            let start = resolve_endpoint(document, &record.start);
            let end = resolve_endpoint(document, &record.end);
            let (Some(start), Some(end)) = (start, end) else {
                report.error(
                    IssueKind::UnresolvedEndpoint,
                    Some(id.as_str()),
                    format!(
                        "start ({}) and end ({}) nodes of connector {id} do not both exist",
                        describe(&record.start),
                        describe(&record.end)
                    ),
                );
                continue;
            };
            if let Err(error) = document.create_connector(id, &start, &end, capability) {
                report.error(
                    IssueKind::ConnectorRejected,
                    Some(id.as_str()),
                    format!("could not create connector {id}: {error}"),
                );
            }
        }
        for (id, record) in &snapshot.connectors {
            if document.connector(id).is_none() {
                continue;
            }
            document.restore_connector(id, record);
            if select_new {
                document.select(EntityRef::Connector(id.clone()));
            }
        }
    }

    document.refresh_containers();
    tracing::debug!(
        items = snapshot.items.len(),
        connectors = snapshot.connectors.len(),
        nodes = snapshot.nodes.len(),
        errors = report.error_count(),
        "merged snapshot"
    );
    report
}

/// Make `document` match `snapshot` exactly.
///
/// Microcontroller settings are applied first, then the snapshot is merged
/// without selection and every item, free-standing node and connector the
/// snapshot does not mention is removed. The microcontroller placement item
/// and entities off the canvas are left alone.
pub fn restore_document(
    snapshot: &DocumentSnapshot,
    document: &mut dyn LiveDocument,
    registry: &ItemRegistry,
) -> Report {
    if document.kind() == DocumentKind::FlowCode
        && let Some(micro) = snapshot.micro.as_ref().filter(|micro| !micro.id.is_empty())
    {
        document.restore_micro(micro);
    }

    let report = merge_into(snapshot, document, registry, false);

    for id in document.item_ids() {
        if snapshot.items.contains_key(&id) {
            continue;
        }
        let removable = document
            .item(&id)
            .is_some_and(|item| item.is_on_canvas() && item.item_type() != MICRO_ITEM_TYPE);
        if removable {
            document.remove_item(&id);
        }
    }

    if document.kind().is_graph_capable() {
        for id in document.node_ids() {
            if snapshot.nodes.contains_key(&id) {
                continue;
            }
            if document
                .node(&id)
                .is_some_and(|node| node.on_canvas && !node.is_child)
            {
                document.remove_node(&id);
            }
        }
        for id in document.connector_ids() {
            if snapshot.connectors.contains_key(&id) {
                continue;
            }
            if document.connector(&id).is_some_and(|connector| connector.on_canvas) {
                document.remove_connector(&id);
            }
        }
    }

    document.flush_delete_list();
    report
}

fn resolve_endpoint(document: &dyn LiveDocument, endpoint: &Endpoint) -> Option<Uid> {
    match endpoint {
        Endpoint::Node(id) => document.node(id).map(|_| id.clone()),
        Endpoint::Child { parent, slot } => {
            let node = document.child_node(parent, slot);
            if node.is_none() {
                tracing::debug!(%parent, slot = %slot, "unable to find child node");
            }
            node
        }
    }
}

fn describe(endpoint: &Endpoint) -> String {
    match endpoint {
        Endpoint::Node(id) => format!("node {id}"),
        Endpoint::Child { parent, slot } => format!("{parent}:{slot}"),
    }
}

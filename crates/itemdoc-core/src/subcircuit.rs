//! Promoting a drawn region into a sub-circuit.
//!
//! The region is a snapshot in which `ec/external_connection` markers stand
//! for the pins of the new component. Markers are replaced by numbered pins
//! of the container, the rest of the region is merged into the container's
//! document and handed over to the container.

use itemdoc_model::{DocumentSnapshot, EntityRef, Endpoint, Report, Uid};
use thiserror::Error;

use crate::live::{LiveDocument, SubcircuitContainer};
use crate::merge::merge_into;
use crate::registry::ItemRegistry;
use crate::remap::regenerate_identifiers;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("container {id} does not exist")]
    MissingContainer { id: Uid },

    #[error("item {id} cannot hold a sub-circuit")]
    NotAContainer { id: Uid },
}

/// What an extraction produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub container: Uid,
    /// Pin names, indexed by pin number.
    pub pin_names: Vec<String>,
    pub items: usize,
    pub connectors: usize,
    pub nodes: usize,
}

struct Marker {
    id: Uid,
    x: i32,
    y: i32,
    name: String,
}

/// Build the contents of the sub-circuit `container_id` from `snapshot`.
///
/// Pins are numbered counter-clockwise: markers are split by x into a left
/// half (the larger half for odd counts) and a right half; left pins count
/// up from 0 top to bottom, right pins count down from `n - 1` top to
/// bottom.
pub fn init_external_connections(
    snapshot: &mut DocumentSnapshot,
    document: &mut dyn LiveDocument,
    registry: &ItemRegistry,
    container_id: &Uid,
) -> Result<(ExtractionSummary, Report), ExtractError> {
    container(document, container_id)?;

    let (_, mut report) = regenerate_identifiers(snapshot, document);

    let mut markers: Vec<Marker> = snapshot
        .items
        .iter()
        .filter(|(_, record)| record.is_external_connection())
        .map(|(id, record)| Marker {
            id: id.clone(),
            x: record.x,
            y: record.y,
            name: record.string("name").unwrap_or_default().to_string(),
        })
        .collect();
    markers.sort_by_key(|marker| marker.x);
    let count = markers.len();
    let mut right = markers.split_off(count.div_ceil(2));
    let mut left = markers;
    left.sort_by_key(|marker| marker.y);
    right.sort_by_key(|marker| marker.y);

    let numbered: Vec<(usize, Marker)> = left
        .into_iter()
        .enumerate()
        .chain(
            right
                .into_iter()
                .enumerate()
                .map(|(offset, marker)| (count - 1 - offset, marker)),
        )
        .collect();

    let mut pin_names = vec![String::new(); count];
    {
        let container = container(document, container_id)?;
        container.set_external_connection_count(count);
        for (index, marker) in &numbered {
            container.set_external_connection_name(*index, &marker.name);
            pin_names[*index] = marker.name.clone();
        }
    }
    document.sync_child_nodes(container_id);

    for (_, marker) in &numbered {
        snapshot.items.remove(&marker.id);
    }
    for connector in snapshot.connectors.values_mut() {
        for endpoint in [&mut connector.start, &mut connector.end] {
            let Endpoint::Child { parent, slot } = endpoint else {
                continue;
            };
            if let Some((index, _)) = numbered.iter().find(|(_, marker)| marker.id == *parent) {
                *slot = index.to_string();
                *parent = container_id.clone();
            }
        }
    }

    report.extend(merge_into(snapshot, document, registry, false));

    let mut adopted = Vec::new();
    for id in snapshot.items.keys() {
        if let Some(item) = document.item_mut(id) {
            item.set_parent(Some(container_id.clone()));
            adopted.push(EntityRef::Item(id.clone()));
        }
    }
    let items = adopted.len();
    adopted.extend(
        snapshot
            .connectors
            .keys()
            .filter(|id| document.connector(id).is_some())
            .map(|id| EntityRef::Connector(id.clone())),
    );
    let connectors = adopted.len() - items;
    adopted.extend(
        snapshot
            .nodes
            .keys()
            .filter(|id| document.node(id).is_some())
            .map(|id| EntityRef::Node(id.clone())),
    );
    let nodes = adopted.len() - items - connectors;

    for entity in &adopted {
        document.hide_and_detach(entity);
    }
    let container = container(document, container_id)?;
    for entity in adopted {
        container.adopt(entity);
    }
    container.done_init();

    tracing::info!(
        container = %container_id,
        pins = count,
        items,
        connectors,
        nodes,
        "initialised sub-circuit"
    );
    let summary = ExtractionSummary {
        container: container_id.clone(),
        pin_names,
        items,
        connectors,
        nodes,
    };
    Ok((summary, report))
}

fn container<'a>(
    document: &'a mut dyn LiveDocument,
    id: &Uid,
) -> Result<&'a mut dyn SubcircuitContainer, ExtractError> {
    document
        .item_mut(id)
        .ok_or_else(|| ExtractError::MissingContainer { id: id.clone() })?
        .as_subcircuit_mut()
        .ok_or_else(|| ExtractError::NotAContainer { id: id.clone() })
}

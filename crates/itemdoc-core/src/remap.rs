//! Identifier regeneration.
//!
//! Pasting or duplicating content must not reuse identifiers already present
//! in the target document. Every key of the snapshot is replaced by one the
//! document mints, and all references inside the snapshot follow.

use std::collections::BTreeMap;
use std::mem;

use itemdoc_model::{DocumentSnapshot, Endpoint, IssueKind, Report, Uid};

use crate::live::LiveDocument;

/// Old identifier to new identifier.
pub type Substitutions = BTreeMap<Uid, Uid>;

/// Replace every identifier in `snapshot` with a fresh one from `document`.
///
/// One table is shared by the three maps, so an identifier used as both an
/// item and a node key gets a single replacement. The empty identifier maps
/// to itself. References to identifiers the snapshot does not contain are
/// cleared and reported.
pub fn regenerate_identifiers(
    snapshot: &mut DocumentSnapshot,
    document: &mut dyn LiveDocument,
) -> (Substitutions, Report) {
    let mut report = Report::new();
    let mut table = Substitutions::new();

    let keys: Vec<Uid> = snapshot
        .items
        .keys()
        .chain(snapshot.nodes.keys())
        .chain(snapshot.connectors.keys())
        .cloned()
        .collect();
    for old in keys {
        if old.is_empty() || table.contains_key(&old) {
            continue;
        }
        let new = document.generate_uid(old.as_str());
        table.insert(old, new);
    }

    let items = mem::take(&mut snapshot.items);
    for (id, mut item) in items {
        if let Some(parent) = item.parent_id.take() {
            let parent = substitute(&table, &parent, &id, &mut report);
            item.set_parent(Some(parent));
        }
        snapshot.items.insert(image(&table, &id), item);
    }

    let nodes = mem::take(&mut snapshot.nodes);
    snapshot.nodes = nodes
        .into_iter()
        .map(|(id, node)| (image(&table, &id), node))
        .collect();

    let connectors = mem::take(&mut snapshot.connectors);
    for (id, mut connector) in connectors {
        connector.start = substitute_endpoint(&table, connector.start, &id, &mut report);
        connector.end = substitute_endpoint(&table, connector.end, &id, &mut report);
        snapshot.connectors.insert(image(&table, &id), connector);
    }

    tracing::debug!(replaced = table.len(), "regenerated identifiers");
    (table, report)
}

fn image(table: &Substitutions, id: &Uid) -> Uid {
    table.get(id).cloned().unwrap_or_else(|| id.clone())
}

fn substitute(table: &Substitutions, reference: &Uid, owner: &Uid, report: &mut Report) -> Uid {
    if reference.is_empty() {
        return Uid::empty();
    }
    match table.get(reference) {
        Some(new) => new.clone(),
        None => {
            report.warn(
                IssueKind::DanglingReference,
                Some(owner.as_str()),
                format!("{owner} refers to {reference}, which is not part of the snapshot; cleared"),
            );
            Uid::empty()
        }
    }
}

fn substitute_endpoint(
    table: &Substitutions,
    endpoint: Endpoint,
    owner: &Uid,
    report: &mut Report,
) -> Endpoint {
    match endpoint {
        Endpoint::Node(id) => Endpoint::Node(substitute(table, &id, owner, report)),
        Endpoint::Child { parent, slot } => Endpoint::Child {
            parent: substitute(table, &parent, owner, report),
            slot,
        },
    }
}

#[cfg(test)]
mod tests {
    use itemdoc_model::{ConnectorRecord, DocumentKind, ItemRecord, NodeRecord};

    use super::*;
    use crate::headless::HeadlessDocument;

    fn sample() -> DocumentSnapshot {
        let mut snapshot = DocumentSnapshot::new(DocumentKind::Circuit);
        snapshot
            .items
            .insert(Uid::from("box"), ItemRecord::new("dp/rect", 0, 0));
        snapshot.items.insert(
            Uid::from("label"),
            ItemRecord::new("dp/text", 0, 0).with_parent("box"),
        );
        snapshot.nodes.insert(Uid::from("j"), NodeRecord::new(1, 1));
        snapshot.connectors.insert(
            Uid::from("w"),
            ConnectorRecord::new(Endpoint::node("j"), Endpoint::child("box", "p1")),
        );
        snapshot
    }

    #[test]
    fn references_follow_their_image() {
        let mut doc = HeadlessDocument::new(DocumentKind::Circuit);
        let mut snapshot = sample();
        let (table, report) = regenerate_identifiers(&mut snapshot, &mut doc);

        assert!(report.is_empty());
        assert_eq!(table.len(), 4);
        let label = &snapshot.items[&table[&Uid::from("label")]];
        assert_eq!(label.parent_id.as_ref(), Some(&table[&Uid::from("box")]));

        let wire = &snapshot.connectors[&table[&Uid::from("w")]];
        assert_eq!(wire.start, Endpoint::Node(table[&Uid::from("j")].clone()));
        assert_eq!(
            wire.end,
            Endpoint::Child {
                parent: table[&Uid::from("box")].clone(),
                slot: "p1".to_string()
            }
        );
    }

    #[test]
    fn dangling_references_are_cleared() {
        let mut doc = HeadlessDocument::new(DocumentKind::Circuit);
        let mut snapshot = DocumentSnapshot::new(DocumentKind::Circuit);
        snapshot.items.insert(
            Uid::from("orphan"),
            ItemRecord::new("dp/text", 0, 0).with_parent("gone"),
        );
        snapshot.connectors.insert(
            Uid::from("w"),
            ConnectorRecord::new(Endpoint::node("nowhere"), Endpoint::node("")),
        );

        let (table, report) = regenerate_identifiers(&mut snapshot, &mut doc);
        assert_eq!(report.count_of(IssueKind::DanglingReference), 2);

        let orphan = &snapshot.items[&table[&Uid::from("orphan")]];
        assert_eq!(orphan.parent_id, None);
        let wire = &snapshot.connectors[&table[&Uid::from("w")]];
        assert_eq!(wire.start, Endpoint::node(""));
        assert_eq!(wire.end, Endpoint::node(""));
    }

    #[test]
    fn two_calls_give_unrelated_numberings() {
        let mut doc = HeadlessDocument::new(DocumentKind::Circuit);
        let mut snapshot = sample();
        let (first, _) = regenerate_identifiers(&mut snapshot, &mut doc);
        let (second, _) = regenerate_identifiers(&mut snapshot, &mut doc);

        for new in first.values() {
            assert!(second.contains_key(new));
            assert!(!second.values().any(|again| again == new));
        }
    }
}

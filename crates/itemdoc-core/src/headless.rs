//! In-memory live document.
//!
//! [`HeadlessDocument`] implements [`LiveDocument`] without a canvas. Each
//! namespace (items, nodes, connectors) is one map, so the identifiers the
//! document knows are exactly the keys of those maps. Items are usually
//! [`GenericItem`]s, which store their property bag verbatim.

use std::collections::{BTreeMap, BTreeSet};

use itemdoc_model::{
    Capability, ConnectorRecord, DocumentKind, DocumentSnapshot, EntityRef, Endpoint, ItemRecord,
    MicroRecord, NodeRecord, Point, Uid,
};

use crate::live::{
    ConnectorView, Item, LiveDocument, LiveError, NodeView, SubcircuitContainer,
};
use crate::registry::ItemRegistry;

/// Item type of sub-circuit containers built by [`GenericItem::subcircuit`].
pub const SUBCIRCUIT_TYPE: &str = "ec/subcircuit";

/// Pin and ownership state of a sub-circuit container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubcircuitState {
    pin_names: Vec<String>,
    owned: Vec<EntityRef>,
    initialised: bool,
}

impl SubcircuitContainer for SubcircuitState {
    fn set_external_connection_count(&mut self, count: usize) {
        self.pin_names.resize(count, String::new());
    }

    fn set_external_connection_name(&mut self, index: usize, name: &str) {
        if let Some(slot) = self.pin_names.get_mut(index) {
            *slot = name.to_string();
        }
    }

    fn external_connection_names(&self) -> &[String] {
        &self.pin_names
    }

    fn adopt(&mut self, entity: EntityRef) {
        self.owned.push(entity);
    }

    fn owned_children(&self) -> &[EntityRef] {
        &self.owned
    }

    fn done_init(&mut self) {
        self.initialised = true;
    }

    fn is_initialised(&self) -> bool {
        self.initialised
    }
}

/// An item that keeps its property bag as is.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericItem {
    id: Uid,
    record: ItemRecord,
    slots: Vec<String>,
    visible: bool,
    on_canvas: bool,
    created: bool,
    valid: bool,
    subcircuit: Option<SubcircuitState>,
}

impl GenericItem {
    pub fn new(id: Uid, item_type: &str) -> Self {
        Self {
            id,
            record: ItemRecord::new(item_type, 0, 0),
            slots: Vec::new(),
            visible: false,
            on_canvas: true,
            created: false,
            valid: true,
            subcircuit: None,
        }
    }

    /// A sub-circuit container; its slots are its external pins.
    pub fn subcircuit(id: Uid) -> Self {
        Self {
            subcircuit: Some(SubcircuitState::default()),
            ..Self::new(id, SUBCIRCUIT_TYPE)
        }
    }

    #[must_use]
    pub fn with_slots<I, S>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slots = slots.into_iter().map(Into::into).collect();
        self
    }

    /// An item the document will refuse.
    #[must_use]
    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }

    pub fn record(&self) -> &ItemRecord {
        &self.record
    }

    /// Whether [`Item::finish_creation`] has run.
    pub fn is_created(&self) -> bool {
        self.created
    }
}

impl Item for GenericItem {
    fn id(&self) -> &Uid {
        &self.id
    }

    fn item_type(&self) -> &str {
        &self.record.item_type
    }

    fn item_data(&self) -> ItemRecord {
        self.record.clone()
    }

    fn restore_from_item_data(&mut self, record: &ItemRecord) {
        let item_type = std::mem::take(&mut self.record.item_type);
        self.record = ItemRecord {
            item_type,
            ..record.clone()
        };
        let parent = self.record.parent_id.take();
        self.record.set_parent(parent);
    }

    fn move_to(&mut self, x: i32, y: i32) {
        self.record.x = x;
        self.record.y = y;
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn finish_creation(&mut self) {
        self.created = true;
    }

    fn is_on_canvas(&self) -> bool {
        self.on_canvas
    }

    fn set_on_canvas(&mut self, on_canvas: bool) {
        self.on_canvas = on_canvas;
    }

    fn set_parent(&mut self, parent: Option<Uid>) {
        self.record.set_parent(parent);
    }

    fn child_slots(&self) -> Vec<String> {
        match &self.subcircuit {
            Some(state) => (0..state.pin_names.len()).map(|pin| pin.to_string()).collect(),
            None => self.slots.clone(),
        }
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn as_subcircuit(&self) -> Option<&dyn SubcircuitContainer> {
        self.subcircuit
            .as_ref()
            .map(|state| state as &dyn SubcircuitContainer)
    }

    fn as_subcircuit_mut(&mut self) -> Option<&mut dyn SubcircuitContainer> {
        self.subcircuit
            .as_mut()
            .map(|state| state as &mut dyn SubcircuitContainer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChildSlot {
    item: Uid,
    slot: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LiveNode {
    position: NodeRecord,
    capability: Capability,
    owner: Option<ChildSlot>,
    visible: bool,
    on_canvas: bool,
}

/// Endpoints and flavor of a live connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorEnds {
    pub start: Uid,
    pub end: Uid,
    pub capability: Capability,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LiveConnector {
    ends: ConnectorEnds,
    manual_route: bool,
    route: Vec<Point>,
    visible: bool,
    on_canvas: bool,
}

/// A live document held entirely in memory.
pub struct HeadlessDocument {
    kind: DocumentKind,
    items: BTreeMap<Uid, Box<dyn Item>>,
    nodes: BTreeMap<Uid, LiveNode>,
    connectors: BTreeMap<Uid, LiveConnector>,
    micro: Option<MicroRecord>,
    selection: BTreeSet<EntityRef>,
    delete_list: Vec<EntityRef>,
    uid_counter: u64,
}

impl HeadlessDocument {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            items: BTreeMap::new(),
            nodes: BTreeMap::new(),
            connectors: BTreeMap::new(),
            micro: None,
            selection: BTreeSet::new(),
            delete_list: Vec::new(),
            uid_counter: 0,
        }
    }

    pub fn selection(&self) -> &BTreeSet<EntityRef> {
        &self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Entities removed since the last [`LiveDocument::flush_delete_list`].
    pub fn pending_deletions(&self) -> &[EntityRef] {
        &self.delete_list
    }

    pub fn connector_ends(&self, id: &Uid) -> Option<&ConnectorEnds> {
        self.connectors.get(id).map(|connector| &connector.ends)
    }

    /// Flow connectors entering `node`.
    pub fn flow_inputs(&self, node: &Uid) -> Vec<Uid> {
        self.flow_connectors(|ends| ends.end == *node)
    }

    /// Flow connectors leaving `node`.
    pub fn flow_outputs(&self, node: &Uid) -> Vec<Uid> {
        self.flow_connectors(|ends| ends.start == *node)
    }

    /// Connectors attached to `node` at either end.
    pub fn attached_connectors(&self, node: &Uid) -> Vec<Uid> {
        self.connectors
            .iter()
            .filter(|(_, connector)| connector.ends.start == *node || connector.ends.end == *node)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn is_node_visible(&self, id: &Uid) -> bool {
        self.nodes.get(id).is_some_and(|node| node.visible)
    }

    pub fn is_connector_visible(&self, id: &Uid) -> bool {
        self.connectors
            .get(id)
            .is_some_and(|connector| connector.visible)
    }

    fn flow_connectors(&self, matches: impl Fn(&ConnectorEnds) -> bool) -> Vec<Uid> {
        self.connectors
            .iter()
            .filter(|(_, connector)| {
                connector.ends.capability == Capability::Flow && matches(&connector.ends)
            })
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Whether `id` is taken in any namespace. Only [`LiveDocument::generate_uid`]
    /// asks this; creation checks its own namespace.
    fn is_used(&self, id: &str) -> bool {
        self.items.contains_key(id) || self.nodes.contains_key(id) || self.connectors.contains_key(id)
    }

    fn child_nodes_of(&self, item: &Uid) -> Vec<Uid> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.owner.as_ref().is_some_and(|owner| owner.item == *item))
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn endpoint_of(&self, node: &Uid) -> Option<Endpoint> {
        let live = self.nodes.get(node)?;
        Some(match &live.owner {
            Some(owner) => Endpoint::child(owner.item.clone(), owner.slot.clone()),
            None => Endpoint::Node(node.clone()),
        })
    }

    fn remove_entity(&mut self, entity: &EntityRef) {
        match entity {
            EntityRef::Item(id) => self.remove_item(id),
            EntityRef::Node(id) => self.remove_node(id),
            EntityRef::Connector(id) => self.remove_connector(id),
        }
    }
}

impl LiveDocument for HeadlessDocument {
    fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Identifiers take the form `base__N`, where `base` is the seed with
    /// any previous `__N` suffix removed.
    fn generate_uid(&mut self, seed: &str) -> Uid {
        let base = match seed.rsplit_once("__") {
            Some((base, suffix))
                if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) =>
            {
                base
            }
            _ => seed,
        };
        let base = if base.is_empty() { "id" } else { base };
        loop {
            self.uid_counter += 1;
            let candidate = format!("{base}__{}", self.uid_counter);
            if !self.is_used(&candidate) {
                return Uid::from(candidate);
            }
        }
    }

    fn select(&mut self, entity: EntityRef) {
        let exists = match &entity {
            EntityRef::Item(id) => self.items.contains_key(id),
            EntityRef::Node(id) => self.nodes.contains_key(id),
            EntityRef::Connector(id) => self.connectors.contains_key(id),
        };
        if exists {
            self.selection.insert(entity);
        }
    }

    fn flush_delete_list(&mut self) {
        if !self.delete_list.is_empty() {
            tracing::debug!(count = self.delete_list.len(), "flushing delete list");
        }
        self.delete_list.clear();
    }

    fn item_ids(&self) -> Vec<Uid> {
        self.items.keys().cloned().collect()
    }

    fn item(&self, id: &Uid) -> Option<&dyn Item> {
        Some(self.items.get(id)?.as_ref())
    }

    fn item_mut(&mut self, id: &Uid) -> Option<&mut dyn Item> {
        match self.items.get_mut(id) {
            Some(item) => Some(item.as_mut()),
            None => None,
        }
    }

    fn add_item(&mut self, item: Box<dyn Item>) -> Result<(), LiveError> {
        let id = item.id().clone();
        if self.items.contains_key(&id) {
            return Err(LiveError::DuplicateId { id });
        }
        if !item.is_valid() {
            return Err(LiveError::InvalidItem { id });
        }
        self.items.insert(id.clone(), item);
        self.sync_child_nodes(&id);
        Ok(())
    }

    fn remove_item(&mut self, id: &Uid) {
        let Some(item) = self.items.remove(id) else {
            return;
        };
        let owned: Vec<EntityRef> = item
            .as_subcircuit()
            .map(|container| container.owned_children().to_vec())
            .unwrap_or_default();

        for node in self.child_nodes_of(id) {
            self.remove_node(&node);
        }
        let entity = EntityRef::Item(id.clone());
        self.selection.remove(&entity);
        self.delete_list.push(entity);

        for child in &owned {
            self.remove_entity(child);
        }
    }

    fn sync_child_nodes(&mut self, id: &Uid) {
        let Some(capability) = self.kind.capability() else {
            return;
        };
        let Some(item) = self.items.get(id) else {
            return;
        };
        let slots = item.child_slots();
        let record = item.item_data();
        let on_canvas = item.is_on_canvas();
        let visible = item.is_visible();

        for node in self.child_nodes_of(id) {
            let keep = self.nodes[&node]
                .owner
                .as_ref()
                .is_some_and(|owner| slots.contains(&owner.slot));
            if !keep {
                self.remove_node(&node);
            }
        }
        for slot in slots {
            if self.child_node(id, &slot).is_some() {
                continue;
            }
            let node_id = self.generate_uid(&format!("{id}-{slot}"));
            self.nodes.insert(
                node_id,
                LiveNode {
                    position: NodeRecord::new(record.x, record.y),
                    capability,
                    owner: Some(ChildSlot {
                        item: id.clone(),
                        slot,
                    }),
                    visible,
                    on_canvas,
                },
            );
        }
    }

    fn node_ids(&self) -> Vec<Uid> {
        self.nodes.keys().cloned().collect()
    }

    fn node(&self, id: &Uid) -> Option<NodeView> {
        self.nodes.get(id).map(|node| NodeView {
            record: node.position,
            is_child: node.owner.is_some(),
            on_canvas: node.on_canvas,
        })
    }

    fn create_junction(
        &mut self,
        id: &Uid,
        position: NodeRecord,
        capability: Capability,
    ) -> Result<(), LiveError> {
        match self.kind.capability() {
            None => return Err(LiveError::NotGraphCapable { kind: self.kind }),
            Some(own) if own != capability => {
                return Err(LiveError::IncompatibleNode {
                    id: id.clone(),
                    capability,
                });
            }
            Some(_) => {}
        }
        if self.nodes.contains_key(id) {
            return Err(LiveError::DuplicateId { id: id.clone() });
        }
        self.nodes.insert(
            id.clone(),
            LiveNode {
                position,
                capability,
                owner: None,
                visible: true,
                on_canvas: true,
            },
        );
        Ok(())
    }

    fn move_node(&mut self, id: &Uid, x: i32, y: i32) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.position = NodeRecord::new(x, y);
        }
    }

    fn remove_node(&mut self, id: &Uid) {
        if self.nodes.remove(id).is_none() {
            return;
        }
        for connector in self.attached_connectors(id) {
            self.remove_connector(&connector);
        }
        let entity = EntityRef::Node(id.clone());
        self.selection.remove(&entity);
        self.delete_list.push(entity);
    }

    fn child_node(&self, parent: &Uid, slot: &str) -> Option<Uid> {
        self.nodes
            .iter()
            .find(|(_, node)| {
                node.owner
                    .as_ref()
                    .is_some_and(|owner| owner.item == *parent && owner.slot == slot)
            })
            .map(|(id, _)| id.clone())
    }

    fn connector_ids(&self) -> Vec<Uid> {
        self.connectors.keys().cloned().collect()
    }

    fn connector(&self, id: &Uid) -> Option<ConnectorView> {
        let connector = self.connectors.get(id)?;
        let record = match (
            self.endpoint_of(&connector.ends.start),
            self.endpoint_of(&connector.ends.end),
        ) {
            (Some(start), Some(end)) => Some(ConnectorRecord {
                manual_route: connector.manual_route,
                route: connector.route.clone(),
                start,
                end,
            }),
            _ => None,
        };
        Some(ConnectorView {
            record,
            on_canvas: connector.on_canvas,
        })
    }

    fn create_connector(
        &mut self,
        id: &Uid,
        start: &Uid,
        end: &Uid,
        capability: Capability,
    ) -> Result<(), LiveError> {
        if self.connectors.contains_key(id) {
            return Err(LiveError::DuplicateId { id: id.clone() });
        }
        for node_id in [start, end] {
            let node = self
                .nodes
                .get(node_id)
                .ok_or_else(|| LiveError::UnknownNode { id: node_id.clone() })?;
            if node.capability != capability {
                return Err(LiveError::IncompatibleNode {
                    id: node_id.clone(),
                    capability,
                });
            }
        }
        self.connectors.insert(
            id.clone(),
            LiveConnector {
                ends: ConnectorEnds {
                    start: start.clone(),
                    end: end.clone(),
                    capability,
                },
                manual_route: false,
                route: Vec::new(),
                visible: true,
                on_canvas: true,
            },
        );
        Ok(())
    }

    fn restore_connector(&mut self, id: &Uid, record: &ConnectorRecord) {
        if let Some(connector) = self.connectors.get_mut(id) {
            connector.manual_route = record.manual_route;
            connector.route = record.route.clone();
        }
    }

    fn remove_connector(&mut self, id: &Uid) {
        if self.connectors.remove(id).is_none() {
            return;
        }
        let entity = EntityRef::Connector(id.clone());
        self.selection.remove(&entity);
        self.delete_list.push(entity);
    }

    fn hide_and_detach(&mut self, entity: &EntityRef) {
        match entity {
            EntityRef::Item(id) => {
                if let Some(item) = self.items.get_mut(id) {
                    item.hide();
                    item.set_on_canvas(false);
                }
                for node in self.child_nodes_of(id) {
                    self.hide_and_detach(&EntityRef::Node(node));
                }
            }
            EntityRef::Node(id) => {
                if let Some(node) = self.nodes.get_mut(id) {
                    node.visible = false;
                    node.on_canvas = false;
                }
            }
            EntityRef::Connector(id) => {
                if let Some(connector) = self.connectors.get_mut(id) {
                    connector.visible = false;
                    connector.on_canvas = false;
                }
            }
        }
        self.selection.remove(entity);
    }

    fn micro_settings(&self) -> Option<MicroRecord> {
        match self.kind {
            DocumentKind::FlowCode => self.micro.clone(),
            _ => None,
        }
    }

    fn restore_micro(&mut self, micro: &MicroRecord) {
        self.micro = Some(micro.clone());
    }

    /// Child nodes follow the visibility and canvas presence of their item.
    fn refresh_containers(&mut self) {
        for node in self.nodes.values_mut() {
            let Some(owner) = &node.owner else {
                continue;
            };
            if let Some(item) = self.items.get(&owner.item) {
                node.visible = item.is_visible();
                node.on_canvas = item.is_on_canvas();
            }
        }
    }
}

/// A registry able to build every item type a snapshot uses.
///
/// Each type gets [`GenericItem`]s whose slots are the union of the child
/// slots that connectors in `snapshot` reference on items of that type.
/// [`SUBCIRCUIT_TYPE`] builds sub-circuit containers.
pub fn registry_for(snapshot: &DocumentSnapshot) -> ItemRegistry {
    let mut slots: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for connector in snapshot.connectors.values() {
        for endpoint in [&connector.start, &connector.end] {
            if let Endpoint::Child { parent, slot } = endpoint
                && let Some(item) = snapshot.items.get(parent)
            {
                slots
                    .entry(item.item_type.clone())
                    .or_default()
                    .insert(slot.clone());
            }
        }
    }

    let mut registry = ItemRegistry::new();
    registry.register(SUBCIRCUIT_TYPE, |id| Box::new(GenericItem::subcircuit(id.clone())));
    registry.with_fallback(move |id, item_type| {
        let item = GenericItem::new(id.clone(), item_type);
        Box::new(match slots.get(item_type) {
            Some(names) => item.with_slots(names.iter().cloned()),
            None => item,
        })
    })
}

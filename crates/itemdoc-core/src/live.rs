//! The interface a live document exposes to the persistence core.
//!
//! Everything the core does to a document goes through [`LiveDocument`]:
//! lookups by identifier, creation and removal of items, nodes and
//! connectors, and identifier generation. Items are trait objects built by
//! an [`crate::ItemRegistry`].

use itemdoc_model::{
    Capability, ConnectorRecord, DocumentKind, EntityRef, ItemRecord, MicroRecord, NodeRecord, Uid,
};
use thiserror::Error;

/// Failure of a single live-document mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiveError {
    #[error("identifier {id} is already in use")]
    DuplicateId { id: Uid },

    #[error("item {id} is not valid in this document")]
    InvalidItem { id: Uid },

    #[error("node {id} does not exist")]
    UnknownNode { id: Uid },

    #[error("node {id} cannot carry {capability:?} connections")]
    IncompatibleNode { id: Uid, capability: Capability },

    #[error("{kind} documents have no nodes or connectors")]
    NotGraphCapable { kind: DocumentKind },
}

/// A placeable element of a document.
pub trait Item {
    fn id(&self) -> &Uid;

    fn item_type(&self) -> &str;

    /// Describe the item as a property bag.
    fn item_data(&self) -> ItemRecord;

    /// Apply a property bag: position, stacking, size, orientation, parent
    /// and every property map.
    fn restore_from_item_data(&mut self, record: &ItemRecord);

    fn move_to(&mut self, x: i32, y: i32);

    fn show(&mut self);

    fn hide(&mut self);

    fn is_visible(&self) -> bool;

    /// Called once all properties of a newly merged item are set.
    fn finish_creation(&mut self);

    fn is_on_canvas(&self) -> bool;

    fn set_on_canvas(&mut self, on_canvas: bool);

    fn set_parent(&mut self, parent: Option<Uid>);

    /// Names of the connection points the item owns, in order.
    fn child_slots(&self) -> Vec<String> {
        Vec::new()
    }

    /// Items the document must refuse report `false`.
    fn is_valid(&self) -> bool {
        true
    }

    fn as_subcircuit(&self) -> Option<&dyn SubcircuitContainer> {
        None
    }

    fn as_subcircuit_mut(&mut self) -> Option<&mut dyn SubcircuitContainer> {
        None
    }
}

/// An item that encloses an extracted region of another document.
pub trait SubcircuitContainer {
    /// Resize the external pin list; pins are the slots `"0"`, `"1"`, ...
    fn set_external_connection_count(&mut self, count: usize);

    fn set_external_connection_name(&mut self, index: usize, name: &str);

    fn external_connection_names(&self) -> &[String];

    /// Take ownership of a hidden entity; it is removed with the container.
    fn adopt(&mut self, entity: EntityRef);

    fn owned_children(&self) -> &[EntityRef];

    fn done_init(&mut self);

    fn is_initialised(&self) -> bool;
}

/// Read-only view of a live node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeView {
    pub record: NodeRecord,
    /// Owned by an item as one of its connection points.
    pub is_child: bool,
    pub on_canvas: bool,
}

/// Read-only view of a live connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorView {
    /// `None` while either end node is missing.
    pub record: Option<ConnectorRecord>,
    pub on_canvas: bool,
}

/// A document holding items, nodes and connectors.
pub trait LiveDocument {
    fn kind(&self) -> DocumentKind;

    /// Mint an identifier not used by any entity, derived from `seed`.
    fn generate_uid(&mut self, seed: &str) -> Uid;

    fn select(&mut self, entity: EntityRef);

    /// Drop everything removed since the last flush.
    fn flush_delete_list(&mut self);

    fn item_ids(&self) -> Vec<Uid>;

    fn item(&self, id: &Uid) -> Option<&dyn Item>;

    fn item_mut(&mut self, id: &Uid) -> Option<&mut dyn Item>;

    /// Register a constructed item, creating its child nodes. Rejected items
    /// are dropped.
    fn add_item(&mut self, item: Box<dyn Item>) -> Result<(), LiveError>;

    /// Remove an item together with its child nodes, their connectors and,
    /// for containers, everything the container owns.
    fn remove_item(&mut self, id: &Uid);

    /// Bring the child nodes of an item in line with its current slots.
    fn sync_child_nodes(&mut self, id: &Uid);

    fn node_ids(&self) -> Vec<Uid>;

    fn node(&self, id: &Uid) -> Option<NodeView>;

    /// Create a free-standing junction of the given flavor.
    fn create_junction(
        &mut self,
        id: &Uid,
        position: NodeRecord,
        capability: Capability,
    ) -> Result<(), LiveError>;

    fn move_node(&mut self, id: &Uid, x: i32, y: i32);

    /// Remove a node and every connector attached to it.
    fn remove_node(&mut self, id: &Uid);

    /// The node an item owns at `slot`.
    fn child_node(&self, parent: &Uid, slot: &str) -> Option<Uid>;

    fn connector_ids(&self) -> Vec<Uid>;

    fn connector(&self, id: &Uid) -> Option<ConnectorView>;

    /// Create a connector between two live nodes. Electronic connectors are
    /// attached to both nodes; flow connectors leave `start` and enter `end`.
    fn create_connector(
        &mut self,
        id: &Uid,
        start: &Uid,
        end: &Uid,
        capability: Capability,
    ) -> Result<(), LiveError>;

    /// Apply routing state from a record.
    fn restore_connector(&mut self, id: &Uid, record: &ConnectorRecord);

    fn remove_connector(&mut self, id: &Uid);

    /// Hide an entity and take it off the canvas without deleting it.
    fn hide_and_detach(&mut self, entity: &EntityRef);

    fn micro_settings(&self) -> Option<MicroRecord>;

    fn restore_micro(&mut self, micro: &MicroRecord);

    /// Recompute container grouping state after a merge.
    fn refresh_containers(&mut self);
}

//! Data model for item documents: entity records, property codecs and the
//! document snapshot.
//!
//! A snapshot owns three identifier-keyed maps (items, connectors, nodes)
//! plus the optional microcontroller settings of flow-code documents. It is
//! the intermediate form between a live document and its XML text.

pub mod codec;
pub mod ids;
pub mod records;
pub mod report;
pub mod snapshot;

pub use codec::{Bits, Color};
pub use ids::{EntityRef, Uid};
pub use records::{
    ConnectorRecord, DEFAULT_ITEM_POSITION, DEFAULT_ITEM_SIZE, EXTERNAL_CONNECTION_TYPE, Endpoint,
    ItemRecord, MICRO_ITEM_TYPE, MicroRecord, NodeRecord, Orientation, PinDirection, PinMapping,
    PinMappingType, PinRecord, PinState, Point, Rect,
};
pub use report::{Issue, IssueKind, IssueSeverity, Report};
pub use snapshot::{Capability, DocumentKind, DocumentSnapshot, ROUTE_SCALE};

//! Moving item documents between their live and snapshot forms.
//!
//! - [`capture`]: live document to snapshot
//! - [`merge`]: snapshot into a live document, or a full restore
//! - [`remap`]: fresh identifiers for pasted or duplicated content
//! - [`subcircuit`]: promoting a drawn region into a sub-circuit
//!
//! Live documents are reached only through the [`LiveDocument`] trait; the
//! [`headless`] module provides an in-memory implementation.

pub mod capture;
pub mod headless;
pub mod live;
pub mod merge;
pub mod registry;
pub mod remap;
pub mod subcircuit;

pub use capture::{capture, capture_from};
pub use headless::{GenericItem, HeadlessDocument, SUBCIRCUIT_TYPE, registry_for};
pub use live::{ConnectorView, Item, LiveDocument, LiveError, NodeView, SubcircuitContainer};
pub use merge::{merge_into, restore_document};
pub use registry::ItemRegistry;
pub use remap::{Substitutions, regenerate_identifiers};
pub use subcircuit::{ExtractError, ExtractionSummary, init_external_connections};

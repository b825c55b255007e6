//! Passive value records exchanged between live documents and snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::{Bits, Color};
use crate::ids::Uid;

/// Item type of the microcontroller placement item. It is described by the
/// [`MicroRecord`] rather than stored as an ordinary item.
pub const MICRO_ITEM_TYPE: &str = "microitem";

/// Item type of the boundary markers used when promoting a region to a
/// sub-circuit.
pub const EXTERNAL_CONNECTION_TYPE: &str = "ec/external_connection";

/// Item position used when an item element carries no coordinates.
pub const DEFAULT_ITEM_POSITION: i32 = 120;

/// Size used when a bounding rectangle is declared without one dimension.
pub const DEFAULT_ITEM_SIZE: i32 = 120;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinates wrap on overflow.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.wrapping_add(dx), self.y.wrapping_add(dy))
    }
}

/// Explicitly set item bounds, relative to the item position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// How an item is oriented.
///
/// Items placed by a flow container carry a fixed orientation index and
/// ignore angle and flip. Everything else is rotated freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Fixed(u32),
    Free { angle_degrees: i32, flipped: bool },
}

impl Default for Orientation {
    fn default() -> Self {
        Self::Free {
            angle_degrees: 0,
            flipped: false,
        }
    }
}

impl Orientation {
    /// Combine the three stored attributes; a negative orientation selects
    /// angle and flip.
    pub fn from_parts(orientation: i32, angle_degrees: i32, flipped: bool) -> Self {
        match u32::try_from(orientation) {
            Ok(index) => Self::Fixed(index),
            Err(_) => Self::Free {
                angle_degrees,
                flipped,
            },
        }
    }
}

/// Flat property bag describing one item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(rename = "type")]
    pub item_type: String,
    pub x: i32,
    pub y: i32,
    pub z: Option<i32>,
    pub size: Option<Rect>,
    pub orientation: Orientation,
    pub parent_id: Option<Uid>,
    pub data_string: BTreeMap<String, String>,
    pub data_number: BTreeMap<String, f64>,
    pub data_color: BTreeMap<String, Color>,
    pub data_bool: BTreeMap<String, bool>,
    pub data_raw: BTreeMap<String, Bits>,
    /// Transient widget state, kept apart from configuration.
    pub buttons: BTreeMap<String, bool>,
    pub sliders: BTreeMap<String, i32>,
}

impl ItemRecord {
    pub fn new(item_type: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            item_type: item_type.into(),
            x,
            y,
            ..Self::default()
        }
    }

    /// An empty identifier clears the parent.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<Uid>) -> Self {
        self.set_parent(Some(parent.into()));
        self
    }

    /// Set or clear the parent; `Some` of an empty identifier clears it.
    pub fn set_parent(&mut self, parent: Option<Uid>) {
        self.parent_id = parent.filter(|parent| !parent.is_empty());
    }

    #[must_use]
    pub fn with_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data_string.insert(key.into(), value.into());
        self
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.data_string.get(key).map(String::as_str)
    }

    pub fn is_external_connection(&self) -> bool {
        self.item_type == EXTERNAL_CONNECTION_TYPE
    }

    pub fn is_micro_item(&self) -> bool {
        self.item_type == MICRO_ITEM_TYPE
    }
}

/// One end of a connector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// A free-standing node, resolved against the node map.
    Node(Uid),
    /// A numbered connection point owned by an item.
    Child { parent: Uid, slot: String },
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::Node(Uid::empty())
    }
}

impl Endpoint {
    pub fn node(id: impl Into<Uid>) -> Self {
        Self::Node(id.into())
    }

    pub fn child(parent: impl Into<Uid>, slot: impl Into<String>) -> Self {
        Self::Child {
            parent: parent.into(),
            slot: slot.into(),
        }
    }

    pub fn is_child(&self) -> bool {
        matches!(self, Self::Child { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorRecord {
    pub manual_route: bool,
    pub route: Vec<Point>,
    pub start: Endpoint,
    pub end: Endpoint,
}

impl ConnectorRecord {
    pub fn new(start: Endpoint, end: Endpoint) -> Self {
        Self {
            start,
            end,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_route(mut self, route: Vec<Point>) -> Self {
        self.route = route;
        self
    }
}

/// A free-standing junction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRecord {
    pub x: i32,
    pub y: i32,
}

impl NodeRecord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    #[default]
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinState {
    #[default]
    Off,
    On,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinRecord {
    pub direction: PinDirection,
    pub state: PinState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinMappingType {
    SevenSegment,
    Keypad4x3,
    Keypad4x4,
    #[default]
    Invalid,
}

impl PinMappingType {
    /// Attribute text; empty for [`PinMappingType::Invalid`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SevenSegment => "sevensegment",
            Self::Keypad4x3 => "keypad_4x3",
            Self::Keypad4x4 => "keypad_4x4",
            Self::Invalid => "",
        }
    }

    /// Unknown type names map to [`PinMappingType::Invalid`].
    pub fn parse(text: &str) -> Self {
        match text {
            "sevensegment" => Self::SevenSegment,
            "keypad_4x3" => Self::Keypad4x3,
            "keypad_4x4" => Self::Keypad4x4,
            _ => Self::Invalid,
        }
    }
}

/// Assignment of a device (display, keypad) to microcontroller pins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinMapping {
    #[serde(rename = "type")]
    pub mapping_type: PinMappingType,
    pub pins: Vec<String>,
}

impl PinMapping {
    pub fn new(mapping_type: PinMappingType, pins: Vec<String>) -> Self {
        Self { mapping_type, pins }
    }
}

/// Microcontroller settings of a flow-code document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroRecord {
    pub id: String,
    pub pins: BTreeMap<String, PinRecord>,
    pub pin_mappings: BTreeMap<String, PinMapping>,
    pub variables: BTreeMap<String, String>,
}

impl MicroRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_parent_is_no_parent() {
        assert_eq!(ItemRecord::new("dp/text", 0, 0).with_parent("").parent_id, None);
        let mut record = ItemRecord::new("dp/text", 0, 0).with_parent("box");
        assert_eq!(record.parent_id, Some(Uid::from("box")));
        record.set_parent(Some(Uid::empty()));
        assert_eq!(record.parent_id, None);
    }

    #[test]
    fn orientation_sign_convention() {
        assert_eq!(Orientation::from_parts(2, 90, true), Orientation::Fixed(2));
        assert_eq!(
            Orientation::from_parts(-1, 90, true),
            Orientation::Free {
                angle_degrees: 90,
                flipped: true
            }
        );
    }

    #[test]
    fn pin_mapping_type_names() {
        for mapping_type in [
            PinMappingType::SevenSegment,
            PinMappingType::Keypad4x3,
            PinMappingType::Keypad4x4,
        ] {
            assert_eq!(PinMappingType::parse(mapping_type.as_str()), mapping_type);
        }
        assert_eq!(PinMappingType::parse("lcd"), PinMappingType::Invalid);
    }

    #[test]
    fn default_endpoint_is_unresolved_plain_node() {
        assert_eq!(Endpoint::default(), Endpoint::Node(Uid::empty()));
        assert!(Endpoint::child("ic1", "3").is_child());
    }
}

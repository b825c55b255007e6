use std::borrow::Borrow;
use std::fmt;

/// Opaque identifier of an item, node or connector.
///
/// Identifiers are unique within their own namespace only; an item and a
/// node may share the same text. The empty identifier stands for "no
/// reference" and is never minted for a live entity.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The "no reference" identifier.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Uid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for Uid {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reference to a live entity in one of the three namespaces.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum EntityRef {
    Item(Uid),
    Node(Uid),
    Connector(Uid),
}

impl EntityRef {
    pub fn id(&self) -> &Uid {
        match self {
            Self::Item(id) | Self::Node(id) | Self::Connector(id) => id,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(id) => write!(f, "item {id}"),
            Self::Node(id) => write!(f, "node {id}"),
            Self::Connector(id) => write!(f, "connector {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn uid_lookup_by_str() {
        let mut map = BTreeMap::new();
        map.insert(Uid::new("resistor__1"), 1);
        assert_eq!(map.get("resistor__1"), Some(&1));
        assert!(Uid::empty().is_empty());
    }

    #[test]
    fn entity_ref_display() {
        assert_eq!(EntityRef::Node(Uid::from("n1")).to_string(), "node n1");
    }
}

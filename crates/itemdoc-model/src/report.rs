//! Unit-level problems found while parsing, capturing or merging.
//!
//! None of these abort an operation: the offending element, item or
//! connector is skipped, the issue is logged through `tracing` and recorded
//! here so callers can decide whether a partial result is acceptable.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// An element has no `id` attribute.
    MissingId,
    /// An element tag the reader does not know.
    UnknownElement,
    /// A `data` element with an unrecognised value kind.
    UnknownDataType,
    /// The root element names an unknown document type.
    UnknownDocumentType,
    /// An identifier was captured twice; the later value wins.
    DuplicateId,
    /// A reference to an identifier that is not part of the snapshot.
    DanglingReference,
    /// No factory is registered for an item type.
    UnknownItemType,
    /// The live document rejected a constructed item.
    InvalidItem,
    /// A connector endpoint does not resolve to a live node.
    UnresolvedEndpoint,
    /// The live document refused to create a junction.
    NodeRejected,
    /// The live document refused to create a connector.
    ConnectorRejected,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingId => "missing_id",
            Self::UnknownElement => "unknown_element",
            Self::UnknownDataType => "unknown_data_type",
            Self::UnknownDocumentType => "unknown_document_type",
            Self::DuplicateId => "duplicate_id",
            Self::DanglingReference => "dangling_reference",
            Self::UnknownItemType => "unknown_item_type",
            Self::InvalidItem => "invalid_item",
            Self::UnresolvedEndpoint => "unresolved_endpoint",
            Self::NodeRejected => "node_rejected",
            Self::ConnectorRejected => "connector_rejected",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub message: String,
    /// Identifier or tag of the skipped unit, when there is one.
    pub entity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub issues: Vec<Issue>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log an error.
    pub fn error(&mut self, kind: IssueKind, entity: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(issue = %kind, entity = entity.unwrap_or("-"), "{message}");
        self.push(kind, IssueSeverity::Error, entity, message);
    }

    /// Record and log a warning.
    pub fn warn(&mut self, kind: IssueKind, entity: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(issue = %kind, entity = entity.unwrap_or("-"), "{message}");
        self.push(kind, IssueSeverity::Warning, entity, message);
    }

    fn push(
        &mut self,
        kind: IssueKind,
        severity: IssueSeverity,
        entity: Option<&str>,
        message: String,
    ) {
        self.issues.push(Issue {
            kind,
            severity,
            message,
            entity: entity.map(str::to_string),
        });
    }

    pub fn extend(&mut self, other: Report) {
        self.issues.extend(other.issues);
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == IssueSeverity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == IssueSeverity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn count_of(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|issue| issue.kind == kind).count()
    }
}

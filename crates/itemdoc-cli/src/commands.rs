//! Subcommand implementations.
//!
//! Each command loads a document, runs one operation and returns what the
//! binary prints. Issues found along the way are collected into a single
//! [`Report`]; the caller decides the exit code from it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;

use itemdoc_core::{
    ExtractionSummary, HeadlessDocument, LiveDocument, SUBCIRCUIT_TYPE, init_external_connections,
    merge_into, regenerate_identifiers, registry_for,
};
use itemdoc_model::{DocumentKind, DocumentSnapshot, Report};
use itemdoc_xml::{
    Location, RemoteFetcher, WriteOptions, load_snapshot, save_snapshot, to_xml_string,
};

/// A parsed input document.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub source: String,
    pub snapshot: DocumentSnapshot,
    pub report: Report,
}

/// Parse `input`, a local path or a remote URL.
pub fn load(input: &str) -> Result<LoadedDocument> {
    let location = Location::parse(input);
    let fetcher = remote_fetcher(&location)?;
    let outcome = load_snapshot(&location, fetcher.as_ref())
        .with_context(|| format!("failed to load {location}"))?;
    Ok(LoadedDocument {
        source: location.to_string(),
        snapshot: outcome.snapshot,
        report: outcome.report,
    })
}

#[cfg(feature = "remote")]
fn remote_fetcher(location: &Location) -> Result<Box<dyn RemoteFetcher>> {
    if location.is_remote() {
        let fetcher = itemdoc_xml::HttpFetcher::new().context("failed to set up HTTP client")?;
        return Ok(Box::new(fetcher));
    }
    Ok(Box::new(itemdoc_xml::NoRemote))
}

#[cfg(not(feature = "remote"))]
fn remote_fetcher(_location: &Location) -> Result<Box<dyn RemoteFetcher>> {
    Ok(Box::new(itemdoc_xml::NoRemote))
}

/// Where a rewritten document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    File(PathBuf),
    /// Returned as text for the caller to print.
    Stdout,
}

impl Output {
    pub fn from_arg(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::File(path.to_path_buf()),
            None => Self::Stdout,
        }
    }
}

/// Result of a command that rewrites a document.
#[derive(Debug, Clone)]
pub struct RewriteResult {
    pub snapshot: DocumentSnapshot,
    pub report: Report,
    /// Serialized document when writing to stdout.
    pub text: Option<String>,
    pub written: Option<PathBuf>,
}

impl RewriteResult {
    pub fn has_errors(&self) -> bool {
        self.report.has_errors()
    }
}

fn emit(snapshot: DocumentSnapshot, report: Report, output: &Output) -> Result<RewriteResult> {
    let options = WriteOptions::default();
    let (text, written) = match output {
        Output::File(path) => {
            save_snapshot(&snapshot, path, &options)
                .with_context(|| format!("failed to write {}", path.display()))?;
            (None, Some(path.clone()))
        }
        Output::Stdout => (
            Some(to_xml_string(&snapshot, &options).context("failed to serialize document")?),
            None,
        ),
    };
    Ok(RewriteResult {
        snapshot,
        report,
        text,
        written,
    })
}

/// Counts and issues of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectResult {
    pub source: String,
    pub kind: DocumentKind,
    pub items: usize,
    pub connectors: usize,
    pub nodes: usize,
    /// Microcontroller id of flow-code documents.
    pub micro: Option<String>,
    /// Item count per item type.
    pub item_types: BTreeMap<String, usize>,
    pub report: Report,
}

impl InspectResult {
    pub fn has_errors(&self) -> bool {
        self.report.has_errors()
    }
}

pub fn run_inspect(input: &str) -> Result<InspectResult> {
    let loaded = load(input)?;
    Ok(inspect_snapshot(loaded.source, &loaded.snapshot, loaded.report))
}

pub fn inspect_snapshot(source: String, snapshot: &DocumentSnapshot, report: Report) -> InspectResult {
    let mut item_types: BTreeMap<String, usize> = BTreeMap::new();
    for item in snapshot.items.values() {
        *item_types.entry(item.item_type.clone()).or_default() += 1;
    }
    InspectResult {
        source,
        kind: snapshot.kind,
        items: snapshot.items.len(),
        connectors: snapshot.connectors.len(),
        nodes: snapshot.nodes.len(),
        micro: snapshot.micro.as_ref().map(|micro| micro.id.clone()),
        item_types,
        report,
    }
}

/// Parse and write back in canonical form.
pub fn run_normalize(input: &str, output: &Output) -> Result<RewriteResult> {
    let loaded = load(input)?;
    tracing::info!(source = %loaded.source, "normalizing document");
    emit(loaded.snapshot, loaded.report, output)
}

/// Move every item, node and connector waypoint by `(dx, dy)`.
pub fn run_translate(input: &str, dx: i32, dy: i32, output: &Output) -> Result<RewriteResult> {
    let mut loaded = load(input)?;
    tracing::info!(source = %loaded.source, dx, dy, "translating document");
    loaded.snapshot.translate(dx, dy);
    emit(loaded.snapshot, loaded.report, output)
}

/// Give every entity a fresh identifier, as pasting the document into
/// itself would.
pub fn run_renumber(input: &str, output: &Output) -> Result<RewriteResult> {
    let mut loaded = load(input)?;
    let registry = registry_for(&loaded.snapshot);
    let mut document = HeadlessDocument::new(loaded.snapshot.kind);
    let mut report = loaded.report;
    report.extend(merge_into(&loaded.snapshot, &mut document, &registry, false));

    let (substitutions, remap_report) = regenerate_identifiers(&mut loaded.snapshot, &mut document);
    report.extend(remap_report);
    tracing::info!(
        source = %loaded.source,
        renamed = substitutions.len(),
        "regenerated identifiers"
    );
    emit(loaded.snapshot, report, output)
}

/// Outcome of promoting a drawn region to a sub-circuit.
#[derive(Debug, Clone)]
pub struct ExtractResult {
    pub source: String,
    pub summary: ExtractionSummary,
    pub report: Report,
}

impl ExtractResult {
    pub fn has_errors(&self) -> bool {
        self.report.has_errors()
    }
}

/// Extract the region in `input` into a new sub-circuit container inside an
/// empty circuit document.
pub fn run_extract(input: &str) -> Result<ExtractResult> {
    let mut loaded = load(input)?;
    if !matches!(loaded.snapshot.kind, DocumentKind::Circuit) {
        bail!(
            "{} is a {} document; only circuits can be extracted",
            loaded.source,
            loaded.snapshot.kind.as_str()
        );
    }
    let registry = registry_for(&loaded.snapshot);
    let mut document = HeadlessDocument::new(DocumentKind::Circuit);
    let container_id = document.generate_uid("subcircuit");
    let container = registry
        .create(SUBCIRCUIT_TYPE, &container_id)
        .context("no factory for sub-circuit containers")?;
    document
        .add_item(container)
        .context("failed to add the sub-circuit container")?;

    let (summary, extract_report) =
        init_external_connections(&mut loaded.snapshot, &mut document, &registry, &container_id)
            .context("sub-circuit extraction failed")?;
    let mut report = loaded.report;
    report.extend(extract_report);
    tracing::info!(
        source = %loaded.source,
        container = %summary.container,
        pins = summary.pin_names.len(),
        "extracted sub-circuit"
    );
    Ok(ExtractResult {
        source: loaded.source,
        summary,
        report,
    })
}

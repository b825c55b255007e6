//! Snapshot loading operations.

use std::fs;
use std::path::Path;

use crate::error::{DocumentError, Result};
use crate::reader::{ParseOutcome, parse_snapshot};

use super::remote::{Location, RemoteFetcher};

/// Load a snapshot from a local file.
pub fn load_file(path: &Path) -> Result<ParseOutcome> {
    let text = fs::read_to_string(path).map_err(|e| DocumentError::io("read", path, e))?;
    let outcome = parse_snapshot(&text)?;
    tracing::info!(
        issues = outcome.report.issues.len(),
        "Loaded document from {}",
        path.display()
    );
    Ok(outcome)
}

/// Load a snapshot from a local path or a remote URL.
///
/// Remote documents are fetched into a temporary file that is removed once
/// the text has been parsed.
pub fn load_snapshot(location: &Location, fetcher: &dyn RemoteFetcher) -> Result<ParseOutcome> {
    match location {
        Location::Local(path) => load_file(path),
        Location::Remote(url) => {
            let temp = tempfile::NamedTempFile::new()
                .map_err(|e| DocumentError::io("create", std::env::temp_dir(), e))?;
            fetcher.fetch(url, temp.path())?;
            load_file(temp.path())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::NoRemote;
    use tempfile::tempdir;

    struct FixtureFetcher(&'static str);

    impl RemoteFetcher for FixtureFetcher {
        fn fetch(&self, _url: &str, destination: &Path) -> Result<()> {
            fs::write(destination, self.0).map_err(|e| DocumentError::io("write", destination, e))
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let error = load_file(&dir.path().join("absent.circuit")).unwrap_err();
        assert!(matches!(error, DocumentError::Io { operation: "read", .. }));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_load_remote_through_fetcher() {
        let location = Location::parse("https://example.org/led.circuit");
        let fetcher = FixtureFetcher(r#"<document type="circuit"><node id="n1" x="1" y="2"/></document>"#);
        let outcome = load_snapshot(&location, &fetcher).unwrap();
        assert_eq!(outcome.snapshot.nodes.len(), 1);
    }

    #[test]
    fn test_load_remote_without_fetcher() {
        let location = Location::parse("http://example.org/led.circuit");
        assert!(matches!(
            load_snapshot(&location, &NoRemote),
            Err(DocumentError::Transfer { .. })
        ));
    }
}

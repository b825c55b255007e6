//! Document locations and remote transfer.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{DocumentError, Result};

/// Where a document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    /// Network address, materialized into a temporary file before parsing.
    Remote(String),
}

impl Location {
    /// Classify user input. `http`, `https` and `ftp` URLs are remote;
    /// `file://` URLs and everything else are local paths.
    pub fn parse(input: &str) -> Self {
        const REMOTE_SCHEMES: [&str; 3] = ["http://", "https://", "ftp://"];
        let lower = input.to_ascii_lowercase();
        if REMOTE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
            return Self::Remote(input.to_string());
        }
        let path = input.strip_prefix("file://").unwrap_or(input);
        Self::Local(PathBuf::from(path))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

impl From<&Path> for Location {
    fn from(path: &Path) -> Self {
        Self::Local(path.to_path_buf())
    }
}

/// Copies a remote document into a local file.
pub trait RemoteFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<()>;
}

/// Fetcher for builds without network access; every transfer fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRemote;

impl RemoteFetcher for NoRemote {
    fn fetch(&self, url: &str, _destination: &Path) -> Result<()> {
        Err(DocumentError::Transfer {
            location: url.to_string(),
            message: "remote documents are not supported in this build".to_string(),
        })
    }
}

#[cfg(feature = "remote")]
mod http {
    use std::path::Path;
    use std::time::Duration;

    use reqwest::blocking::Client;
    use reqwest::header::USER_AGENT;

    use super::RemoteFetcher;
    use crate::error::{DocumentError, Result};

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Blocking HTTP(S) fetcher.
    pub struct HttpFetcher {
        client: Client,
    }

    impl HttpFetcher {
        pub fn new() -> Result<Self> {
            let client = Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|error| DocumentError::Transfer {
                    location: String::new(),
                    message: error.to_string(),
                })?;
            Ok(Self { client })
        }
    }

    impl RemoteFetcher for HttpFetcher {
        fn fetch(&self, url: &str, destination: &Path) -> Result<()> {
            let transfer = |message: String| DocumentError::Transfer {
                location: url.to_string(),
                message,
            };

            tracing::debug!(url, "fetching remote document");
            let response = self
                .client
                .get(url)
                .header(USER_AGENT, format!("itemdoc/{}", env!("CARGO_PKG_VERSION")))
                .send()
                .map_err(|error| transfer(error.to_string()))?;

            if !response.status().is_success() {
                return Err(transfer(format!("server answered {}", response.status())));
            }

            let bytes = response
                .bytes()
                .map_err(|error| transfer(error.to_string()))?;
            std::fs::write(destination, &bytes)
                .map_err(|error| DocumentError::io("write", destination, error))?;
            tracing::debug!(url, bytes = bytes.len(), "fetched remote document");
            Ok(())
        }
    }
}

#[cfg(feature = "remote")]
pub use http::HttpFetcher;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_locations() {
        assert!(Location::parse("https://example.org/a.circuit").is_remote());
        assert!(Location::parse("FTP://host/a.flowcode").is_remote());
        assert_eq!(
            Location::parse("file:///tmp/a.circuit"),
            Location::Local(PathBuf::from("/tmp/a.circuit"))
        );
        assert_eq!(
            Location::parse("docs/a.circuit"),
            Location::Local(PathBuf::from("docs/a.circuit"))
        );
    }

    #[test]
    fn no_remote_refuses_transfer() {
        let error = NoRemote
            .fetch("http://example.org/x", Path::new("unused"))
            .unwrap_err();
        assert!(matches!(error, DocumentError::Transfer { .. }));
    }
}

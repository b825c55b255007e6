//! XML persistence for item document snapshots.
//!
//! The format has a `document` root carrying the document type and a
//! revision, followed by `item`, `connector`, `node` and (for flow
//! programs) `micro` elements. Reading is lenient: element level problems
//! are reported, not fatal.

mod element;
pub mod error;
pub mod io;
pub mod options;
pub mod reader;
pub mod writer;

pub use error::{DocumentError, Result};
#[cfg(feature = "remote")]
pub use io::HttpFetcher;
pub use io::{Location, NoRemote, RemoteFetcher, load_file, load_snapshot, save_snapshot};
pub use options::{REVISION, WriteOptions};
pub use reader::{ParseOutcome, parse_snapshot};
pub use writer::{to_xml_string, write_snapshot};

//! File I/O for document snapshots.
//!
//! This module handles:
//! - Loading snapshots from local paths or remote locations
//! - Saving snapshots with atomic writes

mod load;
mod remote;
mod save;

pub use load::{load_file, load_snapshot};
#[cfg(feature = "remote")]
pub use remote::HttpFetcher;
pub use remote::{Location, NoRemote, RemoteFetcher};
pub use save::save_snapshot;

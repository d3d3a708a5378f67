//! Remote Git-Object Store
//!
//! Everything the journal knows about its backend lives here. There is no
//! server of our own: the data store is a hosted git repository, driven
//! entirely through its REST API:
//! - [`client`]: thin wrappers over the git data endpoints (refs, commits,
//!   blobs, trees) and the contents endpoint for reads
//! - [`commit`]: the atomic multi-file commit orchestrator
//! - [`types`]: request/response DTOs
//! - [`error`]: typed API errors

mod client;
mod commit;
mod error;
mod types;

pub use client::GitClient;
pub use commit::{CommitBatch, CommitOutcome, FileChange, FileContent};
pub use error::RemoteError;
pub use types::{CommitObject, FileData, RefObject, RefTarget, TreeEntry, TreeRef};

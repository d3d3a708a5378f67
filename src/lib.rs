//! # Growlog
//!
//! A git-backed hydroponics grow journal. There is no server of our own:
//! the archive of experiments and diary entries lives in a hosted git
//! repository, read and written entirely through its REST API with a
//! personal access token.
//!
//! ## Features
//!
//! - **Atomic submissions**: entry JSON, index update, and photo blobs land
//!   as a single commit via the blob → tree → commit → ref protocol
//! - **Index integrity**: the per-experiment index is merged
//!   read-modify-write at the current head, so same-day submissions keep
//!   each other's lines
//! - **Offline browsing**: fetched documents are cached on disk and served
//!   (flagged stale) when the network is unavailable
//! - **Photo compression**: photos are downscaled and re-encoded client-side
//!   before upload
//!
//! ## Modules
//!
//! - [`remote`]: git data API client and the commit orchestrator
//! - [`journal`]: data model, store, search, and measurement charts
//! - [`cache`]: offline read cache
//! - [`auth`]: persisted operator credentials
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use growlog::auth::Credentials;
//! use growlog::cache::OfflineCache;
//! use growlog::config::Config;
//! use growlog::journal::{Entry, JournalStore};
//! use growlog::remote::GitClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let creds = Credentials::new("token", "alice", "greenhouse");
//!
//!     let client = GitClient::new(&config.remote, &creds)?;
//!     let cache = OfflineCache::new(&config.cache);
//!     let store = JournalStore::new(client, cache, &config);
//!
//!     let entry = Entry::new(chrono::Utc::now().date_naive())
//!         .notes("Transplanted six basil seedlings into the DWC tub");
//!     let receipt = store.submit("basil-dwc", entry, &[]).await?;
//!
//!     println!("Committed {} as {}", receipt.entry_file, receipt.commit_sha);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cache;
pub mod config;
pub mod images;
pub mod journal;
pub mod remote;

// Re-export top-level types for convenience
pub use auth::{AuthError, Credentials};
pub use cache::{CacheError, CacheStats, OfflineCache};
pub use config::{CacheConfig, Config, ConfigError, ImageConfig, LoggingConfig, RemoteConfig};
pub use images::ImageError;
pub use journal::{
    Entry, EntryIndex, Experiment, ExperimentList, ExperimentStatus, Fetched, JournalError,
    JournalStore, Measurements, Metric, NewExperiment, SubmitReceipt,
};
pub use remote::{CommitBatch, CommitOutcome, FileChange, FileContent, GitClient, RemoteError};

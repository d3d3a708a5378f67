//! Journal Domain
//!
//! The data model and high-level store for the grow journal:
//! - [`types`]: experiments, entries, measurements, and the entry index
//! - [`paths`]: repository data layout and filename computation
//! - [`store`]: reads (through the offline cache) and submissions
//! - [`search`]: search-as-filter over fetched entries
//! - [`stats`]: measurement series, summaries, and terminal charts

mod error;
mod paths;
mod search;
mod stats;
mod store;
mod types;

pub use error::{JournalError, JournalResult};
pub use paths::{
    entry_filename, entry_path, entry_sort_key, entry_stem, index_path, is_valid_slug,
    next_entry_filename, parse_entry_date, photo_path, EXPERIMENTS_FILE,
};
pub use search::filter_entries;
pub use stats::{render_chart, series, summarize, Metric, Summary};
pub use store::{Fetched, JournalStore, NewExperiment, SubmitReceipt};
pub use types::{Entry, EntryIndex, Experiment, ExperimentList, ExperimentStatus, Measurements};

//! Journal Store
//!
//! High-level facade over the git-object client and the offline cache.
//! Reads are network-first with a stale cached fallback; writes assemble a
//! [`CommitBatch`] and land it atomically through the commit orchestrator.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

use crate::cache::OfflineCache;
use crate::config::{Config, ImageConfig};
use crate::images;
use crate::remote::{CommitBatch, CommitOutcome, GitClient, RemoteError};

use super::error::{JournalError, JournalResult};
use super::paths;
use super::types::{Entry, EntryIndex, Experiment, ExperimentList, ExperimentStatus};

/// A value read through the store, flagged when it came from the offline
/// cache instead of the network.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: T,
    pub stale: bool,
}

impl<T> Fetched<T> {
    fn fresh(value: T) -> Self {
        Self { value, stale: false }
    }

    fn cached(value: T) -> Self {
        Self { value, stale: true }
    }

    fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            value: f(self.value),
            stale: self.stale,
        }
    }
}

/// Parameters for creating an experiment
#[derive(Debug, Clone)]
pub struct NewExperiment {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub started: NaiveDate,
}

/// What a successful submission landed
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    /// Filename the entry was assigned (collision suffix included)
    pub entry_file: String,
    /// SHA of the commit that carries everything
    pub commit_sha: String,
    /// Entry-relative paths of the uploaded photos
    pub photos: Vec<String>,
}

/// High-level journal reads and writes against one repository branch
pub struct JournalStore {
    client: GitClient,
    cache: OfflineCache,
    branch: String,
    images: ImageConfig,
}

impl JournalStore {
    pub fn new(client: GitClient, cache: OfflineCache, config: &Config) -> Self {
        Self {
            client,
            cache,
            branch: config.remote.branch.clone(),
            images: config.images.clone(),
        }
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn cache(&self) -> &OfflineCache {
        &self.cache
    }

    pub fn client(&self) -> &GitClient {
        &self.client
    }

    // ============================================
    // Reads (network-first, cached fallback)
    // ============================================

    /// Fetch the shared experiment list. A repository with no journal data
    /// yet simply has no experiments.
    pub async fn experiments(&self) -> JournalResult<Fetched<ExperimentList>> {
        match self.fetch_json::<ExperimentList>(paths::EXPERIMENTS_FILE).await {
            Ok(list) => Ok(list),
            Err(JournalError::Remote(RemoteError::NotFound(_))) => {
                Ok(Fetched::fresh(ExperimentList::default()))
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch one experiment's metadata
    pub async fn experiment(&self, slug: &str) -> JournalResult<Fetched<Experiment>> {
        let list = self.experiments().await?;
        let stale = list.stale;
        match list.value.experiments.into_iter().find(|e| e.slug == slug) {
            Some(exp) => Ok(Fetched { value: exp, stale }),
            None => Err(JournalError::ExperimentNotFound(slug.to_string())),
        }
    }

    /// Fetch an experiment's entry index
    pub async fn index(&self, slug: &str) -> JournalResult<Fetched<EntryIndex>> {
        match self.fetch_json::<EntryIndex>(&paths::index_path(slug)).await {
            Ok(index) => Ok(index),
            Err(JournalError::Remote(RemoteError::NotFound(_))) => {
                Err(JournalError::ExperimentNotFound(slug.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch all entries of an experiment, in index (chronological) order
    pub async fn entries(&self, slug: &str) -> JournalResult<Fetched<Vec<(String, Entry)>>> {
        let index = self.index(slug).await?;
        let mut stale = index.stale;

        let mut filenames = index.value.entries;
        // Date then collision ordinal: plain string order would put
        // `-2.json` before `.json` for the same day.
        filenames.sort_by_key(|f| paths::entry_sort_key(f));

        let mut entries = Vec::with_capacity(filenames.len());
        for filename in filenames {
            let fetched = self
                .fetch_json::<Entry>(&paths::entry_path(slug, &filename))
                .await?;
            stale |= fetched.stale;
            entries.push((filename, fetched.value));
        }

        Ok(Fetched { value: entries, stale })
    }

    /// Fetch a single entry document
    pub async fn entry(&self, slug: &str, filename: &str) -> JournalResult<Fetched<Entry>> {
        self.fetch_json(&paths::entry_path(slug, filename)).await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> JournalResult<Fetched<T>> {
        let fetched = self.fetch_bytes(path).await?;
        let path = path.to_string();
        let parsed = serde_json::from_slice(&fetched.value).map_err(|e| {
            JournalError::Document {
                path,
                error: e.to_string(),
            }
        })?;
        Ok(fetched.map(|_| parsed))
    }

    /// Network-first read with stale fallback. Successful fetches write
    /// through to the cache; a write failure only costs us the fallback.
    async fn fetch_bytes(&self, path: &str) -> JournalResult<Fetched<Vec<u8>>> {
        match self.client.get_file(path, &self.branch).await {
            Ok(bytes) => {
                if let Err(e) = self.cache.put(path, &bytes) {
                    tracing::warn!("Could not cache {}: {}", path, e);
                }
                Ok(Fetched::fresh(bytes))
            }
            Err(err) => resolve_offline(err, self.cache.get(path), path),
        }
    }

    // ============================================
    // Writes (one commit per operation, never cached reads)
    // ============================================

    /// Create an experiment: append it to the shared list and create its
    /// empty entry index, as one commit.
    pub async fn create_experiment(&self, new: NewExperiment) -> JournalResult<CommitOutcome> {
        if !paths::is_valid_slug(&new.slug) {
            return Err(JournalError::InvalidSlug(new.slug));
        }

        // Pin the head first and read the live document at that commit, so
        // a head that moves before our ref update comes back as RefConflict
        // instead of the commit landing on a list we never saw.
        let head = self.client.get_ref(&self.branch).await?.object.sha;
        let mut list = match self
            .client
            .get_json::<ExperimentList>(paths::EXPERIMENTS_FILE, &head)
            .await
        {
            Ok(list) => list,
            Err(RemoteError::NotFound(_)) => ExperimentList::default(),
            Err(e) => return Err(e.into()),
        };

        if list.contains(&new.slug) {
            return Err(JournalError::ExperimentExists(new.slug));
        }

        let slug = new.slug.clone();
        list.experiments.push(Experiment {
            slug: new.slug,
            name: new.name,
            description: new.description,
            started: new.started,
            status: ExperimentStatus::Active,
        });

        let list_json = to_json_doc(&list);
        let index_json = to_json_doc(&EntryIndex::default());

        let batch = CommitBatch::new(format!("journal: start experiment {}", slug))
            .text(paths::EXPERIMENTS_FILE, list_json.clone())
            .text(paths::index_path(&slug), index_json.clone());

        let outcome = self.client.commit_files_at(&self.branch, &head, &batch).await?;

        let _ = self.cache.put(paths::EXPERIMENTS_FILE, list_json.as_bytes());
        let _ = self.cache.put(&paths::index_path(&slug), index_json.as_bytes());

        Ok(outcome)
    }

    /// Submit an entry with photos, landing everything as one commit.
    ///
    /// The head is resolved first and the index is read at that exact
    /// commit; the new filename is merged into it (read-modify-write) and
    /// the batch lands on that same head. A submission that races past ours
    /// moves the ref, our update is rejected as non-fast-forward, and the
    /// caller retries on a fresh read instead of clobbering the index.
    pub async fn submit(
        &self,
        slug: &str,
        entry: Entry,
        photo_files: &[PathBuf],
    ) -> JournalResult<SubmitReceipt> {
        let head = self.client.get_ref(&self.branch).await?.object.sha;
        let index = match self
            .client
            .get_json::<EntryIndex>(&paths::index_path(slug), &head)
            .await
        {
            Ok(index) => index,
            Err(RemoteError::NotFound(_)) => {
                return Err(JournalError::ExperimentNotFound(slug.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let mut photos = Vec::with_capacity(photo_files.len());
        for path in photo_files {
            photos.push(images::load_and_prepare(path, &self.images)?);
        }

        let plan = plan_submission(slug, &index, entry, photos);
        let outcome = self
            .client
            .commit_files_at(&self.branch, &head, &plan.batch)
            .await?;

        let _ = self
            .cache
            .put(&paths::entry_path(slug, &plan.entry_file), plan.entry_json.as_bytes());
        let _ = self
            .cache
            .put(&paths::index_path(slug), plan.index_json.as_bytes());

        Ok(SubmitReceipt {
            entry_file: plan.entry_file,
            commit_sha: outcome.commit_sha,
            photos: plan.photo_paths,
        })
    }
}

/// Decide what a failed network read becomes: only connectivity failures
/// fall back to the cached copy (flagged stale). Everything else, a 404
/// included, propagates even when a cached copy exists: the remote answered
/// and its answer wins.
fn resolve_offline(
    err: RemoteError,
    cached: Option<Vec<u8>>,
    path: &str,
) -> JournalResult<Fetched<Vec<u8>>> {
    match err {
        RemoteError::Unavailable | RemoteError::Timeout => match cached {
            Some(bytes) => {
                tracing::warn!("Remote unreachable, serving cached {}", path);
                Ok(Fetched::cached(bytes))
            }
            None => Err(err.into()),
        },
        other => Err(other.into()),
    }
}

/// Everything a submission will commit, computed before any write
struct SubmissionPlan {
    entry_file: String,
    entry_json: String,
    index_json: String,
    photo_paths: Vec<String>,
    batch: CommitBatch,
}

/// Assemble the commit batch for one submission: claim the next free
/// filename, name the photos after the entry, merge the index.
fn plan_submission(
    slug: &str,
    index: &EntryIndex,
    mut entry: Entry,
    photos: Vec<Vec<u8>>,
) -> SubmissionPlan {
    let entry_file = paths::next_entry_filename(index, entry.date);
    let stem = paths::entry_stem(&entry_file).to_string();

    let mut photo_paths = Vec::with_capacity(photos.len());
    for i in 0..photos.len() {
        photo_paths.push(format!("photos/{}-{}.jpg", stem, i + 1));
    }
    entry.photos.extend(photo_paths.iter().cloned());

    let merged = index.merged_with(&entry_file);
    let entry_json = to_json_doc(&entry);
    let index_json = to_json_doc(&merged);

    let mut batch = CommitBatch::new(format!("journal({}): entry {}", slug, stem))
        .text(paths::entry_path(slug, &entry_file), entry_json.clone())
        .text(paths::index_path(slug), index_json.clone());
    for (rel, data) in photo_paths.iter().zip(photos) {
        batch = batch.binary(paths::photo_path(slug, rel), data);
    }

    SubmissionPlan {
        entry_file,
        entry_json,
        index_json,
        photo_paths,
        batch,
    }
}

/// Serialize a document the way the repository stores it: pretty-printed
/// with a trailing newline, so commits diff cleanly.
fn to_json_doc<T: Serialize>(value: &T) -> String {
    let mut doc = serde_json::to_string_pretty(value).expect("journal documents always serialize");
    doc.push('\n');
    doc
}

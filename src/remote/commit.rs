//! Atomic Multi-File Commit Orchestrator
//!
//! Lands a batch of logical file writes (entry JSON, index update, photo
//! blobs) as a single consistent commit, using the four-step object-graph
//! protocol: blob, tree, commit, ref update.
//!
//! The sequence is deliberately unretried. Any step failing aborts the whole
//! operation with one error; objects created before the failure are orphaned
//! on the remote but harmless. Two concurrent submissions race on the final
//! ref update and the loser gets [`RemoteError::RefConflict`], which means
//! "rerun the whole submission from the new head".

use super::client::GitClient;
use super::error::RemoteResult;
use super::types::TreeEntry;

/// Contents of one file in a commit batch
#[derive(Debug, Clone)]
pub enum FileContent {
    /// UTF-8 text, sent as-is
    Text(String),
    /// Binary data, base64-encoded on the wire
    Binary(Vec<u8>),
}

impl FileContent {
    pub fn len(&self) -> usize {
        match self {
            FileContent::Text(s) => s.len(),
            FileContent::Binary(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One logical file write
#[derive(Debug, Clone)]
pub struct FileChange {
    /// Repository-relative path, `/`-separated
    pub path: String,
    pub content: FileContent,
}

/// A batch of file writes to land as one commit
#[derive(Debug, Clone)]
pub struct CommitBatch {
    pub message: String,
    pub files: Vec<FileChange>,
}

impl CommitBatch {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            files: Vec::new(),
        }
    }

    /// Builder method: add a text file
    pub fn text(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push(FileChange {
            path: path.into(),
            content: FileContent::Text(content.into()),
        });
        self
    }

    /// Builder method: add a binary file
    pub fn binary(mut self, path: impl Into<String>, data: Vec<u8>) -> Self {
        self.files.push(FileChange {
            path: path.into(),
            content: FileContent::Binary(data),
        });
        self
    }

    /// Total payload size across all files (for logging)
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.content.len()).sum()
    }
}

/// Result of a successful batch commit
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    /// SHA of the new head commit
    pub commit_sha: String,
    /// Head the commit was built on
    pub parent_sha: String,
    /// Number of files written
    pub files_committed: usize,
}

impl GitClient {
    /// Commit a batch of files atomically.
    ///
    /// Six sequential API calls:
    /// 1. resolve the branch head commit
    /// 2. read its tree SHA as the merge base
    /// 3. create one blob per input file
    /// 4. create one tree listing all new blobs on top of the base tree
    /// 5. create a commit with the prior head as sole parent
    /// 6. fast-forward the branch ref
    pub async fn commit_files(
        &self,
        branch: &str,
        batch: &CommitBatch,
    ) -> RemoteResult<CommitOutcome> {
        let head = self.get_ref(branch).await?.object.sha;
        self.commit_files_at(branch, &head, batch).await
    }

    /// Commit a batch on top of a specific head commit (steps 2-6).
    ///
    /// Callers whose batch contents depend on a read of the repository (the
    /// index merge, the filename scan) resolve the head first, read at that
    /// SHA, and pass it here as the parent. The ref update then rejects any
    /// head that moved in between as non-fast-forward, instead of silently
    /// building on a newer head the batch never saw.
    pub async fn commit_files_at(
        &self,
        branch: &str,
        head: &str,
        batch: &CommitBatch,
    ) -> RemoteResult<CommitOutcome> {
        tracing::debug!(
            "Committing {} files ({} bytes) to {}:{} on {}",
            batch.files.len(),
            batch.total_bytes(),
            self.repo_slug(),
            branch,
            &head[..head.len().min(8)]
        );

        // (2): the head's tree is the merge base
        let base_tree = self.get_commit(head).await?.tree.sha;

        // (3): one blob per file
        let mut entries = Vec::with_capacity(batch.files.len());
        for file in &batch.files {
            let sha = match &file.content {
                FileContent::Text(text) => self.create_text_blob(text).await?,
                FileContent::Binary(data) => self.create_binary_blob(data).await?,
            };
            tracing::trace!("Created blob {} for {}", sha, file.path);
            entries.push(TreeEntry::blob(file.path.clone(), sha));
        }

        // (4): new tree on top of the base; unlisted paths are inherited
        let tree = self.create_tree(&base_tree, entries).await?;

        // (5): commit with the prior head as sole parent
        let commit_sha = self.create_commit(&batch.message, &tree, head).await?;

        // (6): fast-forward the ref; a loss here is RefConflict
        self.update_ref(branch, &commit_sha).await?;

        tracing::info!(
            "Committed {} as {} ({} files)",
            batch.message.lines().next().unwrap_or(""),
            &commit_sha[..commit_sha.len().min(8)],
            batch.files.len()
        );

        Ok(CommitOutcome {
            commit_sha,
            parent_sha: head.to_string(),
            files_committed: batch.files.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_builder() {
        let batch = CommitBatch::new("journal: add entry")
            .text("data/basil/2026-08-26.json", "{}")
            .binary("data/basil/photos/2026-08-26-1.jpg", vec![0xFF, 0xD8]);

        assert_eq!(batch.files.len(), 2);
        assert_eq!(batch.message, "journal: add entry");
        assert!(matches!(batch.files[0].content, FileContent::Text(_)));
        assert!(matches!(batch.files[1].content, FileContent::Binary(_)));
    }

    #[test]
    fn test_total_bytes() {
        let batch = CommitBatch::new("m")
            .text("a.json", "abcd")
            .binary("b.jpg", vec![1, 2, 3]);
        assert_eq!(batch.total_bytes(), 7);
    }

    #[test]
    fn test_empty_content() {
        let content = FileContent::Text(String::new());
        assert!(content.is_empty());
        let content = FileContent::Binary(vec![0]);
        assert!(!content.is_empty());
    }
}

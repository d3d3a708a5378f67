//! Request/response DTOs for the git data API
//!
//! Only the fields the journal actually consumes are modeled; the API
//! returns plenty more that serde is free to ignore.

use serde::{Deserialize, Serialize};

/// A branch ref: a mutable pointer to the current head commit
#[derive(Debug, Clone, Deserialize)]
pub struct RefObject {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: RefTarget,
}

/// The object a ref points at
#[derive(Debug, Clone, Deserialize)]
pub struct RefTarget {
    pub sha: String,
    #[serde(rename = "type")]
    pub object_type: String,
}

/// A commit object, as read back from the API
#[derive(Debug, Clone, Deserialize)]
pub struct CommitObject {
    pub sha: String,
    pub tree: TreeRef,
    #[serde(default)]
    pub parents: Vec<TreeRef>,
    #[serde(default)]
    pub message: String,
}

/// A bare SHA reference to a tree or parent commit
#[derive(Debug, Clone, Deserialize)]
pub struct TreeRef {
    pub sha: String,
}

/// One path entry in a tree we are creating.
///
/// Mode is always `100644` (regular file): the journal never commits
/// executables or symlinks.
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: &'static str,
    #[serde(rename = "type")]
    pub entry_type: &'static str,
    pub sha: String,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: "100644",
            entry_type: "blob",
            sha: sha.into(),
        }
    }
}

/// A file read from the contents endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct FileData {
    pub sha: String,
    #[serde(default)]
    pub encoding: String,
    #[serde(default)]
    pub content: String,
}

// ============================================
// Request bodies
// ============================================

#[derive(Debug, Serialize)]
pub(crate) struct CreateBlobRequest {
    pub content: String,
    pub encoding: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateTreeRequest {
    pub base_tree: String,
    pub tree: Vec<TreeEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateCommitRequest {
    pub message: String,
    pub tree: String,
    pub parents: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateRefRequest {
    pub sha: String,
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShaResponse {
    pub sha: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_ref() {
        let json = r#"{
            "ref": "refs/heads/main",
            "node_id": "xyz",
            "object": { "sha": "abc123", "type": "commit", "url": "https://example" }
        }"#;
        let r: RefObject = serde_json::from_str(json).unwrap();
        assert_eq!(r.name, "refs/heads/main");
        assert_eq!(r.object.sha, "abc123");
        assert_eq!(r.object.object_type, "commit");
    }

    #[test]
    fn test_deserialize_commit() {
        let json = r#"{
            "sha": "abc123",
            "tree": { "sha": "tree456" },
            "parents": [{ "sha": "parent789" }],
            "message": "journal: add entry"
        }"#;
        let c: CommitObject = serde_json::from_str(json).unwrap();
        assert_eq!(c.tree.sha, "tree456");
        assert_eq!(c.parents.len(), 1);
    }

    #[test]
    fn test_tree_entry_serializes_blob_mode() {
        let entry = TreeEntry::blob("data/basil/index.json", "abc");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["mode"], "100644");
        assert_eq!(json["type"], "blob");
        assert_eq!(json["path"], "data/basil/index.json");
    }
}

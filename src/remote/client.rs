//! Git Data API Client
//!
//! HTTP client for the hosted git-object API. Each method wraps exactly one
//! endpoint; the composite "commit a batch of files atomically" operation
//! lives in [`super::commit`].

use base64::Engine;
use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::Credentials;
use crate::config::RemoteConfig;

use super::error::{RemoteError, RemoteResult};
use super::types::{
    CommitObject, CreateBlobRequest, CreateCommitRequest, CreateTreeRequest, FileData, RefObject,
    ShaResponse, TreeEntry, UpdateRefRequest,
};

/// Client for the git data API of one repository
pub struct GitClient {
    client: Client,
    api_base: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitClient {
    /// Create a client bound to the configured repository
    pub fn new(config: &RemoteConfig, creds: &Credentials) -> RemoteResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("growlog/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            owner: creds.owner.clone(),
            repo: creds.repo.clone(),
            token: creds.token.clone(),
        })
    }

    /// The `owner/repo` pair this client talks to
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    fn repo_url(&self, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.owner, self.repo, tail
        )
    }

    /// Resolve a branch to its head commit SHA
    pub async fn get_ref(&self, branch: &str) -> RemoteResult<RefObject> {
        let url = self.repo_url(&format!("git/ref/heads/{}", branch));
        let response = self.send_get(&url).await?;
        self.parse_json(response, &format!("branch {}", branch)).await
    }

    /// Read a commit object (primarily for its tree SHA)
    pub async fn get_commit(&self, sha: &str) -> RemoteResult<CommitObject> {
        let url = self.repo_url(&format!("git/commits/{}", sha));
        let response = self.send_get(&url).await?;
        self.parse_json(response, &format!("commit {}", sha)).await
    }

    /// Create a blob from UTF-8 text, returning its SHA
    pub async fn create_text_blob(&self, content: &str) -> RemoteResult<String> {
        self.create_blob(CreateBlobRequest {
            content: content.to_string(),
            encoding: "utf-8",
        })
        .await
    }

    /// Create a blob from binary data (base64 on the wire), returning its SHA
    pub async fn create_binary_blob(&self, data: &[u8]) -> RemoteResult<String> {
        self.create_blob(CreateBlobRequest {
            content: base64::engine::general_purpose::STANDARD.encode(data),
            encoding: "base64",
        })
        .await
    }

    async fn create_blob(&self, body: CreateBlobRequest) -> RemoteResult<String> {
        let url = self.repo_url("git/blobs");
        let response = self.send_post(&url, &body).await?;
        let created: ShaResponse = self.parse_json(response, "blob").await?;
        Ok(created.sha)
    }

    /// Create a tree on top of `base_tree`; unlisted paths are inherited
    /// unchanged from the base.
    pub async fn create_tree(
        &self,
        base_tree: &str,
        entries: Vec<TreeEntry>,
    ) -> RemoteResult<String> {
        let url = self.repo_url("git/trees");
        let body = CreateTreeRequest {
            base_tree: base_tree.to_string(),
            tree: entries,
        };
        let response = self.send_post(&url, &body).await?;
        let created: ShaResponse = self.parse_json(response, "tree").await?;
        Ok(created.sha)
    }

    /// Create a commit pointing at `tree` with `parent` as sole parent
    pub async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parent: &str,
    ) -> RemoteResult<String> {
        let url = self.repo_url("git/commits");
        let body = CreateCommitRequest {
            message: message.to_string(),
            tree: tree.to_string(),
            parents: vec![parent.to_string()],
        };
        let response = self.send_post(&url, &body).await?;
        let created: ShaResponse = self.parse_json(response, "commit").await?;
        Ok(created.sha)
    }

    /// Fast-forward a branch ref to `sha`.
    ///
    /// A non-fast-forward rejection means another submission updated the
    /// branch between our head resolution and now; that maps to
    /// [`RemoteError::RefConflict`] and the caller must rerun the sequence.
    pub async fn update_ref(&self, branch: &str, sha: &str) -> RemoteResult<()> {
        let url = self.repo_url(&format!("git/refs/heads/{}", branch));
        let body = UpdateRefRequest {
            sha: sha.to_string(),
            force: false,
        };

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.v3+json")
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let reset = rate_limit_reset(&response);
        let text = response.text().await.unwrap_or_default();
        if status == StatusCode::CONFLICT || status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(RemoteError::RefConflict(text));
        }
        if status == StatusCode::FORBIDDEN {
            if let Some(secs) = reset {
                return Err(RemoteError::RateLimited(secs));
            }
        }
        Err(self.status_error(status, text, &format!("ref heads/{}", branch)))
    }

    /// Read a file's raw bytes at `reference` (branch name or commit SHA)
    /// via the contents endpoint.
    pub async fn get_file(&self, path: &str, reference: &str) -> RemoteResult<Vec<u8>> {
        let escaped: Vec<String> = path
            .split('/')
            .map(|seg| urlencoding::encode(seg).into_owned())
            .collect();
        let url = format!(
            "{}?ref={}",
            self.repo_url(&format!("contents/{}", escaped.join("/"))),
            urlencoding::encode(reference)
        );

        let response = self.send_get(&url).await?;
        let file: FileData = self.parse_json(response, path).await?;

        if file.encoding != "base64" {
            return Err(RemoteError::Decode(format!(
                "unexpected content encoding {:?} for {}",
                file.encoding, path
            )));
        }
        decode_content(&file.content)
            .map_err(|e| RemoteError::Decode(format!("bad base64 in {}: {}", path, e)))
    }

    /// Read and parse a JSON document from the repository
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        reference: &str,
    ) -> RemoteResult<T> {
        let bytes = self.get_file(path, reference).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    // ============================================
    // Shared request plumbing
    // ============================================

    async fn send_get(&self, url: &str) -> RemoteResult<Response> {
        self.client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await
            .map_err(classify_transport)
    }

    async fn send_post<T: Serialize>(&self, url: &str, body: &T) -> RemoteResult<Response> {
        self.client
            .post(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.v3+json")
            .json(body)
            .send()
            .await
            .map_err(classify_transport)
    }

    async fn parse_json<T: DeserializeOwned>(
        &self,
        response: Response,
        what: &str,
    ) -> RemoteResult<T> {
        if response.status().is_success() {
            return response.json().await.map_err(RemoteError::Request);
        }

        let status = response.status();
        let reset = rate_limit_reset(&response);
        let text = response.text().await.unwrap_or_default();

        if status == StatusCode::FORBIDDEN {
            if let Some(secs) = reset {
                return Err(RemoteError::RateLimited(secs));
            }
        }
        Err(self.status_error(status, text, what))
    }

    fn status_error(&self, status: StatusCode, text: String, what: &str) -> RemoteError {
        match status {
            StatusCode::UNAUTHORIZED => RemoteError::AuthFailed(format!(
                "token rejected by {} for {}",
                self.api_base,
                self.repo_slug()
            )),
            StatusCode::NOT_FOUND => RemoteError::NotFound(what.to_string()),
            _ => RemoteError::ApiError {
                status: status.as_u16(),
                message: text,
            },
        }
    }
}

/// Map transport failures to the coarse categories the offline cache keys on
fn classify_transport(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout
    } else if e.is_connect() {
        RemoteError::Unavailable
    } else {
        RemoteError::Request(e)
    }
}

/// Seconds until the rate limit resets, if the response carries the header
fn rate_limit_reset(response: &Response) -> Option<u64> {
    let remaining = response
        .headers()
        .get("X-RateLimit-Remaining")?
        .to_str()
        .ok()?;
    if remaining != "0" {
        return None;
    }
    let reset = response
        .headers()
        .get("X-RateLimit-Reset")?
        .to_str()
        .ok()?
        .parse::<i64>()
        .ok()?;
    Some((reset - Utc::now().timestamp()).max(0) as u64)
}

/// Decode a contents-endpoint payload: base64 with embedded newlines
pub(crate) fn decode_content(content: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = content.split_whitespace().collect();
    base64::engine::general_purpose::STANDARD.decode(compact)
}

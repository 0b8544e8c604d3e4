//! Commit endpoints: listing, single lookup, and diffs.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::git::{Change, Commit, GitError, Hash};
use crate::server::envelope::Payload;
use crate::server::error::Result;
use crate::server::middleware::RepoDir;
use crate::server::state::AppState;

/// An author or committer on the wire.
#[derive(Debug, Serialize)]
pub struct ContributorRecord {
    /// Contributor's name
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Contributor's email
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    /// When the contribution was made, RFC 3339
    pub timestamp: String,
}

/// One commit on the wire.
#[derive(Debug, Serialize)]
pub struct CommitRecord {
    /// The commit hash, lowercase hex
    pub hash: String,
    /// First line of the commit message
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    /// Who wrote the change
    pub author: ContributorRecord,
    /// Who committed the change
    pub committer: ContributorRecord,
    /// Names of the references pointing at this commit, `[]` when none
    pub references: Vec<String>,
}

impl CommitRecord {
    fn new(commit: &Commit, references: Vec<String>) -> Self {
        Self {
            hash: commit.hash.to_string(),
            summary: commit.summary.clone(),
            author: ContributorRecord {
                name: commit.author.name.clone(),
                email: commit.author.email.clone(),
                timestamp: commit.author.timestamp_rfc3339(),
            },
            committer: ContributorRecord {
                name: commit.committer.name.clone(),
                email: commit.committer.email.clone(),
                timestamp: commit.committer.timestamp_rfc3339(),
            },
            references,
        }
    }
}

/// One tree-diff entry on the wire.
#[derive(Debug, Serialize)]
pub struct ChangeRecord {
    /// INSERT, MODIFY or DELETE
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// The relative file path in the repository
    pub path: String,
}

impl ChangeRecord {
    fn new(change: &Change) -> Self {
        Self {
            kind: change.kind.as_str(),
            path: change.path.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommitParams {
    hash: String,
}

/// `GET /v1/repositories/{directory}/commits`
///
/// All commits reachable from HEAD along first parents, newest committer
/// time first.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(RepoDir(dir)): Extension<RepoDir>,
) -> Result<Json<Payload>> {
    let repo = state.reader.open(&dir)?;
    let head = repo.head()?;
    let references = repo.reference_map()?;

    let mut commits = Vec::new();
    for commit in repo.log(head.hash)? {
        commits.push(commit?);
    }

    // The walk order is not chronological; the response contract is
    // committer time descending, as a stable second pass.
    commits.sort_by(|a, b| b.committer.when.cmp(&a.committer.when));

    let records: Vec<CommitRecord> = commits
        .iter()
        .map(|commit| {
            let refs = references
                .get(&commit.hash.to_string())
                .cloned()
                .unwrap_or_default();
            CommitRecord::new(commit, refs)
        })
        .collect();

    Ok(Json(Payload::with_data(records)?))
}

/// `GET /v1/repositories/{directory}/commits/{hash}`
pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(RepoDir(dir)): Extension<RepoDir>,
    Path(params): Path<CommitParams>,
) -> Result<Json<Payload>> {
    let hash = parse_hash(&params.hash)?;
    let repo = state.reader.open(&dir)?;
    let commit = repo.find_commit(hash)?;

    let references = repo.reference_map()?;
    let refs = references
        .get(&commit.hash.to_string())
        .cloned()
        .unwrap_or_default();

    Ok(Json(Payload::with_data([CommitRecord::new(&commit, refs)])?))
}

/// `GET /v1/repositories/{directory}/commits/{hash}/diff`
///
/// The commit's tree diffed against its first parent, classified into
/// insert/modify/delete records.
pub async fn diff(
    State(state): State<Arc<AppState>>,
    Extension(RepoDir(dir)): Extension<RepoDir>,
    Path(params): Path<CommitParams>,
) -> Result<Json<Payload>> {
    let hash = parse_hash(&params.hash)?;
    let repo = state.reader.open(&dir)?;
    let changes = repo.diff(hash)?;

    let records: Vec<ChangeRecord> = changes.iter().map(ChangeRecord::new).collect();
    Ok(Json(Payload::with_data(records)?))
}

/// A hash that does not parse cannot resolve to a commit; both cases are
/// the same not-found condition for the caller.
fn parse_hash(raw: &str) -> std::result::Result<Hash, GitError> {
    Hash::from_hex(raw).map_err(|_| GitError::CommitNotFound {
        hash: raw.to_string(),
    })
}

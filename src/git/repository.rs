//! git::repository
//!
//! Opening history stores and querying them.
//!
//! [`Reader`] resolves a directory to its metadata root and opens a
//! [`Repository`] handle; the handle exposes head lookup, first-parent
//! commit traversal, reference enumeration and tree diffing. Everything
//! returned to callers is an owned crate type — `git2` never crosses this
//! module's boundary.
//!
//! # Resource handling
//!
//! [`CommitIter`] and [`ReferenceIter`] hold walk state inside the
//! underlying store. Dropping an iterator releases that state, so ownership
//! guarantees release on every exit path, including early returns with `?`.
//!
//! # Error Handling
//!
//! Failures are categorized into typed [`GitError`] variants so callers can
//! distinguish "the user asked for something absent" from "the store is
//! broken":
//! - [`GitError::RepositoryNotFound`]: no metadata at the resolved path
//! - [`GitError::CommitNotFound`]: a hash that resolves to nothing
//! - [`GitError::RefNotFound`]: missing or unborn reference
//! - [`GitError::Internal`]: everything else from the underlying store

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::git::resolver;
use crate::git::types::{Change, ChangeKind, Commit, Hash, Reference, Signature};

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// No history store metadata at the resolved path.
    #[error("repository does not exist: {}", path.display())]
    RepositoryNotFound {
        /// The worktree path that was probed
        path: PathBuf,
    },

    /// A commit hash that does not resolve in the store.
    #[error("commit '{hash}' not found")]
    CommitNotFound {
        /// The hash as given by the caller
        hash: String,
    },

    /// Requested reference does not exist (or HEAD is unborn).
    #[error("reference not found: {name}")]
    RefNotFound {
        /// The reference that was looked up
        name: String,
    },

    /// A tree-diff entry whose action or path cannot be determined.
    #[error("cannot classify change: {detail}")]
    UnclassifiableChange {
        /// Description of the entry
        detail: String,
    },

    /// Internal error from the underlying store.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Categorize a git2::Error with the context it occurred in.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::UnbornBranch => {
                if context == "HEAD" || context.starts_with("refs/") {
                    GitError::RefNotFound {
                        name: context.to_string(),
                    }
                } else {
                    GitError::CommitNotFound {
                        hash: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::CommitNotFound {
                hash: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    /// True for the variants a request can legitimately trigger by asking
    /// for something absent.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GitError::RepositoryNotFound { .. } | GitError::CommitNotFound { .. }
        )
    }
}

fn internal(err: git2::Error) -> GitError {
    GitError::Internal {
        message: err.message().to_string(),
    }
}

/// Opens history stores below a fixed root directory.
#[derive(Debug)]
pub struct Reader {
    root: PathBuf,
}

impl Reader {
    /// Create a reader resolving relative repository paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open the history store for the worktree at `dir`.
    ///
    /// `dir` is taken as-is when absolute, otherwise joined onto the
    /// reader's root. The metadata directory is located via
    /// [`resolver::locate_git_dir`], following one level of submodule-style
    /// `gitdir:` indirection. Decoded-object caching is the underlying
    /// store's own; each handle carries its own cache.
    ///
    /// # Errors
    ///
    /// - [`GitError::RepositoryNotFound`] when no metadata is found
    /// - [`GitError::Internal`] when the store exists but cannot be parsed
    pub fn open(&self, dir: &Path) -> Result<Repository, GitError> {
        let worktree = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root.join(dir)
        };

        let git_dir = resolver::locate_git_dir(&worktree)
            .ok_or(GitError::RepositoryNotFound { path: worktree })?;

        let inner = git2::Repository::open(&git_dir).map_err(|e| GitError::Internal {
            message: format!("{}: {}", git_dir.display(), e.message()),
        })?;

        Ok(Repository { inner })
    }
}

/// An open handle onto one history store.
///
/// Handles are cheap to construct and live for a single request; they are
/// never shared across requests, so the store may change on disk between
/// two opens without coherency concerns.
pub struct Repository {
    inner: git2::Repository,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.inner.path())
            .finish()
    }
}

impl Repository {
    /// The reference symbolic HEAD currently resolves to.
    ///
    /// # Errors
    ///
    /// [`GitError::RefNotFound`] if HEAD is unborn or unreadable.
    pub fn head(&self) -> Result<Reference, GitError> {
        let head = self
            .inner
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        reference_from(&head).ok_or(GitError::RefNotFound {
            name: "HEAD".to_string(),
        })
    }

    /// Walk first-parent history backward starting at `from`.
    ///
    /// The walk order is topological, not guaranteed to be chronological —
    /// callers needing strict committer-time ordering must sort the
    /// collected commits themselves.
    ///
    /// # Errors
    ///
    /// [`GitError::CommitNotFound`] if `from` does not resolve.
    pub fn log(&self, from: Hash) -> Result<CommitIter<'_>, GitError> {
        let mut walk = self.inner.revwalk().map_err(internal)?;
        walk.simplify_first_parent().map_err(internal)?;
        walk.push(to_oid(&from)?)
            .map_err(|e| GitError::from_git2(e, &from.to_string()))?;

        Ok(CommitIter {
            repo: &self.inner,
            walk,
        })
    }

    /// The single commit at `hash`.
    ///
    /// # Errors
    ///
    /// [`GitError::CommitNotFound`] if the hash does not resolve.
    pub fn find_commit(&self, hash: Hash) -> Result<Commit, GitError> {
        let mut log = self.log(hash)?;
        match log.next() {
            Some(commit) => commit,
            None => Err(GitError::CommitNotFound {
                hash: hash.to_string(),
            }),
        }
    }

    /// Iterate over all references in the store.
    ///
    /// Enumeration order is whatever the store yields; it is stable within
    /// one snapshot but not across implementations.
    pub fn references(&self) -> Result<ReferenceIter<'_>, GitError> {
        let inner = self.inner.references().map_err(internal)?;
        Ok(ReferenceIter { inner })
    }

    /// Drain [`Repository::references`] into a hash-string to
    /// reference-name index.
    ///
    /// A hash pointed at by several references appears once with all names,
    /// in enumeration order. Defective individual references are skipped;
    /// partial indexing is acceptable here.
    pub fn reference_map(&self) -> Result<HashMap<String, Vec<String>>, GitError> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();

        for reference in self.references()? {
            let Ok(reference) = reference else { continue };
            map.entry(reference.hash.to_string())
                .or_default()
                .push(reference.name);
        }

        Ok(map)
    }

    /// Diff the commit at `hash` against its first parent and classify the
    /// result.
    ///
    /// A root commit diffs against the empty tree: the full insertion of
    /// its tree.
    ///
    /// # Errors
    ///
    /// - [`GitError::CommitNotFound`] if `hash` does not resolve
    /// - [`GitError::UnclassifiableChange`] if any entry cannot be
    ///   classified; no partial diff is returned
    pub fn diff(&self, hash: Hash) -> Result<Vec<Change>, GitError> {
        let commit = self
            .inner
            .find_commit(to_oid(&hash)?)
            .map_err(|e| GitError::from_git2(e, &hash.to_string()))?;
        let tree = commit.tree().map_err(internal)?;

        let parent_tree = if commit.parent_count() == 0 {
            None
        } else {
            let parent = commit.parent(0).map_err(internal)?;
            Some(parent.tree().map_err(internal)?)
        };

        let diff = self
            .inner
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
            .map_err(internal)?;

        classify(&diff)
    }
}

/// Classify every entry of a raw tree diff.
///
/// Inserts and modifies resolve the path in the newer tree, deletes the
/// path in the older tree. An entry whose action or path cannot be
/// determined aborts the whole diff.
fn classify(diff: &git2::Diff<'_>) -> Result<Vec<Change>, GitError> {
    let mut changes = Vec::new();

    for delta in diff.deltas() {
        let (kind, file) = match delta.status() {
            git2::Delta::Added => (ChangeKind::Insert, delta.new_file()),
            git2::Delta::Modified => (ChangeKind::Modify, delta.new_file()),
            git2::Delta::Deleted => (ChangeKind::Delete, delta.old_file()),
            status => {
                return Err(GitError::UnclassifiableChange {
                    detail: format!("unsupported action {status:?}"),
                })
            }
        };

        let path = file
            .path()
            .and_then(|p| p.to_str())
            .ok_or_else(|| GitError::UnclassifiableChange {
                detail: format!("{} entry without a path", kind),
            })?;

        changes.push(Change {
            kind,
            path: path.to_string(),
        });
    }

    Ok(changes)
}

/// Forward iterator over first-parent commit history.
///
/// Yields owned [`Commit`] snapshots; dropping the iterator releases the
/// walk state.
pub struct CommitIter<'repo> {
    repo: &'repo git2::Repository,
    walk: git2::Revwalk<'repo>,
}

impl Iterator for CommitIter<'_> {
    type Item = Result<Commit, GitError>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = match self.walk.next()? {
            Ok(oid) => oid,
            Err(e) => return Some(Err(internal(e))),
        };

        Some(
            self.repo
                .find_commit(oid)
                .map(|c| commit_from(&c))
                .map_err(internal),
        )
    }
}

/// Iterator over all references in a store.
///
/// Symbolic references without a direct target and references with
/// non-UTF-8 names are skipped.
pub struct ReferenceIter<'repo> {
    inner: git2::References<'repo>,
}

impl Iterator for ReferenceIter<'_> {
    type Item = Result<Reference, GitError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let reference = match self.inner.next()? {
                Ok(reference) => reference,
                Err(e) => return Some(Err(internal(e))),
            };

            if let Some(reference) = reference_from(&reference) {
                return Some(Ok(reference));
            }
        }
    }
}

fn reference_from(reference: &git2::Reference<'_>) -> Option<Reference> {
    let name = reference.name()?;
    let target = reference.target()?;

    Some(Reference {
        name: name.to_string(),
        hash: hash_from(target),
    })
}

fn commit_from(commit: &git2::Commit<'_>) -> Commit {
    Commit {
        hash: hash_from(commit.id()),
        summary: commit.summary().unwrap_or("").to_string(),
        author: signature_from(&commit.author()),
        committer: signature_from(&commit.committer()),
    }
}

fn signature_from(sig: &git2::Signature<'_>) -> Signature {
    let when = sig.when();
    let offset = FixedOffset::east_opt(when.offset_minutes() * 60)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is in range"));
    let when = DateTime::from_timestamp(when.seconds(), 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .with_timezone(&offset);

    Signature {
        name: sig.name().unwrap_or("").to_string(),
        email: sig.email().unwrap_or("").to_string(),
        when,
    }
}

fn to_oid(hash: &Hash) -> Result<git2::Oid, GitError> {
    git2::Oid::from_bytes(hash.as_bytes()).map_err(internal)
}

fn hash_from(oid: git2::Oid) -> Hash {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(oid.as_bytes());
    Hash::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod error_categorization {
        use super::*;

        fn not_found(message: &str) -> git2::Error {
            git2::Error::new(git2::ErrorCode::NotFound, git2::ErrorClass::Odb, message)
        }

        #[test]
        fn missing_head_is_ref_not_found() {
            let err = GitError::from_git2(not_found("reference not found"), "HEAD");
            assert!(matches!(err, GitError::RefNotFound { ref name } if name == "HEAD"));
        }

        #[test]
        fn missing_object_is_commit_not_found() {
            let hash = "e38e2cde1fada4a738f2461b283e561bc767568b";
            let err = GitError::from_git2(not_found("object not found"), hash);
            assert!(matches!(err, GitError::CommitNotFound { hash: ref h } if h == hash));
        }

        #[test]
        fn other_codes_are_internal() {
            let raw = git2::Error::new(
                git2::ErrorCode::Ambiguous,
                git2::ErrorClass::Odb,
                "short id is ambiguous",
            );
            let err = GitError::from_git2(raw, "abc123");
            assert!(matches!(err, GitError::Internal { .. }));
        }

        #[test]
        fn not_found_classification() {
            assert!(GitError::RepositoryNotFound {
                path: PathBuf::from("/tmp/nope"),
            }
            .is_not_found());
            assert!(GitError::CommitNotFound {
                hash: "abc".to_string(),
            }
            .is_not_found());
            assert!(!GitError::Internal {
                message: "boom".to_string(),
            }
            .is_not_found());
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn repository_not_found_names_the_path() {
            let err = GitError::RepositoryNotFound {
                path: PathBuf::from("/srv/repos/missing"),
            };
            assert_eq!(
                err.to_string(),
                "repository does not exist: /srv/repos/missing"
            );
        }

        #[test]
        fn commit_not_found_quotes_the_hash() {
            let err = GitError::CommitNotFound {
                hash: "deadbeef".to_string(),
            };
            assert_eq!(err.to_string(), "commit 'deadbeef' not found");
        }
    }
}

//! git
//!
//! The repository query layer.
//!
//! # Architecture
//!
//! This module is the **only doorway** to on-disk history. All store reads
//! flow through [`Reader`] and [`Repository`]; no other module imports
//! `git2` or parses `.git` internals directly. Everything handed to callers
//! is an owned crate type ([`Commit`], [`Reference`], [`Change`]), so the
//! rest of the system never depends on the underlying library's object
//! model.
//!
//! # Responsibilities
//!
//! - Resolving a worktree path to its metadata directory, including
//!   submodule-style `gitdir:` indirection
//! - Opening stores and reading HEAD
//! - First-parent commit traversal and single-commit lookup
//! - Reference enumeration and the hash-to-names index
//! - Tree diffing with change classification
//!
//! # Example
//!
//! ```ignore
//! use githist::git::Reader;
//! use std::path::Path;
//!
//! let reader = Reader::new("/");
//! let repo = reader.open(Path::new("/srv/repos/project"))?;
//!
//! let head = repo.head()?;
//! for commit in repo.log(head.hash)? {
//!     println!("{}", commit?.summary);
//! }
//! ```

mod repository;
mod resolver;
mod types;

pub use repository::{CommitIter, GitError, Reader, ReferenceIter, Repository};
pub use resolver::locate_git_dir;
pub use types::{Change, ChangeKind, Commit, Hash, Reference, Signature, TypeError};

//! git::types
//!
//! Value types for the repository query layer.
//!
//! # Types
//!
//! - [`Hash`] - Fixed 20-byte object identifier
//! - [`Signature`] - Author/committer identity with a zoned timestamp
//! - [`Commit`] - Owned read snapshot of a commit
//! - [`Reference`] - A (name, hash) pair
//! - [`Change`] - One classified entry of a tree diff
//!
//! These types enforce validity at construction time: a [`Hash`] is either
//! the zero value or a full 20-byte identifier, never anything in between.
//!
//! # Examples
//!
//! ```
//! use githist::git::Hash;
//!
//! let hash = Hash::from_hex("e38e2cde1fada4a738f2461b283e561bc767568b").unwrap();
//! assert!(!hash.is_zero());
//! assert_eq!(hash.to_string(), "e38e2cde1fada4a738f2461b283e561bc767568b");
//!
//! assert!(Hash::from_hex("not-a-sha").is_err());
//! assert!(Hash::ZERO.is_zero());
//! ```

use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object hash: {0}")]
    InvalidHash(String),
}

/// A fixed-width 20-byte object identifier.
///
/// The canonical string form is 40 lowercase hex digits. The zero value
/// means "absent"; there are no partial states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash([u8; 20]);

impl Hash {
    /// The zero (absent) hash.
    pub const ZERO: Hash = Hash([0u8; 20]);

    /// Parse a hash from a 40-digit hex string.
    ///
    /// Accepts upper- or lowercase digits; anything that is not exactly
    /// 20 bytes of hex is rejected.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidHash` if the input is not valid hex or
    /// has the wrong length.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|_| TypeError::InvalidHash(s.to_string()))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| TypeError::InvalidHash(s.to_string()))?;
        Ok(Self(bytes))
    }

    /// Construct a hash from raw bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Check whether this is the zero (absent) hash.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// An author or committer identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// When the signature was made, in the signer's own timezone
    pub when: DateTime<FixedOffset>,
}

impl Signature {
    /// Render the timestamp as RFC 3339 without subsecond digits,
    /// e.g. `2019-05-26T12:41:18-04:00`.
    pub fn timestamp_rfc3339(&self) -> String {
        self.when.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// An owned read snapshot of a commit.
///
/// Decoded once from the store; never a live view into it.
#[derive(Debug, Clone)]
pub struct Commit {
    /// The commit hash
    pub hash: Hash,
    /// First line of the commit message, empty if the message is empty
    pub summary: String,
    /// Who wrote the change
    pub author: Signature,
    /// Who committed the change
    pub committer: Signature,
}

/// A reference: a namespaced name pointing at a commit.
#[derive(Debug, Clone)]
pub struct Reference {
    /// Full reference name, e.g. `refs/heads/master`
    pub name: String,
    /// The commit the reference points at
    pub hash: Hash,
}

/// The kind of a single tree-diff entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A path present only in the newer tree
    Insert,
    /// A path present in both trees with different content
    Modify,
    /// A path present only in the older tree
    Delete,
}

impl ChangeKind {
    /// The wire form of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "INSERT",
            ChangeKind::Modify => "MODIFY",
            ChangeKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified entry of a tree diff.
///
/// Inserts and modifies carry the path in the newer tree; deletes carry
/// the path in the older tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// What happened to the path
    pub kind: ChangeKind,
    /// The representative path
    pub path: String,
}

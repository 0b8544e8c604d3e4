//! git::resolver
//!
//! Locates the metadata directory for a working-directory path.
//!
//! A checked-out repository keeps its history store in `<dir>/.git`. For a
//! linked (submodule-style) worktree, `<dir>/.git` is instead a regular file
//! of the form `gitdir: <relative-path>` pointing at the real store; one
//! level of that indirection is followed here.

use std::fs;
use std::path::{Path, PathBuf};

const DOT_GIT: &str = ".git";

/// Resolve the metadata directory for `dir`.
///
/// Returns the path of the directory holding the history store, or `None`
/// when no metadata is found. Any I/O failure (missing path, unreadable
/// gitdir file, malformed contents) collapses to `None`; callers surface it
/// as "repository does not exist".
pub fn locate_git_dir(dir: &Path) -> Option<PathBuf> {
    let dot_git = dir.join(DOT_GIT);
    let meta = fs::metadata(&dot_git).ok()?;

    if meta.is_dir() {
        return Some(dot_git);
    }

    // Submodule-style indirection: `gitdir: <relative-path>`
    let contents = fs::read_to_string(&dot_git).ok()?;
    let (_, target) = contents.split_once(' ')?;
    let target = target.trim_end_matches('\n');
    if target.is_empty() {
        return None;
    }

    Some(dir.join(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn finds_plain_metadata_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let found = locate_git_dir(dir.path()).unwrap();
        assert_eq!(found, dir.path().join(".git"));
    }

    #[test]
    fn follows_gitdir_file_indirection() {
        let root = TempDir::new().unwrap();
        let store = root.path().join("parent/.git/modules/sub");
        fs::create_dir_all(&store).unwrap();

        let linked = root.path().join("linked");
        fs::create_dir(&linked).unwrap();
        fs::write(
            linked.join(".git"),
            "gitdir: ../parent/.git/modules/sub\n",
        )
        .unwrap();

        let found = locate_git_dir(&linked).unwrap();
        assert_eq!(found, linked.join("../parent/.git/modules/sub"));
    }

    #[test]
    fn missing_metadata_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(locate_git_dir(dir.path()), None);
        assert_eq!(locate_git_dir(&dir.path().join("nope")), None);
    }

    #[test]
    fn malformed_gitdir_file_is_none() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".git"), "no-space-separator").unwrap();
        assert_eq!(locate_git_dir(dir.path()), None);
    }
}

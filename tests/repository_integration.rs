//! Integration tests for the repository query layer.
//!
//! These tests use real git repositories created via tempfile to verify
//! path resolution, traversal, reference indexing and diff classification
//! against actual git operations.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use githist::git::{ChangeKind, GitError, Hash, Reader, Repository};

/// Test fixture that creates a real git repository.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new empty test repository.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "-b", "master"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);

        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Open a query handle onto this repository.
    fn open(&self) -> Repository {
        Reader::new("/")
            .open(self.path())
            .expect("failed to open test repo")
    }

    /// Create or overwrite a file and commit it, returning the new commit
    /// hash.
    fn commit_file(&self, path: &str, content: &str, message: &str) -> Hash {
        std::fs::write(self.path().join(path), content).unwrap();
        run_git(self.path(), &["add", path]);
        run_git(self.path(), &["commit", "-m", message]);
        self.head_hash()
    }

    /// Remove a tracked file and commit the deletion.
    fn delete_file(&self, path: &str, message: &str) -> Hash {
        run_git(self.path(), &["rm", "-q", path]);
        run_git(self.path(), &["commit", "-m", message]);
        self.head_hash()
    }

    /// Create a branch at the current HEAD.
    fn create_branch(&self, name: &str) {
        run_git(self.path(), &["branch", name]);
    }

    /// Get HEAD using git directly.
    fn head_hash(&self) -> Hash {
        let output = Command::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(self.path())
            .output()
            .expect("git rev-parse failed");
        let raw = String::from_utf8(output.stdout).unwrap();
        Hash::from_hex(raw.trim()).unwrap()
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

#[test]
fn head_resolves_to_current_branch() {
    let repo = TestRepo::new();
    let hash = repo.commit_file("README.md", "# Test\n", "Initial commit");

    let head = repo.open().head().unwrap();
    assert_eq!(head.name, "refs/heads/master");
    assert_eq!(head.hash, hash);
}

#[test]
fn head_of_unborn_repository_is_an_error() {
    let repo = TestRepo::new();
    assert!(repo.open().head().is_err());
}

#[test]
fn log_walks_history_from_the_given_start() {
    let repo = TestRepo::new();
    let first = repo.commit_file("README.md", "one\n", "first");
    let second = repo.commit_file("README.md", "two\n", "second");
    let third = repo.commit_file("README.md", "three\n", "third");

    let handle = repo.open();
    let commits: Vec<_> = handle
        .log(third)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let hashes: Vec<Hash> = commits.iter().map(|c| c.hash).collect();
    assert_eq!(hashes, vec![third, second, first]);
    assert_eq!(commits[0].summary, "third");

    // Starting mid-history excludes descendants.
    let commits: Vec<_> = handle
        .log(second)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(commits.len(), 2);
}

#[test]
fn commit_snapshot_carries_signatures() {
    let repo = TestRepo::new();
    let hash = repo.commit_file("README.md", "# Test\n", "Initial commit");

    let commit = repo.open().find_commit(hash).unwrap();
    assert_eq!(commit.author.name, "Test User");
    assert_eq!(commit.author.email, "test@example.com");
    assert_eq!(commit.committer.name, "Test User");
    assert!(!commit.author.timestamp_rfc3339().is_empty());
}

#[test]
fn find_commit_with_unknown_hash_is_not_found() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "# Test\n", "Initial commit");

    let absent = Hash::from_hex("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
    let err = repo.open().find_commit(absent).unwrap_err();
    assert!(matches!(err, GitError::CommitNotFound { .. }));
}

#[test]
fn reference_map_groups_names_by_hash() {
    let repo = TestRepo::new();
    let first = repo.commit_file("README.md", "one\n", "first");
    let second = repo.commit_file("README.md", "two\n", "second");
    repo.create_branch("feature");

    let map = repo.open().reference_map().unwrap();

    // Two references share the tip; the hash appears once with both names.
    let names = map.get(&second.to_string()).unwrap();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"refs/heads/master".to_string()));
    assert!(names.contains(&"refs/heads/feature".to_string()));

    // Nothing points at the first commit.
    assert!(!map.contains_key(&first.to_string()));
}

#[test]
fn reference_iteration_matches_the_map() {
    let repo = TestRepo::new();
    let tip = repo.commit_file("README.md", "one\n", "first");
    repo.create_branch("feature");

    let handle = repo.open();
    let listed: Vec<_> = handle
        .references()
        .unwrap()
        .filter_map(|r| r.ok())
        .collect();
    let map = handle.reference_map().unwrap();

    assert_eq!(
        listed.len(),
        map.values().map(|names| names.len()).sum::<usize>()
    );
    for reference in listed {
        assert_eq!(reference.hash, tip);
    }
}

#[test]
fn diff_classifies_inserts_and_modifies() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "alpha\n", "add a");
    std::fs::write(repo.path().join("a.txt"), "alpha two\n").unwrap();
    std::fs::write(repo.path().join("b.txt"), "beta\n").unwrap();
    run_git(repo.path(), &["add", "a.txt", "b.txt"]);
    run_git(repo.path(), &["commit", "-m", "change a, add b"]);
    let second = repo.head_hash();

    let changes = repo.open().diff(second).unwrap();

    assert_eq!(changes.len(), 2);
    let modified = changes.iter().find(|c| c.path == "a.txt").unwrap();
    assert_eq!(modified.kind, ChangeKind::Modify);
    let inserted = changes.iter().find(|c| c.path == "b.txt").unwrap();
    assert_eq!(inserted.kind, ChangeKind::Insert);
}

#[test]
fn diff_reports_deletes_with_the_old_path() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "# Test\n", "initial");
    repo.commit_file("data.txt", "payload\n", "add data");
    let deletion = repo.delete_file("data.txt", "drop data");

    let changes = repo.open().diff(deletion).unwrap();

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, ChangeKind::Delete);
    assert_eq!(changes[0].path, "data.txt");
}

#[test]
fn root_commit_diff_is_the_full_tree_insertion() {
    let repo = TestRepo::new();
    let root = repo.commit_file("README.md", "# Test\n", "initial");

    let changes = repo.open().diff(root).unwrap();

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, ChangeKind::Insert);
    assert_eq!(changes[0].path, "README.md");
}

#[test]
fn diff_of_unknown_hash_is_not_found() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "# Test\n", "initial");

    let absent = Hash::from_hex("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb").unwrap();
    let err = repo.open().diff(absent).unwrap_err();
    assert!(matches!(err, GitError::CommitNotFound { .. }));
}

#[test]
fn gitdir_file_indirection_reaches_the_linked_store() {
    let root = TempDir::new().unwrap();

    let real = root.path().join("real");
    std::fs::create_dir(&real).unwrap();
    run_git(&real, &["init", "-b", "master"]);
    run_git(&real, &["config", "user.email", "test@example.com"]);
    run_git(&real, &["config", "user.name", "Test User"]);
    std::fs::write(real.join("README.md"), "# Linked\n").unwrap();
    run_git(&real, &["add", "README.md"]);
    run_git(&real, &["commit", "-m", "linked commit"]);

    let linked = root.path().join("linked");
    std::fs::create_dir(&linked).unwrap();
    std::fs::write(linked.join(".git"), "gitdir: ../real/.git\n").unwrap();

    let handle = Reader::new("/").open(&linked).unwrap();
    let head = handle.head().unwrap();

    let direct = Reader::new("/").open(&real).unwrap();
    assert_eq!(head.hash, direct.head().unwrap().hash);
}

#[test]
fn missing_repository_is_not_found() {
    let dir = TempDir::new().unwrap();

    let err = Reader::new("/").open(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, GitError::RepositoryNotFound { .. }));
    assert!(err.to_string().starts_with("repository does not exist"));
}

#[test]
fn relative_paths_resolve_against_the_reader_root() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "# Test\n", "initial");

    let parent = repo.path().parent().unwrap();
    let name = repo.path().file_name().unwrap();

    let handle = Reader::new(parent).open(Path::new(name)).unwrap();
    assert_eq!(handle.head().unwrap().hash, repo.head_hash());
}

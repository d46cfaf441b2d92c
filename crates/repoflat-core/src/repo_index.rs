//! In-memory repository index: commit id to owning repository and branch.
//!
//! The index is read once from a line-oriented listing and never changes
//! afterwards. Two line shapes are understood:
//!
//! ```text
//! org/proj main 46ec6a6365ded7f9d96674baf40f7342d76ebdda
//! ReactiveX RxJava 2.x 46ec6a6365ded7f9d96674baf40f7342d76ebdda
//! ```
//!
//! The second form (user, repository, branch, commit) is what the listing
//! tool emits; user and repository are joined with `/`.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use log::warn;

use crate::Result;

/// Repository and branch a commit belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoEntry {
    /// Full repository name, `owner/name`.
    pub repository: String,
    /// Branch the snapshot was taken from.
    pub branch: String,
}

/// A fully resolved snapshot identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRef {
    /// Full repository name, `owner/name`.
    pub repository: String,
    /// Branch the snapshot was taken from.
    pub branch: String,
    /// Commit id, the archive's file stem.
    pub commit_id: String,
}

/// Immutable mapping from commit id to [`RepoEntry`].
#[derive(Debug, Clone, Default)]
pub struct RepoIndex {
    entries: HashMap<String, RepoEntry>,
}

impl RepoIndex {
    /// Reads and parses an index file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::parse(&text))
    }

    /// Parses index text. Malformed lines are skipped with a warning.
    ///
    /// # Examples
    ///
    /// ```
    /// use repoflat_core::RepoIndex;
    ///
    /// let index = RepoIndex::parse("org/proj main abc123\nsquare retrofit master def456\n");
    /// assert_eq!(index.len(), 2);
    ///
    /// let commit = index.resolve("def456").expect("indexed commit");
    /// assert_eq!(commit.repository, "square/retrofit");
    /// assert_eq!(commit.branch, "master");
    /// assert!(index.resolve("ffffff").is_none());
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();

        for (lineno, line) in text.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let (repository, branch, commit) = match fields.as_slice() {
                [] => continue,
                [repo, branch, commit] => ((*repo).to_string(), *branch, *commit),
                [user, repo, branch, commit] => (format!("{user}/{repo}"), *branch, *commit),
                _ => {
                    warn!("repository index line {}: malformed: {line:?}", lineno + 1);
                    continue;
                }
            };

            match entries.entry(commit.to_string()) {
                Entry::Occupied(_) => {
                    warn!(
                        "repository index line {}: duplicate commit {commit}, keeping first",
                        lineno + 1
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(RepoEntry {
                        repository,
                        branch: branch.to_string(),
                    });
                }
            }
        }

        Self { entries }
    }

    /// Looks up the repository entry for a commit.
    #[must_use]
    pub fn get(&self, commit_id: &str) -> Option<&RepoEntry> {
        self.entries.get(commit_id)
    }

    /// Resolves a commit id into a [`CommitRef`].
    #[must_use]
    pub fn resolve(&self, commit_id: &str) -> Option<CommitRef> {
        self.get(commit_id).map(|entry| CommitRef {
            repository: entry.repository.clone(),
            branch: entry.branch.clone(),
            commit_id: commit_id.to_string(),
        })
    }

    /// Number of indexed commits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no commits are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Provenance store: durable flat name to origin mapping in SQLite.
//!
//! Rows are appended inside one open transaction that the batch runner
//! commits after each archive. A store dropped without [`ProvenanceStore::close`]
//! or [`ProvenanceStore::commit`] loses its pending rows, never committed ones.

use std::path::Path;

use rusqlite::Connection;
use rusqlite::Row;
use rusqlite::params;

use crate::Result;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS SourceMap (
    Uid INTEGER PRIMARY KEY,
    FileName TEXT,
    RepoName TEXT,
    BranchName TEXT,
    CommitId TEXT,
    SrcPath TEXT
);
CREATE INDEX IF NOT EXISTS SourceMapIndex ON SourceMap(FileName);
";

/// A provenance row about to be inserted; the store assigns the uid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProvenanceRecord {
    /// `bucket/key` of the extracted file.
    pub flat_name: String,
    /// Full repository name, `owner/name`.
    pub repository: String,
    /// Branch name.
    pub branch: String,
    /// Commit id.
    pub commit_id: String,
    /// Path inside the repository, below the archive's top-level folder.
    pub original_path: String,
}

/// A stored provenance row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceRecord {
    /// Auto-increment row id.
    pub uid: i64,
    /// `bucket/key` of the extracted file.
    pub flat_name: String,
    /// Full repository name, `owner/name`.
    pub repository: String,
    /// Branch name.
    pub branch: String,
    /// Commit id.
    pub commit_id: String,
    /// Path inside the repository, below the archive's top-level folder.
    pub original_path: String,
}

impl ProvenanceRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            flat_name: row.get(1)?,
            repository: row.get(2)?,
            branch: row.get(3)?,
            commit_id: row.get(4)?,
            original_path: row.get(5)?,
        })
    }
}

/// Append-only writer and reverse-lookup reader for the `SourceMap` table.
///
/// # Examples
///
/// ```
/// use repoflat_core::store::{NewProvenanceRecord, ProvenanceStore};
///
/// # fn main() -> Result<(), repoflat_core::FlattenError> {
/// let mut store = ProvenanceStore::open_in_memory()?;
/// store.append(&NewProvenanceRecord {
///     flat_name: "proj-abc123/0f3c_Main.txt".into(),
///     repository: "org/proj".into(),
///     branch: "main".into(),
///     commit_id: "abc123".into(),
///     original_path: "src/Main.txt".into(),
/// })?;
/// store.commit()?;
///
/// let rows = store.lookup("proj-abc123/0f3c_Main.txt")?;
/// assert_eq!(rows[0].original_path, "src/Main.txt");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ProvenanceStore {
    conn: Connection,
}

impl ProvenanceStore {
    /// Opens (or creates) the store at `path`, creating the table and index
    /// if they are absent. Existing rows are kept.
    ///
    /// # Errors
    ///
    /// Returns `Provenance` if the database cannot be opened or the schema
    /// statement fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::init(conn)
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Inserts a row into the pending transaction and returns its uid.
    pub fn append(&mut self, record: &NewProvenanceRecord) -> Result<i64> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN IMMEDIATE")?;
        }
        self.conn.execute(
            "INSERT INTO SourceMap (FileName, RepoName, BranchName, CommitId, SrcPath)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.flat_name,
                record.repository,
                record.branch,
                record.commit_id,
                record.original_path
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Commits pending rows. A no-op when nothing is pending.
    pub fn commit(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    /// Discards pending rows. A no-op when nothing is pending.
    pub fn rollback(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    /// Returns `true` if rows were appended since the last commit/rollback.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Returns every row recorded for `flat_name`, oldest first.
    pub fn lookup(&self, flat_name: &str) -> Result<Vec<ProvenanceRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT Uid, FileName, RepoName, BranchName, CommitId, SrcPath
             FROM SourceMap WHERE FileName = ?1 ORDER BY Uid",
        )?;
        let rows = stmt
            .query_map(params![flat_name], ProvenanceRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Returns every row in insertion order.
    pub fn records(&self) -> Result<Vec<ProvenanceRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT Uid, FileName, RepoName, BranchName, CommitId, SrcPath
             FROM SourceMap ORDER BY Uid",
        )?;
        let rows = stmt
            .query_map([], ProvenanceRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Number of rows, including pending ones.
    pub fn len(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM SourceMap", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Returns `true` if the table holds no rows.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Commits pending rows and closes the connection.
    pub fn close(mut self) -> Result<()> {
        self.commit()?;
        self.conn.close().map_err(|(_, err)| err.into())
    }
}

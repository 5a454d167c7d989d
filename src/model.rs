use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub id: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: DateTime<Utc>,
    pub parent_ids: Vec<String>,
}

impl CommitInfo {
    pub fn parent_count(&self) -> usize {
        self.parent_ids.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    pub path: String,
    pub added_lines: u32,
    pub deleted_lines: u32,
}

impl FileStats {
    pub fn new(path: impl Into<String>, added_lines: u32, deleted_lines: u32) -> Self {
        Self {
            path: path.into(),
            added_lines,
            deleted_lines,
        }
    }
}

/// A commit as yielded by a history walk.
///
/// The header is always available; per-file statistics are produced on
/// demand because computing them means diffing trees, and commits rejected
/// by the merge policy never need them.
pub trait Commit {
    fn info(&self) -> &CommitInfo;

    fn file_stats(&self) -> Result<Vec<FileStats>>;
}

/// A commit whose file statistics are already known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub info: CommitInfo,
    pub files: Vec<FileStats>,
}

impl Commit for CommitRecord {
    fn info(&self) -> &CommitInfo {
        &self.info
    }

    fn file_stats(&self) -> Result<Vec<FileStats>> {
        Ok(self.files.clone())
    }
}

impl<C: Commit + ?Sized> Commit for &C {
    fn info(&self) -> &CommitInfo {
        (**self).info()
    }

    fn file_stats(&self) -> Result<Vec<FileStats>> {
        (**self).file_stats()
    }
}

/// One line of a report: an author and the numbers shown for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRow {
    pub author: String,
    pub commits: usize,
    pub total: u64,
    pub additions: u64,
    pub deletions: u64,
    pub days: usize,
    pub additions_per_day: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryReport {
    pub name: String,
    pub location: String,
    pub authors: Vec<AuthorRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub repositories: Vec<RepositoryReport>,
    pub total: Vec<AuthorRow>,
}

/// NDJSON line: one author row tagged with the scope it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct ScopedRow<'a> {
    pub scope: &'a str,
    #[serde(flatten)]
    pub row: &'a AuthorRow,
}

#[derive(Debug, Clone, Default)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new() -> Self {
        Self { since: None, until: None }
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if timestamp < &since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if timestamp > &until {
                return false;
            }
        }
        true
    }
}

use crate::error::Result;
use crate::filter::FileFilter;
use crate::model::{Commit, CommitInfo};

/// Which commits contribute to statistics, and what to do when a commit's
/// diff cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitPolicy {
    /// Count merge and root commits too. Off by default: only commits with
    /// exactly one parent count, so lines a merge brings in from an already
    /// walked branch are not counted twice.
    pub include_merges: bool,
    /// Drop a commit whose diff fails with a warning instead of aborting.
    pub skip_unreadable: bool,
}

impl CommitPolicy {
    pub fn counts(&self, info: &CommitInfo) -> bool {
        self.include_merges || info.parent_count() == 1
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineDelta {
    pub additions: u64,
    pub deletions: u64,
}

/// Line changes a commit contributes, or `None` when the commit does not
/// count at all.
///
/// A counted commit whose files are all filtered out still yields
/// `Some(LineDelta::default())`: its day is active even without lines.
pub fn summarize<C: Commit>(
    commit: &C,
    filter: &FileFilter,
    policy: &CommitPolicy,
) -> Result<Option<LineDelta>> {
    let info = commit.info();
    if !policy.counts(info) {
        tracing::trace!(
            event = "commit.skipped_by_policy",
            commit = %info.id,
            parents = info.parent_count()
        );
        return Ok(None);
    }

    let files = match commit.file_stats() {
        Ok(files) => files,
        Err(e) if policy.skip_unreadable && e.is_retrieval() => {
            tracing::warn!(event = "commit.diff_unreadable", commit = %info.id, error = %e);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let delta = filter
        .matching(&files)
        .fold(LineDelta::default(), |acc, fs| LineDelta {
            additions: acc.additions + u64::from(fs.added_lines),
            deletions: acc.deletions + u64::from(fs.deleted_lines),
        });

    Ok(Some(delta))
}

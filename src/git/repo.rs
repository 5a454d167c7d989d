use crate::error::{GitliticsError, Result};
use crate::model::{Commit, CommitInfo, DateRange, FileStats};
use chrono::DateTime;
use gix::object::tree::diff::ChangeDetached;
use gix::{discover, ObjectId, Repository};
use similar::{ChangeTag, TextDiff};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at `path`, or current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => std::env::current_dir()?,
        };

        let repo = discover(&repo_path)?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    /// Bare-clone `url` into `into`, which must be empty or missing.
    pub fn clone_bare(url: &str, into: &Path) -> Result<Self> {
        let should_interrupt = AtomicBool::new(false);
        let mut prepare = gix::prepare_clone_bare(url, into)?;
        let (repo, _outcome) = prepare.fetch_only(gix::progress::Discard, &should_interrupt)?;
        let path = repo.path().to_path_buf();

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Walks every commit reachable from HEAD once, newest tips first.
    ///
    /// Commits outside `range` are not yielded, but their parents are still
    /// followed. An unborn HEAD yields nothing.
    pub fn commits<'r>(&'r self, range: &DateRange) -> Result<CommitWalk<'r>> {
        let mut head = self.repo.head()?;
        let stack = if head.is_unborn() {
            Vec::new()
        } else {
            vec![head.peel_to_commit_in_place()?.id]
        };

        Ok(CommitWalk {
            repo: self,
            range: range.clone(),
            seen: HashSet::new(),
            stack,
        })
    }

    fn load_commit(&self, commit_id: ObjectId) -> Result<(CommitInfo, Vec<ObjectId>)> {
        let commit = self.repo.find_commit(commit_id)?;
        // Days and date ranges use the author time.
        let author = commit.author()?;
        let secs = author.time()?.seconds;
        let timestamp = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| GitliticsError::InvalidDate(format!("Invalid timestamp: {secs}")))?;
        let parents: Vec<ObjectId> = commit.parent_ids().map(|id| id.detach()).collect();

        let info = CommitInfo {
            id: commit_id.to_string(),
            author_name: author.name.to_string(),
            author_email: author.email.to_string(),
            timestamp,
            parent_ids: parents.iter().map(|id| id.to_string()).collect(),
        };
        Ok((info, parents))
    }

    /// Per-file line counts against the first parent, or against the empty
    /// tree for a root commit.
    fn diff_stats(&self, commit_id: ObjectId, first_parent: Option<ObjectId>) -> Result<Vec<FileStats>> {
        let commit_tree = self.repo.find_commit(commit_id)?.tree()?;
        let changes: Vec<ChangeDetached> = match first_parent {
            Some(parent_id) => {
                let parent_tree = self.repo.find_commit(parent_id)?.tree()?;
                self.repo
                    .diff_tree_to_tree(Some(&parent_tree), Some(&commit_tree), None)?
            }
            None => self.repo.diff_tree_to_tree(None, Some(&commit_tree), None)?,
        };

        let mut files = Vec::new();
        for change in changes {
            if let Some(stats) = self.handle_change(change)? {
                files.push(stats);
            }
        }
        Ok(files)
    }

    fn handle_change(&self, change: ChangeDetached) -> Result<Option<FileStats>> {
        let (path, old_id, new_id) = match change {
            ChangeDetached::Addition { id, location, .. } => (location, None, Some(id)),
            ChangeDetached::Deletion { id, location, .. } => (location, Some(id), None),
            ChangeDetached::Modification {
                previous_id,
                id,
                location,
                ..
            } => (location, Some(previous_id), Some(id)),
            ChangeDetached::Rewrite {
                source_id,
                id,
                location,
                ..
            } => (location, Some(source_id), Some(id)),
        };

        let old = old_id.map(|id| self.blob(id)).transpose()?.flatten();
        let new = new_id.map(|id| self.blob(id)).transpose()?.flatten();
        if old.is_none() && new.is_none() {
            return Ok(None);
        }

        let old_data = old.as_deref().unwrap_or(&[]);
        let new_data = new.as_deref().unwrap_or(&[]);
        let (added_lines, deleted_lines) = if is_binary(old_data) || is_binary(new_data) {
            (0, 0)
        } else {
            line_diff(old_data, new_data)
        };

        Ok(Some(FileStats {
            path: path.to_string(),
            added_lines,
            deleted_lines,
        }))
    }

    /// Blob contents, or `None` for trees and submodule commits.
    fn blob(&self, id: ObjectId) -> Result<Option<Vec<u8>>> {
        let object = self.repo.find_object(id)?;
        if object.kind != gix::object::Kind::Blob {
            return Ok(None);
        }
        Ok(Some(object.detach().data))
    }
}

fn is_binary(data: &[u8]) -> bool {
    data.iter().take(8192).any(|&b| b == 0)
}

fn line_diff(old: &[u8], new: &[u8]) -> (u32, u32) {
    let old_text = String::from_utf8_lossy(old);
    let new_text = String::from_utf8_lossy(new);

    let diff = TextDiff::from_lines(old_text.as_ref(), new_text.as_ref());
    let mut added = 0u32;
    let mut deleted = 0u32;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => deleted += 1,
            ChangeTag::Equal => {}
        }
    }
    (added, deleted)
}

/// Depth-first walk over the history reachable from HEAD.
pub struct CommitWalk<'r> {
    repo: &'r GitRepo,
    range: DateRange,
    seen: HashSet<ObjectId>,
    stack: Vec<ObjectId>,
}

impl<'r> CommitWalk<'r> {
    fn visit(&mut self, commit_id: ObjectId) -> Result<Option<PendingCommit<'r>>> {
        let (info, parents) = self.repo.load_commit(commit_id)?;

        let first_parent = parents.first().copied();
        // Pushed in reverse so the first parent is walked first.
        for pid in parents.into_iter().rev() {
            if !self.seen.contains(&pid) {
                self.stack.push(pid);
            }
        }

        if !self.range.contains(&info.timestamp) {
            return Ok(None);
        }

        Ok(Some(PendingCommit {
            repo: self.repo,
            id: commit_id,
            first_parent,
            info,
        }))
    }
}

impl<'r> Iterator for CommitWalk<'r> {
    type Item = Result<PendingCommit<'r>>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(commit_id) = self.stack.pop() {
            if !self.seen.insert(commit_id) {
                continue;
            }
            match self.visit(commit_id) {
                Ok(Some(commit)) => return Some(Ok(commit)),
                Ok(None) => continue,
                Err(e) => {
                    self.stack.clear();
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

/// A commit whose header has been read but whose diff has not.
pub struct PendingCommit<'r> {
    repo: &'r GitRepo,
    id: ObjectId,
    first_parent: Option<ObjectId>,
    info: CommitInfo,
}

impl Commit for PendingCommit<'_> {
    fn info(&self) -> &CommitInfo {
        &self.info
    }

    fn file_stats(&self) -> Result<Vec<FileStats>> {
        self.repo
            .diff_stats(self.id, self.first_parent)
            .map_err(|e| GitliticsError::Diff {
                commit: self.info.id.clone(),
                reason: e.to_string(),
            })
    }
}

use crate::error::Result;
use crate::filter::FileFilter;
use crate::identity::IdentityResolver;
use crate::model::{AuthorRow, Commit, CommitInfo};
use crate::summary::{summarize, CommitPolicy, LineDelta};
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Calendar day a commit is credited to. Timestamps are normalized to UTC
/// before truncation so a run gives the same days regardless of the
/// committers' time zones.
pub fn day_of(timestamp: &DateTime<Utc>) -> NaiveDate {
    timestamp.date_naive()
}

/// Everything the aggregation needs to know about the run's configuration.
#[derive(Debug, Clone, Default)]
pub struct StatSettings {
    pub identity: IdentityResolver,
    pub filter: FileFilter,
    pub policy: CommitPolicy,
}

/// Finalized statistics for one author, in one repository or across all of
/// them. Values are built once and never modified; merging produces a new
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorStat {
    author: String,
    additions: u64,
    deletions: u64,
    commits: Vec<CommitInfo>,
    days: BTreeSet<NaiveDate>,
}

impl AuthorStat {
    /// The additive identity for [`AuthorStat::merge`].
    pub fn empty(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            additions: 0,
            deletions: 0,
            commits: Vec::new(),
            days: BTreeSet::new(),
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn additions(&self) -> u64 {
        self.additions
    }

    pub fn deletions(&self) -> u64 {
        self.deletions
    }

    pub fn total(&self) -> u64 {
        self.additions + self.deletions
    }

    pub fn commits(&self) -> &[CommitInfo] {
        &self.commits
    }

    pub fn days(&self) -> &BTreeSet<NaiveDate> {
        &self.days
    }

    pub fn active_days(&self) -> usize {
        self.days.len()
    }

    /// Integer additions per active day; `None` when there are no active days.
    pub fn additions_per_day(&self) -> Option<u64> {
        self.additions.checked_div(self.days.len() as u64)
    }

    /// Combines two records of the same author. Line counts add up, commits
    /// are concatenated with `self` first, and days are unioned. The same
    /// commit seen in two repositories (a fork, say) is counted twice.
    pub fn merge(&self, other: &AuthorStat) -> AuthorStat {
        let mut commits = Vec::with_capacity(self.commits.len() + other.commits.len());
        commits.extend(self.commits.iter().cloned());
        commits.extend(other.commits.iter().cloned());

        AuthorStat {
            author: self.author.clone(),
            additions: self.additions + other.additions,
            deletions: self.deletions + other.deletions,
            commits,
            days: self.days.union(&other.days).copied().collect(),
        }
    }

    pub fn row(&self) -> AuthorRow {
        AuthorRow {
            author: self.author.clone(),
            commits: self.commits.len(),
            total: self.total(),
            additions: self.additions,
            deletions: self.deletions,
            days: self.active_days(),
            additions_per_day: self.additions_per_day(),
        }
    }
}

struct AuthorBucket {
    additions: u64,
    deletions: u64,
    commits: Vec<CommitInfo>,
    days: BTreeSet<NaiveDate>,
}

impl AuthorBucket {
    fn new() -> Self {
        Self {
            additions: 0,
            deletions: 0,
            commits: Vec::new(),
            days: BTreeSet::new(),
        }
    }

    fn record(&mut self, info: CommitInfo, delta: LineDelta) {
        self.additions += delta.additions;
        self.deletions += delta.deletions;
        self.days.insert(day_of(&info.timestamp));
        self.commits.push(info);
    }

    fn finish(self, author: String) -> AuthorStat {
        AuthorStat {
            author,
            additions: self.additions,
            deletions: self.deletions,
            commits: self.commits,
            days: self.days,
        }
    }
}

/// Author statistics keyed by canonical author key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorStats {
    by_author: HashMap<String, AuthorStat>,
}

impl AuthorStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, author: &str) -> Option<&AuthorStat> {
        self.by_author.get(author)
    }

    pub fn len(&self) -> usize {
        self.by_author.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_author.is_empty()
    }

    /// Cross-repository merge. Neither input is modified; authors missing
    /// from `self` start from the empty record.
    pub fn merge(&self, incoming: &AuthorStats) -> AuthorStats {
        let mut by_author = self.by_author.clone();
        for (author, stat) in &incoming.by_author {
            let merged = match self.by_author.get(author) {
                Some(existing) => existing.merge(stat),
                None => stat.clone(),
            };
            by_author.insert(author.clone(), merged);
        }
        AuthorStats { by_author }
    }

    /// Report rows, highest additions per day first. Ties go to the larger
    /// total, then to the author key in ascending order. Authors without a
    /// rate sort last.
    pub fn rows(&self) -> Vec<AuthorRow> {
        let mut stats: Vec<&AuthorStat> = self.by_author.values().collect();
        stats.sort_by(|a, b| compare_for_report(a, b));
        stats.into_iter().map(AuthorStat::row).collect()
    }
}

fn compare_for_report(a: &AuthorStat, b: &AuthorStat) -> Ordering {
    b.additions_per_day()
        .cmp(&a.additions_per_day())
        .then_with(|| b.total().cmp(&a.total()))
        .then_with(|| a.author.cmp(&b.author))
}

/// Groups one repository's commits by author.
///
/// The stream is consumed once, in the order given. Any error from the
/// stream or from a commit's diff aborts the aggregation.
pub fn aggregate<I, C>(commits: I, settings: &StatSettings) -> Result<AuthorStats>
where
    I: IntoIterator<Item = Result<C>>,
    C: Commit,
{
    let mut buckets: HashMap<String, AuthorBucket> = HashMap::new();
    let mut seen = 0usize;
    let mut counted = 0usize;

    for commit in commits {
        let commit = commit?;
        seen += 1;

        let Some(delta) = summarize(&commit, &settings.filter, &settings.policy)? else {
            continue;
        };
        counted += 1;

        let info = commit.info();
        let author = settings.identity.resolve_commit(info);
        buckets
            .entry(author)
            .or_insert_with(AuthorBucket::new)
            .record(info.clone(), delta);
    }

    tracing::debug!(
        event = "stats.aggregated",
        commits_seen = seen,
        commits_counted = counted,
        authors = buckets.len()
    );

    let by_author = buckets
        .into_iter()
        .map(|(author, bucket)| (author.clone(), bucket.finish(author)))
        .collect();
    Ok(AuthorStats { by_author })
}

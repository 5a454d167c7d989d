use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use gitlitics::error::{GitliticsError, Result};
use gitlitics::filter::FileFilter;
use gitlitics::identity::{AliasTable, IdentityField, IdentityResolver};
use gitlitics::model::{Commit, CommitInfo, CommitRecord, FileStats};
use gitlitics::stats::{aggregate, AuthorStat, AuthorStats, StatSettings};
use gitlitics::summary::{summarize, CommitPolicy, LineDelta};
use pretty_assertions::assert_eq;
use std::cell::Cell;

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn commit(
    id: &str,
    name: &str,
    email: &str,
    when: DateTime<Utc>,
    parents: usize,
    files: &[(&str, u32, u32)],
) -> CommitRecord {
    CommitRecord {
        info: CommitInfo {
            id: id.to_string(),
            author_name: name.to_string(),
            author_email: email.to_string(),
            timestamp: when,
            parent_ids: (0..parents).map(|i| format!("{id}-parent{i}")).collect(),
        },
        files: files
            .iter()
            .map(|(path, added, deleted)| FileStats::new(*path, *added, *deleted))
            .collect(),
    }
}

fn run(commits: Vec<CommitRecord>, settings: &StatSettings) -> AuthorStats {
    aggregate(commits.into_iter().map(Ok), settings).unwrap()
}

fn settings(field: IdentityField) -> StatSettings {
    StatSettings {
        identity: IdentityResolver::new(field, &AliasTable::new()).unwrap(),
        ..StatSettings::default()
    }
}

#[test]
fn same_email_merges_differently_spelled_names() {
    let commits = vec![
        commit("c1", "Alice", "alice@x.com", at(2024, 3, 1, 10), 1, &[("README.md", 10, 2)]),
        commit("c2", "alice", "alice@x.com", at(2024, 3, 2, 10), 1, &[("notes.txt", 5, 1)]),
    ];
    let stats = run(commits, &settings(IdentityField::Mail));

    assert_eq!(stats.len(), 1);
    let alice = stats.get("alice@x.com").unwrap();
    assert_eq!(alice.additions(), 15);
    assert_eq!(alice.deletions(), 3);
    assert_eq!(alice.commits().len(), 2);
    assert_eq!(alice.total(), 18);
    assert_eq!(alice.commits()[0].id, "c1");
    assert_eq!(alice.commits()[1].id, "c2");
}

#[test]
fn name_field_keeps_spellings_apart_unless_aliased() {
    let commits = || {
        vec![
            commit("c1", "Alice", "alice@x.com", at(2024, 3, 1, 10), 1, &[("a.go", 1, 0)]),
            commit("c2", "alice", "alice@x.com", at(2024, 3, 1, 11), 1, &[("a.go", 2, 0)]),
        ]
    };

    let stats = run(commits(), &settings(IdentityField::Name));
    assert_eq!(stats.len(), 2);

    let mut aliases = AliasTable::new();
    aliases.insert("Alice".to_string(), vec!["alice".to_string()]);
    let aliased = StatSettings {
        identity: IdentityResolver::new(IdentityField::Name, &aliases).unwrap(),
        ..StatSettings::default()
    };
    let stats = run(commits(), &aliased);
    assert_eq!(stats.len(), 1);
    assert_eq!(stats.get("Alice").unwrap().additions(), 3);
}

#[test]
fn merge_commits_are_excluded_by_default() {
    let commits = vec![
        commit("c1", "Bob", "bob@x.com", at(2024, 3, 1, 10), 1, &[("a.go", 7, 3)]),
        commit("m1", "Bob", "bob@x.com", at(2024, 3, 5, 10), 2, &[("a.go", 100, 50)]),
    ];
    let stats = run(commits, &settings(IdentityField::Name));

    let bob = stats.get("Bob").unwrap();
    assert_eq!(bob.additions(), 7);
    assert_eq!(bob.deletions(), 3);
    assert_eq!(bob.commits().len(), 1);
    assert_eq!(bob.active_days(), 1);
}

#[test]
fn root_commits_are_excluded_by_default_and_counted_when_merges_are_included() {
    let commits = || {
        vec![
            commit("r", "Bob", "bob@x.com", at(2024, 3, 1, 10), 0, &[("a.go", 40, 0)]),
            commit("m", "Bob", "bob@x.com", at(2024, 3, 2, 10), 2, &[("a.go", 100, 50)]),
        ]
    };

    let stats = run(commits(), &settings(IdentityField::Name));
    assert!(stats.get("Bob").is_none());
    assert!(stats.is_empty());

    let everything = StatSettings {
        policy: CommitPolicy {
            include_merges: true,
            ..CommitPolicy::default()
        },
        ..StatSettings::default()
    };
    let stats = run(commits(), &everything);
    let bob = stats.get("Bob").unwrap();
    assert_eq!(bob.additions(), 140);
    assert_eq!(bob.deletions(), 50);
    assert_eq!(bob.active_days(), 2);
}

#[test]
fn filtered_out_commits_still_mark_the_day_active() {
    let filter = FileFilter::new(Some(r"\.go$"), Some(r"_test\.go$")).unwrap();
    let settings = StatSettings {
        filter,
        ..StatSettings::default()
    };
    let commits = vec![
        commit("c1", "Carol", "c@x.com", at(2024, 3, 1, 9), 1, &[("main.go", 10, 1), ("main_test.go", 30, 3)]),
        commit("c2", "Carol", "c@x.com", at(2024, 3, 2, 9), 1, &[("docs/readme.md", 99, 9)]),
    ];
    let stats = run(commits, &settings);

    let carol = stats.get("Carol").unwrap();
    assert_eq!(carol.additions(), 10);
    assert_eq!(carol.deletions(), 1);
    assert_eq!(carol.commits().len(), 2);
    assert_eq!(carol.active_days(), 2);
    assert_eq!(carol.additions_per_day(), Some(5));
}

#[test]
fn several_commits_on_one_day_count_one_active_day() {
    let commits = vec![
        commit("c1", "Dan", "d@x.com", at(2024, 3, 1, 1), 1, &[("a", 4, 0)]),
        commit("c2", "Dan", "d@x.com", at(2024, 3, 1, 13), 1, &[("a", 4, 0)]),
        commit("c3", "Dan", "d@x.com", at(2024, 3, 1, 23), 1, &[("a", 4, 0)]),
    ];
    let stats = run(commits, &StatSettings::default());
    let dan = stats.get("Dan").unwrap();
    assert_eq!(dan.active_days(), 1);
    assert_eq!(dan.additions_per_day(), Some(12));
}

#[test]
fn days_are_taken_in_utc() {
    // 23:30 at +02:00 on the 1st is 21:30 UTC on the 1st;
    // 01:30 at +05:00 on the 2nd is 20:30 UTC on the 1st.
    let local_first = chrono::DateTime::parse_from_rfc3339("2024-03-01T23:30:00+02:00")
        .unwrap()
        .with_timezone(&Utc);
    let local_second = chrono::DateTime::parse_from_rfc3339("2024-03-02T01:30:00+05:00")
        .unwrap()
        .with_timezone(&Utc);
    let commits = vec![
        commit("c1", "Eve", "e@x.com", local_first, 1, &[("a", 1, 0)]),
        commit("c2", "Eve", "e@x.com", local_second, 1, &[("a", 1, 0)]),
    ];
    let stats = run(commits, &StatSettings::default());
    let eve = stats.get("Eve").unwrap();
    assert_eq!(eve.days().iter().copied().collect::<Vec<_>>(), vec![day(2024, 3, 1)]);
}

#[test]
fn empty_record_has_no_rate_instead_of_dividing_by_zero() {
    let empty = AuthorStat::empty("nobody");
    assert_eq!(empty.active_days(), 0);
    assert_eq!(empty.additions_per_day(), None);
    assert_eq!(empty.row().additions_per_day, None);
    assert_eq!(empty.total(), 0);
}

fn single(id: &str, when: DateTime<Utc>, added: u32, deleted: u32) -> AuthorStats {
    run(
        vec![commit(id, "Alice", "a@x.com", when, 1, &[("a", added, deleted)])],
        &StatSettings::default(),
    )
}

#[test]
fn merging_unions_days_and_sums_lines() {
    let repo_a = single("a1", at(2024, 3, 1, 10), 10, 0);
    let repo_b = run(
        vec![
            commit("b1", "Alice", "a@x.com", at(2024, 3, 1, 12), 1, &[("b", 2, 0)]),
            commit("b2", "Alice", "a@x.com", at(2024, 3, 2, 12), 1, &[("b", 3, 0)]),
        ],
        &StatSettings::default(),
    );

    let merged = repo_a.merge(&repo_b);
    let alice = merged.get("Alice").unwrap();
    assert_eq!(alice.additions(), 15);
    assert_eq!(alice.active_days(), 2);
    assert_eq!(
        alice.commits().iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
        vec!["a1", "b1", "b2"]
    );

    // inputs are untouched
    assert_eq!(repo_a.get("Alice").unwrap().additions(), 10);
    assert_eq!(repo_b.get("Alice").unwrap().additions(), 5);
}

#[test]
fn merge_order_does_not_change_numbers() {
    let a = single("a", at(2024, 1, 1, 0), 3, 1);
    let b = single("b", at(2024, 1, 2, 0), 5, 2);
    let c = single("c", at(2024, 1, 1, 5), 7, 4);

    let abc = AuthorStats::new().merge(&a).merge(&b).merge(&c);
    let cab = AuthorStats::new().merge(&c).merge(&a).merge(&b);
    let grouped = a.merge(&b.merge(&c));

    for merged in [&cab, &grouped] {
        let x = abc.get("Alice").unwrap();
        let y = merged.get("Alice").unwrap();
        assert_eq!(x.additions(), y.additions());
        assert_eq!(x.deletions(), y.deletions());
        assert_eq!(x.days(), y.days());
        assert_eq!(x.commits().len(), y.commits().len());
    }
    assert_eq!(abc.get("Alice").unwrap().additions(), 15);
    assert_eq!(abc.get("Alice").unwrap().active_days(), 2);
}

#[test]
fn same_commit_in_two_repositories_counts_twice() {
    let fork = single("shared", at(2024, 1, 1, 0), 4, 0);
    let merged = fork.merge(&fork);
    let alice = merged.get("Alice").unwrap();
    assert_eq!(alice.additions(), 8);
    assert_eq!(alice.commits().len(), 2);
    assert_eq!(alice.active_days(), 1);
}

#[test]
fn empty_record_is_the_merge_identity() {
    let stats = single("a", at(2024, 1, 1, 0), 9, 4);
    let alice = stats.get("Alice").unwrap();
    let merged = AuthorStat::empty("Alice").merge(alice);
    assert_eq!(&merged, alice);
}

#[test]
fn rows_sort_by_additions_per_day_then_total_then_author() {
    let commits = vec![
        // 20/day over one day
        commit("1", "slow", "s@x", at(2024, 1, 1, 0), 1, &[("a", 20, 0)]),
        // 30/day over two days
        commit("2", "fast", "f@x", at(2024, 1, 1, 0), 1, &[("a", 30, 0)]),
        commit("3", "fast", "f@x", at(2024, 1, 2, 0), 1, &[("a", 30, 0)]),
        // 20/day but more deletions
        commit("4", "churn", "c@x", at(2024, 1, 1, 0), 1, &[("a", 20, 50)]),
        // exactly tied with slow
        commit("5", "also-slow", "as@x", at(2024, 1, 1, 0), 1, &[("a", 20, 0)]),
    ];
    let stats = run(commits, &StatSettings::default());
    let rows = stats.rows();

    let order: Vec<&str> = rows.iter().map(|r| r.author.as_str()).collect();
    assert_eq!(order, vec!["fast", "churn", "also-slow", "slow"]);

    let fast = &rows[0];
    assert_eq!(fast.commits, 2);
    assert_eq!(fast.total, 60);
    assert_eq!(fast.days, 2);
    assert_eq!(fast.additions_per_day, Some(30));
    for row in &rows {
        assert_eq!(row.total, row.additions + row.deletions);
    }
}

struct BrokenDiff(CommitInfo);

impl Commit for BrokenDiff {
    fn info(&self) -> &CommitInfo {
        &self.0
    }

    fn file_stats(&self) -> Result<Vec<FileStats>> {
        Err(GitliticsError::Diff {
            commit: self.0.id.clone(),
            reason: "object missing".to_string(),
        })
    }
}

#[test]
fn diff_failure_aborts_aggregation() {
    let broken = BrokenDiff(commit("x", "Zed", "z@x", at(2024, 1, 1, 0), 1, &[]).info);
    let result = aggregate(vec![Ok(broken)], &StatSettings::default());
    assert!(matches!(result, Err(GitliticsError::Diff { .. })));
}

#[test]
fn diff_failure_can_be_skipped() {
    let settings = StatSettings {
        policy: CommitPolicy {
            skip_unreadable: true,
            ..CommitPolicy::default()
        },
        ..StatSettings::default()
    };
    let broken = BrokenDiff(commit("x", "Zed", "z@x", at(2024, 1, 1, 0), 1, &[]).info);
    let summary = summarize(&broken, &settings.filter, &settings.policy).unwrap();
    assert_eq!(summary, None);

    let stats = aggregate(vec![Ok(broken)], &settings).unwrap();
    assert!(stats.is_empty());
}

#[test]
fn stream_errors_abort_aggregation() {
    let items: Vec<Result<CommitRecord>> = vec![
        Ok(commit("c1", "Amy", "a@x", at(2024, 1, 1, 0), 1, &[("a", 1, 0)])),
        Err(GitliticsError::InvalidDate("Invalid timestamp: -1".to_string())),
    ];
    assert!(aggregate(items, &StatSettings::default()).is_err());
}

struct CountingCommit {
    record: CommitRecord,
    diffs: Cell<usize>,
}

impl Commit for CountingCommit {
    fn info(&self) -> &CommitInfo {
        &self.record.info
    }

    fn file_stats(&self) -> Result<Vec<FileStats>> {
        self.diffs.set(self.diffs.get() + 1);
        self.record.file_stats()
    }
}

#[test]
fn excluded_commits_are_never_diffed() {
    let merge = CountingCommit {
        record: commit("m", "Amy", "a@x", at(2024, 1, 1, 0), 2, &[("a", 1, 0)]),
        diffs: Cell::new(0),
    };
    let summary = summarize(&merge, &FileFilter::default(), &CommitPolicy::default()).unwrap();
    assert_eq!(summary, None);
    assert_eq!(merge.diffs.get(), 0);

    let plain = CountingCommit {
        record: commit("p", "Amy", "a@x", at(2024, 1, 1, 0), 1, &[("a", 1, 2)]),
        diffs: Cell::new(0),
    };
    let summary = summarize(&plain, &FileFilter::default(), &CommitPolicy::default()).unwrap();
    assert_eq!(
        summary,
        Some(LineDelta {
            additions: 1,
            deletions: 2
        })
    );
    assert_eq!(plain.diffs.get(), 1);
}

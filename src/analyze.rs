use crate::config::RunSettings;
use crate::error::{GitliticsError, Result};
use crate::git::{is_remote, repository_name, Credentials, GitRepo};
use crate::stats::{aggregate, AuthorStats};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Statistics of one fully processed repository.
#[derive(Debug, Clone)]
pub struct RepositoryOutcome {
    pub name: String,
    pub location: String,
    pub stats: AuthorStats,
}

/// Processes every configured repository in order, one at a time.
///
/// `on_repository` sees each repository as soon as it is done, so callers
/// can print incrementally. The first failure ends the run; the
/// accumulated totals are returned only when every repository succeeded.
pub fn run<F>(
    settings: &RunSettings,
    credentials: Option<&Credentials>,
    progress: bool,
    mut on_repository: F,
) -> Result<AuthorStats>
where
    F: FnMut(&RepositoryOutcome) -> Result<()>,
{
    let mut total = AuthorStats::new();

    for location in &settings.paths {
        let stats = analyze_location(location, settings, credentials, progress).map_err(|e| {
            tracing::error!(event = "repo.analyze_failed", location = %location, error = %e);
            GitliticsError::Repository {
                location: location.clone(),
                source: Box::new(e),
            }
        })?;
        let outcome = RepositoryOutcome {
            name: repository_name(location),
            location: location.clone(),
            stats,
        };
        on_repository(&outcome)?;
        total = total.merge(&outcome.stats);
    }

    tracing::info!(
        event = "run.completed",
        repositories = settings.paths.len(),
        authors = total.len()
    );
    Ok(total)
}

/// Opens or clones one repository and aggregates its history.
pub fn analyze_location(
    location: &str,
    settings: &RunSettings,
    credentials: Option<&Credentials>,
    progress: bool,
) -> Result<AuthorStats> {
    tracing::info!(event = "repo.analyze_started", location = %location);

    let stats = if is_remote(location) {
        let url = match credentials {
            Some(creds) => creds.apply(location),
            None => location.to_string(),
        };
        let checkout = tempfile::tempdir()?;
        let pb = spinner(progress, "{spinner:.green} {msg}", format!("Cloning {location}..."));
        let cloned = GitRepo::clone_bare(&url, checkout.path());
        pb.finish_and_clear();
        let repo = cloned.map_err(|e| match credentials {
            Some(creds) => GitliticsError::CloneFailed {
                location: location.to_string(),
                reason: creds.redact(&e.to_string()),
            },
            None => e,
        })?;
        tracing::debug!(event = "repo.cloned", location = %location, into = %checkout.path().display());
        collect(&repo, location, settings, progress)?
    } else {
        let repo = GitRepo::open(Some(Path::new(location)))?;
        collect(&repo, location, settings, progress)?
    };

    tracing::info!(
        event = "repo.analyze_completed",
        location = %location,
        authors = stats.len()
    );
    Ok(stats)
}

fn collect(repo: &GitRepo, location: &str, settings: &RunSettings, progress: bool) -> Result<AuthorStats> {
    tracing::debug!(event = "repo.opened", location = %location, path = %repo.path().display());
    let pb = spinner(progress, "{spinner:.green} {msg} {pos}", format!("Collecting commits from {location}..."));
    let walk = repo.commits(&settings.range)?.inspect(|_| pb.inc(1));
    let stats = aggregate(walk, &settings.stats);
    pb.finish_and_clear();
    stats
}

fn spinner(enabled: bool, template: &str, message: String) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

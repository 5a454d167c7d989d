//! Run configuration.
//!
//! Values come from a YAML file (missing file means all defaults) and are
//! then overridden by command-line flags. Everything that can be wrong with
//! the configuration is reported by [`Config::settings`] before any
//! repository is opened.

use crate::error::{GitliticsError, Result};
use crate::filter::FileFilter;
use crate::identity::{AliasTable, IdentityField, IdentityResolver};
use crate::model::DateRange;
use crate::range::resolve_range;
use crate::stats::StatSettings;
use crate::summary::CommitPolicy;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "gitlitics.yml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub paths: Vec<String>,
    pub author: AuthorConfig,
    pub files: FilesConfig,
    pub commits: CommitsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorConfig {
    pub key: IdentityField,
    pub duplicates: AliasTable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilesConfig {
    pub include: Option<String>,
    pub exclude: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommitsConfig {
    pub include_merges: bool,
    pub skip_unreadable: bool,
    pub since: Option<String>,
    pub until: Option<String>,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub paths: Option<String>,
    pub key: Option<IdentityField>,
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub include_merges: bool,
    pub skip_unreadable: bool,
    pub since: Option<String>,
    pub until: Option<String>,
}

/// Validated, ready-to-use form of a [`Config`].
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub paths: Vec<String>,
    pub stats: StatSettings,
    pub range: DateRange,
}

impl Config {
    /// Reads `path`. A missing file yields the defaults; unreadable or
    /// malformed files are errors.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                tracing::debug!(event = "config.loaded", path = %path.display());
                Self::from_yaml(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(event = "config.not_found", path = %path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(paths) = overrides.paths.filter(|p| !p.trim().is_empty()) {
            self.paths = split_paths(&paths);
        }
        if let Some(key) = overrides.key {
            self.author.key = key;
        }
        if overrides.include.is_some() {
            self.files.include = overrides.include;
        }
        if overrides.exclude.is_some() {
            self.files.exclude = overrides.exclude;
        }
        self.commits.include_merges |= overrides.include_merges;
        self.commits.skip_unreadable |= overrides.skip_unreadable;
        if overrides.since.is_some() {
            self.commits.since = overrides.since;
        }
        if overrides.until.is_some() {
            self.commits.until = overrides.until;
        }
    }

    /// Validates the configuration and builds the run settings.
    pub fn settings(&self) -> Result<RunSettings> {
        let paths: Vec<String> = self
            .paths
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if paths.is_empty() {
            return Err(GitliticsError::Config(
                "no repositories configured: set `paths` in the config file or pass --paths".to_string(),
            ));
        }

        let identity = IdentityResolver::new(self.author.key, &self.author.duplicates)?;
        let filter = FileFilter::new(self.files.include.as_deref(), self.files.exclude.as_deref())?;
        let policy = CommitPolicy {
            include_merges: self.commits.include_merges,
            skip_unreadable: self.commits.skip_unreadable,
        };
        let range = resolve_range(self.commits.since.as_deref(), self.commits.until.as_deref(), Utc::now())?;

        Ok(RunSettings {
            paths,
            stats: StatSettings {
                identity,
                filter,
                policy,
            },
            range,
        })
    }
}

fn split_paths(paths: &str) -> Vec<String> {
    paths
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

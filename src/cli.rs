use crate::analyze;
use crate::config::{Config, ConfigOverrides, DEFAULT_CONFIG_FILE};
use crate::git::Credentials;
use crate::identity::IdentityField;
use crate::model::RepositoryReport;
use crate::report::{self, TOTAL_SCOPE};
use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gitlitics")]
#[command(about = "Per-author contribution statistics across git repositories")]
#[command(after_help = "Use GITLAB_USER and GITLAB_PASSWORD for HTTP auth when cloning")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Repository URLs or local paths, comma-separated")]
    pub paths: Option<String>,

    #[arg(long, default_value = DEFAULT_CONFIG_FILE, help = "Path to config")]
    pub conf: PathBuf,

    #[clap(flatten)]
    pub filters: FilterArgs,

    #[arg(long, help = "Output as JSON", conflicts_with = "ndjson")]
    pub json: bool,

    #[arg(long, help = "Output as NDJSON")]
    pub ndjson: bool,

    #[arg(short, long, action = ArgAction::Count, help = "More log output on stderr (repeatable)")]
    pub verbose: u8,

    #[arg(long, help = "Log as JSON lines")]
    pub log_json: bool,
}

#[derive(Args, Clone, Default)]
pub struct FilterArgs {
    #[arg(long, value_enum, help = "Author identity field")]
    pub key: Option<IdentityField>,

    #[arg(long, help = "Only count files whose path matches this regex")]
    pub include: Option<String>,

    #[arg(long, help = "Skip files whose path matches this regex")]
    pub exclude: Option<String>,

    #[arg(long, help = "Count merge and root commits too")]
    pub include_merges: bool,

    #[arg(long, help = "Skip commits whose diff cannot be read instead of failing")]
    pub skip_unreadable: bool,

    #[arg(long, help = "Only commits at or after this date (RFC3339, YYYY-MM-DD, or '2 weeks ago')")]
    pub since: Option<String>,

    #[arg(long, help = "Only commits at or before this date (RFC3339, YYYY-MM-DD, or '2 weeks ago')")]
    pub until: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Json,
    Ndjson,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        crate::logging::init(self.verbose, self.log_json);

        let mut config = Config::load(&self.conf)
            .with_context(|| format!("Failed to load config {}", self.conf.display()))?;
        config.apply_overrides(self.overrides());
        let settings = config.settings().context("Invalid configuration")?;

        let format = if self.json {
            OutputFormat::Json
        } else if self.ndjson {
            OutputFormat::Ndjson
        } else {
            OutputFormat::Table
        };
        let credentials = Credentials::from_env();

        let mut repositories = Vec::new();
        let total = analyze::run(
            &settings,
            credentials.as_ref(),
            format == OutputFormat::Table,
            |outcome| {
                let rows = outcome.stats.rows();
                match format {
                    OutputFormat::Table => report::print_table(&outcome.name, &rows)?,
                    OutputFormat::Ndjson => report::output_ndjson(&outcome.name, &rows)?,
                    OutputFormat::Json => repositories.push(RepositoryReport {
                        name: outcome.name.clone(),
                        location: outcome.location.clone(),
                        authors: rows,
                    }),
                }
                Ok(())
            },
        )
        .context("Failed to analyze repositories")?;

        let total_rows = total.rows();
        match format {
            OutputFormat::Table => report::print_table(TOTAL_SCOPE, &total_rows)?,
            OutputFormat::Ndjson => report::output_ndjson(TOTAL_SCOPE, &total_rows)?,
            OutputFormat::Json => {
                let output = report::build_output(
                    repositories,
                    total_rows,
                    config.commits.since.clone(),
                    config.commits.until.clone(),
                );
                report::output_json(&output)?;
            }
        }

        Ok(())
    }

    fn overrides(&self) -> ConfigOverrides {
        let filters = self.filters.clone();
        ConfigOverrides {
            paths: self.paths.clone(),
            key: filters.key,
            include: filters.include,
            exclude: filters.exclude,
            include_merges: filters.include_merges,
            skip_unreadable: filters.skip_unreadable,
            since: filters.since,
            until: filters.until,
        }
    }
}

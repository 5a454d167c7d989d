use crate::error::Result;
use crate::model::{AuthorRow, RepositoryReport, ReportOutput, ScopedRow, SCHEMA_VERSION};
use chrono::Utc;
use console::style;
use std::fmt::{self, Write};

pub const TOTAL_SCOPE: &str = "total";

const HEADERS: [&str; 7] = [
    "author",
    "commits",
    "total",
    "additions",
    "deletions",
    "days",
    "additions/day",
];

/// Writes the table for one scope (a repository or the overall total).
pub fn write_table<W: Write>(out: &mut W, title: &str, rows: &[AuthorRow]) -> fmt::Result {
    let author_width = rows
        .iter()
        .map(|r| console::measure_text_width(&r.author))
        .chain(std::iter::once(HEADERS[0].len()))
        .max()
        .unwrap_or(HEADERS[0].len());

    writeln!(out, "{}", style(format!("{title}:")).bold())?;
    if rows.is_empty() {
        writeln!(out, "  no commits matched")?;
        return Ok(());
    }

    let header = format!(
        "  {} {:>8} {:>10} {:>10} {:>10} {:>6} {:>14}",
        console::pad_str(HEADERS[0], author_width, console::Alignment::Left, None),
        HEADERS[1],
        HEADERS[2],
        HEADERS[3],
        HEADERS[4],
        HEADERS[5],
        HEADERS[6]
    );
    writeln!(out, "{}", style(header).green().underlined())?;

    for row in rows {
        let author = console::pad_str(&row.author, author_width, console::Alignment::Left, None);
        writeln!(
            out,
            "  {} {:>8} {:>10} {:>10} {:>10} {:>6} {:>14}",
            style(author).yellow(),
            row.commits,
            row.total,
            style(row.additions).green(),
            style(row.deletions).red(),
            row.days,
            row.additions_per_day.unwrap_or(0)
        )?;
    }
    Ok(())
}

pub fn print_table(title: &str, rows: &[AuthorRow]) -> Result<()> {
    let mut table = String::new();
    write_table(&mut table, title, rows)?;
    println!("{table}");
    Ok(())
}

pub fn build_output(
    repositories: Vec<RepositoryReport>,
    total: Vec<AuthorRow>,
    since: Option<String>,
    until: Option<String>,
) -> ReportOutput {
    ReportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        since,
        until,
        repositories,
        total,
    }
}

pub fn output_json(output: &ReportOutput) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

pub fn output_ndjson(scope: &str, rows: &[AuthorRow]) -> Result<()> {
    for row in rows {
        println!("{}", serde_json::to_string(&ScopedRow { scope, row })?);
    }
    Ok(())
}

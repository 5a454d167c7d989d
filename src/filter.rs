use crate::error::Result;
use crate::model::FileStats;
use regex::Regex;

/// Decides which changed files count toward line statistics.
///
/// Patterns are regular expressions searched anywhere in the path recorded
/// by the diff; an exclude match wins over an include match.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl FileFilter {
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        Ok(Self {
            include: include.map(Regex::new).transpose()?,
            exclude: exclude.map(Regex::new).transpose()?,
        })
    }

    pub fn includes(&self, path: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(path) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(path) {
                return false;
            }
        }
        true
    }

    pub fn matching<'a>(&'a self, files: &'a [FileStats]) -> impl Iterator<Item = &'a FileStats> + 'a {
        files.iter().filter(move |fs| self.includes(&fs.path))
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GitliticsError>;

#[derive(Error, Debug)]
pub enum GitliticsError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Signature date error: {0}")]
    SignatureDate(#[from] gix::date::parse::Error),
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
    #[error("Failed to compute file statistics for commit {commit}: {reason}")]
    Diff { commit: String, reason: String },
    #[error("Failed to process repository {location}: {source}")]
    Repository {
        location: String,
        #[source]
        source: Box<GitliticsError>,
    },
    #[error("Git error: {0}")]
    Git(#[from] Box<gix::open::Error>),
    #[error("Git discover error: {0}")]
    GitDiscover(#[from] Box<gix::discover::Error>),
    #[error("Failed to clone {location}: {reason}")]
    CloneFailed { location: String, reason: String },
    #[error("Clone error: {0}")]
    Clone(#[from] Box<gix::clone::Error>),
    #[error("Fetch error: {0}")]
    Fetch(#[from] Box<gix::clone::fetch::Error>),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Reference find error: {0}")]
    RefFind(#[from] Box<gix::reference::find::existing::Error>),
    #[error("Head peel error: {0}")]
    HeadPeel(#[from] Box<gix::head::peel::to_commit::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Diff tree to tree error: {0}")]
    DiffTreeToTree(#[from] Box<gix::repository::diff_tree_to_tree::Error>),
}

impl GitliticsError {
    /// Errors raised while reading commits or their diffs, as opposed to
    /// opening the repository or reading configuration.
    pub fn is_retrieval(&self) -> bool {
        matches!(
            self,
            GitliticsError::Diff { .. }
                | GitliticsError::SignatureDate(_)
                | GitliticsError::ObjectFind(_)
                | GitliticsError::ObjectFindConv(_)
                | GitliticsError::ObjectDecode(_)
                | GitliticsError::Commit(_)
                | GitliticsError::DiffTreeToTree(_)
        )
    }
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::open::Error> for GitliticsError {
    fn from(err: gix::open::Error) -> Self {
        GitliticsError::Git(Box::new(err))
    }
}

impl From<gix::discover::Error> for GitliticsError {
    fn from(err: gix::discover::Error) -> Self {
        GitliticsError::GitDiscover(Box::new(err))
    }
}

impl From<gix::clone::Error> for GitliticsError {
    fn from(err: gix::clone::Error) -> Self {
        GitliticsError::Clone(Box::new(err))
    }
}

impl From<gix::clone::fetch::Error> for GitliticsError {
    fn from(err: gix::clone::fetch::Error) -> Self {
        GitliticsError::Fetch(Box::new(err))
    }
}

impl From<gix::object::find::existing::Error> for GitliticsError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        GitliticsError::ObjectFind(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for GitliticsError {
    fn from(err: gix::object::commit::Error) -> Self {
        GitliticsError::Commit(Box::new(err))
    }
}

impl From<gix::reference::find::existing::Error> for GitliticsError {
    fn from(err: gix::reference::find::existing::Error) -> Self {
        GitliticsError::RefFind(Box::new(err))
    }
}

impl From<gix::head::peel::to_commit::Error> for GitliticsError {
    fn from(err: gix::head::peel::to_commit::Error) -> Self {
        GitliticsError::HeadPeel(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for GitliticsError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        GitliticsError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for GitliticsError {
    fn from(err: gix::objs::decode::Error) -> Self {
        GitliticsError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::repository::diff_tree_to_tree::Error> for GitliticsError {
    fn from(err: gix::repository::diff_tree_to_tree::Error) -> Self {
        GitliticsError::DiffTreeToTree(Box::new(err))
    }
}

pub mod remote;
pub mod repo;

pub use remote::{is_remote, repository_name, Credentials};
pub use repo::{CommitWalk, GitRepo, PendingCommit};

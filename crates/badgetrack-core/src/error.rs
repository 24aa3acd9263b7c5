use thiserror::Error;

/// Read-side validation errors. These are reported as structured data to the
/// caller, never panics: a repo-scoped query without a repo is a client
/// mistake, not a server fault.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("repo parameter required for repo-scoped stats")]
    RepoRequired,

    #[error("unknown stats dimension: {0}")]
    UnknownDimension(String),
}

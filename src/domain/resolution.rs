/// Outcome of resolving one dependency against the branch under test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    /// Name of the dependency repository
    pub repository: String,
    /// Whether the remote has a branch named exactly like the branch under test
    pub matched: bool,
    /// Branch checked out after resolution
    pub effective_branch: String,
}

impl ResolutionResult {
    pub fn matched(repository: impl Into<String>, branch: impl Into<String>) -> Self {
        ResolutionResult {
            repository: repository.into(),
            matched: true,
            effective_branch: branch.into(),
        }
    }

    pub fn unmatched(repository: impl Into<String>, default_branch: impl Into<String>) -> Self {
        ResolutionResult {
            repository: repository.into(),
            matched: false,
            effective_branch: default_branch.into(),
        }
    }
}

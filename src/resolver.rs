//! Cross-repository branch resolution
//!
//! When the primary repository is tested on branch `B`, every dependency that
//! also has a remote branch named `B` is switched to it, so co-developed
//! changes are tested together. Dependencies without `B` stay on their
//! default branch. Each dependency is resolved independently of the others.

use std::thread;
use tracing::{info, warn};

use crate::config::{QueryFailurePolicy, ResolverConfig};
use crate::domain::{BranchName, ResolutionResult, WorkspaceMember};
use crate::error::{Result, WorkspaceError};
use crate::git::RepositoryHost;
use crate::warning::PipelineWarning;

/// Output of the resolution stage, in dependency input order
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub results: Vec<ResolutionResult>,
    pub warnings: Vec<PipelineWarning>,
}

/// Resolves dependencies against a branch name using a repository host
pub struct BranchResolver<'a, H> {
    host: &'a H,
    parallel: bool,
    on_query_error: QueryFailurePolicy,
}

impl<'a, H: RepositoryHost> BranchResolver<'a, H> {
    pub fn new(host: &'a H) -> Self {
        Self::with_config(host, &ResolverConfig::default())
    }

    pub fn with_config(host: &'a H, config: &ResolverConfig) -> Self {
        BranchResolver {
            host,
            parallel: config.parallel,
            on_query_error: config.on_query_error,
        }
    }

    /// Resolve every dependency against `branch`
    ///
    /// Matched dependencies are checked out on `branch` as a side effect.
    ///
    /// # Returns
    /// * `Ok(Resolution)` - One result per dependency, in input order
    /// * `Err` - A query could not be answered (under the `fail` policy) or a
    ///   matched branch could not be checked out. When several dependencies
    ///   fail, the first in input order is reported.
    pub fn resolve(
        &self,
        branch: &BranchName,
        dependencies: &[&WorkspaceMember],
    ) -> Result<Resolution> {
        let outcomes: Vec<Result<Outcome>> = if self.parallel && dependencies.len() > 1 {
            thread::scope(|scope| {
                let handles: Vec<_> = dependencies
                    .iter()
                    .map(|&member| scope.spawn(move || self.resolve_one(branch, member)))
                    .collect();

                handles
                    .into_iter()
                    .map(|handle| match handle.join() {
                        Ok(outcome) => outcome,
                        Err(panic) => std::panic::resume_unwind(panic),
                    })
                    .collect()
            })
        } else {
            dependencies
                .iter()
                .map(|&member| self.resolve_one(branch, member))
                .collect()
        };

        let mut results = Vec::with_capacity(outcomes.len());
        let mut warnings = Vec::new();
        for outcome in outcomes {
            let outcome = outcome?;
            results.push(outcome.result);
            warnings.extend(outcome.warning);
        }

        Ok(Resolution { results, warnings })
    }

    /// Put a freshly cloned primary repository on `branch`
    ///
    /// Adopted checkouts are left as they are: CI already checked out the
    /// code under test there, possibly as a detached merge commit. The
    /// branch under test must exist on the primary's remote.
    ///
    /// # Returns
    /// * `Ok(Some(result))` - The primary was switched to `branch`
    /// * `Ok(None)` - Nothing to do
    /// * `Err` - The checkout failed
    pub fn align_primary(
        &self,
        branch: &BranchName,
        primary: &WorkspaceMember,
    ) -> Result<Option<ResolutionResult>> {
        if primary.adopted || primary.effective_branch == branch.as_str() {
            return Ok(None);
        }

        self.host
            .checkout(primary, branch)
            .map_err(|e| WorkspaceError::CheckoutSwitch {
                repository: primary.name().to_string(),
                branch: branch.to_string(),
                reason: e.to_string(),
            })?;

        info!(repository = %primary.name(), branch = %branch, "primary switched to branch under test");
        Ok(Some(ResolutionResult::matched(primary.name(), branch.as_str())))
    }

    fn resolve_one(&self, branch: &BranchName, member: &WorkspaceMember) -> Result<Outcome> {
        let exists = match self.host.branch_exists(member, branch) {
            Ok(exists) => exists,
            Err(e) => return self.query_failed(branch, member, e),
        };

        if !exists {
            info!(
                repository = %member.name(),
                branch = %member.default_branch,
                "no matching branch, keeping default"
            );
            return Ok(Outcome {
                result: ResolutionResult::unmatched(member.name(), &member.default_branch),
                warning: None,
            });
        }

        if member.effective_branch != branch.as_str() {
            self.host
                .checkout(member, branch)
                .map_err(|e| WorkspaceError::CheckoutSwitch {
                    repository: member.name().to_string(),
                    branch: branch.to_string(),
                    reason: e.to_string(),
                })?;
        }

        info!(repository = %member.name(), branch = %branch, "matched branch");
        Ok(Outcome {
            result: ResolutionResult::matched(member.name(), branch.as_str()),
            warning: None,
        })
    }

    fn query_failed(
        &self,
        branch: &BranchName,
        member: &WorkspaceMember,
        err: WorkspaceError,
    ) -> Result<Outcome> {
        match self.on_query_error {
            QueryFailurePolicy::Fail => Err(WorkspaceError::ResolutionAmbiguous {
                repository: member.name().to_string(),
                branch: branch.to_string(),
                reason: err.to_string(),
            }),
            QueryFailurePolicy::Fallback => {
                warn!(
                    repository = %member.name(),
                    branch = %branch,
                    error = %err,
                    "branch query failed, keeping default branch"
                );
                Ok(Outcome {
                    result: ResolutionResult::unmatched(member.name(), &member.default_branch),
                    warning: Some(PipelineWarning::QueryFallback {
                        repository: member.name().to_string(),
                        branch: branch.to_string(),
                        reason: err.to_string(),
                    }),
                })
            }
        }
    }
}

struct Outcome {
    result: ResolutionResult,
    warning: Option<PipelineWarning>,
}

/// Resolve `dependencies` against `branch` with the default resolver settings
pub fn resolve<H: RepositoryHost>(
    host: &H,
    branch: &BranchName,
    dependencies: &[&WorkspaceMember],
) -> Result<Vec<ResolutionResult>> {
    BranchResolver::new(host)
        .resolve(branch, dependencies)
        .map(|resolution| resolution.results)
}

//! Per-call decisions.
//!
//! [`Gate`] pairs the configuration snapshot with the lazily filled
//! [`PolicyTable`] and turns a call of an [`Operation`] into a verdict.

use crate::config::Config;
use crate::operation::Operation;
use crate::policy::{Policy, PolicyGroup, PolicyTable};
use crate::redirect::is_coverage_artifact;
use std::ffi::CStr;

/// Outcome for an ordinary gated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Forward to the real definition.
    Delegate,
    /// Return the operation's failure sentinel.
    Deny,
    /// Terminate the process.
    Abort,
}

/// Outcome for a call of the open family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenVerdict {
    /// Open the requested path.
    PassThrough,
    /// Open the null sink instead.
    Redirect,
    /// Terminate the process.
    Abort,
}

pub struct Gate {
    config: Config,
    table: PolicyTable,
}

impl Gate {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            table: PolicyTable::new(),
        }
    }

    /// Gate over the current process environment.
    pub fn from_env() -> Self {
        Self::new(Config::from_env())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn policy(&self, group: PolicyGroup) -> Policy {
        self.table.get_or_classify(group, &self.config)
    }

    /// Decide a call of `op`. Budgeted calls are charged here.
    pub fn check(&self, op: &Operation) -> Verdict {
        let verdict = match self.policy(op.group()) {
            Policy::AllowUnlimited => Verdict::Delegate,
            Policy::AllowBudgeted(limit) if op.admit(limit) => Verdict::Delegate,
            Policy::AllowBudgeted(_) | Policy::Deny => Verdict::Deny,
            Policy::Abort => Verdict::Abort,
        };
        match verdict {
            Verdict::Delegate => log_gate_trace!("delegated", op = op.name()),
            Verdict::Deny => log_gate_debug!("denied", op = op.name(), calls = op.calls()),
            Verdict::Abort => log_gate_info!("forbidden call", op = op.name()),
        }
        verdict
    }

    /// Decide an open of `path` (when known) with or without write intent.
    ///
    /// Read-only opens always pass and are never charged. Coverage artifacts
    /// pass when coverage is enabled, before any budget is consulted.
    pub fn check_open(&self, op: &Operation, write: bool, path: Option<&CStr>) -> OpenVerdict {
        let policy = self.policy(op.group());
        let verdict = if policy == Policy::AllowUnlimited || !write {
            OpenVerdict::PassThrough
        } else if self.config.coverage_enabled() && path.is_some_and(is_coverage_artifact) {
            OpenVerdict::PassThrough
        } else {
            match policy {
                Policy::Abort => OpenVerdict::Abort,
                Policy::AllowBudgeted(limit) if op.admit(limit) => OpenVerdict::PassThrough,
                _ => OpenVerdict::Redirect,
            }
        };
        match verdict {
            OpenVerdict::PassThrough => {
                log_gate_trace!("open passed", op = op.name(), write = write)
            }
            OpenVerdict::Redirect => log_gate_debug!(
                "open redirected",
                op = op.name(),
                path = tracing::field::debug(path),
            ),
            OpenVerdict::Abort => log_gate_info!("forbidden open", op = op.name()),
        }
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigKey;

    fn gate(pairs: &[(ConfigKey, &str)]) -> Gate {
        Gate::new(Config::from_pairs(pairs))
    }

    #[test]
    fn test_denied_by_default() {
        let g = gate(&[]);
        let op = Operation::new(c"unlink", PolicyGroup::Remove);
        assert_eq!(g.check(&op), Verdict::Deny);
    }

    #[test]
    fn test_flag_group_allows_everything() {
        let g = gate(&[(ConfigKey::WithRemove, "1")]);
        let op = Operation::new(c"unlink", PolicyGroup::Remove);
        for _ in 0..10 {
            assert_eq!(g.check(&op), Verdict::Delegate);
        }
        assert_eq!(op.calls(), 0);
    }

    #[test]
    fn test_fork_budget_of_two() {
        let g = gate(&[(ConfigKey::WithFork, "2")]);
        let op = Operation::new(c"fork", PolicyGroup::Fork);
        assert_eq!(g.check(&op), Verdict::Delegate);
        assert_eq!(g.check(&op), Verdict::Delegate);
        assert_eq!(g.check(&op), Verdict::Deny);
        assert_eq!(g.check(&op), Verdict::Deny);
    }

    #[test]
    fn test_exec_fatal_aborts() {
        let g = gate(&[(ConfigKey::WithExec, "1"), (ConfigKey::DenyExecFatal, "1")]);
        let op = Operation::new(c"execve", PolicyGroup::Exec);
        assert_eq!(g.check(&op), Verdict::Abort);
    }

    #[test]
    fn test_open_budget_redirects_after_limit() {
        let g = gate(&[(ConfigKey::WithOpen, "2")]);
        let op = Operation::new(c"open", PolicyGroup::Open);
        let path = Some(c"/tmp/out");
        assert_eq!(g.check_open(&op, true, path), OpenVerdict::PassThrough);
        assert_eq!(g.check_open(&op, true, path), OpenVerdict::PassThrough);
        assert_eq!(g.check_open(&op, true, path), OpenVerdict::Redirect);
    }

    #[test]
    fn test_read_only_opens_are_free() {
        let g = gate(&[(ConfigKey::WithOpen, "1")]);
        let op = Operation::new(c"open", PolicyGroup::Open);
        for _ in 0..5 {
            assert_eq!(g.check_open(&op, false, Some(c"/etc/passwd")), OpenVerdict::PassThrough);
        }
        assert_eq!(op.calls(), 0);
        assert_eq!(g.check_open(&op, true, None), OpenVerdict::PassThrough);
        assert_eq!(g.check_open(&op, true, None), OpenVerdict::Redirect);
    }

    #[test]
    fn test_zero_budget_is_unlimited() {
        let g = gate(&[(ConfigKey::WithOpen, "0")]);
        let op = Operation::new(c"open", PolicyGroup::Open);
        for _ in 0..100 {
            assert_eq!(g.check_open(&op, true, None), OpenVerdict::PassThrough);
        }
    }

    #[test]
    fn test_denied_open_redirects_writes_only() {
        let g = gate(&[]);
        let op = Operation::new(c"fopen", PolicyGroup::Open);
        assert_eq!(g.check_open(&op, false, Some(c"in.txt")), OpenVerdict::PassThrough);
        assert_eq!(g.check_open(&op, true, Some(c"out.txt")), OpenVerdict::Redirect);
    }

    #[test]
    fn test_coverage_artifacts_pass_when_enabled() {
        let g = gate(&[(ConfigKey::WithCoverage, "1")]);
        let op = Operation::new(c"open", PolicyGroup::Open);
        assert_eq!(g.check_open(&op, true, Some(c"/b/x.gcda")), OpenVerdict::PassThrough);
        assert_eq!(g.check_open(&op, true, Some(c"/b/x.txt")), OpenVerdict::Redirect);

        let g = gate(&[]);
        assert_eq!(g.check_open(&op, true, Some(c"/b/x.gcda")), OpenVerdict::Redirect);
    }

    #[test]
    fn test_coverage_does_not_consume_budget() {
        let g = gate(&[(ConfigKey::WithOpen, "1"), (ConfigKey::WithCoverage, "")]);
        let op = Operation::new(c"open", PolicyGroup::Open);
        assert_eq!(g.check_open(&op, true, Some(c"a.profraw")), OpenVerdict::PassThrough);
        assert_eq!(op.calls(), 0);
        assert_eq!(g.check_open(&op, true, Some(c"a.log")), OpenVerdict::PassThrough);
        assert_eq!(g.check_open(&op, true, Some(c"a.log")), OpenVerdict::Redirect);
    }

    #[test]
    fn test_fatal_open_aborts_on_write_only() {
        let g = gate(&[(ConfigKey::DenyOpenFatal, "1")]);
        let op = Operation::new(c"open", PolicyGroup::Open);
        assert_eq!(g.check_open(&op, false, Some(c"/etc/hosts")), OpenVerdict::PassThrough);
        assert_eq!(g.check_open(&op, true, Some(c"/tmp/x")), OpenVerdict::Abort);
    }

    #[test]
    fn test_classification_is_frozen_at_first_use() {
        let g = gate(&[(ConfigKey::WithDup, "1")]);
        let op = Operation::new(c"dup", PolicyGroup::Dup);
        assert_eq!(g.check(&op), Verdict::Delegate);
        assert_eq!(g.policy(PolicyGroup::Dup), Policy::AllowUnlimited);
    }
}

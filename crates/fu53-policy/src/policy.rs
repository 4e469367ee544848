//! Policy groups and their classification.

use crate::config::{Config, ConfigKey};
use libc::{c_int, c_long};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A set of intercepted operations sharing one classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyGroup {
    /// open, creat, fopen, fdopen, freopen, dlopen
    Open,
    /// remove, unlink, unlinkat, rmdir
    Remove,
    /// exec* family
    Exec,
    /// rename, renameat, renameat2
    Rename,
    /// chown/chmod family
    Change,
    /// system, syscall, chroot, mount, unshare
    System,
    /// fork, popen
    Fork,
    /// FIFOs, device nodes, pipes, semaphores
    Parallel,
    /// dup, dup2, dup3
    Dup,
    /// setenv, unsetenv
    Env,
}

impl PolicyGroup {
    pub const COUNT: usize = 10;

    pub const ALL: [PolicyGroup; Self::COUNT] = [
        PolicyGroup::Open,
        PolicyGroup::Remove,
        PolicyGroup::Exec,
        PolicyGroup::Rename,
        PolicyGroup::Change,
        PolicyGroup::System,
        PolicyGroup::Fork,
        PolicyGroup::Parallel,
        PolicyGroup::Dup,
        PolicyGroup::Env,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PolicyGroup::Open => "open",
            PolicyGroup::Remove => "remove",
            PolicyGroup::Exec => "exec",
            PolicyGroup::Rename => "rename",
            PolicyGroup::Change => "change",
            PolicyGroup::System => "system",
            PolicyGroup::Fork => "fork",
            PolicyGroup::Parallel => "parallel",
            PolicyGroup::Dup => "dup",
            PolicyGroup::Env => "env",
        }
    }

    /// Key that enables the group.
    pub const fn key(self) -> ConfigKey {
        match self {
            PolicyGroup::Open => ConfigKey::WithOpen,
            PolicyGroup::Remove => ConfigKey::WithRemove,
            PolicyGroup::Exec => ConfigKey::WithExec,
            PolicyGroup::Rename => ConfigKey::WithRename,
            PolicyGroup::Change => ConfigKey::WithChange,
            PolicyGroup::System => ConfigKey::WithSystem,
            PolicyGroup::Fork => ConfigKey::WithFork,
            PolicyGroup::Parallel => ConfigKey::WithParallel,
            PolicyGroup::Dup => ConfigKey::WithDup,
            PolicyGroup::Env => ConfigKey::WithEnv,
        }
    }

    /// Key that turns every forbidden call into a process abort.
    pub const fn fatal_key(self) -> Option<ConfigKey> {
        match self {
            PolicyGroup::Open => Some(ConfigKey::DenyOpenFatal),
            PolicyGroup::Exec => Some(ConfigKey::DenyExecFatal),
            _ => None,
        }
    }

    /// Whether a numeric value of [`key`](Self::key) is a call budget.
    pub const fn budgeted(self) -> bool {
        matches!(
            self,
            PolicyGroup::Open | PolicyGroup::Fork | PolicyGroup::Parallel
        )
    }

    /// `errno` reported when a call of this group is denied.
    pub const fn denial_errno(self) -> c_int {
        match self {
            PolicyGroup::Open
            | PolicyGroup::Remove
            | PolicyGroup::Exec
            | PolicyGroup::Rename
            | PolicyGroup::Change => libc::EACCES,
            PolicyGroup::Fork | PolicyGroup::Parallel => libc::EAGAIN,
            PolicyGroup::System | PolicyGroup::Dup | PolicyGroup::Env => libc::EPERM,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Classification of a policy group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "limit", rename_all = "snake_case")]
pub enum Policy {
    /// Fail every call with the operation's error sentinel.
    Deny,
    /// Delegate every call.
    AllowUnlimited,
    /// Delegate the first `limit` calls per operation, then deny.
    AllowBudgeted(u64),
    /// Terminate the process on a forbidden call.
    Abort,
}

impl Policy {
    pub fn is_allowed(self) -> bool {
        matches!(self, Policy::AllowUnlimited | Policy::AllowBudgeted(_))
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Deny => f.write_str("deny"),
            Policy::AllowUnlimited => f.write_str("allow"),
            Policy::AllowBudgeted(limit) => write!(f, "allow (first {limit} calls)"),
            Policy::Abort => f.write_str("abort"),
        }
    }
}

/// Classify `group` from `config`.
pub fn classify(group: PolicyGroup, config: &Config) -> Policy {
    if let Some(fatal) = group.fatal_key() {
        if config.is_set(fatal) {
            return Policy::Abort;
        }
    }

    let key = group.key();
    if !config.is_set(key) {
        return Policy::Deny;
    }

    if group.budgeted() {
        match config.numeric(key) {
            Some(0) | None => Policy::AllowUnlimited,
            Some(limit) => Policy::AllowBudgeted(limit),
        }
    } else {
        Policy::AllowUnlimited
    }
}

// Cell encoding: 0 = unclassified, low two bits carry the tag, budgeted
// limits live above the tag (a budgeted limit is never 0, so the encoded
// value never collides with "unclassified").
const UNCLASSIFIED: u64 = 0;
const TAG_BUDGETED: u64 = 0;
const TAG_DENY: u64 = 1;
const TAG_UNLIMITED: u64 = 2;
const TAG_ABORT: u64 = 3;
const MAX_LIMIT: u64 = u64::MAX >> 2;

fn encode(policy: Policy) -> u64 {
    match policy {
        Policy::AllowBudgeted(limit) => (limit.min(MAX_LIMIT) << 2) | TAG_BUDGETED,
        Policy::Deny => TAG_DENY,
        Policy::AllowUnlimited => TAG_UNLIMITED,
        Policy::Abort => TAG_ABORT,
    }
}

fn decode(raw: u64) -> Policy {
    match raw & 0b11 {
        TAG_DENY => Policy::Deny,
        TAG_UNLIMITED => Policy::AllowUnlimited,
        TAG_ABORT => Policy::Abort,
        _ => Policy::AllowBudgeted(raw >> 2),
    }
}

/// Once-computed classification for every group.
pub struct PolicyTable {
    cells: [AtomicU64; PolicyGroup::COUNT],
}

impl PolicyTable {
    #[allow(clippy::declare_interior_mutable_const)]
    const EMPTY: AtomicU64 = AtomicU64::new(UNCLASSIFIED);

    pub const fn new() -> Self {
        Self {
            cells: [Self::EMPTY; PolicyGroup::COUNT],
        }
    }

    /// Classification of `group`, computing it on first use.
    ///
    /// Concurrent first calls may both classify; the first stored value is
    /// returned to everyone.
    pub fn get_or_classify(&self, group: PolicyGroup, config: &Config) -> Policy {
        let cell = &self.cells[group.index()];
        let raw = cell.load(Ordering::Acquire);
        if raw != UNCLASSIFIED {
            return decode(raw);
        }

        let policy = classify(group, config);
        log_policy_debug!(
            "group classified",
            group = group.name(),
            policy = tracing::field::debug(policy),
        );
        match cell.compare_exchange(
            UNCLASSIFIED,
            encode(policy),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => policy,
            Err(existing) => decode(existing),
        }
    }

    #[cfg(test)]
    fn is_classified(&self, group: PolicyGroup) -> bool {
        self.cells[group.index()].load(Ordering::Acquire) != UNCLASSIFIED
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw system calls that only touch the calling process and always reach
/// the kernel, whatever the system group says. Threaded runtimes issue
/// `futex` through `syscall(2)`; denying it would wedge the target.
pub const PROCESS_LOCAL_SYSCALLS: &[c_long] = &[
    libc::SYS_futex,
    libc::SYS_getrandom,
    libc::SYS_gettid,
    libc::SYS_getpid,
    libc::SYS_sched_yield,
    libc::SYS_clock_gettime,
    libc::SYS_clock_nanosleep,
    libc::SYS_nanosleep,
    libc::SYS_rseq,
    libc::SYS_membarrier,
];

pub fn is_process_local_syscall(number: c_long) -> bool {
    PROCESS_LOCAL_SYSCALLS.contains(&number)
}

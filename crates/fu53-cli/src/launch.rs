//! `fu53 run`: build the policy environment and exec the target.

use std::ffi::{OsStr, OsString};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::Args;
use fu53_policy::config::LOG_ENV;
use fu53_policy::{log_cli_debug, log_cli_info, ConfigKey};

pub const PRELOAD_FILE: &str = "libfu53_preload.so";

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Interposer shared object
    #[arg(long, env = "FU53_PRELOAD", value_name = "PATH")]
    pub preload: Option<PathBuf>,

    /// Allow write-intent opens; with N, only the first N per function
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "0")]
    pub allow_open: Option<u64>,

    /// Abort on any write-intent open instead of redirecting it
    #[arg(long)]
    pub deny_open_fatal: bool,

    /// Allow remove, unlink, unlinkat and rmdir
    #[arg(long)]
    pub allow_remove: bool,

    /// Allow the exec family
    #[arg(long)]
    pub allow_exec: bool,

    /// Abort on any exec
    #[arg(long)]
    pub deny_exec_fatal: bool,

    /// Allow rename, renameat and renameat2
    #[arg(long)]
    pub allow_rename: bool,

    /// Allow the chown and chmod families
    #[arg(long)]
    pub allow_change: bool,

    /// Allow system, syscall, chroot, mounts and unshare
    #[arg(long)]
    pub allow_system: bool,

    /// Allow fork and popen; with N, only the first N per function
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "0")]
    pub allow_fork: Option<u64>,

    /// Allow pipes, FIFOs, device nodes and semaphores; with N, only the first N
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "0")]
    pub allow_parallel: Option<u64>,

    /// Allow dup, dup2 and dup3
    #[arg(long)]
    pub allow_dup: bool,

    /// Allow setenv/unsetenv; every setenv stores VALUE
    #[arg(long, value_name = "VALUE")]
    pub env_override: Option<String>,

    /// Let coverage artifacts (.gcda, .gcno, .profraw) through
    #[arg(long)]
    pub coverage: bool,

    /// Log filter for the interposer (e.g. `debug`)
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,

    /// Command to run
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    pub command: Vec<OsString>,
}

/// Environment entries encoding the requested policy.
pub fn policy_env(args: &RunArgs) -> Vec<(ConfigKey, String)> {
    let flag = |on: bool, key: ConfigKey| on.then(|| (key, "1".to_string()));
    let budget = |n: Option<u64>, key: ConfigKey| n.map(|n| (key, n.to_string()));

    [
        budget(args.allow_open, ConfigKey::WithOpen),
        flag(args.deny_open_fatal, ConfigKey::DenyOpenFatal),
        flag(args.allow_remove, ConfigKey::WithRemove),
        flag(args.allow_exec, ConfigKey::WithExec),
        flag(args.deny_exec_fatal, ConfigKey::DenyExecFatal),
        flag(args.allow_rename, ConfigKey::WithRename),
        flag(args.allow_change, ConfigKey::WithChange),
        flag(args.allow_system, ConfigKey::WithSystem),
        budget(args.allow_fork, ConfigKey::WithFork),
        budget(args.allow_parallel, ConfigKey::WithParallel),
        flag(args.allow_dup, ConfigKey::WithDup),
        args.env_override.clone().map(|v| (ConfigKey::WithEnv, v)),
        flag(args.coverage, ConfigKey::WithCoverage),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Put `lib` in front of an existing `LD_PRELOAD` list.
pub fn prepend_preload(lib: &Path, existing: Option<&OsStr>) -> OsString {
    let mut value = OsString::from(lib);
    if let Some(rest) = existing.filter(|s| !s.is_empty()) {
        value.push(":");
        value.push(rest);
    }
    value
}

/// Find the interposer: explicit path (or `FU53_PRELOAD`), then next to
/// the `fu53` executable, then `../lib` relative to it.
pub fn locate_preload(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("preload library not found: {}", path.display());
        }
        return path
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", path.display()));
    }

    let exe = std::env::current_exe().context("Failed to locate fu53 executable")?;
    if let Some(bin_dir) = exe.parent() {
        let candidates = [
            Some(bin_dir.join(PRELOAD_FILE)),
            bin_dir.parent().map(|p| p.join("lib").join(PRELOAD_FILE)),
        ];
        for candidate in candidates.into_iter().flatten() {
            if candidate.exists() {
                return Ok(candidate);
            }
        }
    }

    bail!(
        "preload library not found\n\
        Build with: cargo build -p fu53-preload --release\n\
        or pass --preload / set FU53_PRELOAD"
    )
}

/// Replace this process with the target. Only returns on failure.
pub fn run(args: RunArgs) -> Result<()> {
    let lib = locate_preload(args.preload.as_deref())?;
    let Some((program, rest)) = args.command.split_first() else {
        bail!("no command given");
    };

    let mut cmd = Command::new(program);
    cmd.args(rest);

    // Inherited policy keys would leak into the target's classification.
    for key in ConfigKey::ALL {
        cmd.env_remove(key.env_name());
    }
    for (key, value) in policy_env(&args) {
        log_cli_debug!("policy", key = key.env_name(), value = value.as_str());
        cmd.env(key.env_name(), value);
    }
    if let Some(filter) = &args.log {
        cmd.env(LOG_ENV, filter);
    }

    let existing = std::env::var_os("LD_PRELOAD");
    cmd.env("LD_PRELOAD", prepend_preload(&lib, existing.as_deref()));

    log_cli_info!(
        "launching target",
        program = tracing::field::debug(program),
        preload = tracing::field::display(lib.display()),
    );
    let err = cmd.exec();
    Err(err).with_context(|| format!("Failed to execute: {}", program.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        run: RunArgs,
    }

    fn parse(args: &[&str]) -> RunArgs {
        Harness::try_parse_from(std::iter::once("fu53").chain(args.iter().copied()))
            .unwrap()
            .run
    }

    fn lookup(env: &[(ConfigKey, String)], key: ConfigKey) -> Option<&str> {
        env.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_no_flags_means_no_policy_keys() {
        let args = parse(&["--", "true"]);
        assert!(policy_env(&args).is_empty());
        assert_eq!(args.command, vec![OsString::from("true")]);
    }

    #[test]
    fn test_bare_budget_flag_is_unlimited() {
        let args = parse(&["--allow-fork", "--", "true"]);
        let env = policy_env(&args);
        assert_eq!(lookup(&env, ConfigKey::WithFork), Some("0"));
    }

    #[test]
    fn test_budget_value_is_passed_through() {
        let args = parse(&["--allow-open=3", "--allow-parallel=7", "--", "true"]);
        let env = policy_env(&args);
        assert_eq!(lookup(&env, ConfigKey::WithOpen), Some("3"));
        assert_eq!(lookup(&env, ConfigKey::WithParallel), Some("7"));
        assert_eq!(lookup(&env, ConfigKey::WithFork), None);
    }

    #[test]
    fn test_flags_and_override() {
        let args = parse(&[
            "--allow-exec",
            "--deny-exec-fatal",
            "--coverage",
            "--env-override",
            "pinned",
            "--",
            "prog",
            "-x",
        ]);
        let env = policy_env(&args);
        assert_eq!(lookup(&env, ConfigKey::WithExec), Some("1"));
        assert_eq!(lookup(&env, ConfigKey::DenyExecFatal), Some("1"));
        assert_eq!(lookup(&env, ConfigKey::WithCoverage), Some("1"));
        assert_eq!(lookup(&env, ConfigKey::WithEnv), Some("pinned"));
        assert_eq!(args.command, vec![OsString::from("prog"), OsString::from("-x")]);
    }

    #[test]
    fn test_prepend_preload() {
        let lib = Path::new("/opt/libfu53_preload.so");
        assert_eq!(prepend_preload(lib, None), OsString::from("/opt/libfu53_preload.so"));
        assert_eq!(
            prepend_preload(lib, Some(OsStr::new(""))),
            OsString::from("/opt/libfu53_preload.so")
        );
        assert_eq!(
            prepend_preload(lib, Some(OsStr::new("/usr/lib/libasan.so"))),
            OsString::from("/opt/libfu53_preload.so:/usr/lib/libasan.so")
        );
    }

    #[test]
    fn test_explicit_preload_must_exist() {
        let err = locate_preload(Some(Path::new("/nonexistent/libfu53_preload.so"))).unwrap_err();
        assert!(err.to_string().contains("not found"));

        let file = tempfile::NamedTempFile::new().unwrap();
        let found = locate_preload(Some(file.path())).unwrap();
        assert_eq!(found, file.path().canonicalize().unwrap());
    }
}

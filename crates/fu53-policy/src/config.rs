//! Policy configuration.
//!
//! The supervised process is configured exclusively through environment
//! variables. [`Config`] captures every recognised key once; classification
//! works from the snapshot, so later `setenv`/`unsetenv` calls made by the
//! target never change a decision.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::ffi::{CStr, CString};

/// Recognised configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    WithOpen,
    DenyOpenFatal,
    WithRemove,
    WithExec,
    DenyExecFatal,
    WithRename,
    WithChange,
    WithSystem,
    WithFork,
    WithParallel,
    WithDup,
    WithEnv,
    WithCoverage,
}

impl ConfigKey {
    pub const COUNT: usize = 13;

    pub const ALL: [ConfigKey; Self::COUNT] = [
        ConfigKey::WithOpen,
        ConfigKey::DenyOpenFatal,
        ConfigKey::WithRemove,
        ConfigKey::WithExec,
        ConfigKey::DenyExecFatal,
        ConfigKey::WithRename,
        ConfigKey::WithChange,
        ConfigKey::WithSystem,
        ConfigKey::WithFork,
        ConfigKey::WithParallel,
        ConfigKey::WithDup,
        ConfigKey::WithEnv,
        ConfigKey::WithCoverage,
    ];

    /// Environment variable backing this key.
    pub const fn env_name(self) -> &'static str {
        match self {
            ConfigKey::WithOpen => "WITH_OPEN",
            ConfigKey::DenyOpenFatal => "DENY_OPEN_FATAL",
            ConfigKey::WithRemove => "WITH_REMOVE",
            ConfigKey::WithExec => "WITH_EXEC",
            ConfigKey::DenyExecFatal => "DENY_EXEC_FATAL",
            ConfigKey::WithRename => "WITH_RENAME",
            ConfigKey::WithChange => "WITH_CHANGE",
            ConfigKey::WithSystem => "WITH_SYSTEM",
            ConfigKey::WithFork => "WITH_FORK",
            ConfigKey::WithParallel => "WITH_PARALLEL",
            ConfigKey::WithDup => "WITH_DUP",
            ConfigKey::WithEnv => "WITH_ENV",
            ConfigKey::WithCoverage => "WITH_COVERAGE",
        }
    }

    #[cfg(test)]
    fn from_env_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.env_name() == name)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Log filter read by the preload constructor. Not a policy key.
pub const LOG_ENV: &str = "FU53_LOG";

/// Immutable snapshot of the policy environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    values: [Option<CString>; ConfigKey::COUNT],
}

impl Config {
    /// Snapshot the process environment.
    pub fn from_env() -> Self {
        use std::os::unix::ffi::OsStringExt;

        Self::from_lookup(|name| {
            std::env::var_os(name).and_then(|v| CString::new(v.into_vec()).ok())
        })
    }

    /// Build a snapshot from an arbitrary lookup (tests, launchers).
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<CString>,
    {
        let mut config = Config::default();
        for key in ConfigKey::ALL {
            config.values[key.index()] = lookup(key.env_name());
        }
        config
    }

    /// Build a snapshot from `(key, value)` pairs.
    pub fn from_pairs(pairs: &[(ConfigKey, &str)]) -> Self {
        let mut config = Config::default();
        for (key, value) in pairs {
            config.values[key.index()] = CString::new(*value).ok();
        }
        config
    }

    pub fn value(&self, key: ConfigKey) -> Option<&CStr> {
        self.values[key.index()].as_deref()
    }

    pub fn is_set(&self, key: ConfigKey) -> bool {
        self.values[key.index()].is_some()
    }

    /// Numeric value of a key, if it is present and parses as `u64`.
    pub fn numeric(&self, key: ConfigKey) -> Option<u64> {
        let raw = self.value(key)?.to_str().ok()?;
        raw.trim().parse().ok()
    }

    pub fn coverage_enabled(&self) -> bool {
        self.is_set(ConfigKey::WithCoverage)
    }

    /// Value substituted by `setenv` while the environment group is allowed.
    pub fn env_override(&self) -> Option<&CStr> {
        self.value(ConfigKey::WithEnv)
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present = ConfigKey::ALL.iter().filter(|k| self.is_set(**k)).count();
        let mut map = serializer.serialize_map(Some(present))?;
        for key in ConfigKey::ALL {
            if let Some(value) = self.value(key) {
                map.serialize_entry(key.env_name(), &value.to_string_lossy())?;
            }
        }
        map.end()
    }
}

//! Structured logging utilities for fu53 components.
//!
//! Every event carries a `component` field so interposer output can be
//! filtered apart from launcher output.
//!
//! # Usage
//!
//! ```ignore
//! log_gate_debug!("call denied", op = "unlink");
//! log_cli_info!("launching target", program = "/bin/true");
//! ```

/// Component identifiers for log filtering
pub struct Component;

impl Component {
    pub const POLICY: &'static str = "POLICY";
    pub const GATE: &'static str = "GATE";
    pub const EXEC: &'static str = "EXEC";
    pub const SYMBOL: &'static str = "SYMBOL";
    pub const CLI: &'static str = "CLI";
}

/// Log levels for runtime configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Map a `-v` repetition count onto a level (0 = warn).
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

// === POLICY logging macros ===

#[macro_export]
macro_rules! log_policy_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = "POLICY", $($key = $value,)* $msg)
    };
}

// === GATE logging macros ===

#[macro_export]
macro_rules! log_gate_error {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::error!(component = "GATE", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_gate_info {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(component = "GATE", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_gate_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = "GATE", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_gate_trace {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::trace!(component = "GATE", $($key = $value,)* $msg)
    };
}

// === EXEC logging macros ===

#[macro_export]
macro_rules! log_exec_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(component = "EXEC", $($key = $value,)* $msg)
    };
}

// === SYMBOL logging macros ===

#[macro_export]
macro_rules! log_symbol_trace {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::trace!(component = "SYMBOL", $($key = $value,)* $msg)
    };
}

// === CLI logging macros ===

#[macro_export]
macro_rules! log_cli_info {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(component = "CLI", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_cli_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = "CLI", $($key = $value,)* $msg)
    };
}

/// Initialize logging with the given level filter.
/// Call this once at application startup. `RUST_LOG` overrides `level`.
pub fn init_logging(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Install a stderr subscriber from an explicit filter directive.
///
/// Used by the interposer, which must never panic on a second install
/// or on a malformed directive coming from the supervised environment.
pub fn init_logging_with_filter(directive: &str) -> bool {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_constants() {
        assert_eq!(Component::GATE, "GATE");
        assert_eq!(Component::POLICY, "POLICY");
        assert_eq!(Component::CLI, "CLI");
    }

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(LogLevel::from_verbosity(0), LogLevel::Warn);
        assert_eq!(LogLevel::from_verbosity(2), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbosity(9), LogLevel::Trace);
        assert_eq!(LogLevel::Debug.as_filter(), "debug");
    }
}

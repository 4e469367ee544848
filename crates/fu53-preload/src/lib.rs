//! # fu53-preload
//!
//! `LD_PRELOAD` object that replaces destructive libc entry points with
//! policy-gated versions. Load it into an untrusted target (for instance
//! through `AFL_PRELOAD`) and configure it with the `WITH_*` variables.
//!
//! Rules for code in this crate:
//! - no panics on the call path; failures go through `fu53_policy::fatal`
//! - no calls back into interposed functions while deciding a call
//! - errno is set last, after any logging

#![feature(c_variadic)]
#![allow(clippy::missing_safety_doc)]

#[macro_use]
mod macros;

mod ops;
mod state;
pub mod syscalls;

use fu53_policy::config::LOG_ENV;
use fu53_policy::log_gate_debug;
use fu53_policy::logging::init_logging_with_filter;
use libc::c_int;

#[inline]
pub(crate) unsafe fn set_errno(e: c_int) {
    *libc::__errno_location() = e;
}

/// Runs when the loader maps the library, before the target's `main`.
/// Takes the configuration snapshot so later environment edits by the
/// target cannot influence classification.
#[cfg(target_os = "linux")]
#[link_section = ".init_array"]
#[used]
pub static FU53_BOOT: unsafe extern "C" fn() = {
    unsafe extern "C" fn boot() {
        if let Some(directive) = std::env::var_os(LOG_ENV) {
            init_logging_with_filter(&directive.to_string_lossy());
        }
        let gate = state::gate();
        log_gate_debug!(
            "interposer loaded",
            pid = std::process::id(),
            coverage = gate.config().coverage_enabled(),
        );
    }
    boot
};

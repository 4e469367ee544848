//! Write-intent detection for the open family.
//!
//! A denied open with write intent is not failed. It is pointed at
//! [`NULL_SINK`] instead so the target keeps running with a descriptor that
//! swallows everything written to it.

use libc::c_int;
use std::ffi::CStr;

/// Path substituted for a redirected open.
pub const NULL_SINK: &CStr = c"/dev/null";

/// Open flags that signal an intent to create or modify the file.
pub const WRITE_INTENT_FLAGS: c_int =
    libc::O_CREAT | libc::O_APPEND | libc::O_WRONLY | libc::O_RDWR | libc::O_SYNC | libc::O_TRUNC;

/// Coverage artifacts written by gcov and LLVM source-based coverage.
pub const COVERAGE_SUFFIXES: [&[u8]; 3] = [b".gcda", b".gcno", b".profraw"];

pub fn flags_request_write(flags: c_int) -> bool {
    flags & WRITE_INTENT_FLAGS != 0
}

/// `fopen`-style mode strings: any of `w`, `a` or `+` means write intent.
pub fn mode_requests_write(mode: &CStr) -> bool {
    mode.to_bytes()
        .iter()
        .any(|b| matches!(b, b'w' | b'a' | b'+'))
}

pub fn is_coverage_artifact(path: &CStr) -> bool {
    let bytes = path.to_bytes();
    COVERAGE_SUFFIXES.iter().any(|s| bytes.ends_with(s))
}

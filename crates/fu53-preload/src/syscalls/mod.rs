//! Exported C entry points, one module per family.

pub mod dup;
pub mod env;
pub mod exec;
pub mod fs;
pub mod open;
pub mod process;
pub mod stdio;
pub mod system;

use libc::c_char;
use std::ffi::CStr;

/// Borrow a possibly-null C string.
#[inline]
pub(crate) unsafe fn cstr_opt<'a>(p: *const c_char) -> Option<&'a CStr> {
    if p.is_null() {
        None
    } else {
        Some(CStr::from_ptr(p))
    }
}

//! `setenv` and `unsetenv`.
//!
//! Classification works from the snapshot taken at load time, so nothing
//! done here changes a decision.

use crate::ops;
use crate::state::gate;
use libc::{c_char, c_int};
use std::ffi::CStr;

type SetenvFn = unsafe extern "C" fn(*const c_char, *const c_char, c_int) -> c_int;
type UnsetenvFn = unsafe extern "C" fn(*const c_char) -> c_int;

/// When allowed, the stored value is the `WITH_ENV` value, not `value`.
#[no_mangle]
pub unsafe extern "C" fn setenv(
    name: *const c_char,
    value: *const c_char,
    overwrite: c_int,
) -> c_int {
    let value = gate().config().env_override().map_or(value, CStr::as_ptr);
    gated!(ops::SETENV, -1, SetenvFn, (name, value, overwrite))
}

#[no_mangle]
pub unsafe extern "C" fn unsetenv(name: *const c_char) -> c_int {
    gated!(ops::UNSETENV, -1, UnsetenvFn, (name))
}

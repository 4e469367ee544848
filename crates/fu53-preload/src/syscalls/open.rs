//! `open`, `openat`, `creat` and `dlopen`, including the LFS and fortify
//! variants glibc exports.
//!
//! Write-intent opens the policy does not admit are served from the null
//! sink with the caller's flags, mode and dirfd untouched. Read-only opens
//! always reach the requested path.

use crate::ops;
use crate::state::{abort_call, gate};
use crate::syscalls::cstr_opt;
use fu53_policy::marshal::pull_open_mode;
use fu53_policy::redirect::{flags_request_write, NULL_SINK};
use fu53_policy::{OpenVerdict, Operation};
use libc::{c_char, c_int, c_uint, c_void, mode_t};

type OpenFn = unsafe extern "C" fn(*const c_char, c_int, ...) -> c_int;
type OpenAtFn = unsafe extern "C" fn(c_int, *const c_char, c_int, ...) -> c_int;
type Open2Fn = unsafe extern "C" fn(*const c_char, c_int) -> c_int;
type OpenAt2Fn = unsafe extern "C" fn(c_int, *const c_char, c_int) -> c_int;
type CreatFn = unsafe extern "C" fn(*const c_char, mode_t) -> c_int;
type DlopenFn = unsafe extern "C" fn(*const c_char, c_int) -> *mut c_void;

/// Path the real open should receive.
pub(crate) unsafe fn open_target(
    op: &Operation,
    path: *const c_char,
    write: bool,
) -> *const c_char {
    match gate().check_open(op, write, cstr_opt(path)) {
        OpenVerdict::PassThrough => path,
        OpenVerdict::Redirect => NULL_SINK.as_ptr(),
        OpenVerdict::Abort => abort_call(op),
    }
}

#[no_mangle]
pub unsafe extern "C" fn open(path: *const c_char, flags: c_int, mut args: ...) -> c_int {
    let mode = pull_open_mode(flags, &mut va_puller!(args));
    let target = open_target(&ops::OPEN, path, flags_request_write(flags));
    real!(ops::OPEN, OpenFn)(target, flags, mode as c_uint)
}

#[no_mangle]
pub unsafe extern "C" fn open64(path: *const c_char, flags: c_int, mut args: ...) -> c_int {
    let mode = pull_open_mode(flags, &mut va_puller!(args));
    let target = open_target(&ops::OPEN64, path, flags_request_write(flags));
    real!(ops::OPEN64, OpenFn)(target, flags, mode as c_uint)
}

#[no_mangle]
pub unsafe extern "C" fn openat(
    dirfd: c_int,
    path: *const c_char,
    flags: c_int,
    mut args: ...
) -> c_int {
    let mode = pull_open_mode(flags, &mut va_puller!(args));
    let target = open_target(&ops::OPENAT, path, flags_request_write(flags));
    real!(ops::OPENAT, OpenAtFn)(dirfd, target, flags, mode as c_uint)
}

#[no_mangle]
pub unsafe extern "C" fn openat64(
    dirfd: c_int,
    path: *const c_char,
    flags: c_int,
    mut args: ...
) -> c_int {
    let mode = pull_open_mode(flags, &mut va_puller!(args));
    let target = open_target(&ops::OPENAT64, path, flags_request_write(flags));
    real!(ops::OPENAT64, OpenAtFn)(dirfd, target, flags, mode as c_uint)
}

// _FORTIFY_SOURCE builds call these when no mode is passed.

#[no_mangle]
pub unsafe extern "C" fn __open_2(path: *const c_char, flags: c_int) -> c_int {
    let target = open_target(&ops::OPEN_2, path, flags_request_write(flags));
    real!(ops::OPEN_2, Open2Fn)(target, flags)
}

#[no_mangle]
pub unsafe extern "C" fn __open64_2(path: *const c_char, flags: c_int) -> c_int {
    let target = open_target(&ops::OPEN64_2, path, flags_request_write(flags));
    real!(ops::OPEN64_2, Open2Fn)(target, flags)
}

#[no_mangle]
pub unsafe extern "C" fn __openat_2(dirfd: c_int, path: *const c_char, flags: c_int) -> c_int {
    let target = open_target(&ops::OPENAT_2, path, flags_request_write(flags));
    real!(ops::OPENAT_2, OpenAt2Fn)(dirfd, target, flags)
}

#[no_mangle]
pub unsafe extern "C" fn __openat64_2(dirfd: c_int, path: *const c_char, flags: c_int) -> c_int {
    let target = open_target(&ops::OPENAT64_2, path, flags_request_write(flags));
    real!(ops::OPENAT64_2, OpenAt2Fn)(dirfd, target, flags)
}

/// `creat` always has write intent.
#[no_mangle]
pub unsafe extern "C" fn creat(path: *const c_char, mode: mode_t) -> c_int {
    let target = open_target(&ops::CREAT, path, true);
    real!(ops::CREAT, CreatFn)(target, mode)
}

#[no_mangle]
pub unsafe extern "C" fn creat64(path: *const c_char, mode: mode_t) -> c_int {
    let target = open_target(&ops::CREAT64, path, true);
    real!(ops::CREAT64, CreatFn)(target, mode)
}

/// Loading code is gated like any other call; `dlopen(NULL)` only returns a
/// handle to the running program and is always allowed.
#[no_mangle]
pub unsafe extern "C" fn dlopen(filename: *const c_char, flags: c_int) -> *mut c_void {
    if filename.is_null() {
        return real!(ops::DLOPEN, DlopenFn)(filename, flags);
    }
    gated!(ops::DLOPEN, std::ptr::null_mut(), DlopenFn, (filename, flags))
}

//! Stream opens: `fopen`, `fdopen`, `freopen` and their LFS aliases.

use crate::ops;
use crate::state::{abort_call, gate};
use crate::syscalls::cstr_opt;
use crate::syscalls::open::open_target;
use fu53_policy::redirect::{mode_requests_write, NULL_SINK};
use fu53_policy::OpenVerdict;
use libc::{c_char, c_int, FILE};

type FopenFn = unsafe extern "C" fn(*const c_char, *const c_char) -> *mut FILE;
type FdopenFn = unsafe extern "C" fn(c_int, *const c_char) -> *mut FILE;
type FreopenFn = unsafe extern "C" fn(*const c_char, *const c_char, *mut FILE) -> *mut FILE;

unsafe fn mode_writes(mode: *const c_char) -> bool {
    cstr_opt(mode).is_some_and(mode_requests_write)
}

#[no_mangle]
pub unsafe extern "C" fn fopen(path: *const c_char, mode: *const c_char) -> *mut FILE {
    let target = open_target(&ops::FOPEN, path, mode_writes(mode));
    real!(ops::FOPEN, FopenFn)(target, mode)
}

#[no_mangle]
pub unsafe extern "C" fn fopen64(path: *const c_char, mode: *const c_char) -> *mut FILE {
    let target = open_target(&ops::FOPEN64, path, mode_writes(mode));
    real!(ops::FOPEN64, FopenFn)(target, mode)
}

/// A redirected `fdopen` does not wrap `fd`; it returns a fresh stream on
/// the null sink and leaves `fd` to the caller.
#[no_mangle]
pub unsafe extern "C" fn fdopen(fd: c_int, mode: *const c_char) -> *mut FILE {
    match gate().check_open(&ops::FDOPEN, mode_writes(mode), None) {
        OpenVerdict::PassThrough => real!(ops::FDOPEN, FdopenFn)(fd, mode),
        OpenVerdict::Redirect => real!(ops::FOPEN, FopenFn)(NULL_SINK.as_ptr(), mode),
        OpenVerdict::Abort => abort_call(&ops::FDOPEN),
    }
}

/// `freopen(NULL, mode, stream)` changes the mode of an open stream and is
/// never redirected.
#[no_mangle]
pub unsafe extern "C" fn freopen(
    path: *const c_char,
    mode: *const c_char,
    stream: *mut FILE,
) -> *mut FILE {
    let target = if path.is_null() {
        path
    } else {
        open_target(&ops::FREOPEN, path, mode_writes(mode))
    };
    real!(ops::FREOPEN, FreopenFn)(target, mode, stream)
}

#[no_mangle]
pub unsafe extern "C" fn freopen64(
    path: *const c_char,
    mode: *const c_char,
    stream: *mut FILE,
) -> *mut FILE {
    let target = if path.is_null() {
        path
    } else {
        open_target(&ops::FREOPEN64, path, mode_writes(mode))
    };
    real!(ops::FREOPEN64, FreopenFn)(target, mode, stream)
}

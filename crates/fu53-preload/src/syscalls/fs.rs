//! Removal, rename and ownership/permission changes.

use crate::ops;
use libc::{c_char, c_int, c_uint, gid_t, mode_t, uid_t};

type PathFn = unsafe extern "C" fn(*const c_char) -> c_int;
type UnlinkAtFn = unsafe extern "C" fn(c_int, *const c_char, c_int) -> c_int;
type RenameFn = unsafe extern "C" fn(*const c_char, *const c_char) -> c_int;
type RenameAtFn = unsafe extern "C" fn(c_int, *const c_char, c_int, *const c_char) -> c_int;
type RenameAt2Fn =
    unsafe extern "C" fn(c_int, *const c_char, c_int, *const c_char, c_uint) -> c_int;
type ChownFn = unsafe extern "C" fn(*const c_char, uid_t, gid_t) -> c_int;
type FchownFn = unsafe extern "C" fn(c_int, uid_t, gid_t) -> c_int;
type FchownAtFn = unsafe extern "C" fn(c_int, *const c_char, uid_t, gid_t, c_int) -> c_int;
type ChmodFn = unsafe extern "C" fn(*const c_char, mode_t) -> c_int;
type FchmodFn = unsafe extern "C" fn(c_int, mode_t) -> c_int;
type FchmodAtFn = unsafe extern "C" fn(c_int, *const c_char, mode_t, c_int) -> c_int;

// === remove ===

#[no_mangle]
pub unsafe extern "C" fn remove(path: *const c_char) -> c_int {
    gated!(ops::REMOVE, -1, PathFn, (path))
}

#[no_mangle]
pub unsafe extern "C" fn unlink(path: *const c_char) -> c_int {
    gated!(ops::UNLINK, -1, PathFn, (path))
}

#[no_mangle]
pub unsafe extern "C" fn unlinkat(dirfd: c_int, path: *const c_char, flags: c_int) -> c_int {
    gated!(ops::UNLINKAT, -1, UnlinkAtFn, (dirfd, path, flags))
}

#[no_mangle]
pub unsafe extern "C" fn rmdir(path: *const c_char) -> c_int {
    gated!(ops::RMDIR, -1, PathFn, (path))
}

// === rename ===

#[no_mangle]
pub unsafe extern "C" fn rename(old: *const c_char, new: *const c_char) -> c_int {
    gated!(ops::RENAME, -1, RenameFn, (old, new))
}

#[no_mangle]
pub unsafe extern "C" fn renameat(
    olddirfd: c_int,
    old: *const c_char,
    newdirfd: c_int,
    new: *const c_char,
) -> c_int {
    gated!(ops::RENAMEAT, -1, RenameAtFn, (olddirfd, old, newdirfd, new))
}

#[no_mangle]
pub unsafe extern "C" fn renameat2(
    olddirfd: c_int,
    old: *const c_char,
    newdirfd: c_int,
    new: *const c_char,
    flags: c_uint,
) -> c_int {
    gated!(ops::RENAMEAT2, -1, RenameAt2Fn, (olddirfd, old, newdirfd, new, flags))
}

// === change ===

#[no_mangle]
pub unsafe extern "C" fn chown(path: *const c_char, owner: uid_t, group: gid_t) -> c_int {
    gated!(ops::CHOWN, -1, ChownFn, (path, owner, group))
}

#[no_mangle]
pub unsafe extern "C" fn lchown(path: *const c_char, owner: uid_t, group: gid_t) -> c_int {
    gated!(ops::LCHOWN, -1, ChownFn, (path, owner, group))
}

#[no_mangle]
pub unsafe extern "C" fn fchown(fd: c_int, owner: uid_t, group: gid_t) -> c_int {
    gated!(ops::FCHOWN, -1, FchownFn, (fd, owner, group))
}

#[no_mangle]
pub unsafe extern "C" fn fchownat(
    dirfd: c_int,
    path: *const c_char,
    owner: uid_t,
    group: gid_t,
    flags: c_int,
) -> c_int {
    gated!(ops::FCHOWNAT, -1, FchownAtFn, (dirfd, path, owner, group, flags))
}

#[no_mangle]
pub unsafe extern "C" fn chmod(path: *const c_char, mode: mode_t) -> c_int {
    gated!(ops::CHMOD, -1, ChmodFn, (path, mode))
}

#[no_mangle]
pub unsafe extern "C" fn fchmod(fd: c_int, mode: mode_t) -> c_int {
    gated!(ops::FCHMOD, -1, FchmodFn, (fd, mode))
}

#[no_mangle]
pub unsafe extern "C" fn fchmodat(
    dirfd: c_int,
    path: *const c_char,
    mode: mode_t,
    flags: c_int,
) -> c_int {
    gated!(ops::FCHMODAT, -1, FchmodAtFn, (dirfd, path, mode, flags))
}

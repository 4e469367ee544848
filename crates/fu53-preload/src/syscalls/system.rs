//! Host-level operations: `system`, raw `syscall`, `chroot`, mounts and
//! namespace changes.

use crate::ops;
use fu53_policy::marshal::pull_syscall_args;
use fu53_policy::policy::is_process_local_syscall;
use libc::{c_char, c_int, c_long, c_ulong, c_void};

type SystemFn = unsafe extern "C" fn(*const c_char) -> c_int;
type SyscallFn = unsafe extern "C" fn(c_long, ...) -> c_long;
type PathFn = unsafe extern "C" fn(*const c_char) -> c_int;
type MountFn = unsafe extern "C" fn(
    *const c_char,
    *const c_char,
    *const c_char,
    c_ulong,
    *const c_void,
) -> c_int;
type Umount2Fn = unsafe extern "C" fn(*const c_char, c_int) -> c_int;
type UnshareFn = unsafe extern "C" fn(c_int) -> c_int;

#[no_mangle]
pub unsafe extern "C" fn system(command: *const c_char) -> c_int {
    gated!(ops::SYSTEM, -1, SystemFn, (command))
}

/// All six argument words are forwarded whatever the call number. Calls
/// that only touch the calling process skip the gate.
#[no_mangle]
pub unsafe extern "C" fn syscall(number: c_long, mut args: ...) -> c_long {
    let [a0, a1, a2, a3, a4, a5] = pull_syscall_args(&mut va_puller!(args));
    if is_process_local_syscall(number) {
        return real!(ops::SYSCALL, SyscallFn)(number, a0, a1, a2, a3, a4, a5);
    }
    gated!(ops::SYSCALL, -1, SyscallFn, (number, a0, a1, a2, a3, a4, a5))
}

#[no_mangle]
pub unsafe extern "C" fn chroot(path: *const c_char) -> c_int {
    gated!(ops::CHROOT, -1, PathFn, (path))
}

#[no_mangle]
pub unsafe extern "C" fn mount(
    source: *const c_char,
    target: *const c_char,
    fstype: *const c_char,
    flags: c_ulong,
    data: *const c_void,
) -> c_int {
    gated!(ops::MOUNT, -1, MountFn, (source, target, fstype, flags, data))
}

#[no_mangle]
pub unsafe extern "C" fn umount(target: *const c_char) -> c_int {
    gated!(ops::UMOUNT, -1, PathFn, (target))
}

#[no_mangle]
pub unsafe extern "C" fn umount2(target: *const c_char, flags: c_int) -> c_int {
    gated!(ops::UMOUNT2, -1, Umount2Fn, (target, flags))
}

#[no_mangle]
pub unsafe extern "C" fn unshare(flags: c_int) -> c_int {
    gated!(ops::UNSHARE, -1, UnshareFn, (flags))
}

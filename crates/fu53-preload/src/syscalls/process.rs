//! Process creation and inter-process channels: `fork`, `popen`, FIFOs,
//! device nodes, pipes and System V / POSIX semaphores.

use crate::ops;
use crate::set_errno;
use crate::state::{abort_call, gate};
use fu53_policy::marshal::{pull_sem_open, pull_semctl};
use fu53_policy::Verdict;
use libc::{c_char, c_int, c_uint, dev_t, key_t, mode_t, pid_t, sem_t, FILE};

type ForkFn = unsafe extern "C" fn() -> pid_t;
type PopenFn = unsafe extern "C" fn(*const c_char, *const c_char) -> *mut FILE;
type MkfifoFn = unsafe extern "C" fn(*const c_char, mode_t) -> c_int;
type MkfifoAtFn = unsafe extern "C" fn(c_int, *const c_char, mode_t) -> c_int;
type MknodFn = unsafe extern "C" fn(*const c_char, mode_t, dev_t) -> c_int;
type MknodAtFn = unsafe extern "C" fn(c_int, *const c_char, mode_t, dev_t) -> c_int;
type SemOpenFn = unsafe extern "C" fn(*const c_char, c_int, ...) -> *mut sem_t;
type SemctlFn = unsafe extern "C" fn(c_int, c_int, c_int, ...) -> c_int;
type SemgetFn = unsafe extern "C" fn(key_t, c_int, c_int) -> c_int;
type PipeFn = unsafe extern "C" fn(*mut c_int) -> c_int;
type Pipe2Fn = unsafe extern "C" fn(*mut c_int, c_int) -> c_int;

#[no_mangle]
pub unsafe extern "C" fn fork() -> pid_t {
    gated!(ops::FORK, -1, ForkFn, ())
}

#[no_mangle]
pub unsafe extern "C" fn popen(command: *const c_char, kind: *const c_char) -> *mut FILE {
    gated!(ops::POPEN, std::ptr::null_mut(), PopenFn, (command, kind))
}

#[no_mangle]
pub unsafe extern "C" fn mkfifo(path: *const c_char, mode: mode_t) -> c_int {
    gated!(ops::MKFIFO, -1, MkfifoFn, (path, mode))
}

#[no_mangle]
pub unsafe extern "C" fn mkfifoat(dirfd: c_int, path: *const c_char, mode: mode_t) -> c_int {
    gated!(ops::MKFIFOAT, -1, MkfifoAtFn, (dirfd, path, mode))
}

#[no_mangle]
pub unsafe extern "C" fn mknod(path: *const c_char, mode: mode_t, dev: dev_t) -> c_int {
    gated!(ops::MKNOD, -1, MknodFn, (path, mode, dev))
}

#[no_mangle]
pub unsafe extern "C" fn mknodat(
    dirfd: c_int,
    path: *const c_char,
    mode: mode_t,
    dev: dev_t,
) -> c_int {
    gated!(ops::MKNODAT, -1, MknodAtFn, (dirfd, path, mode, dev))
}

/// `sem_open(name, oflag)` or, with `O_CREAT`,
/// `sem_open(name, oflag, mode, value)`.
#[no_mangle]
pub unsafe extern "C" fn sem_open(name: *const c_char, oflag: c_int, mut args: ...) -> *mut sem_t {
    let op = &ops::SEM_OPEN;
    match gate().check(op) {
        Verdict::Delegate => {
            let real = real!(op, SemOpenFn);
            match pull_sem_open(oflag, &mut va_puller!(args)) {
                Some(extra) => real(name, oflag, extra.mode as c_uint, extra.value),
                None => real(name, oflag),
            }
        }
        Verdict::Deny => {
            set_errno(op.group().denial_errno());
            libc::SEM_FAILED
        }
        Verdict::Abort => abort_call(op),
    }
}

/// The fourth argument is forwarded only for commands that take one.
#[no_mangle]
pub unsafe extern "C" fn semctl(semid: c_int, semnum: c_int, cmd: c_int, mut args: ...) -> c_int {
    let op = &ops::SEMCTL;
    match gate().check(op) {
        Verdict::Delegate => {
            let real = real!(op, SemctlFn);
            match pull_semctl(cmd, &mut va_puller!(args)) {
                Some(arg) => real(semid, semnum, cmd, arg),
                None => real(semid, semnum, cmd),
            }
        }
        Verdict::Deny => {
            set_errno(op.group().denial_errno());
            -1
        }
        Verdict::Abort => abort_call(op),
    }
}

#[no_mangle]
pub unsafe extern "C" fn semget(key: key_t, nsems: c_int, semflg: c_int) -> c_int {
    gated!(ops::SEMGET, -1, SemgetFn, (key, nsems, semflg))
}

#[no_mangle]
pub unsafe extern "C" fn pipe(fds: *mut c_int) -> c_int {
    gated!(ops::PIPE, -1, PipeFn, (fds))
}

#[no_mangle]
pub unsafe extern "C" fn pipe2(fds: *mut c_int, flags: c_int) -> c_int {
    gated!(ops::PIPE2, -1, Pipe2Fn, (fds, flags))
}

//! The exec family.
//!
//! Vector forms are gated directly. List forms only build the argument
//! vector and re-enter through the matching vector form, which applies the
//! policy.

use crate::ops;
use crate::set_errno;
use fu53_policy::exec::ExecArgsError;
use fu53_policy::log_exec_warn;
use libc::{c_char, c_int};

type Argv = *const *const c_char;

type ExecvFn = unsafe extern "C" fn(*const c_char, Argv) -> c_int;
type ExecveFn = unsafe extern "C" fn(*const c_char, Argv, Argv) -> c_int;
type ExecveatFn = unsafe extern "C" fn(c_int, *const c_char, Argv, Argv, c_int) -> c_int;
type FexecveFn = unsafe extern "C" fn(c_int, Argv, Argv) -> c_int;

#[no_mangle]
pub unsafe extern "C" fn execv(path: *const c_char, argv: Argv) -> c_int {
    gated!(ops::EXECV, -1, ExecvFn, (path, argv))
}

#[no_mangle]
pub unsafe extern "C" fn execve(path: *const c_char, argv: Argv, envp: Argv) -> c_int {
    gated!(ops::EXECVE, -1, ExecveFn, (path, argv, envp))
}

#[no_mangle]
pub unsafe extern "C" fn execvp(file: *const c_char, argv: Argv) -> c_int {
    gated!(ops::EXECVP, -1, ExecvFn, (file, argv))
}

#[no_mangle]
pub unsafe extern "C" fn execvpe(file: *const c_char, argv: Argv, envp: Argv) -> c_int {
    gated!(ops::EXECVPE, -1, ExecveFn, (file, argv, envp))
}

#[no_mangle]
pub unsafe extern "C" fn execveat(
    dirfd: c_int,
    path: *const c_char,
    argv: Argv,
    envp: Argv,
    flags: c_int,
) -> c_int {
    gated!(ops::EXECVEAT, -1, ExecveatFn, (dirfd, path, argv, envp, flags))
}

#[no_mangle]
pub unsafe extern "C" fn fexecve(fd: c_int, argv: Argv, envp: Argv) -> c_int {
    gated!(ops::FEXECVE, -1, FexecveFn, (fd, argv, envp))
}

unsafe fn list_overflow(entry: &str, err: ExecArgsError) -> c_int {
    log_exec_warn!(
        "argument list rejected",
        entry = entry,
        error = tracing::field::display(&err),
    );
    set_errno(libc::E2BIG);
    -1
}

#[no_mangle]
pub unsafe extern "C" fn execl(path: *const c_char, arg0: *const c_char, mut args: ...) -> c_int {
    match exec_list!(arg0, args) {
        Ok(argv) => execv(path, argv.as_ptr()),
        Err(e) => list_overflow("execl", e),
    }
}

#[no_mangle]
pub unsafe extern "C" fn execlp(file: *const c_char, arg0: *const c_char, mut args: ...) -> c_int {
    match exec_list!(arg0, args) {
        Ok(argv) => execvp(file, argv.as_ptr()),
        Err(e) => list_overflow("execlp", e),
    }
}

/// `execle(path, arg0, ..., NULL, envp)`
#[no_mangle]
pub unsafe extern "C" fn execle(path: *const c_char, arg0: *const c_char, mut args: ...) -> c_int {
    match exec_list!(arg0, args) {
        Ok(argv) => {
            let envp = args.next_arg::<Argv>();
            execve(path, argv.as_ptr(), envp)
        }
        Err(e) => list_overflow("execle", e),
    }
}

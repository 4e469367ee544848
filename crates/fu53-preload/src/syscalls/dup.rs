use crate::ops;
use libc::c_int;

type DupFn = unsafe extern "C" fn(c_int) -> c_int;
type Dup2Fn = unsafe extern "C" fn(c_int, c_int) -> c_int;
type Dup3Fn = unsafe extern "C" fn(c_int, c_int, c_int) -> c_int;

#[no_mangle]
pub unsafe extern "C" fn dup(fd: c_int) -> c_int {
    gated!(ops::DUP, -1, DupFn, (fd))
}

#[no_mangle]
pub unsafe extern "C" fn dup2(fd: c_int, target: c_int) -> c_int {
    gated!(ops::DUP2, -1, Dup2Fn, (fd, target))
}

#[no_mangle]
pub unsafe extern "C" fn dup3(fd: c_int, target: c_int, flags: c_int) -> c_int {
    gated!(ops::DUP3, -1, Dup3Fn, (fd, target, flags))
}

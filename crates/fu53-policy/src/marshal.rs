//! Variadic argument marshaling.
//!
//! Entry points receive their trailing arguments as a C `va_list`. The rules
//! for how many arguments to read, and at which width, live here behind the
//! [`ArgPuller`] trait so they can be exercised without a real `va_list`.
//!
//! Reading an argument the caller never supplied is undefined behaviour, so
//! every rule reads only what the fixed arguments say is present.

use libc::{c_int, c_long, c_uint, c_ulong, mode_t};

/// Width at which one variadic argument is read after default promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// `int`-sized (`int`, `unsigned int`, promoted `mode_t`)
    Int,
    /// `long`-sized
    Long,
    /// pointer-sized
    Ptr,
}

/// Source of variadic arguments.
pub trait ArgPuller {
    /// Read the next argument at `width`, zero-extended into a `usize`.
    ///
    /// # Safety
    /// The caller must guarantee an argument of that width is present.
    unsafe fn pull(&mut self, width: Width) -> usize;
}

/// [`ArgPuller`] backed by a closure.
pub struct FnPuller<F>(F);

impl<F: FnMut(Width) -> usize> FnPuller<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F: FnMut(Width) -> usize> ArgPuller for FnPuller<F> {
    unsafe fn pull(&mut self, width: Width) -> usize {
        (self.0)(width)
    }
}

/// `mode_t` travels through `...` promoted to `unsigned int`.
pub const MODE_PROMOTED: Width = Width::Int;

const _: () = assert!(std::mem::size_of::<mode_t>() <= std::mem::size_of::<c_uint>());

/// Whether an `open`/`openat` call with `flags` carries a mode argument.
pub fn open_needs_mode(flags: c_int) -> bool {
    flags & libc::O_CREAT != 0 || flags & libc::O_TMPFILE == libc::O_TMPFILE
}

/// Read the optional mode of an `open`-family call. Absent modes read as 0.
///
/// # Safety
/// `args` must hold the caller's variadic arguments following `flags`.
pub unsafe fn pull_open_mode<P: ArgPuller>(flags: c_int, args: &mut P) -> mode_t {
    if open_needs_mode(flags) {
        args.pull(MODE_PROMOTED) as c_uint as mode_t
    } else {
        0
    }
}

/// Trailing arguments of `sem_open(name, oflag, mode, value)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemOpenArgs {
    pub mode: mode_t,
    pub value: c_uint,
}

/// `sem_open` takes `mode` and `value` only when `O_CREAT` is set.
///
/// # Safety
/// `args` must hold the caller's variadic arguments following `oflag`.
pub unsafe fn pull_sem_open<P: ArgPuller>(oflag: c_int, args: &mut P) -> Option<SemOpenArgs> {
    if oflag & libc::O_CREAT == 0 {
        return None;
    }
    let mode = args.pull(MODE_PROMOTED) as c_uint as mode_t;
    let value = args.pull(Width::Int) as c_uint;
    Some(SemOpenArgs { mode, value })
}

// semctl commands taking the fourth `union semun` argument (linux/sem.h)
const IPC_SET: c_int = 1;
const IPC_STAT: c_int = 2;
const IPC_INFO: c_int = 3;
const GETALL: c_int = 13;
const SETVAL: c_int = 16;
const SETALL: c_int = 17;
const SEM_STAT: c_int = 18;
const SEM_INFO: c_int = 19;
const SEM_STAT_ANY: c_int = 20;

pub fn semctl_takes_arg(cmd: c_int) -> bool {
    matches!(
        cmd,
        IPC_SET
            | IPC_STAT
            | IPC_INFO
            | GETALL
            | SETVAL
            | SETALL
            | SEM_STAT
            | SEM_INFO
            | SEM_STAT_ANY
    )
}

/// Read the `union semun` argument of `semctl` when `cmd` supplies one.
///
/// The union is at most pointer-sized and is forwarded as an opaque word.
///
/// # Safety
/// `args` must hold the caller's variadic arguments following `cmd`.
pub unsafe fn pull_semctl<P: ArgPuller>(cmd: c_int, args: &mut P) -> Option<c_ulong> {
    if semctl_takes_arg(cmd) {
        Some(args.pull(Width::Long) as c_ulong)
    } else {
        None
    }
}

/// Number of argument words forwarded by the `syscall` wrapper.
pub const SYSCALL_ARGS: usize = 6;

/// Read the six `long` words following a `syscall` number.
///
/// The kernel ABI has no arity information, so all six are always read.
///
/// # Safety
/// Callers of `syscall` must tolerate reads of unused argument slots, as they
/// do with the C library wrapper.
pub unsafe fn pull_syscall_args<P: ArgPuller>(args: &mut P) -> [c_long; SYSCALL_ARGS] {
    let mut words = [0 as c_long; SYSCALL_ARGS];
    for word in &mut words {
        *word = args.pull(Width::Long) as c_long;
    }
    words
}

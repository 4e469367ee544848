//! Argument vectors for `execl`, `execlp` and `execle`.
//!
//! The list form passes `arg0, arg1, ..., NULL` through `...`. The vector is
//! built in two passes over the same argument list: one over a copy to count,
//! one to collect. `execle` then reads `envp` after the terminator.

use crate::marshal::{ArgPuller, Width};
use libc::{c_char, c_int};
use thiserror::Error;

/// Upper bound on the number of list arguments, including `arg0`.
pub const MAX_EXEC_ARGS: usize = c_int::MAX as usize;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecArgsError {
    #[error("argument list longer than {max} entries")]
    TooManyArguments { max: usize },
}

/// Count the non-null list arguments starting at `first`.
///
/// `args` is positioned just after `first` and is consumed up to and
/// including the terminating NULL.
///
/// # Safety
/// `args` must hold a NULL-terminated list of pointers.
pub unsafe fn count_args<P: ArgPuller>(
    first: *const c_char,
    args: &mut P,
    max: usize,
) -> Result<usize, ExecArgsError> {
    if first.is_null() {
        return Ok(0);
    }
    let mut count = 1usize;
    loop {
        let next = args.pull(Width::Ptr) as *const c_char;
        if next.is_null() {
            return Ok(count);
        }
        if count >= max {
            return Err(ExecArgsError::TooManyArguments { max });
        }
        count += 1;
    }
}

/// Collect `count` list arguments starting at `first` into a NULL-terminated
/// vector.
///
/// Consumes exactly the pointers [`count_args`] counted plus the terminator,
/// leaving `args` positioned on whatever follows the list.
///
/// # Safety
/// `count` must come from [`count_args`] over an identical copy of `args`.
pub unsafe fn build_argv<P: ArgPuller>(
    first: *const c_char,
    count: usize,
    args: &mut P,
) -> Vec<*const c_char> {
    let mut argv = Vec::with_capacity(count + 1);
    if count > 0 {
        argv.push(first);
        for _ in 1..count {
            argv.push(args.pull(Width::Ptr) as *const c_char);
        }
        // terminator
        let _ = args.pull(Width::Ptr);
    }
    argv.push(std::ptr::null());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::testing::QueuePuller;

    fn ptr(s: &'static [u8]) -> usize {
        s.as_ptr() as usize
    }

    #[test]
    fn test_null_first_is_empty_list() {
        let mut args = QueuePuller::new(&[]);
        let count = unsafe { count_args(std::ptr::null(), &mut args, MAX_EXEC_ARGS) }.unwrap();
        assert_eq!(count, 0);
        assert!(args.served.is_empty());

        let argv = unsafe { build_argv(std::ptr::null(), 0, &mut args) };
        assert_eq!(argv, vec![std::ptr::null::<c_char>()]);
        assert!(args.served.is_empty());
    }

    #[test]
    fn test_counts_first_argument() {
        let a0 = b"ls\0";
        let a1 = b"-l\0";
        let mut args = QueuePuller::new(&[ptr(a1), 0]);
        let count = unsafe { count_args(a0.as_ptr().cast(), &mut args, MAX_EXEC_ARGS) };
        assert_eq!(count, Ok(2));
        assert_eq!(args.remaining(), 0);
    }

    #[test]
    fn test_build_argv_leaves_envp_unread() {
        let a0 = b"env\0";
        let a1 = b"-i\0";
        let a2 = b"true\0";
        let envp = 0x1000usize;
        let list = [ptr(a1), ptr(a2), 0, envp];

        let mut counting = QueuePuller::new(&list);
        let count =
            unsafe { count_args(a0.as_ptr().cast(), &mut counting, MAX_EXEC_ARGS) }.unwrap();
        assert_eq!(count, 3);

        let mut collecting = QueuePuller::new(&list);
        let argv = unsafe { build_argv(a0.as_ptr().cast(), count, &mut collecting) };
        assert_eq!(argv.len(), 4);
        assert_eq!(argv[0], a0.as_ptr().cast::<c_char>());
        assert_eq!(argv[1] as usize, ptr(a1));
        assert_eq!(argv[2] as usize, ptr(a2));
        assert!(argv[3].is_null());

        // the next pull must be the environment pointer
        assert_eq!(unsafe { collecting.pull(Width::Ptr) }, envp);
    }

    #[test]
    fn test_single_argument_list() {
        let a0 = b"true\0";
        let mut args = QueuePuller::new(&[0]);
        let count = unsafe { count_args(a0.as_ptr().cast(), &mut args, MAX_EXEC_ARGS) }.unwrap();
        assert_eq!(count, 1);

        let mut args = QueuePuller::new(&[0]);
        let argv = unsafe { build_argv(a0.as_ptr().cast(), count, &mut args) };
        assert_eq!(argv, vec![a0.as_ptr().cast::<c_char>(), std::ptr::null::<c_char>()]);
        assert_eq!(args.remaining(), 0);
    }

    #[test]
    fn test_overflow_is_reported() {
        let a = b"x\0";
        let mut args = QueuePuller::new(&[ptr(a), ptr(a), ptr(a), 0]);
        let err = unsafe { count_args(a.as_ptr().cast(), &mut args, 3) };
        assert_eq!(err, Err(ExecArgsError::TooManyArguments { max: 3 }));
    }

    #[test]
    fn test_list_at_exact_limit_is_accepted() {
        let a = b"x\0";
        let mut args = QueuePuller::new(&[ptr(a), ptr(a), 0]);
        let count = unsafe { count_args(a.as_ptr().cast(), &mut args, 3) };
        assert_eq!(count, Ok(3));
    }
}

/// Cast an operation's real definition to its C prototype.
macro_rules! real {
    ($op:expr, $t:ty) => {
        std::mem::transmute::<*mut libc::c_void, $t>($op.real().as_ptr())
    };
}

/// Wrap a variadic argument list in an `ArgPuller`.
macro_rules! va_puller {
    ($args:ident) => {
        fu53_policy::marshal::FnPuller::new(|width| {
            use fu53_policy::marshal::Width;
            match width {
                Width::Int => unsafe { $args.next_arg::<libc::c_uint>() as usize },
                Width::Long => unsafe { $args.next_arg::<libc::c_ulong>() as usize },
                Width::Ptr => unsafe { $args.next_arg::<*const libc::c_void>() as usize },
            }
        })
    };
}

/// Decide a call and either forward it to the real definition or fail it
/// with `$fail` and the group's errno.
///
/// ```ignore
/// gated!(ops::UNLINK, -1, UnlinkFn, (path))
/// ```
macro_rules! gated {
    ($op:expr, $fail:expr, $t:ty, ($($arg:expr),* $(,)?)) => {{
        let op = &$op;
        match $crate::state::gate().check(op) {
            fu53_policy::Verdict::Delegate => real!(op, $t)($($arg),*),
            fu53_policy::Verdict::Deny => {
                $crate::set_errno(op.group().denial_errno());
                $fail
            }
            fu53_policy::Verdict::Abort => $crate::state::abort_call(op),
        }
    }};
}

/// Build the NULL-terminated argument vector of an `execl`-style call.
/// Counts over a copy of the list, then collects from the caller's list so it
/// is left on whatever follows the terminator.
macro_rules! exec_list {
    ($arg0:expr, $args:ident) => {{
        let mut copy = $args.clone();
        let counted = {
            let mut puller = va_puller!(copy);
            fu53_policy::exec::count_args($arg0, &mut puller, fu53_policy::exec::MAX_EXEC_ARGS)
        };
        match counted {
            Ok(count) => {
                let mut puller = va_puller!($args);
                Ok(fu53_policy::exec::build_argv($arg0, count, &mut puller))
            }
            Err(e) => Err(e),
        }
    }};
}

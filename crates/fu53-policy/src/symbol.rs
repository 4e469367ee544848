//! Handles to the next definition of an interposed symbol.
//!
//! Each replaced function forwards to the definition that follows this
//! library in the dynamic search order. The address is looked up on first
//! use and cached; a symbol that cannot be found is fatal.

use libc::c_void;
use std::ffi::CStr;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicPtr, Ordering};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("cannot resolve next definition of `{0}`")]
    Missing(&'static str),
}

/// Address lookup by symbol name.
pub trait SymbolResolver {
    fn lookup(&self, name: &CStr) -> *mut c_void;
}

/// `dlsym(RTLD_NEXT, name)`.
pub struct NextInSearchOrder;

impl SymbolResolver for NextInSearchOrder {
    fn lookup(&self, name: &CStr) -> *mut c_void {
        // SAFETY: `name` is NUL-terminated; RTLD_NEXT is a valid handle
        unsafe { libc::dlsym(libc::RTLD_NEXT, name.as_ptr()) }
    }
}

/// Lazily resolved, cached address of a real function.
pub struct RealSymbol {
    ptr: AtomicPtr<c_void>,
    name: &'static CStr,
}

impl RealSymbol {
    pub const fn new(name: &'static CStr) -> Self {
        Self {
            ptr: AtomicPtr::new(std::ptr::null_mut()),
            name,
        }
    }

    pub fn name(&self) -> &'static CStr {
        self.name
    }

    pub fn is_resolved(&self) -> bool {
        !self.ptr.load(Ordering::Acquire).is_null()
    }

    /// Resolve through `resolver` unless already cached.
    ///
    /// Racing resolvers all succeed; the first stored address is returned to
    /// everyone.
    pub fn resolve_with<R: SymbolResolver>(
        &self,
        resolver: &R,
    ) -> Result<NonNull<c_void>, ResolveError> {
        if let Some(p) = NonNull::new(self.ptr.load(Ordering::Acquire)) {
            return Ok(p);
        }
        let found = NonNull::new(resolver.lookup(self.name))
            .ok_or_else(|| ResolveError::Missing(self.name.to_str().unwrap_or("?")))?;
        log_symbol_trace!("resolved", symbol = self.name.to_str().unwrap_or("?"));
        match self.ptr.compare_exchange(
            std::ptr::null_mut(),
            found.as_ptr(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => Ok(found),
            Err(winner) => Ok(NonNull::new(winner).unwrap_or(found)),
        }
    }

    /// Address of the next definition. Aborts the process if there is none.
    pub fn get(&self) -> NonNull<c_void> {
        match self.resolve_with(&NextInSearchOrder) {
            Ok(p) => p,
            Err(e) => crate::fatal::fatal(format_args!("{e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingResolver {
        answer: *mut c_void,
        calls: Cell<usize>,
    }

    impl CountingResolver {
        fn new(answer: *mut c_void) -> Self {
            Self {
                answer,
                calls: Cell::new(0),
            }
        }
    }

    impl SymbolResolver for CountingResolver {
        fn lookup(&self, _name: &CStr) -> *mut c_void {
            self.calls.set(self.calls.get() + 1);
            self.answer
        }
    }

    #[test]
    fn test_resolves_once_and_caches() {
        let sym = RealSymbol::new(c"frobnicate");
        let resolver = CountingResolver::new(0x1234 as *mut c_void);
        assert!(!sym.is_resolved());
        for _ in 0..3 {
            assert_eq!(sym.resolve_with(&resolver).unwrap().as_ptr() as usize, 0x1234);
        }
        assert_eq!(resolver.calls.get(), 1);
        assert!(sym.is_resolved());
    }

    #[test]
    fn test_missing_symbol_is_an_error_and_not_cached() {
        let sym = RealSymbol::new(c"does_not_exist");
        let resolver = CountingResolver::new(std::ptr::null_mut());
        assert_eq!(
            sym.resolve_with(&resolver),
            Err(ResolveError::Missing("does_not_exist"))
        );
        assert_eq!(sym.resolve_with(&resolver), Err(ResolveError::Missing("does_not_exist")));
        assert_eq!(resolver.calls.get(), 2);
    }

    #[test]
    fn test_first_resolution_wins() {
        let sym = RealSymbol::new(c"frobnicate");
        sym.resolve_with(&CountingResolver::new(0x10 as *mut c_void)).unwrap();
        let later = sym.resolve_with(&CountingResolver::new(0x20 as *mut c_void)).unwrap();
        assert_eq!(later.as_ptr() as usize, 0x10);
    }

    #[test]
    fn test_next_in_search_order_finds_libc() {
        // the test binary has no interposer loaded, so RTLD_NEXT reaches libc
        let sym = RealSymbol::new(c"getpid");
        let p = sym.resolve_with(&NextInSearchOrder).unwrap();
        // SAFETY: getpid has this signature
        let getpid: extern "C" fn() -> libc::pid_t = unsafe { std::mem::transmute(p.as_ptr()) };
        assert_eq!(getpid(), std::process::id() as libc::pid_t);
    }
}

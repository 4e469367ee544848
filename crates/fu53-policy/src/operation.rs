//! Descriptor for one interposed function.

use crate::budget::CallCounter;
use crate::policy::PolicyGroup;
use crate::symbol::RealSymbol;
use libc::c_void;
use std::ffi::CStr;
use std::ptr::NonNull;

/// A replaced libc function: its name, the group that decides it, the cached
/// real definition and the budget consumed so far.
///
/// Instances are `static` and live for the whole process.
pub struct Operation {
    group: PolicyGroup,
    symbol: RealSymbol,
    calls: CallCounter,
}

impl Operation {
    pub const fn new(name: &'static CStr, group: PolicyGroup) -> Self {
        Self {
            group,
            symbol: RealSymbol::new(name),
            calls: CallCounter::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.symbol.name().to_str().unwrap_or("?")
    }

    pub fn group(&self) -> PolicyGroup {
        self.group
    }

    #[cfg(test)]
    fn symbol(&self) -> &RealSymbol {
        &self.symbol
    }

    pub fn calls(&self) -> u64 {
        self.calls.count()
    }

    /// Charge one call against `limit` (0 = unlimited).
    pub fn admit(&self, limit: u64) -> bool {
        self.calls.admit(limit)
    }

    /// Address of the real definition; aborts if it cannot be found.
    pub fn real(&self) -> NonNull<c_void> {
        self.symbol.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budgets_are_per_operation() {
        static A: Operation = Operation::new(c"open", PolicyGroup::Open);
        static B: Operation = Operation::new(c"openat", PolicyGroup::Open);
        assert!(A.admit(1));
        assert!(!A.admit(1));
        assert!(B.admit(1));
        assert_eq!(A.calls(), 1);
        assert_eq!(B.calls(), 1);
    }

    #[test]
    fn test_name_and_group() {
        let op = Operation::new(c"renameat2", PolicyGroup::Rename);
        assert_eq!(op.name(), "renameat2");
        assert_eq!(op.group(), PolicyGroup::Rename);
        assert!(!op.symbol().is_resolved());
    }
}

//! Per-operation call budgets.

use std::sync::atomic::{AtomicU64, Ordering};

/// Number of calls an operation has delegated under a budgeted policy.
///
/// Only ever increases. Admission is a single compare-and-increment, so no
/// interleaving of threads admits more than `limit` calls.
pub struct CallCounter(AtomicU64);

impl CallCounter {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Admit one call against `limit`. `limit == 0` means unlimited and
    /// leaves the counter untouched.
    pub fn admit(&self, limit: u64) -> bool {
        if limit == 0 {
            return true;
        }
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < limit).then_some(n + 1)
            })
            .is_ok()
    }

    pub fn count(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for CallCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_admits_exactly_limit() {
        for limit in 1..=5u64 {
            let counter = CallCounter::new();
            let admitted = (0..20).filter(|_| counter.admit(limit)).count() as u64;
            assert_eq!(admitted, limit);
            assert_eq!(counter.count(), limit);
        }
    }

    #[test]
    fn test_first_calls_are_the_admitted_ones() {
        let counter = CallCounter::new();
        let outcomes: Vec<bool> = (0..4).map(|_| counter.admit(2)).collect();
        assert_eq!(outcomes, vec![true, true, false, false]);
    }

    #[test]
    fn test_zero_limit_is_unlimited_and_uncounted() {
        let counter = CallCounter::new();
        assert!((0..1000).all(|_| counter.admit(0)));
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_rejection_does_not_increment() {
        let counter = CallCounter::new();
        assert!(counter.admit(1));
        assert!(!counter.admit(1));
        assert!(!counter.admit(1));
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn test_concurrent_admission_never_exceeds_limit() {
        const LIMIT: u64 = 37;
        let counter = Arc::new(CallCounter::new());
        let admitted = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                let admitted = Arc::clone(&admitted);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        if counter.admit(LIMIT) {
                            admitted.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::Relaxed) as u64, LIMIT);
        assert_eq!(counter.count(), LIMIT);
    }
}

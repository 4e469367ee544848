//! # fu53-policy
//!
//! Decision core of the fu53 interposition layer. Everything here is free of
//! exported C symbols so it can be unit-tested in an ordinary test harness:
//!
//! - [`config`]: snapshot of the policy environment variables
//! - [`policy`]: groups and their classification
//! - [`gate`]: per-call verdicts over a policy snapshot
//! - [`budget`]: atomic call counters for budgeted groups
//! - [`redirect`]: write-intent detection and the null sink
//! - [`marshal`]: typed pullers for variadic argument lists
//! - [`exec`]: argument-vector construction for `execl`-style calls
//! - [`symbol`]: once-resolved handles to the next definition of a symbol
//!
//! The `fu53-preload` crate wires these into `#[no_mangle]` entry points.

#[macro_use]
pub mod logging;

pub mod budget;
pub mod config;
pub mod exec;
pub mod fatal;
pub mod gate;
pub mod marshal;
pub mod operation;
pub mod policy;
pub mod redirect;
pub mod symbol;
pub mod sync;

pub use config::{Config, ConfigKey};
pub use gate::{Gate, OpenVerdict, Verdict};
pub use operation::Operation;
pub use policy::{Policy, PolicyGroup};

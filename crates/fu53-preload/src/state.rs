//! Process-wide interposer state.

use fu53_policy::fatal::fatal;
use fu53_policy::sync::InitOnce;
use fu53_policy::{Gate, Operation};

static GATE: InitOnce<Gate> = InitOnce::new();

/// The process gate. Built from the environment on first use, which is
/// normally the library constructor.
pub(crate) fn gate() -> &'static Gate {
    GATE.get_or_init(Gate::from_env)
}

/// Terminate the process for a call its group forbids outright.
pub(crate) fn abort_call(op: &Operation) -> ! {
    fatal(format_args!(
        "forbidden call to {}() ({} group)",
        op.name(),
        op.group().name()
    ))
}

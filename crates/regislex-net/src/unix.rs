//! Unix needs no process-wide socket subsystem setup.

use regislex_core::PalResult;

pub(crate) fn startup() -> PalResult<()> {
    Ok(())
}

pub(crate) fn cleanup() {}

//! Process-wide handling of the insecure-transport warning.

use std::sync::atomic::{AtomicBool, Ordering};

static INSECURE_WARNING_SUPPRESSED: AtomicBool = AtomicBool::new(false);

/// Announces, once per process, that certificate verification is disabled and
/// silences the warning from then on.
///
/// Returns `true` only for the call that actually performed it.
pub fn suppress_insecure_warnings() -> bool {
    if INSECURE_WARNING_SUPPRESSED.swap(true, Ordering::SeqCst) {
        return false;
    }
    tracing::warn!(
        "TLS certificate verification is disabled; further insecure-connection warnings are suppressed"
    );
    true
}

/// Whether [`suppress_insecure_warnings`] has run in this process.
pub fn insecure_warnings_suppressed() -> bool {
    INSECURE_WARNING_SUPPRESSED.load(Ordering::SeqCst)
}

//! Termination-signal suppression during imports.
//!
//! An interrupted commit could leave a batch half-written, so `SIGINT` and
//! `SIGTERM` are ignored for the whole lifetime of an import run. This is a
//! one-time setup with no teardown.

/// Ignore `SIGINT` and `SIGTERM` for the rest of the process lifetime.
#[cfg(unix)]
pub fn ignore_termination() {
    // SAFETY: SIG_IGN is a valid handler constant; signal(2) with SIG_IGN
    // has no preconditions beyond a valid signal number.
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_IGN);
        libc::signal(libc::SIGTERM, libc::SIG_IGN);
    }
    tracing::debug!("SIGINT/SIGTERM suppressed for the duration of the import");
}

/// No-op on non-Unix targets.
#[cfg(not(unix))]
pub fn ignore_termination() {}

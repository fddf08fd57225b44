//! Stack growth for the recursive passes.
//!
//! Scanning is iterative, but parsing, resolving and evaluating recurse once
//! (or several times) per level of nesting in the Lox program.  Deep Lox
//! recursion would otherwise abort the process with a native stack overflow.

/// Runs `f`, first moving to a freshly allocated stack segment if less than
/// the red zone is left on the current one.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Space that must remain before recursing further (128 KiB).
    const RED_ZONE: usize = 128 * 1024;

    /// Size of each new segment (1 MiB).
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

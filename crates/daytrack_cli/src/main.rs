//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `daytrack_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // Why: keep a tiny CLI probe to validate core crate wiring independently
    // from Flutter/FFI runtime setup.
    println!("daytrack_core ping={}", daytrack_core::ping());
    println!("daytrack_core version={}", daytrack_core::core_version());
}

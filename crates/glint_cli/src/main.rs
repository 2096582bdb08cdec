//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `glint_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // Why: keep a tiny CLI probe to validate core crate wiring independently
    // from the app runtime setup.
    println!("glint_core ping={}", glint_core::ping());
    println!("glint_core version={}", glint_core::core_version());
}

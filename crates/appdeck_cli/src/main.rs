//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `appdeck_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("appdeck_core ping={}", appdeck_core::ping());
    println!("appdeck_core version={}", appdeck_core::core_version());
}

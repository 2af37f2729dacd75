//! Property tests for Cascade.
//!
//! Properties use randomized input generation to explore edge cases and
//! protect invariants like "never panics".
//!
//! Run with: `cargo test --test properties`

#[path = "properties/imports.rs"]
mod imports;

#[path = "properties/paths.rs"]
mod paths;

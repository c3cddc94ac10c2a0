//! Library wrapper around the `veil` CLI implementation.
//!
//! Compiles the binary crate root (`main.rs`) as a module so
//! `cargo test -p veil-cli --lib` typechecks the CLI without building the
//! binary test suite.

#[allow(dead_code)]
#[path = "main.rs"]
mod main_bin;

//! End-to-end tests against a mock QAPI server.
//!
//! Run with:
//!   cargo test --test integration

#[path = "e2e/common.rs"]
mod common;
#[path = "e2e/calls.rs"]
mod calls;
#[path = "e2e/errors.rs"]
mod errors;

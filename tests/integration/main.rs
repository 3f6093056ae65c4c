//! Integration tests
//!
//! Workflow tests run against an in-memory runtime. Daemon-backed tests are
//! ignored by default; run them with `cargo test --test integration -- --ignored`.

mod docker_client;
mod fake;
mod workflows;

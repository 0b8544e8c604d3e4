//! Githist - read-only Git history over HTTP
//!
//! Githist exposes a repository's commits, references and per-commit diffs
//! as a small JSON API. It never writes to a repository.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`config`] - Startup configuration (flags and environment)
//! - [`git`] - The repository query layer; the only module touching the
//!   on-disk store
//! - [`server`] - The request pipeline: middleware stages, response
//!   envelope, routes, and the listener
//!
//! # Correctness Invariants
//!
//! 1. No module outside [`git`] depends on the underlying history library
//! 2. Repository handles and their iterators live for a single request and
//!    are released on every exit path
//! 3. Every response body, success or error, carries the uniform envelope
//! 4. Per-request context is typed and immutable; there is no global
//!    mutable state

pub mod config;
pub mod git;
pub mod server;

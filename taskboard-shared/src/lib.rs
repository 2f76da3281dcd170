//! # Taskboard Shared Library
//!
//! This crate contains the domain types, storage layer, and authentication
//! primitives used by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, JWT tokens, bearer middleware, session flow
//! - `db`: Connection pool and migrations
//! - `models`: Users, statuses and tasks (ownership-scoped storage)
//! - `error`: Storage-layer error type

pub mod auth;
pub mod db;
pub mod error;
pub mod models;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

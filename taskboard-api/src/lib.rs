//! # Taskboard API Server Library
//!
//! HTTP surface of the Taskboard service: accounts and sessions under
//! `/auth`, and the ownership-scoped `/statuses` and `/tasks` resources.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `cookies`: Refresh-token cookie helpers
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Request extractors that reject with `ApiError`
//! - `mailer`: Password-reset delivery
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod cookies;
pub mod error;
pub mod extract;
pub mod mailer;
pub mod middleware;
pub mod routes;

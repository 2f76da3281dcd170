/// Middleware modules for the API server
///
/// Bearer authentication lives in `app.rs` next to the router because it
/// needs the application state; this module holds state-free layers.

pub mod security;

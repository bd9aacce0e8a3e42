//! Request middleware.
//!
//! Purpose: cross-cutting request lifecycle concerns. `Trace` scopes a trace
//! identifier around each request; `Cors` answers preflights and stamps the
//! permissive CORS headers browser clients rely on.

pub mod cors;
pub mod trace;

pub use cors::Cors;
pub use trace::Trace;

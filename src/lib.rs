//! Serve a directory over HTTP, and run a remote test runner against the test files found in it.
//!
//! - [`server::FileServer`]: static file server (403 for directories, 404/500 fallbacks, CORS).
//! - [`discovery`]: walks the tree for test files and turns them into URLs on the server.
//! - [`runner::run`]: binds the server's lifetime to the external test runner's.
//! - [`cofg`]: layered configuration (built-in → file → env → CLI).

pub mod cofg;
pub mod content_type;
pub mod discovery;
pub mod error;
pub mod observer;
pub(crate) mod resolve;
pub(crate) mod response;
pub mod runner;
pub mod server;

pub use error::{ AppError, AppResult };

#[cfg(test)]
mod test;

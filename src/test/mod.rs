//! Test module - Central organization for all test submodules
//!
//! - Content typing and fallback classification
//! - Request path resolution (normalize, decode, confine)
//! - File server pipeline through actix test services and over a real socket
//! - Discovery filters and URL construction
//! - Orchestrator lifecycle against small system executables
//! - Config loading and CLI overrides

pub(crate) mod common;
pub(crate) mod content_type;
pub(crate) mod resolve;

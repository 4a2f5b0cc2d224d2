//! Observability hooks for the file server.
//!
//! A [`ServeObserver`] is injected once at construction. Both hooks default to no-ops, and the
//! server invokes them through [`guarded`] so a panicking hook cannot take down the request.

use std::{
  io,
  panic::{ self, AssertUnwindSafe },
};

use actix_web::{ HttpRequest, HttpResponse };
use log::{ debug, info, warn };

pub trait ServeObserver: Send + Sync {
  /// Called with the filesystem error before it is turned into a fallback response.
  fn on_error(&self, _err: &io::Error) {}

  /// Called with the final response, right before it is handed to the transport.
  fn on_serve(&self, _req: &HttpRequest, _res: &HttpResponse) {}
}

/// Observer that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ServeObserver for NoopObserver {}

/// Logs one line per request (`METHOD URI STATUS`) and filesystem errors at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ServeObserver for LogObserver {
  fn on_error(&self, err: &io::Error) {
    debug!("{err}: {}", err.kind());
  }

  fn on_serve(&self, req: &HttpRequest, res: &HttpResponse) {
    info!("{} {} {}", req.method(), req.uri(), res.status().as_u16());
  }
}

/// Run a hook, containing any panic it raises.
pub(crate) fn guarded(hook: &str, f: impl FnOnce()) {
  if panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
    warn!("{hook} hook panicked; response is delivered anyway");
  }
}

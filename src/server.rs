//! Static file server (accept loop, request pipeline, lifecycle)
//!
//! What it does
//! - Every request, any method and any path, goes through [`serve_request`]:
//!   resolve the URL under the serving root → 403 for directories → stream the file →
//!   404/500 fallback on filesystem errors → optional CORS → observer `on_serve`.
//! - One actix worker plus a per-server turn lock: requests are processed strictly one at a
//!   time.
//!
//! Lifecycle
//! - [`FileServer::bind`] binds the listener (port `0` picks a free port, on the first address the
//!   host resolves to only, so the reported port is the one actually listening).
//! - [`FileServer::start`] runs until a [`StopHandle`] stops it, or fails with the transport
//!   error.
//! - [`StopHandle::stop`] is Running → Stopped, once. It queues a stop command on the transport
//!   handle and returns without waiting, and the accept loop sees it even if no further request
//!   arrives.
//!
//! 中文：單 worker 依序處理請求；停止以取消訊號通知 accept loop，無需等待下一個請求。

use std::{
  io,
  net::{ SocketAddr, ToSocketAddrs },
  path::PathBuf,
  sync::{
    Arc,
    atomic::{ AtomicBool, Ordering },
  },
};

use actix_web::{
  App, HttpRequest, HttpResponse, HttpServer,
  dev::{ Server, ServerHandle },
  web,
};
use log::{ debug, info, warn };
use tokio::sync::Mutex;

use crate::{
  error::{ AppError, AppResult },
  observer::{ ServeObserver, guarded },
  resolve::resolve_request_path,
  response::{ apply_cors, build_fallback, build_success, forbidden_directory },
};

/// Immutable server parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
  pub host: String,
  pub port: u16,
  /// Serving root; canonicalized when the server is bound.
  pub root: PathBuf,
  pub cors: bool,
  /// Seconds the transport waits for in-flight connections after a stop.
  pub shutdown_timeout: u64,
}

impl ServeConfig {
  pub fn new(host: impl Into<String>, port: u16, root: impl Into<PathBuf>) -> Self {
    Self {
      host: host.into(),
      port,
      root: root.into(),
      cors: false,
      shutdown_timeout: 5,
    }
  }
}

/// Per-server state shared with the request handler.
pub(crate) struct ServeState {
  root: PathBuf,
  cors: bool,
  observer: Arc<dyn ServeObserver>,
  turn: Mutex<()>,
}

impl ServeState {
  pub(crate) fn new(
    root: &std::path::Path,
    cors: bool,
    observer: Arc<dyn ServeObserver>
  ) -> AppResult<Self> {
    Ok(Self {
      root: root.canonicalize()?,
      cors,
      observer,
      turn: Mutex::new(()),
    })
  }
}

/// Request pipeline, mounted as the app's default service.
pub(crate) async fn serve_request(req: HttpRequest, state: web::Data<ServeState>) -> HttpResponse {
  let _turn = state.turn.lock().await;

  let mut res = match respond_path(&state, req.uri().path()).await {
    Ok(res) => res,
    Err(err) => {
      guarded("on_error", || state.observer.on_error(&err));
      build_fallback(&err)
    }
  };
  if state.cors {
    apply_cors(&mut res);
  }
  guarded("on_serve", || state.observer.on_serve(&req, &res));
  res
}

async fn respond_path(state: &ServeState, url_path: &str) -> std::io::Result<HttpResponse> {
  let fs_path = resolve_request_path(&state.root, url_path)?;
  let meta = tokio::fs::metadata(&fs_path).await?;
  if meta.is_dir() {
    debug!("{}: is dir", fs_path.display());
    return Ok(forbidden_directory());
  }
  build_success(&fs_path).await
}

/// Addresses to listen on for `host:port`. With port `0` every address would get its own
/// ephemeral port, so only the first one is kept.
pub(crate) fn bind_addrs(host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
  let mut addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
  if addrs.is_empty() {
    return Err(
      io::Error::new(io::ErrorKind::AddrNotAvailable, format!("{host} resolved to no address"))
    );
  }
  if port == 0 && addrs.len() > 1 {
    debug!("{host} resolves to {} addresses, binding {} only", addrs.len(), addrs[0]);
    addrs.truncate(1);
  }
  Ok(addrs)
}

/// Stops a running [`FileServer`]. Cheap to clone.
#[derive(Clone)]
pub struct StopHandle {
  handle: ServerHandle,
  stopped: Arc<AtomicBool>,
}

impl StopHandle {
  /// Request the server to stop. Returns immediately; later calls are no-ops.
  pub fn stop(&self) {
    if self.stopped.swap(true, Ordering::SeqCst) {
      return;
    }
    // the command is queued synchronously; completion is observed by `FileServer::start`
    drop(self.handle.stop(true));
  }

  pub fn is_stopped(&self) -> bool {
    self.stopped.load(Ordering::SeqCst)
  }
}

pub struct FileServer {
  server: Server,
  stopper: StopHandle,
  addr: SocketAddr,
}

impl FileServer {
  /// Bind the listener for `config`. Nothing is served until [`FileServer::start`].
  pub fn bind(config: ServeConfig, observer: Arc<dyn ServeObserver>) -> AppResult<Self> {
    let state = web::Data::new(ServeState::new(&config.root, config.cors, observer)?);
    info!("serving {} (cors: {})", state.root.display(), state.cors);

    let http = HttpServer::new(move || {
      App::new()
        .app_data(state.clone())
        .default_service(web::to(serve_request))
    })
    .workers(1)
    .disable_signals()
    .shutdown_timeout(config.shutdown_timeout)
    .bind(bind_addrs(&config.host, config.port)?.as_slice())?;

    let addr = http
      .addrs()
      .first()
      .copied()
      .ok_or_else(|| AppError::ServerTask(format!("no address bound for {}", config.host)))?;
    let server = http.run();
    let stopper = StopHandle {
      handle: server.handle(),
      stopped: Arc::new(AtomicBool::new(false)),
    };
    Ok(Self {
      server,
      stopper,
      addr,
    })
  }

  pub fn local_addr(&self) -> SocketAddr {
    self.addr
  }

  pub fn stopper(&self) -> StopHandle {
    self.stopper.clone()
  }

  /// Serve until stopped.
  pub async fn start(self) -> AppResult<()> {
    debug!("accept loop on {}", self.addr);
    let result = self.server.await;
    if let Err(err) = &result {
      warn!("server on {} failed: {err}", self.addr);
    }
    self.stopper.stopped.store(true, Ordering::SeqCst);
    result.map_err(AppError::from)
  }
}

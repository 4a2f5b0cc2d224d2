//! Test-run orchestration
//!
//! Flow
//! 1. Collect test files under the root. None → [`AppError::NoTests`], before any port is bound.
//! 2. Bind the file server (same root, so discovery and serving agree on paths) and run it on a
//!    background task.
//! 3. Spawn the runner: `runner [subcommand] --reload=<origin> --allow-net=<host:port>
//!    ...permissions ...urls ...args`.
//! 4. Wait for the runner, stop the server, return the exit status.
//!
//! The server is stopped on every route out of step 3/4. If the server task fails first, the
//! runner is killed and the server error is returned.
//!
//! 中文：伺服器生命週期綁定子行程；子行程結束即停止伺服器，任何錯誤路徑都會清理。

use std::{
  path::PathBuf,
  process::{ ExitStatus, Output, Stdio },
  sync::Arc,
};

use log::{ debug, info, warn };
use tokio::{ process::{ Child, Command }, task::JoinError };

use crate::{
  discovery::{ DirFilter, FileFilter, collect_test_files, origin, urls },
  error::{ AppError, AppResult },
  observer::{ NoopObserver, ServeObserver },
  server::{ FileServer, ServeConfig },
};

/// How the runner's standard streams are wired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StdioMode {
  /// Share this process's stdin/stdout/stderr.
  #[default]
  Inherit,
  /// Pipe stdout/stderr into [`RunOutcome`]; stdin is closed.
  Capture,
}

/// Orchestrator input.
#[derive(Clone)]
pub struct RunParam {
  pub host: String,
  pub port: u16,
  pub cors: bool,
  /// Discovery and serving root.
  pub root: PathBuf,
  pub dir_filter: DirFilter,
  pub file_filter: FileFilter,
  /// Executable name or path.
  pub runner: String,
  /// First argument, e.g. `test` for `deno test`.
  pub subcommand: Option<String>,
  /// Extra permission flags, placed before the test URLs.
  pub permissions: Vec<String>,
  /// Trailing arguments, placed after the test URLs.
  pub args: Vec<String>,
  pub stdio: StdioMode,
  pub shutdown_timeout: u64,
  pub observer: Arc<dyn ServeObserver>,
}

impl RunParam {
  pub fn new(host: impl Into<String>, port: u16) -> Self {
    Self {
      host: host.into(),
      port,
      cors: false,
      root: PathBuf::from("."),
      dir_filter: DirFilter::default(),
      file_filter: FileFilter::default(),
      runner: "deno".to_string(),
      subcommand: Some("test".to_string()),
      permissions: Vec::new(),
      args: Vec::new(),
      stdio: StdioMode::Inherit,
      shutdown_timeout: 5,
      observer: Arc::new(NoopObserver),
    }
  }
}

/// What the runner left behind. `stdout`/`stderr` are empty unless [`StdioMode::Capture`].
#[derive(Debug)]
pub struct RunOutcome {
  pub status: ExitStatus,
  pub stdout: Vec<u8>,
  pub stderr: Vec<u8>,
}

impl From<Output> for RunOutcome {
  fn from(out: Output) -> Self {
    Self {
      status: out.status,
      stdout: out.stdout,
      stderr: out.stderr,
    }
  }
}

/// Argument list handed to the runner (the executable itself excluded).
pub fn runner_args(
  subcommand: Option<&str>,
  host: &str,
  port: u16,
  permissions: &[String],
  urls: &[String],
  args: &[String]
) -> Vec<String> {
  let mut out = Vec::with_capacity(3 + permissions.len() + urls.len() + args.len());
  out.extend(subcommand.map(str::to_string));
  out.push(format!("--reload={}", origin(host, port)));
  out.push(format!("--allow-net={host}:{port}"));
  out.extend(permissions.iter().cloned());
  out.extend(urls.iter().cloned());
  out.extend(args.iter().cloned());
  out
}

fn runner_command(param: &RunParam, args: Vec<String>) -> Command {
  let mut command = Command::new(&param.runner);
  command.args(args).kill_on_drop(true);
  match param.stdio {
    StdioMode::Inherit => {
      command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    }
    StdioMode::Capture => {
      command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    }
  }
  command
}

fn flatten(joined: Result<AppResult<()>, JoinError>) -> AppResult<()> {
  joined.map_err(|e| AppError::ServerTask(e.to_string()))?
}

enum Finished {
  Runner(std::io::Result<Output>),
  Server(AppResult<()>),
}

/// Race the runner against the server task. `stop` runs on every route out; if the server ends
/// with an error first, the runner is dropped (and killed) and the error is returned.
pub(crate) async fn supervise<S>(child: Child, server: S, stop: impl Fn()) -> AppResult<Output>
  where S: Future<Output = AppResult<()>>
{
  let runner = child.wait_with_output();
  tokio::pin!(runner);
  tokio::pin!(server);

  let finished = tokio::select! {
    out = &mut runner => Finished::Runner(out),
    served = &mut server => Finished::Server(served),
  };

  match finished {
    Finished::Runner(out) => {
      stop();
      let served = server.await;
      let out = out.map_err(AppError::RunnerWait)?;
      served?;
      Ok(out)
    }
    Finished::Server(Err(err)) => {
      stop();
      // dropping the wait future drops the child, which kills it
      warn!("server failed before the test runner exited: {err}");
      Err(err)
    }
    Finished::Server(Ok(())) => {
      stop();
      warn!("server stopped before the test runner exited");
      runner.await.map_err(AppError::RunnerWait)
    }
  }
}

/// Run the external test runner against the discovered test files.
pub async fn run(param: RunParam) -> AppResult<RunOutcome> {
  let files = collect_test_files(&param.root, &param.dir_filter, &param.file_filter)?;
  if files.is_empty() {
    return Err(AppError::NoTests(param.root.clone()));
  }
  debug!("{} test file(s) under {}", files.len(), param.root.display());

  let mut serve = ServeConfig::new(param.host.clone(), param.port, param.root.clone());
  serve.cors = param.cors;
  serve.shutdown_timeout = param.shutdown_timeout;
  let server = FileServer::bind(serve, param.observer.clone())?;
  let port = server.local_addr().port();
  let stopper = server.stopper();
  let server_task = actix_web::rt::spawn(server.start());

  let test_urls = urls(&origin(&param.host, port), &files);
  let args = runner_args(
    param.subcommand.as_deref(),
    &param.host,
    port,
    &param.permissions,
    &test_urls,
    &param.args
  );
  info!("{} {}", param.runner, args.join(" "));

  let child = match runner_command(&param, args).spawn() {
    Ok(child) => child,
    Err(source) => {
      stopper.stop();
      if let Err(err) = flatten(server_task.await) {
        warn!("server shutdown after spawn failure: {err}");
      }
      return Err(AppError::Spawn {
        runner: param.runner.clone(),
        source,
      });
    }
  };

  let output = supervise(child, async move { flatten(server_task.await) }, || stopper.stop()).await?;
  info!("test runner exited with {}", output.status);
  Ok(output.into())
}

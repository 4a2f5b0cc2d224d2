//! Configuration (Cofg)
//!
//! Layered with the `config` crate, lowest precedence first:
//! 1. built-in `cofg.yaml` (compiled in, so every key always has a value)
//! 2. `./cofg.yaml` if present, or the file given with `--config` (then required)
//! 3. environment, `FIXTURE_SERVER__<SECTION>__<KEY>` (e.g. `FIXTURE_SERVER__ADDRS__PORT=8080`)
//! 4. CLI flags, merged afterwards by `build_config_from_cli`
//!
//! 中文：內建設定 → 設定檔 → 環境變數 → 命令列參數，後者覆寫前者。

use nest_struct::nest_struct;
use std::{ path::{ Path, PathBuf }, sync::Arc };

use crate::{
  discovery::{ DirFilter, FileFilter },
  error::AppResult,
  observer::ServeObserver,
  runner::{ RunParam, StdioMode },
  server::ServeConfig,
};

pub(crate) const BUILD_COFG: &str = include_str!("cofg.yaml");
pub(crate) const ENV_PREFIX: &str = "FIXTURE_SERVER";

#[nest_struct]
#[derive(PartialEq, Clone, Debug, serde::Deserialize)]
pub struct Cofg {
  pub addrs: nest! {
    /// like: 127.0.0.1
    pub ip: String,
    /// like: 80, 8080
    pub port: u16,
  },
  pub cors: bool,
  pub public_path: String,
  pub log_requests: bool,
  pub shutdown_timeout: u64,
  pub test: nest! {
    /// executable of the test runner
    pub runner: String,
    pub subcommand: Option<String>,
    pub permissions: Vec<String>,
    pub args: Vec<String>,
    /// directory names skipped by discovery
    pub ignore: Vec<String>,
    pub marker: String,
    pub ext: Vec<String>,
    /// glob overriding marker/ext
    pub pattern: Option<String>,
    pub stdio: StdioMode,
  },
}

impl Default for Cofg {
  fn default() -> Self {
    Cofg::new_from_str(BUILD_COFG).expect("built-in cofg.yaml must deserialize")
  }
}

impl Cofg {
  /// Load all layers except the CLI.
  pub fn load(path: Option<&Path>) -> AppResult<Self> {
    let builder = config::Config
      ::builder()
      .add_source(config::File::from_str(BUILD_COFG, config::FileFormat::Yaml));
    let builder = match path {
      Some(p) => builder.add_source(config::File::from(p).required(true)),
      None => builder.add_source(config::File::with_name("./cofg.yaml").required(false)),
    };
    Ok(
      builder
        .add_source(
          config::Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true)
        )
        .build()?
        .try_deserialize::<Self>()?
    )
  }

  pub fn new_from_str(data_str: &str) -> AppResult<Self> {
    Ok(
      config::Config
        ::builder()
        .add_source(config::File::from_str(data_str, config::FileFormat::Yaml))
        .build()?
        .try_deserialize::<Self>()?
    )
  }

  pub fn serve_config(&self) -> ServeConfig {
    ServeConfig {
      host: self.addrs.ip.clone(),
      port: self.addrs.port,
      root: PathBuf::from(&self.public_path),
      cors: self.cors,
      shutdown_timeout: self.shutdown_timeout,
    }
  }

  pub fn dir_filter(&self) -> DirFilter {
    DirFilter::ExcludeNames(self.test.ignore.clone())
  }

  pub fn file_filter(&self) -> FileFilter {
    match &self.test.pattern {
      Some(pattern) => FileFilter::Glob(pattern.clone()),
      None =>
        FileFilter::Suffix {
          marker: self.test.marker.clone(),
          extensions: self.test.ext.clone(),
        },
    }
  }

  pub fn run_param(&self, observer: Arc<dyn ServeObserver>) -> RunParam {
    RunParam {
      host: self.addrs.ip.clone(),
      port: self.addrs.port,
      cors: self.cors,
      root: PathBuf::from(&self.public_path),
      dir_filter: self.dir_filter(),
      file_filter: self.file_filter(),
      runner: self.test.runner.clone(),
      subcommand: self.test.subcommand.clone().filter(|s| !s.is_empty()),
      permissions: self.test.permissions.clone(),
      args: self.test.args.clone(),
      stdio: self.test.stdio,
      shutdown_timeout: self.shutdown_timeout,
      observer,
    }
  }
}

impl std::fmt::Display for CofgAddrs {
  /// Format the address as `IP:Port`.
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{}", self.ip, self.port)
  }
}

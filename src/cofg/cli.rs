//! CLI argument parsing for overriding config
//!
//! Flags only override what they name; everything else comes from the file/env layers.
//!
//! 中文：命令列參數只覆寫指定欄位，其餘沿用設定檔。

use std::path::PathBuf;

use clap::{ Parser, Subcommand };

use crate::runner::StdioMode;

#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
pub struct Args {
  /// config file (default: ./cofg.yaml if present)
  #[arg(long, global = true)]
  pub config: Option<PathBuf>,
  #[arg(long, global = true)]
  pub ip: Option<String>,
  #[arg(long, global = true)]
  pub port: Option<u16>,
  /// enable or disable CORS headers
  #[arg(long, global = true)]
  pub cors: Option<bool>,
  /// serving root
  #[arg(long, global = true)]
  pub root: Option<String>,
  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
  /// serve the root directory until interrupted
  Serve,
  /// discover test files, serve them and run the test runner against them
  Test(TestArgs),
}

#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TestArgs {
  /// test runner executable
  #[arg(long)]
  pub runner: Option<String>,
  /// extra permission flag for the runner (repeatable)
  #[arg(long = "permission", allow_hyphen_values = true)]
  pub permissions: Vec<String>,
  /// wax glob selecting test files
  #[arg(long)]
  pub pattern: Option<String>,
  #[arg(long, value_enum)]
  pub stdio: Option<StdioMode>,
  /// arguments appended after the test urls
  #[arg(last = true)]
  pub args: Vec<String>,
}

impl From<&Args> for super::config::CofgAddrs {
  fn from(val: &Args) -> Self {
    // Invariant: only called when both fields are present (see `build_config_from_cli`).
    debug_assert!(val.ip.is_some() && val.port.is_some());
    super::config::CofgAddrs {
      ip: val.ip.clone().unwrap_or_default(),
      port: val.port.unwrap_or_default(),
    }
  }
}

pub mod cli;
pub mod config;

pub use config::{ Cofg, CofgAddrs, CofgTest };

/// Merge CLI overrides into loaded config.
///
/// File-based config is the baseline; explicit CLI flags have higher precedence.
/// 中文：以設定檔為基礎，命令列參數覆寫對應欄位。
pub fn build_config_from_cli(mut s: Cofg, cli: &cli::Args) -> Cofg {
  match (&cli.ip, cli.port) {
    (None, None) => (),
    (None, Some(port)) => {
      s.addrs.port = port;
    }
    (Some(ip), None) => {
      s.addrs.ip = ip.to_string();
    }
    (Some(_), Some(_)) => {
      s.addrs = cli.into();
    }
  }
  if let Some(cors) = cli.cors {
    s.cors = cors;
  }
  if let Some(root) = &cli.root {
    s.public_path = root.clone();
  }
  if let Some(cli::Command::Test(t)) = &cli.command {
    if let Some(runner) = &t.runner {
      s.test.runner = runner.clone();
    }
    if !t.permissions.is_empty() {
      s.test.permissions = t.permissions.clone();
    }
    if let Some(pattern) = &t.pattern {
      s.test.pattern = Some(pattern.clone());
    }
    if let Some(stdio) = t.stdio {
      s.test.stdio = stdio;
    }
    if !t.args.is_empty() {
      s.test.args = t.args.clone();
    }
  }
  s
}

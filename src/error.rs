//! Unified error types using thiserror

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("IO error: {0}")] Io(#[from] std::io::Error),
  #[error("Glob pattern error: {0}")] GlobPattern(#[from] wax::BuildError),
  #[error("Walk error: {0}")] Walk(#[from] walkdir::Error),
  #[error("Config error: {0}")] Config(#[from] config::ConfigError),
  #[error("No tests found under {}", .0.display())] NoTests(PathBuf),
  #[error("Failed to spawn test runner `{runner}`: {source}")] Spawn {
    runner: String,
    #[source]
    source: std::io::Error,
  },
  #[error("Failed waiting for test runner: {0}")] RunnerWait(#[source] std::io::Error),
  #[error("Server task failed: {0}")] ServerTask(String),
}

pub type AppResult<T> = Result<T, AppError>;

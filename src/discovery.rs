//! Test-file discovery
//!
//! Walks a project tree (depth-first, entries sorted by file name so the order is stable for a
//! fixed tree) and collects files accepted by a [`FileFilter`], skipping directories rejected by
//! a [`DirFilter`]. Paths are reported relative to the walk root with `/` separators, which is
//! exactly the form the file server resolves back to the same file.

use std::{
  ffi::OsStr,
  fmt,
  path::{ Component, Path },
  sync::Arc,
};

use log::{ debug, trace };
use percent_encoding::{ AsciiSet, CONTROLS, utf8_percent_encode };
use walkdir::{ DirEntry, WalkDir };
use wax::{ Glob, Pattern };

use crate::error::AppResult;

/// Characters escaped inside one URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
  .add(b' ')
  .add(b'"')
  .add(b'#')
  .add(b'%')
  .add(b'<')
  .add(b'>')
  .add(b'?')
  .add(b'`')
  .add(b'{')
  .add(b'}');

pub const DEFAULT_IGNORED_DIRS: [&str; 2] = [".git", "node_modules"];
pub const DEFAULT_MARKER: &str = "test";
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["ts", "js"];

/// A directory entry seen during the walk.
#[derive(Debug, Clone, Copy)]
pub struct EntryInfo<'a> {
  pub container: &'a Path,
  pub name: &'a OsStr,
  pub is_dir: bool,
}

pub type EntryPredicate = Arc<dyn Fn(&EntryInfo<'_>) -> bool + Send + Sync>;
pub type PathPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Decides whether the walk descends into a directory.
#[derive(Clone)]
pub enum DirFilter {
  /// Skip directories whose name equals one of these (case-sensitive).
  ExcludeNames(Vec<String>),
  /// Descend when the predicate returns `true`.
  Custom(EntryPredicate),
}

impl Default for DirFilter {
  fn default() -> Self {
    DirFilter::ExcludeNames(DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect())
  }
}

impl fmt::Debug for DirFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DirFilter::ExcludeNames(names) => f.debug_tuple("ExcludeNames").field(names).finish(),
      DirFilter::Custom(_) => f.write_str("Custom(..)"),
    }
  }
}

impl DirFilter {
  pub fn allows(&self, entry: &EntryInfo<'_>) -> bool {
    match self {
      DirFilter::ExcludeNames(names) => !names.iter().any(|n| OsStr::new(n) == entry.name),
      DirFilter::Custom(f) => f(entry),
    }
  }
}

/// Decides whether a file (by its `/`-separated path relative to the walk root) is a test file.
#[derive(Clone)]
pub enum FileFilter {
  /// Case-insensitive `.{marker}.{ext}` suffix for any of `extensions`.
  Suffix {
    marker: String,
    extensions: Vec<String>,
  },
  /// A `wax` glob such as `**/*_test.{ts,js}`.
  Glob(String),
  Custom(PathPredicate),
}

impl Default for FileFilter {
  fn default() -> Self {
    FileFilter::Suffix {
      marker: DEFAULT_MARKER.to_string(),
      extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
    }
  }
}

impl fmt::Debug for FileFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FileFilter::Suffix { marker, extensions } => f
        .debug_struct("Suffix")
        .field("marker", marker)
        .field("extensions", extensions)
        .finish(),
      FileFilter::Glob(pattern) => f.debug_tuple("Glob").field(pattern).finish(),
      FileFilter::Custom(_) => f.write_str("Custom(..)"),
    }
  }
}

enum Matcher<'a> {
  Suffixes(Vec<String>),
  Glob(Glob<'a>),
  Custom(&'a PathPredicate),
}

impl Matcher<'_> {
  fn is_match(&self, rel: &str) -> bool {
    match self {
      Matcher::Suffixes(suffixes) => {
        let lower = rel.to_lowercase();
        suffixes.iter().any(|s| lower.ends_with(s.as_str()))
      }
      Matcher::Glob(glob) => glob.is_match(rel),
      Matcher::Custom(f) => f(rel),
    }
  }
}

impl FileFilter {
  fn compile(&self) -> AppResult<Matcher<'_>> {
    Ok(match self {
      FileFilter::Suffix { marker, extensions } => Matcher::Suffixes(
        extensions
          .iter()
          .map(|ext| format!(".{marker}.{ext}").to_lowercase())
          .collect(),
      ),
      FileFilter::Glob(pattern) => Matcher::Glob(Glob::new(pattern)?),
      FileFilter::Custom(f) => Matcher::Custom(f),
    })
  }

  /// One-off check; discovery compiles the filter once per walk instead.
  pub fn matches(&self, rel: &str) -> AppResult<bool> {
    Ok(self.compile()?.is_match(rel))
  }
}

/// `http://{host}:{port}`
pub fn origin(host: &str, port: u16) -> String {
  format!("http://{host}:{port}")
}

/// `/`-joined path of `path` relative to `root`.
fn relative_path(root: &Path, path: &Path) -> String {
  path.strip_prefix(root)
    .unwrap_or(path)
    .components()
    .filter_map(|c| match c {
      Component::Normal(s) => Some(s.to_string_lossy()),
      _ => None,
    })
    .collect::<Vec<_>>()
    .join("/")
}

fn descend(dirs: &DirFilter, entry: &DirEntry) -> bool {
  if entry.depth() == 0 || !entry.file_type().is_dir() {
    return true;
  }
  let info = EntryInfo {
    container: entry.path().parent().unwrap_or(Path::new("")),
    name: entry.file_name(),
    is_dir: true,
  };
  let allowed = dirs.allows(&info);
  if !allowed {
    debug!("skip dir {}", entry.path().display());
  }
  allowed
}

/// Relative paths of every test file under `root`, in walk order.
pub fn collect_test_files(
  root: &Path,
  dirs: &DirFilter,
  files: &FileFilter
) -> AppResult<Vec<String>> {
  let matcher = files.compile()?;
  let mut found = Vec::new();
  let walker = WalkDir::new(root)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| descend(dirs, e));
  for entry in walker {
    let entry = entry?;
    if entry.file_type().is_dir() {
      continue;
    }
    let rel = relative_path(root, entry.path());
    trace!("candidate {rel}");
    if matcher.is_match(&rel) {
      found.push(rel);
    }
  }
  Ok(found)
}

/// Percent-encode each segment of a `/`-separated relative path.
pub fn encode_relative_path(rel: &str) -> String {
  rel.split('/')
    .map(|seg| utf8_percent_encode(seg, SEGMENT).to_string())
    .collect::<Vec<_>>()
    .join("/")
}

/// `{origin}/{relative path}` for each relative path, segments percent-encoded.
pub fn urls(origin: &str, rels: &[String]) -> Vec<String> {
  rels
    .iter()
    .map(|rel| format!("{origin}/{}", encode_relative_path(rel)))
    .collect()
}

/// Fully qualified URLs of every test file under `root`.
pub fn discover(
  root: &Path,
  origin: &str,
  dirs: &DirFilter,
  files: &FileFilter
) -> AppResult<Vec<String>> {
  Ok(urls(origin, &collect_test_files(root, dirs, files)?))
}

//! Request path → filesystem path resolution
//!
//! Order matters: the URL path is normalized first, then percent-decoded, then joined under the
//! serving root. Decoding may reintroduce `..` or separators (`%2e%2e`, `%2f`), so the joined
//! path is canonicalized and must still start with the canonical root.
//!
//! 中文：先正規化再解碼，最後 canonicalize 並檢查前綴，防止跳出服務根目錄。

use std::{
  borrow::Cow,
  io,
  path::{ Path, PathBuf },
};

use log::{ debug, warn };
use percent_encoding::percent_decode_str;

/// Collapse `.`, `..` and repeated `/` the way a POSIX path normalizer does for an absolute
/// path: `..` at the root is dropped, a trailing `/` is kept.
pub(crate) fn normalize_url_path(path: &str) -> String {
  let mut segments: Vec<&str> = Vec::new();
  for segment in path.split('/') {
    match segment {
      "" | "." => {}
      ".." => {
        segments.pop();
      }
      s => segments.push(s),
    }
  }
  let mut out = format!("/{}", segments.join("/"));
  if path.ends_with('/') && !segments.is_empty() {
    out.push('/');
  }
  out
}

/// `true` when every `%` starts a two-hex-digit escape.
fn escapes_well_formed(s: &str) -> bool {
  let bytes = s.as_bytes();
  bytes
    .iter()
    .enumerate()
    .filter(|(_, b)| **b == b'%')
    .all(|(i, _)| {
      bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit) &&
        bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit)
    })
}

/// Percent-decode a normalized path. A malformed escape anywhere, or a result that is not UTF-8,
/// leaves the whole input undecoded.
pub(crate) fn decode_url_path(normalized: &str) -> String {
  if !escapes_well_formed(normalized) {
    debug!("keeping undecoded path {normalized}: malformed escape");
    return normalized.to_string();
  }
  match percent_decode_str(normalized).decode_utf8() {
    Ok(Cow::Borrowed(s)) => s.to_string(),
    Ok(Cow::Owned(s)) => s,
    Err(e) => {
      debug!("keeping undecoded path {normalized}: {e}");
      normalized.to_string()
    }
  }
}

/// Join a decoded request path beneath `root`. Leading separators are stripped so the result is
/// never an absolute path that would replace `root`.
pub(crate) fn join_under_root(root: &Path, decoded: &str) -> PathBuf {
  root.join(decoded.trim_start_matches(['/', '\\']))
}

/// Canonicalize `candidate` and require it to stay under `root` (already canonical).
///
/// An escaping path is reported as `NotFound`, so clients only ever see a 404 for it.
pub(crate) fn confine(root: &Path, candidate: &Path) -> io::Result<PathBuf> {
  let resolved = candidate.canonicalize()?;
  if resolved.starts_with(root) {
    Ok(resolved)
  } else {
    warn!("!!! path escapes serving root: {} -> {}", candidate.display(), resolved.display());
    Err(io::Error::new(io::ErrorKind::NotFound, "path outside serving root"))
  }
}

/// Full pipeline from a raw URL path (no query string) to a confined filesystem path.
pub(crate) fn resolve_request_path(root: &Path, url_path: &str) -> io::Result<PathBuf> {
  let normalized = normalize_url_path(url_path);
  let decoded = decode_url_path(&normalized);
  confine(root, &join_under_root(root, &decoded))
}

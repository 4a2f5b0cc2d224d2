//! Path resolution tests - normalization, decoding and confinement under the serving root

use std::{ fs, io::ErrorKind, path::Path };

use tempfile::TempDir;

use crate::resolve::{
  confine,
  decode_url_path,
  join_under_root,
  normalize_url_path,
  resolve_request_path,
};

#[test]
fn normalize_collapses_dots_and_separators() {
  assert_eq!(normalize_url_path("/"), "/");
  assert_eq!(normalize_url_path("/a/./b"), "/a/b");
  assert_eq!(normalize_url_path("//a///b"), "/a/b");
  assert_eq!(normalize_url_path("/a/b/../c"), "/a/c");
  assert_eq!(normalize_url_path("/a/b/"), "/a/b/");
}

#[test]
fn normalize_never_climbs_above_root() {
  assert_eq!(normalize_url_path("/../../etc/passwd"), "/etc/passwd");
  assert_eq!(normalize_url_path("/.."), "/");
}

#[test]
fn decode_handles_percent_sequences() {
  assert_eq!(decode_url_path("/with%20space.txt"), "/with space.txt");
  assert_eq!(decode_url_path("/%E4%B8%AD.md"), "/中.md");
}

#[test]
fn decode_failure_keeps_normalized_path() {
  // %FF is not valid UTF-8 once decoded
  assert_eq!(decode_url_path("/bad%FF.txt"), "/bad%FF.txt");
}

#[test]
fn malformed_escape_keeps_whole_path_undecoded() {
  assert_eq!(decode_url_path("/a%20b%zz.txt"), "/a%20b%zz.txt");
  assert_eq!(decode_url_path("/a%20b%2.txt"), "/a%20b%2.txt");
  assert_eq!(decode_url_path("/trailing%"), "/trailing%");
}

#[test]
fn malformed_escape_resolves_to_literal_name() {
  let dir = TempDir::new().unwrap();
  fs::write(dir.path().join("a%20b%zz.txt"), "literal").unwrap();
  fs::write(dir.path().join("a b%zz.txt"), "decoded").unwrap();
  let root = dir.path().canonicalize().unwrap();

  let resolved = resolve_request_path(&root, "/a%20b%zz.txt").unwrap();
  assert_eq!(fs::read_to_string(resolved).unwrap(), "literal");
}

#[test]
fn join_strips_leading_separators() {
  let root = Path::new("/srv/root");
  assert_eq!(join_under_root(root, "///etc/passwd"), root.join("etc/passwd"));
  assert_eq!(join_under_root(root, "/"), root.join(""));
}

#[test]
fn resolve_finds_files_under_root() {
  let dir = TempDir::new().unwrap();
  fs::write(dir.path().join("a.json"), "{}").unwrap();
  let root = dir.path().canonicalize().unwrap();

  let resolved = resolve_request_path(&root, "/./a.json").unwrap();
  assert_eq!(resolved, root.join("a.json"));
}

#[test]
fn encoded_dot_dot_cannot_escape_root() {
  let outer = TempDir::new().unwrap();
  fs::create_dir_all(outer.path().join("root")).unwrap();
  fs::write(outer.path().join("secret.txt"), "secret").unwrap();
  let root = outer.path().join("root").canonicalize().unwrap();

  for url in ["/%2e%2e/secret.txt", "/%2E%2E%2Fsecret.txt", "/..%2fsecret.txt"] {
    let err = resolve_request_path(&root, url).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound, "{url} must not resolve");
  }
}

#[test]
fn confine_rejects_existing_path_outside_root() {
  let outer = TempDir::new().unwrap();
  fs::create_dir_all(outer.path().join("root")).unwrap();
  fs::write(outer.path().join("outside.txt"), "x").unwrap();
  let root = outer.path().join("root").canonicalize().unwrap();

  let err = confine(&root, &root.join("../outside.txt")).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn missing_file_is_not_found() {
  let dir = TempDir::new().unwrap();
  let root = dir.path().canonicalize().unwrap();
  let err = resolve_request_path(&root, "/missing.txt").unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

use std::path::Path;

use crate::content_type::content_type;

#[test]
fn known_extensions_map_to_media_types() {
  let cases = [
    ("readme.md", "text/markdown"),
    ("index.html", "text/html"),
    ("index.htm", "text/html"),
    ("a.json", "application/json"),
    ("bundle.js.map", "application/json"),
    ("notes.txt", "text/plain"),
    ("mod.ts", "text/typescript"),
    ("view.tsx", "text/tsx"),
    ("mod.js", "application/javascript"),
    ("view.jsx", "text/jsx"),
    ("archive.tar.gz", "application/gzip"),
    ("module.wasm", "application/wasm"),
  ];
  for (file, expected) in cases {
    assert_eq!(content_type(Path::new(file)), Some(expected), "{file}");
  }
}

#[test]
fn extension_lookup_ignores_case() {
  assert_eq!(content_type(Path::new("A.JSON")), Some("application/json"));
  assert_eq!(content_type(Path::new("x.Test.TS")), Some("text/typescript"));
}

#[test]
fn unknown_or_missing_extension_has_no_opinion() {
  assert_eq!(content_type(Path::new("image.png")), None);
  assert_eq!(content_type(Path::new("Makefile")), None);
  assert_eq!(content_type(Path::new(".gitignore")), None);
}

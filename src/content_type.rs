//! Extension → media type table used for `content-type`.

use std::path::Path;

const MEDIA_TYPES: &[(&str, &str)] = &[
  ("md", "text/markdown"),
  ("html", "text/html"),
  ("htm", "text/html"),
  ("json", "application/json"),
  ("map", "application/json"),
  ("txt", "text/plain"),
  ("ts", "text/typescript"),
  ("tsx", "text/tsx"),
  ("js", "application/javascript"),
  ("jsx", "text/jsx"),
  ("gz", "application/gzip"),
  ("wasm", "application/wasm"),
];

/// Returns the content-type for the extension of `path`, or `None` when the table has no
/// entry (the header must then be left out).
pub fn content_type(path: &Path) -> Option<&'static str> {
  let ext = path.extension()?.to_str()?.to_ascii_lowercase();
  MEDIA_TYPES
    .iter()
    .find(|(known, _)| *known == ext)
    .map(|(_, media)| *media)
}

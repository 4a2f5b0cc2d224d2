use std::{ fs, path::Path, sync::{ Arc, Mutex } };

use actix_web::{ HttpRequest, HttpResponse };
use tempfile::TempDir;

use crate::observer::ServeObserver;

/// Write `contents` at `rel` under `root`, creating parent directories.
pub(crate) fn write_file(root: &Path, rel: &str, contents: &[u8]) {
  let path = root.join(rel);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, contents).unwrap();
}

/// Serving root with `a.json` (10 bytes), `notes.unknownext`, `sub/inner.txt` and `sub/deeper/`.
pub(crate) fn fixture_root() -> TempDir {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "a.json", b"{\"a\":1234}");
  write_file(dir.path(), "notes.unknownext", b"plain");
  write_file(dir.path(), "sub/inner.txt", b"inner");
  fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
  dir
}

/// Records every hook call as `error:<kind>` / `serve:<method> <path> <status>`.
#[derive(Default)]
pub(crate) struct RecordingObserver {
  pub(crate) events: Mutex<Vec<String>>,
}

impl RecordingObserver {
  pub(crate) fn shared() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub(crate) fn events(&self) -> Vec<String> {
    self.events.lock().unwrap().clone()
  }
}

impl ServeObserver for RecordingObserver {
  fn on_error(&self, err: &std::io::Error) {
    self.events.lock().unwrap().push(format!("error:{:?}", err.kind()));
  }

  fn on_serve(&self, req: &HttpRequest, res: &HttpResponse) {
    self.events
      .lock()
      .unwrap()
      .push(format!("serve:{} {} {}", req.method(), req.path(), res.status().as_u16()));
  }
}

/// Both hooks panic.
pub(crate) struct PanickingObserver;

impl ServeObserver for PanickingObserver {
  fn on_error(&self, _err: &std::io::Error) {
    panic!("on_error exploded");
  }

  fn on_serve(&self, _req: &HttpRequest, _res: &HttpResponse) {
    panic!("on_serve exploded");
  }
}

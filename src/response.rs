//! Response construction for the file server.
//!
//! - `build_success`: 200 with a lazily streamed file body, `content-length` and (when known)
//!   `content-type`.
//! - `build_fallback`: classifies an IO error into 404 / 500.
//! - `forbidden_directory`: fixed 403 for directory targets.
//! - `apply_cors`: appends permissive cross-origin headers.
//!
//! 中文：檔案回應、錯誤分類（404/500）、目錄 403 與 CORS 標頭。

use std::{ io, path::Path };

use actix_web::{
  HttpResponse,
  body::SizedStream,
  http::header::{ self, HeaderValue },
  web::{ Bytes, BytesMut },
};
use futures::Stream;
use tokio::{ fs::File, io::AsyncReadExt };

use crate::content_type::content_type;

pub(crate) const NOT_FOUND_BODY: &str = "Not found";
pub(crate) const INTERNAL_ERROR_BODY: &str = "Internal server error";
pub(crate) const DIRECTORY_BODY: &str = "Cannot serve directory";
pub(crate) const CORS_ALLOW_HEADERS: &str = "Origin, X-Requested-With, Content-Type, Accept, Range";

const CHUNK_SIZE: usize = 64 * 1024;

/// Open `path` and stat it concurrently, then answer 200 with the file streamed as the body.
///
/// Either failure aborts with the IO error so the caller can route it to [`build_fallback`].
pub(crate) async fn build_success(path: &Path) -> io::Result<HttpResponse> {
  let (file, meta) = tokio::try_join!(File::open(path), tokio::fs::metadata(path))?;
  let size = meta.len();

  let mut res = HttpResponse::Ok();
  res.insert_header((header::CONTENT_LENGTH, size));
  if let Some(media) = content_type(path) {
    res.insert_header((header::CONTENT_TYPE, media));
  }
  Ok(res.body(SizedStream::new(size, file_stream(file))))
}

/// Reads `file` chunk by chunk; the handle is closed when the stream ends or is dropped.
fn file_stream(file: File) -> impl Stream<Item = io::Result<Bytes>> {
  futures::stream::try_unfold(file, |mut file| async move {
    let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
    let read = file.read_buf(&mut buf).await?;
    let next = if read == 0 {
      None
    } else {
      Some((buf.freeze(), file))
    };
    Ok::<_, io::Error>(next)
  })
}

/// Map any IO error to exactly one of the two fallback responses.
pub(crate) fn build_fallback(err: &io::Error) -> HttpResponse {
  match err.kind() {
    io::ErrorKind::NotFound => HttpResponse::NotFound().body(NOT_FOUND_BODY),
    _ => HttpResponse::InternalServerError().body(INTERNAL_ERROR_BODY),
  }
}

pub(crate) fn forbidden_directory() -> HttpResponse {
  HttpResponse::Forbidden().body(DIRECTORY_BODY)
}

/// Append the CORS headers. Calling it twice duplicates the values.
pub(crate) fn apply_cors(res: &mut HttpResponse) {
  let headers = res.headers_mut();
  headers.append(
    header::ACCESS_CONTROL_ALLOW_ORIGIN,
    HeaderValue::from_static("*"),
  );
  headers.append(
    header::ACCESS_CONTROL_ALLOW_HEADERS,
    HeaderValue::from_static(CORS_ALLOW_HEADERS),
  );
}

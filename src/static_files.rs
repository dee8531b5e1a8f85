//! Serving the site's stylesheet and other static files from a local
//! directory.

use std::borrow::Cow;
use std::fs::File;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use httpdate::{fmt_http_date, parse_http_date};
use log::{debug, warn};
use rouille::{extension_to_mime, Request, Response, ResponseBody};

use crate::http_response_status_codes::HttpResponseStatusCode;

// `mtime > modsince` is nearly always true, as mtime carries
// nanoseconds and HTTP dates don't.
fn file_is_newer_than_snapshot_time(mtime: SystemTime, modsince: SystemTime) -> bool {
    match mtime.duration_since(modsince) {
        // File is older than the client's copy
        Err(_) => false,
        Ok(secsnewer) => secsnewer >= Duration::from_secs(1),
    }
}

/// Resolve `.` and `..` and collapse empty segments. `None` if the
/// path would leave its base.
fn canonicalize_path<'s>(path: &[&'s str]) -> Option<Vec<&'s str>> {
    let mut out = Vec::new();
    for segment in path {
        match *segment {
            "." | "" => (),
            ".." => {
                out.pop()?;
            }
            _ => out.push(*segment),
        }
    }
    Some(out)
}

macro_rules! cow {
    ($a:expr, $b:expr) => {
        (Cow::from($a), Cow::from($b))
    }
}

#[derive(Debug)]
pub struct FileHandler {
    /// Directory in the local file system from which the files are
    /// served.
    basepath: PathBuf,
}

impl FileHandler {
    pub fn new(basepath: impl Into<PathBuf>) -> FileHandler {
        FileHandler {
            basepath: basepath.into()
        }
    }

    /// `pathrest` is the request path below the mount point, like
    /// `main.css`. Returns `Ok(None)` if there's no such file.
    pub fn call(&self, request: &Request, pathrest: &str) -> Result<Option<Response>> {
        let segments: Vec<&str> = pathrest.split('/').collect();
        let canonpath = match canonicalize_path(&segments) {
            Some(p) => p,
            None => return Ok(None),
        };
        if canonpath.is_empty() {
            // A directory
            return Ok(None)
        }
        let full_path = self.basepath.join(canonpath.join("/"));

        let metadata = match full_path.metadata() {
            Ok(m) => m,
            Err(e) => match e.kind() {
                ErrorKind::NotFound => return Ok(None),
                _ => return Err(e).with_context(
                    || anyhow!("can't get metadata of {:?}", full_path)),
            }
        };
        if !metadata.is_file() {
            debug!("not a file: {full_path:?}");
            return Ok(None)
        }
        let mimetype = full_path.extension()
            .and_then(|ext| ext.to_str())
            .map(extension_to_mime)
            .unwrap_or("application/octet-stream");

        let fh = match File::open(&full_path) {
            Ok(fh) => fh,
            Err(e) => match e.kind() {
                ErrorKind::NotFound => return Ok(None),
                _ => return Err(e).with_context(
                    || anyhow!("can't open file for reading: {:?}", full_path)),
            }
        };
        let mtime: SystemTime = metadata.modified()?;
        // Clock skew can put mtime into the future
        let age = mtime.elapsed().unwrap_or(Duration::ZERO);
        let age_allowed = age.as_secs() + age.as_secs() / 10;
        let expires = mtime.checked_add(Duration::from_secs(age_allowed)).ok_or_else(
            || anyhow!("time overflow computing expiry of {:?}", full_path))?;
        let mtime_seconds = mtime.duration_since(UNIX_EPOCH)?.as_secs();
        let etag_quoted = format!("{:?}", mtime_seconds.to_string());

        let headers = vec![
            cow!("Content-type", mimetype),
            cow!("Last-Modified", fmt_http_date(mtime)),
            cow!("Cache-Control", format!("max-age={age_allowed}")),
            cow!("Expires", fmt_http_date(expires)),
            cow!("ETag", etag_quoted.clone()),
        ];
        let send_file = |headers| Response {
            status_code: HttpResponseStatusCode::OK200.code(),
            headers,
            data: ResponseBody::from_reader_and_size(fh, metadata.len() as usize),
            upgrade: None,
        };
        let send_notmodified = |headers| Response {
            status_code: HttpResponseStatusCode::NotModified304.code(),
            headers,
            data: ResponseBody::empty(),
            upgrade: None,
        };
        let response =
            if let Some(modsince_str) = request.header("If-Modified-Since") {
                match parse_http_date(modsince_str) {
                    Ok(modsince) =>
                        if file_is_newer_than_snapshot_time(mtime, modsince) {
                            send_file(headers)
                        } else {
                            send_notmodified(headers)
                        },
                    Err(e) => {
                        warn!("ignoring invalid If-Modified-Since {modsince_str:?}: {e}");
                        send_file(headers)
                    }
                }
            } else if let Some(nonematch_str) = request.header("If-None-Match") {
                if nonematch_str == etag_quoted {
                    send_notmodified(headers)
                } else {
                    send_file(headers)
                }
            } else {
                send_file(headers)
            };
        Ok(Some(response))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn t_canonicalize_path() {
        assert_eq!(canonicalize_path(&[]), Some(vec![]));
        assert_eq!(canonicalize_path(&["a", "b"]), Some(vec!["a", "b"]));
        assert_eq!(canonicalize_path(&[".", "a", ".", "b", ".", ".."]),
                   Some(vec!["a"]));
        assert_eq!(canonicalize_path(&["a", "..", "b"]), Some(vec!["b"]));
        assert_eq!(canonicalize_path(&["a", "..", ".", ".."]), None);
        assert_eq!(canonicalize_path(&["..", "etc", "passwd"]), None);
        assert_eq!(canonicalize_path(&["css", "", ".", "", "main.css", ""]),
                   Some(vec!["css", "main.css"]));
    }

    #[test]
    fn t_newer_than_snapshot() {
        let t = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert!(!file_is_newer_than_snapshot_time(t + Duration::from_millis(300), t));
        assert!(file_is_newer_than_snapshot_time(t + Duration::from_secs(5), t));
        assert!(!file_is_newer_than_snapshot_time(t, t + Duration::from_secs(5)));
    }

    fn handler() -> FileHandler {
        FileHandler::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
    }

    #[test]
    fn t_serve_file() -> Result<()> {
        let request = Request::fake_http("GET", "/static/main.css", vec![], vec![]);
        let response = handler().call(&request, "main.css")?.expect("file exists");
        assert_eq!(response.status_code, 200);
        assert!(response.headers.iter().any(|(k, v)| k == "Content-type" && v.starts_with("text/css")));
        Ok(())
    }

    #[test]
    fn t_serve_lightbox_script() -> Result<()> {
        let request = Request::fake_http("GET", "/static/lightbox.js", vec![], vec![]);
        let response = handler().call(&request, "lightbox.js")?.expect("file exists");
        assert_eq!(response.status_code, 200);
        assert!(response.headers.iter().any(|(k, v)| k == "Content-type"
                                             && v.contains("javascript")));
        let (mut reader, _) = response.data.into_reader_and_size();
        let mut script = String::new();
        reader.read_to_string(&mut script)?;
        for needle in ["a.lightbox", "data-alt", "data-caption", "aria-label\", \"Close"] {
            assert!(script.contains(needle), "{needle}");
        }
        Ok(())
    }

    #[test]
    fn t_not_modified() -> Result<()> {
        let future = fmt_http_date(SystemTime::now() + Duration::from_secs(3600));
        let request = Request::fake_http(
            "GET", "/static/main.css",
            vec![("If-Modified-Since".into(), future)], vec![]);
        let response = handler().call(&request, "main.css")?.expect("file exists");
        assert_eq!(response.status_code, 304);
        Ok(())
    }

    #[test]
    fn t_missing_and_escaping() -> Result<()> {
        let request = Request::fake_http("GET", "/static/x", vec![], vec![]);
        assert!(handler().call(&request, "nope.css")?.is_none());
        assert!(handler().call(&request, "../Cargo.toml")?.is_none());
        assert!(handler().call(&request, "")?.is_none());
        Ok(())
    }
}

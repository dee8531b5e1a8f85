//! Access log lines in the Combined Log Format (Apache style, as per
//! <https://httpd.apache.org/docs/2.4/logs.html>), plus the request
//! duration, emitted through `log` with target `access`.

use std::fmt::Write;
use std::mem::swap;
use std::panic;
use std::time::{Duration, Instant, SystemTime};

use anyhow::Result;
use chrono::{DateTime, Datelike, Timelike, Utc};
use log::{error, info};
use rouille::{Request, Response, ResponseBody};

use crate::webutils::errorpage_from_error;

pub const TARGET: &str = "access";

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun",
    "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// "06/Dec/2023:02:02:47 +0000"
pub fn write_time(outp: &mut impl Write, time: SystemTime) -> std::fmt::Result {
    let dt: DateTime<Utc> = DateTime::from(time);
    write!(outp, "{:02}/{}/{:04}:{:02}:{:02}:{:02} +0000",
           dt.day(), MONTHS[dt.month0() as usize], dt.year(),
           dt.hour(), dt.minute(), dt.second())
}

/// Like the request part in the Combined Log Format; `Request` does
/// not keep the original request line.
pub fn request_line(request: &Request) -> String {
    format!("{} {}", request.method(), request.raw_url())
}

// `ResponseBody` has no accessor for its size, so take it apart and
// put it back together.
fn response_len(response: &mut Response) -> Option<usize> {
    let mut body = ResponseBody::empty();
    swap(&mut body, &mut response.data);
    let (data, length) = body.into_reader_and_size();
    body = match length {
        Some(len) => ResponseBody::from_reader_and_size(data, len),
        None => ResponseBody::from_reader(data),
    };
    swap(&mut body, &mut response.data);
    length
}

// 18.134.151.89 - - [06/Dec/2023:02:02:47 +0000] "GET /story" 200 2403 "-" "curl/8.0" 1.2ms
pub fn format_combined(
    request: &Request,
    time: SystemTime,
    status: u16,
    len: Option<usize>,
    duration: Duration,
) -> String {
    let mut line = String::new();
    let _ = write!(line, "{} - - [", request.remote_addr().ip());
    let _ = write_time(&mut line, time);
    let _ = write!(line, "] {:?} {status} {} {:?} {:?} {duration:?}",
                   request_line(request),
                   len.unwrap_or(0),
                   request.header("referer").unwrap_or("-"),
                   request.header("user-agent").unwrap_or("-"));
    line
}

/// Run `handler`, then log the request. Handler errors are logged
/// and turned into an error page; panics are logged and resumed.
pub fn log_combined<F>(request: &Request, handler: F) -> Response
where
    F: FnOnce() -> Result<Response>,
{
    let start = Instant::now();
    let result = panic::catch_unwind(panic::AssertUnwindSafe(handler));
    let elapsed = start.elapsed();
    match result {
        Ok(result) => {
            let mut response = match result {
                Ok(response) => response,
                Err(err) => errorpage_from_error(err.context(
                    format!("handling {:?} ({elapsed:?})", request_line(request)))),
            };
            let len = response_len(&mut response);
            info!(target: TARGET, "{}",
                  format_combined(request, SystemTime::now(), response.status_code,
                                  len, elapsed));
            response
        }
        Err(payload) => {
            error!("panic handling {:?} after {elapsed:?}", request_line(request));
            panic::resume_unwind(payload);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    #[test]
    fn t_write_time() {
        let mut s = String::new();
        write_time(&mut s, UNIX_EPOCH + Duration::from_secs(1701828167)).unwrap();
        assert_eq!(s, "06/Dec/2023:02:02:47 +0000");
    }

    #[test]
    fn t_format_combined() {
        let request = Request::fake_http_from(
            "10.1.2.3:4567".parse().unwrap(), "GET", "/story?x=1",
            vec![("User-Agent".into(), "curl/8.0".into())], vec![]);
        let line = format_combined(&request, UNIX_EPOCH + Duration::from_secs(1701828167),
                                   200, Some(512), Duration::from_millis(3));
        assert_eq!(line, "10.1.2.3 - - [06/Dec/2023:02:02:47 +0000] \"GET /story?x=1\" \
                          200 512 \"-\" \"curl/8.0\" 3ms");
    }

    #[test]
    fn t_log_combined_error() {
        let request = Request::fake_http("GET", "/", vec![], vec![]);
        let response = log_combined(&request, || anyhow::bail!("backend down"));
        assert_eq!(response.status_code, 500);
    }

    #[test]
    fn t_response_len_kept() {
        let mut response = Response::text("hello");
        assert_eq!(response_len(&mut response), Some(5));
        assert_eq!(response_len(&mut response), Some(5));
    }
}

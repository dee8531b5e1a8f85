use std::borrow::Cow;

use anyhow::{Error, Result};
use log::error;
use rouille::{Response, ResponseBody};
use serde::Serialize;

use crate::html::{att, HtmlWriter};
use crate::http_response_status_codes::HttpResponseStatusCode;

pub fn htmlresponse(status: HttpResponseStatusCode, html: String) -> Response {
    Response {
        status_code: status.code(),
        headers: vec![(Cow::from("Content-type"),
                       Cow::from("text/html; charset=utf-8"))],
        data: ResponseBody::from_string(html),
        upgrade: None,
    }
}

/// A redirect to `location`, e.g. with `SeeOther303`.
pub fn redirect(status: HttpResponseStatusCode, location: &str) -> Response {
    Response {
        status_code: status.code(),
        headers: vec![(Cow::from("Location"), Cow::from(location.to_owned()))],
        data: ResponseBody::empty(),
        upgrade: None,
    }
}

pub fn errorpage_html(status: HttpResponseStatusCode) -> Result<String> {
    let title = format!("{} {}", status.code(), status.title());
    let mut html = HtmlWriter::new();
    html.doctype();
    html.element("html", &[att("lang", "en")], |html| {
        html.element("head", &[], |html| html.text_element("title", &[], &title))?;
        html.element("body", &[], |html| {
            html.text_element("h1", &[], &title)?;
            html.text_element("p", &[], status.desc())?;
            html.text_element("a", &[att("href", "/")], "Go to the home page")
        })
    })?;
    Ok(html.into_string())
}

pub fn errorpage_from_status(status: HttpResponseStatusCode) -> Response {
    match errorpage_html(status) {
        Ok(html) => htmlresponse(status, html),
        Err(e) => {
            error!("can't format error page for {status:?}: {e:#}");
            Response::text(status.title()).with_status_code(status.code())
        }
    }
}

pub fn errorpage_from_error(err: Error) -> Response {
    let status = HttpResponseStatusCode::InternalServerError500;
    error!("error in page (returning {status:?}): {err:#}");
    errorpage_from_status(status)
}

pub fn jsonresponse<T: Serialize>(status: HttpResponseStatusCode, value: &T) -> Response {
    Response::json(value).with_status_code(status.code())
}

/// A JSON error object `{"error": message}`.
pub fn jsonerror(status: HttpResponseStatusCode, message: &str) -> Response {
    jsonresponse(status, &serde_json::json!({ "error": message }))
}

//! Request dispatch: pages, the JSON relay, and static files.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, warn};
use rouille::{Request, Response};

use crate::accesslog::log_combined;
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::layout::{LayoutInterface, PageContext};
use crate::pages::{landing_page, story_index_page, story_page};
use crate::repository::{check_slug, ContentRepository};
use crate::static_files::FileHandler;
use crate::story::NewStoryMessage;
use crate::webutils::{errorpage_from_status, htmlresponse, jsonerror, jsonresponse, redirect};

/// Upper limit for relay request bodies; larger ones get 413.
pub const MAX_BODY_SIZE: u64 = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'p> {
    Landing,
    StoryIndex,
    Story(&'p str),
    Api,
    Static(&'p str),
    NotFound,
}

impl<'p> Route<'p> {
    /// `path` is the decoded request path, without query string.
    pub fn parse(path: &'p str) -> Route<'p> {
        match path {
            "/" | "" => Route::Landing,
            "/story" | "/story/" => Route::StoryIndex,
            "/api/story" | "/api/story/" => Route::Api,
            _ => {
                if let Some(rest) = path.strip_prefix("/static/") {
                    Route::Static(rest)
                } else if let Some(slug) = path.strip_prefix("/story/") {
                    Route::Story(slug.trim_end_matches('/'))
                } else {
                    Route::NotFound
                }
            }
        }
    }
}

pub struct Site {
    repo: Arc<dyn ContentRepository>,
    layout: Arc<dyn LayoutInterface>,
    files: Option<FileHandler>,
}

impl Site {
    pub fn new(
        repo: Arc<dyn ContentRepository>,
        layout: Arc<dyn LayoutInterface>,
        static_dir: Option<PathBuf>,
    ) -> Self {
        Site {
            repo,
            layout,
            files: static_dir.map(FileHandler::new),
        }
    }

    /// The entry point for rouille: never fails, errors become error
    /// pages; every request is logged.
    pub fn handle(&self, request: &Request) -> Response {
        log_combined(request, || self.dispatch(request))
    }

    fn dispatch(&self, request: &Request) -> Result<Response> {
        let path = request.url();
        let route = Route::parse(&path);
        debug!("{} {path:?} -> {route:?}", request.method());
        let is_get = matches!(request.method(), "GET" | "HEAD");
        match route {
            Route::Api => match request.method() {
                "GET" | "HEAD" => self.api_list(),
                "POST" => self.api_insert(request),
                _ => Ok(method_not_allowed()),
            },
            _ if !is_get => Ok(method_not_allowed()),
            Route::Landing => {
                let html = landing_page(&PageContext::new(&path), &*self.layout, &*self.repo)?;
                Ok(htmlresponse(HttpResponseStatusCode::OK200, html))
            }
            Route::StoryIndex => {
                let html = story_index_page(&PageContext::new(&path), &*self.layout,
                                            &*self.repo)?;
                Ok(htmlresponse(HttpResponseStatusCode::OK200, html))
            }
            Route::Story(slug) => {
                if check_slug(slug).is_err() {
                    return Ok(redirect(HttpResponseStatusCode::SeeOther303, "/story"))
                }
                match story_page(&PageContext::new(&path), &*self.layout, &*self.repo, slug)? {
                    Some(html) => Ok(htmlresponse(HttpResponseStatusCode::OK200, html)),
                    None => Ok(redirect(HttpResponseStatusCode::SeeOther303, "/story")),
                }
            }
            Route::Static(rest) => {
                let response = match &self.files {
                    Some(files) => files.call(request, rest)?,
                    None => None,
                };
                Ok(response.unwrap_or_else(
                    || errorpage_from_status(HttpResponseStatusCode::NotFound404)))
            }
            Route::NotFound =>
                Ok(errorpage_from_status(HttpResponseStatusCode::NotFound404)),
        }
    }

    fn api_list(&self) -> Result<Response> {
        let stories = self.repo.list_stories().context("listing stories")?;
        Ok(jsonresponse(HttpResponseStatusCode::OK200, &stories))
    }

    fn api_insert(&self, request: &Request) -> Result<Response> {
        let mut body = Vec::new();
        if let Some(data) = request.data() {
            // One byte more than allowed, to tell a full body from a cut one
            if let Err(e) = data.take(MAX_BODY_SIZE + 1).read_to_end(&mut body) {
                warn!("can't read relay request body: {e}");
                return Ok(jsonerror(HttpResponseStatusCode::BadRequest400,
                                    "unreadable request body"))
            }
        }
        if body.len() as u64 > MAX_BODY_SIZE {
            warn!("relay request body exceeds {MAX_BODY_SIZE} bytes");
            return Ok(jsonerror(HttpResponseStatusCode::PayloadTooLarge413,
                                &format!("request body exceeds {} KiB", MAX_BODY_SIZE / 1024)))
        }
        let body = match String::from_utf8(body) {
            Ok(body) => body,
            Err(_) => return Ok(jsonerror(HttpResponseStatusCode::BadRequest400,
                                          "request body is not UTF-8")),
        };
        let message = match NewStoryMessage::from_relay_json(&body) {
            Ok(message) => message,
            Err(e) => return Ok(jsonerror(HttpResponseStatusCode::BadRequest400,
                                          &format!("invalid message: {e}"))),
        };
        self.repo.insert_story_message(&message).context("storing story message")?;
        Ok(jsonresponse(HttpResponseStatusCode::Created201,
                        &serde_json::json!({ "status": "created" })))
    }
}

fn method_not_allowed() -> Response {
    errorpage_from_status(HttpResponseStatusCode::MethodNotAllowed405)
}

//! Access to stories and their assets.

use std::path::PathBuf;

use log::warn;
use serde_json::Value;
use thiserror::Error;

use crate::story::{Champion, NewStoryMessage, Story};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("request to content backend failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("content backend answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("can't decode content backend response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("can't read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid story slug {0:?}")]
    InvalidSlug(String),
}

/// The content backend. Implementations must be usable from
/// several request threads at once.
pub trait ContentRepository: Send + Sync {
    /// `Ok(None)` if there's no story with that slug.
    fn get_story_by_slug(&self, slug: &str) -> Result<Option<Story>, RepositoryError>;

    /// Newest first.
    fn get_recent_stories(&self, limit: usize) -> Result<Vec<Story>, RepositoryError>;

    /// The public URL of a stored asset; does not check that the
    /// asset exists.
    fn get_public_asset_url(&self, path: &str) -> String;

    /// The champion a story is about, if any.
    fn get_related_entity(&self, story_id: i64) -> Result<Option<Champion>, RepositoryError>;

    /// All rows of the stories table as the backend returns them, in
    /// backend order. Rows inserted through the relay only carry
    /// `name` and `message`, so these are not decoded as `Story`.
    fn list_stories(&self) -> Result<Vec<Value>, RepositoryError>;

    fn insert_story_message(&self, message: &NewStoryMessage) -> Result<(), RepositoryError>;
}

/// Slugs end up in query strings and URL paths, so only a safe subset
/// of characters is accepted.
pub fn check_slug(slug: &str) -> Result<&str, RepositoryError> {
    if !slug.is_empty()
        && slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(slug)
    } else {
        Err(RepositoryError::InvalidSlug(slug.into()))
    }
}

/// Decode the rows that are stories; message rows and other partial
/// rows are skipped.
pub fn stories_from_rows(rows: Vec<Value>) -> Vec<Story> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(story) => Some(story),
            Err(e) => {
                warn!("skipping row that is not a story: {e}");
                None
            }
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_check_slug() {
        assert_eq!(check_slug("first-day_2").ok(), Some("first-day_2"));
        for bad in ["", "a b", "a&slug=eq.b", "../x", "ümlaut"] {
            assert!(matches!(check_slug(bad), Err(RepositoryError::InvalidSlug(_))),
                    "{bad:?}");
        }
    }

    #[test]
    fn t_stories_from_mixed_rows() {
        let rows: Vec<Value> = serde_json::from_str(r#"[
            {"id": 1, "slug": "first-day", "title": "First Day", "subtitle": null,
             "author": "Sam", "body": "Hello", "thumbnail": null,
             "created_at": "2025-03-02T10:00:00+00:00", "champion": null},
            {"id": 2, "name": "Ana", "message": "hi", "slug": null, "title": null,
             "author": null, "body": null, "created_at": "2025-03-03T10:00:00+00:00"},
            {"name": "Ben", "message": "hello"}
        ]"#).unwrap();
        let stories = stories_from_rows(rows);
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].slug, "first-day");
    }
}

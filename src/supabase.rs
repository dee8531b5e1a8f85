//! `ContentRepository` backed by a hosted Supabase project, via its
//! PostgREST and storage HTTP APIs.

use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::repository::{check_slug, stories_from_rows, ContentRepository, RepositoryError};
use crate::story::{Champion, NewStoryMessage, Story};

const STORIES: &str = "stories";

// Leaves out the rows inserted through the relay, which have no slug.
const ONLY_STORIES: &str = "slug=not.is.null";

// Makes PostgREST return a single object instead of an array, and 406
// if there isn't exactly one row.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

pub struct SupabaseRepository {
    client: Client,
    base_url: String,
    key: String,
    bucket: String,
}

impl std::fmt::Debug for SupabaseRepository {
    // Leave out the key
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("SupabaseRepository({:?}, bucket {:?})",
                                 self.base_url, self.bucket))
    }
}

#[derive(Deserialize)]
struct ChampionOfStory {
    champion: Option<Champion>,
}

impl SupabaseRepository {
    pub fn new(
        base_url: &str,
        key: &str,
        bucket: &str,
        timeout: Duration,
    ) -> Result<Self, RepositoryError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(SupabaseRepository {
            client,
            base_url: base_url.trim_end_matches('/').into(),
            key: key.into(),
            bucket: bucket.into(),
        })
    }

    pub fn table_url(&self, table: &str, query: &str) -> String {
        format!("{}/rest/v1/{table}?{query}", self.base_url)
    }

    fn recent_stories_url(&self, limit: usize) -> String {
        self.table_url(STORIES,
                       &format!("select=*&{ONLY_STORIES}&order=created_at.desc&limit={limit}"))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, RepositoryError> {
        debug!("GET {url}");
        let response = self.authorized(self.client.get(url)).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(RepositoryError::Status { status: status.as_u16(), body })
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch exactly one row; `Ok(None)` if there is none.
    fn fetch_one<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, RepositoryError> {
        debug!("GET {url} (single)");
        let response = self.authorized(self.client.get(url))
            .header(ACCEPT, SINGLE_OBJECT)
            .send()?;
        let status = response.status();
        let body = response.text()?;
        if status == StatusCode::NOT_ACCEPTABLE {
            return Ok(None)
        }
        if !status.is_success() {
            return Err(RepositoryError::Status { status: status.as_u16(), body })
        }
        Ok(Some(serde_json::from_str(&body)?))
    }
}

impl ContentRepository for SupabaseRepository {
    fn get_story_by_slug(&self, slug: &str) -> Result<Option<Story>, RepositoryError> {
        let slug = check_slug(slug)?;
        self.fetch_one(&self.table_url(STORIES, &format!("select=*&slug=eq.{slug}")))
    }

    fn get_recent_stories(&self, limit: usize) -> Result<Vec<Story>, RepositoryError> {
        let rows: Vec<Value> = self.fetch(&self.recent_stories_url(limit))?;
        Ok(stories_from_rows(rows))
    }

    fn get_public_asset_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{path}", self.base_url, self.bucket)
    }

    fn get_related_entity(&self, story_id: i64) -> Result<Option<Champion>, RepositoryError> {
        let row: Option<ChampionOfStory> = self.fetch_one(
            &self.table_url(STORIES, &format!("select=champion(*)&id=eq.{story_id}")))?;
        Ok(row.and_then(|r| r.champion))
    }

    fn list_stories(&self) -> Result<Vec<Value>, RepositoryError> {
        self.fetch(&self.table_url(STORIES, "select=*"))
    }

    fn insert_story_message(&self, message: &NewStoryMessage) -> Result<(), RepositoryError> {
        let url = format!("{}/rest/v1/{STORIES}", self.base_url);
        debug!("POST {url}");
        let response = self.authorized(self.client.post(&url))
            .header("Prefer", "return=minimal")
            .json(message)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text()?;
            warn!("insert into {STORIES} failed with {status}");
            return Err(RepositoryError::Status { status: status.as_u16(), body })
        }
        Ok(())
    }
}

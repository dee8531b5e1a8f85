//! An in-memory `ContentRepository`, optionally loaded from a JSON
//! fixtures file; for running the site without the hosted backend,
//! and for tests. Messages posted to the relay are kept in memory
//! only, until the process ends.

use std::path::Path;
use std::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::repository::{check_slug, ContentRepository, RepositoryError};
use crate::story::{Champion, NewStoryMessage, Story};

#[derive(Debug, Default, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub stories: Vec<Story>,
    #[serde(default)]
    pub champions: Vec<Champion>,
}

#[derive(Debug, Default)]
struct Contents {
    fixtures: Fixtures,
    messages: Vec<NewStoryMessage>,
}

#[derive(Debug)]
pub struct MemoryRepository {
    asset_base: String,
    contents: Mutex<Contents>,
}

impl MemoryRepository {
    pub fn new(fixtures: Fixtures, asset_base: &str) -> Self {
        MemoryRepository {
            asset_base: asset_base.trim_end_matches('/').into(),
            contents: Mutex::new(Contents { fixtures, messages: Vec::new() }),
        }
    }

    pub fn from_json(s: &str, asset_base: &str) -> Result<Self, RepositoryError> {
        Ok(Self::new(serde_json::from_str(s)?, asset_base))
    }

    pub fn open(path: &Path, asset_base: &str) -> Result<Self, RepositoryError> {
        let s = std::fs::read_to_string(path).map_err(
            |source| RepositoryError::Io { path: path.into(), source })?;
        Self::from_json(&s, asset_base)
    }

    /// Messages received via `insert_story_message`, oldest first.
    pub fn messages(&self) -> Vec<NewStoryMessage> {
        self.lock().messages.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Contents> {
        self.contents.lock().expect("abandoned mutex")
    }
}

impl ContentRepository for MemoryRepository {
    fn get_story_by_slug(&self, slug: &str) -> Result<Option<Story>, RepositoryError> {
        let slug = check_slug(slug)?;
        Ok(self.lock().fixtures.stories.iter().find(|s| s.slug == slug).cloned())
    }

    fn get_recent_stories(&self, limit: usize) -> Result<Vec<Story>, RepositoryError> {
        let mut stories = self.lock().fixtures.stories.clone();
        stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        stories.truncate(limit);
        Ok(stories)
    }

    fn get_public_asset_url(&self, path: &str) -> String {
        format!("{}/{path}", self.asset_base)
    }

    fn get_related_entity(&self, story_id: i64) -> Result<Option<Champion>, RepositoryError> {
        let contents = self.lock();
        let champion_id = contents.fixtures.stories.iter()
            .find(|s| s.id == story_id)
            .and_then(|s| s.champion);
        Ok(champion_id.and_then(
            |id| contents.fixtures.champions.iter().find(|c| c.id == id).cloned()))
    }

    /// The stories, followed by the received messages as
    /// `{"name", "message"}` rows.
    fn list_stories(&self) -> Result<Vec<Value>, RepositoryError> {
        let contents = self.lock();
        let mut rows = contents.fixtures.stories.iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        rows.extend(contents.messages.iter().map(
            |m| json!({ "name": m.name, "message": m.message })));
        Ok(rows)
    }

    fn insert_story_message(&self, message: &NewStoryMessage) -> Result<(), RepositoryError> {
        self.lock().messages.push(message.clone());
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    pub const FIXTURES: &str = include_str!("../data/fixtures.json");

    fn repo() -> Result<MemoryRepository> {
        Ok(MemoryRepository::from_json(FIXTURES, "/assets/")?)
    }

    #[test]
    fn t_recent_is_newest_first() -> Result<()> {
        let repo = repo()?;
        let recent = repo.get_recent_stories(2)?;
        assert_eq!(recent.len(), 2);
        assert!(recent[0].created_at >= recent[1].created_at);
        let all = repo.get_recent_stories(100)?;
        assert_eq!(all.len(), repo.list_stories()?.len());
        assert_eq!(all[0].slug, recent[0].slug);
        Ok(())
    }

    #[test]
    fn t_by_slug() -> Result<()> {
        let repo = repo()?;
        let story = repo.get_story_by_slug("a-home-of-our-own")?;
        assert_eq!(story.map(|s| s.title).as_deref(), Some("A Home of Our Own"));
        assert!(repo.get_story_by_slug("no-such-story")?.is_none());
        assert!(repo.get_story_by_slug("bad slug").is_err());
        Ok(())
    }

    #[test]
    fn t_related_entity() -> Result<()> {
        let repo = repo()?;
        let story = repo.get_story_by_slug("a-home-of-our-own")?
            .expect("present in fixtures");
        let champion = repo.get_related_entity(story.id)?;
        assert_eq!(champion.map(|c| c.name).as_deref(), Some("Garett Couch"));
        assert!(repo.get_related_entity(-1)?.is_none());
        Ok(())
    }

    #[test]
    fn t_asset_url() -> Result<()> {
        assert_eq!(repo()?.get_public_asset_url("embedded/x/1"), "/assets/embedded/x/1");
        Ok(())
    }

    #[test]
    fn t_insert_message() -> Result<()> {
        let repo = repo()?;
        let msg = NewStoryMessage { name: "Ana".into(), message: "Hello".into() };
        repo.insert_story_message(&msg)?;
        assert_eq!(repo.messages(), vec![msg]);
        Ok(())
    }

    #[test]
    fn t_messages_are_listed_but_not_stories() -> Result<()> {
        let repo = repo()?;
        repo.insert_story_message(
            &NewStoryMessage { name: "Ana".into(), message: "Hello".into() })?;
        let rows = repo.list_stories()?;
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3], json!({ "name": "Ana", "message": "Hello" }));
        assert_eq!(rows[0]["slug"], "a-home-of-our-own");
        assert_eq!(repo.get_recent_stories(100)?.len(), 3);
        Ok(())
    }
}

//! Content records as stored in the backend.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Number of words from the body shown in story listings.
pub const TEASER_WORDS: usize = 10;

/// Reference to a thumbnail; the backend has used both numeric ids
/// and file names for these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetRef {
    Id(i64),
    Name(String),
}

impl Display for AssetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetRef::Id(id) => write!(f, "{id}"),
            AssetRef::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub author: String,
    pub body: String,
    #[serde(default)]
    pub thumbnail: Option<AssetRef>,
    pub created_at: DateTime<Utc>,
    /// Id of the related `Champion`, if any
    #[serde(default)]
    pub champion: Option<i64>,
}

impl Story {
    /// The first few words of the body, for listings.
    pub fn teaser(&self) -> String {
        format!("{}...", self.body.split(' ').take(TEASER_WORDS).join(" "))
    }

    /// Storage path of the thumbnail, if the story has one.
    pub fn thumbnail_path(&self) -> Option<String> {
        self.thumbnail.as_ref().map(|_| format!("thumbnails/{}", self.slug))
    }
}

/// The person a story is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A message submitted through the relay endpoint, stored as a new
/// row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStoryMessage {
    pub name: String,
    pub message: String,
}

// The wire format used by the site's submission form.
#[derive(Deserialize)]
struct RelayEnvelope {
    message: RelayMessage,
}

#[derive(Deserialize)]
struct RelayMessage {
    #[serde(rename = "NAME")]
    name: String,
    #[serde(rename = "MESSAGE")]
    message: String,
}

impl NewStoryMessage {
    /// Decode `{"message": {"NAME": .., "MESSAGE": ..}}`.
    pub fn from_relay_json(s: &str) -> Result<Self, serde_json::Error> {
        let RelayEnvelope { message: RelayMessage { name, message } } =
            serde_json::from_str(s)?;
        Ok(NewStoryMessage { name, message })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    const ROW: &str = r#"{
        "id": 4,
        "slug": "first-day",
        "title": "First Day",
        "subtitle": null,
        "author": "Jordan",
        "body": "It was a bright morning when we arrived at the new house for the first time.",
        "thumbnail": 17,
        "created_at": "2025-03-16T12:34:56.789+00:00",
        "extra_column": true
    }"#;

    #[test]
    fn t_deserialize_row() -> Result<()> {
        let story: Story = serde_json::from_str(ROW)?;
        assert_eq!(story.slug, "first-day");
        assert_eq!(story.subtitle, None);
        assert_eq!(story.thumbnail, Some(AssetRef::Id(17)));
        assert_eq!(story.champion, None);
        assert_eq!(story.created_at.to_rfc3339(), "2025-03-16T12:34:56.789+00:00");
        Ok(())
    }

    #[test]
    fn t_teaser() -> Result<()> {
        let story: Story = serde_json::from_str(ROW)?;
        assert_eq!(story.teaser(),
                   "It was a bright morning when we arrived at the...");
        let short = Story { body: "Just this.".into(), ..story };
        assert_eq!(short.teaser(), "Just this....");
        Ok(())
    }

    #[test]
    fn t_thumbnail_path() -> Result<()> {
        let story: Story = serde_json::from_str(ROW)?;
        assert_eq!(story.thumbnail_path().as_deref(), Some("thumbnails/first-day"));
        let without = Story { thumbnail: None, ..story };
        assert_eq!(without.thumbnail_path(), None);
        Ok(())
    }

    #[test]
    fn t_relay_json() -> Result<()> {
        let msg = NewStoryMessage::from_relay_json(
            r#"{"message": {"NAME": "Sam", "MESSAGE": "Great stories!"}}"#)?;
        assert_eq!(msg, NewStoryMessage {
            name: "Sam".into(),
            message: "Great stories!".into()
        });
        assert!(NewStoryMessage::from_relay_json(r#"{"NAME": "Sam"}"#).is_err());
        Ok(())
    }
}

//! The site's pages, parameterized via `LayoutInterface`.

use anyhow::{Context, Result};
use log::warn;

use crate::html::{att, HtmlWriter};
use crate::layout::{LayoutInterface, PageContext};
use crate::repository::ContentRepository;
use crate::story::Story;
use crate::story_body::render_story;
use crate::story_html::write_blocks;

/// How many stories the story index lists.
pub const STORY_INDEX_LIMIT: usize = 100;

/// How many stories the landing page previews.
pub const LANDING_PAGE_STORIES: usize = 3;

const ABOUT: &[&str] = &[
    "Champions Place is a groundbreaking residential facility designed for \
     adults with disabilities. Through cutting-edge adaptive technology, \
     purposeful architecture, and the presence of compassionate caregivers, \
     it empowers residents to lead independent, fulfilled lives.",
    "Born from the dreams of parents supporting the Team Titans, a wheelchair \
     sports team in Metro Atlanta, Champions Place brings a bold vision to \
     life: a future where disabled athletes thrive in a nurturing community.",
    "This website honors their journey, the memory of Garett Couch, and the \
     powerful partnership between Champions Place and Innovation Academy. \
     Your support of Champions Place helps the lives of residents and future \
     residents to come.",
];

pub fn story_url(story: &Story) -> String {
    format!("/story/{}", story.slug)
}

fn write_story_card(
    html: &mut HtmlWriter,
    repo: &dyn ContentRepository,
    story: &Story,
) -> Result<()> {
    let url = story_url(story);
    html.element("a", &[att("class", "story-card reveal"), att("href", &url)], |html| {
        if let Some(path) = story.thumbnail_path() {
            let src = repo.get_public_asset_url(&path);
            html.element("div", &[att("class", "thumbnail")], |html| {
                html.void("img", &[att("src", &src),
                                   att("alt", &format!("{} thumbnail", story.title))]);
                Ok(())
            })?;
        }
        html.element("div", &[att("class", "story-card-text")], |html| {
            html.text_element("h3", &[att("class", "story-title")], &story.title)?;
            if let Some(subtitle) = &story.subtitle {
                html.text_element("h4", &[att("class", "story-subtitle")], subtitle)?;
            }
            html.text_element("p", &[att("class", "author")],
                              &format!("By {}", story.author))?;
            html.text_element("p", &[att("class", "teaser")], &story.teaser())
        })
    })
}

fn write_story_list(
    html: &mut HtmlWriter,
    repo: &dyn ContentRepository,
    stories: &[Story],
) -> Result<()> {
    if stories.is_empty() {
        return html.text_element("p", &[att("class", "no-stories")], "No stories found.")
    }
    html.element("div", &[att("class", "story-list")], |html| {
        for story in stories {
            write_story_card(html, repo, story)?;
        }
        Ok(())
    })
}

pub fn landing_page(
    context: &PageContext,
    layout: &dyn LayoutInterface,
    repo: &dyn ContentRepository,
) -> Result<String> {
    let stories = repo.get_recent_stories(LANDING_PAGE_STORIES)
        .context("fetching recent stories for the landing page")?;
    let mut html = HtmlWriter::new();
    layout.page(context, &mut html, None, &mut |html| {
        html.element("section", &[att("class", "hero")], |html| {
            html.text_element("h1", &[], "Stories of Legends")
        })?;
        html.element("section", &[att("class", "recent-stories")], |html| {
            html.text_element("h2", &[att("class", "reveal")], "Stories")?;
            write_story_list(html, repo, &stories)?;
            html.text_element("a", &[att("href", "/story"), att("class", "more")],
                              "All stories")
        })?;
        html.element("section", &[att("id", "about"), att("class", "about")], |html| {
            html.text_element("h2", &[att("class", "reveal")], "About Champions Place")?;
            for paragraph in ABOUT {
                html.text_element("p", &[], paragraph)?;
            }
            html.text_element("p", &[att("class", "motto")], "Empower. Engage. Equip.")
        })?;
        html.element("section", &[att("id", "contact"), att("class", "contact")], |html| {
            html.text_element("h2", &[], "Contact")?;
            html.text_element("p", &[],
                              "Want to share a story or support Champions Place? \
                               Get in touch with us.")
        })
    })?;
    Ok(html.into_string())
}

pub fn story_index_page(
    context: &PageContext,
    layout: &dyn LayoutInterface,
    repo: &dyn ContentRepository,
) -> Result<String> {
    let stories = repo.get_recent_stories(STORY_INDEX_LIMIT)
        .context("fetching stories for the index")?;
    let mut html = HtmlWriter::new();
    layout.page(context, &mut html, Some("Stories"), &mut |html| {
        html.element("section", &[att("class", "stories")], |html| {
            html.text_element("h1", &[att("class", "reveal")], "Stories")?;
            write_story_list(html, repo, &stories)
        })
    })?;
    Ok(html.into_string())
}

/// `Ok(None)` if there's no story with this slug.
pub fn story_page(
    context: &PageContext,
    layout: &dyn LayoutInterface,
    repo: &dyn ContentRepository,
    slug: &str,
) -> Result<Option<String>> {
    let story = match repo.get_story_by_slug(slug)
        .with_context(|| format!("fetching story {slug:?}"))?
    {
        Some(story) => story,
        None => return Ok(None),
    };
    // The page is still useful without the champion
    let champion = repo.get_related_entity(story.id).unwrap_or_else(|e| {
        warn!("can't get champion of story {:?}: {e}", story.slug);
        None
    });
    let blocks = render_story(&story, repo);

    let mut html = HtmlWriter::new();
    layout.page(context, &mut html, Some(story.title.as_str()), &mut |html| {
        html.text_element("a", &[att("href", "/story"), att("class", "back")], "← Back")?;
        html.element("article", &[att("class", "story")], |html| {
            html.text_element("h1", &[att("class", "story-title reveal")], &story.title)?;
            if let Some(subtitle) = &story.subtitle {
                html.text_element("h2", &[att("class", "story-subtitle reveal")], subtitle)?;
            }
            html.text_element("p", &[att("class", "author")],
                              &format!("By {}", story.author))?;
            if let Some(champion) = &champion {
                html.element("aside", &[att("class", "champion")], |html| {
                    html.text_element("h3", &[], &champion.name)?;
                    if let Some(description) = &champion.description {
                        html.text_element("p", &[], description)?;
                    }
                    Ok(())
                })?;
            }
            html.element("div", &[att("class", "story-body reveal"),
                                  att("data-slug", &story.slug)],
                         |html| write_blocks(html, &blocks))
        })?;
        html.text_element("a", &[att("href", "/story"), att("class", "button")],
                          "Back to All Stories")
    })?;
    Ok(Some(html.into_string()))
}

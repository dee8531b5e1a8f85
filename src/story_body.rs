//! Convert story bodies to content blocks.
//!
//! A story body is plain text with a few inline tokens embedded:
//!
//!  * `[img-box| ... |img-box]`: a grid of the `{{image:N}}` tokens
//!    found inside, each optionally followed by `[caption:...]`
//!  * `[text](href)`: a link
//!  * `*text*`: italics, only if the text consists of word
//!    characters, whitespace and dots
//!  * `{{image:N}}` optionally followed by `[caption:...]`: a single
//!    image, outside of grids
//!
//! Everything else is text, including tokens that are malformed:
//! there are no parse errors, broken markup is shown literally.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::repository::ContentRepository;
use crate::story::Story;

const GRID_OPENER: &str = "[img-box|";
const GRID_CLOSER: &str = "|img-box]";

lazy_static! {
    // Alternatives are tried left to right at each position, which
    // gives grids precedence over links, and links over italics.
    static ref SEGMENT: Regex = Regex::new(
        r"(?x)
          (?P<grid> \[img-box\| (?P<grid_inner> (?s:.)+? ) \|img-box\] )
        | (?P<link> \[ (?P<link_text> [^\]]+ ) \] \( (?P<link_href> [^)]+ ) \) )
        | (?P<italic> \* (?P<italic_text> [^*]+ ) \* )"
    ).unwrap();

    static ref ITALIC_TEXT: Regex = Regex::new(r"^[0-9A-Za-z_\s.]+$").unwrap();

    static ref IMAGE: Regex = Regex::new(
        r"\{\{image:(?P<id>[0-9]+)\}\}(?:\[caption:(?P<caption>[^\]]+)\])?"
    ).unwrap();
}

/// An embedded image, with its URL already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub asset_id: String,
    pub url: String,
    pub caption: Option<String>,
}

/// What the presentation layer shows when an image is activated
/// (zoomed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lightbox {
    pub url: String,
    pub alt: String,
    pub caption: Option<String>,
}

impl ImageRef {
    pub fn alt(&self) -> String {
        format!("Embedded image {}", self.asset_id)
    }

    pub fn activation(&self) -> Lightbox {
        Lightbox {
            url: self.url.clone(),
            alt: self.alt(),
            caption: self.caption.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Italic { text: String },
    Link { text: String, href: String },
    Image(ImageRef),
    ImageGrid { items: Vec<ImageRef> },
}

/// Storage path of an image embedded in the story with the given
/// slug.
pub fn asset_path(slug: &str, asset_id: &str) -> String {
    format!("embedded/{slug}/{asset_id}")
}

struct Blocks<'r, F: Fn(&str) -> String> {
    slug: &'r str,
    resolve: &'r F,
    blocks: Vec<ContentBlock>,
}

impl<'r, F: Fn(&str) -> String> Blocks<'r, F> {
    fn image(&self, caps: &Captures) -> ImageRef {
        let asset_id = &caps["id"];
        ImageRef {
            asset_id: asset_id.into(),
            url: (self.resolve)(&asset_path(self.slug, asset_id)),
            caption: caps.name("caption").map(|m| m.as_str().into()),
        }
    }

    // Adjacent text is merged, so that text which merely looked like
    // a token doesn't split up the surrounding text block.
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return
        }
        if let Some(ContentBlock::Text { text: last }) = self.blocks.last_mut() {
            last.push_str(text);
        } else {
            self.blocks.push(ContentBlock::Text { text: text.into() });
        }
    }

    /// Text outside of grids, links and italics: may still contain
    /// single images. Image tokens following a grid opener without
    /// any closer after it belong to the broken grid and stay literal.
    fn push_plain(&mut self, segment: &str) {
        let unclosed = segment.match_indices(GRID_OPENER)
            .map(|(i, _)| i)
            .find(|&i| !segment[i..].contains(GRID_CLOSER));
        let (scanned, rest) = match unclosed {
            Some(i) => segment.split_at(i),
            None => (segment, ""),
        };
        let mut pos = 0;
        for caps in IMAGE.captures_iter(scanned) {
            let whole = caps.get(0).expect("group 0 always matches");
            self.push_text(&scanned[pos..whole.start()]);
            let image = self.image(&caps);
            self.blocks.push(ContentBlock::Image(image));
            pos = whole.end();
        }
        self.push_text(&scanned[pos..]);
        self.push_text(rest);
    }

    fn push_token(&mut self, caps: &Captures) {
        if let Some(inner) = caps.name("grid_inner") {
            let items = IMAGE.captures_iter(inner.as_str())
                .map(|c| self.image(&c))
                .collect();
            self.blocks.push(ContentBlock::ImageGrid { items });
        } else if let (Some(text), Some(href)) =
            (caps.name("link_text"), caps.name("link_href"))
        {
            self.blocks.push(ContentBlock::Link {
                text: text.as_str().into(),
                href: href.as_str().into(),
            });
        } else if let Some(text) = caps.name("italic_text")
            .filter(|m| ITALIC_TEXT.is_match(m.as_str()))
        {
            self.blocks.push(ContentBlock::Italic { text: text.as_str().into() });
        } else {
            // An asterisk pair with other characters in between; the
            // asterisks stay literal.
            self.push_plain(&caps[0]);
        }
    }
}

/// Parse `body` into blocks. `resolve` maps asset storage paths (see
/// `asset_path`) to public URLs.
pub fn render_story_body<F>(body: &str, slug: &str, resolve: F) -> Vec<ContentBlock>
where F: Fn(&str) -> String
{
    let mut out = Blocks {
        slug,
        resolve: &resolve,
        blocks: Vec::new(),
    };
    let mut pos = 0;
    for caps in SEGMENT.captures_iter(body) {
        let whole = caps.get(0).expect("group 0 always matches");
        out.push_plain(&body[pos..whole.start()]);
        out.push_token(&caps);
        pos = whole.end();
    }
    out.push_plain(&body[pos..]);
    out.blocks
}

/// Parse the body of `story`, resolving assets through `repo`.
pub fn render_story(story: &Story, repo: &dyn ContentRepository) -> Vec<ContentBlock> {
    render_story_body(&story.body, &story.slug,
                      |path| repo.get_public_asset_url(path))
}

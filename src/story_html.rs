//! HTML for content blocks.

use anyhow::Result;

use crate::html::{att, opt_att, HtmlWriter};
use crate::story_body::{ContentBlock, ImageRef};

/// Newlines in story text are line breaks.
pub fn write_text_with_breaks(html: &mut HtmlWriter, text: &str) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            html.void("br", &[]);
        }
        html.text(line);
    }
}

/// An image, wrapped in a link carrying the lightbox data: without
/// scripting, activating it simply opens the full image.
fn write_image(html: &mut HtmlWriter, image: &ImageRef, class: &str) -> Result<()> {
    let lightbox = image.activation();
    html.element("figure", &[att("class", class)], |html| {
        html.element(
            "a",
            &[att("class", "lightbox"),
              att("href", &lightbox.url),
              att("data-alt", &lightbox.alt),
              opt_att("data-caption", lightbox.caption.as_deref())],
            |html| {
                html.void("img", &[att("src", &image.url),
                                   att("alt", &lightbox.alt),
                                   att("class", "zoomable")]);
                Ok(())
            })?;
        if let Some(caption) = &image.caption {
            html.text_element("figcaption", &[], caption)?;
        }
        Ok(())
    })
}

pub fn write_block(html: &mut HtmlWriter, block: &ContentBlock) -> Result<()> {
    match block {
        ContentBlock::Text { text } => {
            write_text_with_breaks(html, text);
            Ok(())
        }
        ContentBlock::Italic { text } =>
            html.text_element("i", &[], text),
        ContentBlock::Link { text, href } =>
            html.text_element(
                "a",
                &[att("href", href),
                  att("target", "_blank"),
                  att("rel", "noopener noreferrer"),
                  att("class", "story-link")],
                text),
        ContentBlock::Image(image) =>
            write_image(html, image, "story-image"),
        ContentBlock::ImageGrid { items } =>
            html.element("div", &[att("class", "image-grid")], |html| {
                for item in items {
                    write_image(html, item, "grid-image")?;
                }
                Ok(())
            }),
    }
}

pub fn write_blocks(html: &mut HtmlWriter, blocks: &[ContentBlock]) -> Result<()> {
    for block in blocks {
        write_block(html, block)?;
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::story_body::render_story_body;

    fn to_html(body: &str) -> Result<String> {
        let blocks = render_story_body(body, "s", |p| format!("/a/{p}"));
        let mut html = HtmlWriter::new();
        write_blocks(&mut html, &blocks)?;
        Ok(html.into_string())
    }

    #[test]
    fn t_text() -> Result<()> {
        assert_eq!(to_html("one\ntwo <3")?, "one<br>two &lt;3");
        assert_eq!(to_html("")?, "");
        Ok(())
    }

    #[test]
    fn t_inline() -> Result<()> {
        assert_eq!(to_html("*so* [go](https://x.org/?a=1&b=2)")?,
                   "<i>so</i> <a href=\"https://x.org/?a=1&amp;b=2\" target=\"_blank\" \
                    rel=\"noopener noreferrer\" class=\"story-link\">go</a>");
        Ok(())
    }

    #[test]
    fn t_image() -> Result<()> {
        assert_eq!(to_html("{{image:2}}[caption:Us & them]")?,
                   "<figure class=\"story-image\"><a class=\"lightbox\" href=\"/a/embedded/s/2\" \
                    data-alt=\"Embedded image 2\" data-caption=\"Us &amp; them\">\
                    <img src=\"/a/embedded/s/2\" alt=\"Embedded image 2\" class=\"zoomable\"></a>\
                    <figcaption>Us &amp; them</figcaption></figure>");
        Ok(())
    }

    #[test]
    fn t_grid() -> Result<()> {
        let s = to_html("[img-box|{{image:1}}{{image:2}}|img-box]")?;
        assert!(s.starts_with("<div class=\"image-grid\"><figure class=\"grid-image\">"));
        assert_eq!(s.matches("<img ").count(), 2);
        assert!(!s.contains("figcaption"));
        assert_eq!(to_html("[img-box| x |img-box]")?, "<div class=\"image-grid\"></div>");
        Ok(())
    }
}

use anyhow::Result;
use chrono::{DateTime, Datelike, Utc};

use crate::html::{att, HtmlWriter};

/// What a page needs to know about the request it is built for.
#[derive(Debug, Clone)]
pub struct PageContext {
    /// Request path, without query string
    pub path: String,
    pub now: DateTime<Utc>,
}

impl PageContext {
    pub fn new(path: &str) -> Self {
        PageContext {
            path: path.into(),
            now: Utc::now(),
        }
    }
}

pub trait LayoutInterface: Send + Sync {
    /// Build a whole HTML page around `main`. If `head_title` is
    /// missing, the site name is used.
    fn page(
        &self,
        context: &PageContext,
        html: &mut HtmlWriter,
        head_title: Option<&str>,
        main: &mut dyn FnMut(&mut HtmlWriter) -> Result<()>,
    ) -> Result<()>;
}

pub struct NavEntry {
    pub name: &'static str,
    pub path: &'static str,
}

impl NavEntry {
    fn is_current(&self, context: &PageContext) -> bool {
        let path = context.path.trim_end_matches('/');
        let own = self.path.trim_end_matches('/');
        !own.contains('#') && path == own
    }

    fn write(&self, html: &mut HtmlWriter, context: &PageContext) -> Result<()> {
        html.element("li", &[], |html| {
            if self.is_current(context) {
                html.text_element("span", &[att("class", "current")], self.name)
            } else {
                html.text_element("a", &[att("href", self.path)], self.name)
            }
        })
    }
}

pub const NAV: &[NavEntry] = &[
    NavEntry { name: "Home", path: "/" },
    NavEntry { name: "Stories", path: "/story" },
    NavEntry { name: "About", path: "/#about" },
    NavEntry { name: "Contact", path: "/#contact" },
];

pub fn year_range(from: i32, to: i32) -> String {
    if from >= to {
        to.to_string()
    } else {
        format!("{}–{}", from, to)
    }
}

pub struct SiteLayout {
    pub site_name: &'static str,
    pub copyright_owner: &'static str,
    pub copyright_since: i32,
    pub nav: &'static [NavEntry],
}

impl Default for SiteLayout {
    fn default() -> Self {
        SiteLayout {
            site_name: "Champions Place",
            copyright_owner: "Champions Place",
            copyright_since: 2025,
            nav: NAV,
        }
    }
}

impl LayoutInterface for SiteLayout {
    fn page(
        &self,
        context: &PageContext,
        html: &mut HtmlWriter,
        head_title: Option<&str>,
        main: &mut dyn FnMut(&mut HtmlWriter) -> Result<()>,
    ) -> Result<()> {
        html.doctype();
        html.element("html", &[att("lang", "en")], |html| {
            html.element("head", &[], |html| {
                html.void("meta", &[att("charset", "utf-8")]);
                html.void("meta", &[att("name", "viewport"),
                                    att("content", "width=device-width, initial-scale=1")]);
                html.void("link", &[att("rel", "stylesheet"),
                                    att("href", "/static/main.css")]);
                html.element("script", &[att("src", "/static/lightbox.js"),
                                         att("defer", "defer")],
                             |_| Ok(()))?;
                let title = match head_title {
                    // Do not repeat the site name
                    Some(t) if t != self.site_name => format!("{t} | {}", self.site_name),
                    _ => self.site_name.into(),
                };
                html.text_element("title", &[], &title)
            })?;
            html.element("body", &[], |html| {
                html.element("header", &[att("class", "header")], |html| {
                    html.text_element("a", &[att("href", "/"), att("class", "logo")],
                                      self.site_name)?;
                    html.element("nav", &[], |html| {
                        html.element("ul", &[att("class", "nav")], |html| {
                            for entry in self.nav {
                                entry.write(html, context)?;
                            }
                            Ok(())
                        })
                    })
                })?;
                html.element("main", &[att("class", "page-content")], |html| main(html))?;
                html.element("footer", &[att("class", "footer")], |html| {
                    html.text_element(
                        "p", &[],
                        &format!("Copyright © {} {}",
                                 year_range(self.copyright_since, context.now.year()),
                                 self.copyright_owner))
                })
            })
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn context(path: &str) -> PageContext {
        PageContext {
            path: path.into(),
            now: Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn t_year_range() {
        assert_eq!(year_range(2025, 2025), "2025");
        assert_eq!(year_range(2025, 2027), "2025–2027");
        assert_eq!(year_range(2030, 2026), "2026");
    }

    #[test]
    fn t_nav_current() {
        assert!(NAV[1].is_current(&context("/story/")));
        assert!(!NAV[1].is_current(&context("/story/game-day")));
        assert!(NAV[0].is_current(&context("/")));
        assert!(!NAV[2].is_current(&context("/")));
    }

    #[test]
    fn t_page() -> Result<()> {
        let layout = SiteLayout::default();
        let mut html = HtmlWriter::new();
        layout.page(&context("/story"), &mut html, Some("Stories"), &mut |html| {
            html.text_element("h1", &[], "Stories")
        })?;
        let s = html.into_string();
        assert!(s.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
        assert!(s.contains("<title>Stories | Champions Place</title>"));
        assert!(s.contains("<script src=\"/static/lightbox.js\" defer=\"defer\"></script>"));
        assert!(s.contains("<span class=\"current\">Stories</span>"));
        assert!(s.contains("<a href=\"/\">Home</a>"));
        assert!(s.contains("<main class=\"page-content\"><h1>Stories</h1></main>"));
        assert!(s.contains("Copyright © 2025–2026 Champions Place"));
        Ok(())
    }
}

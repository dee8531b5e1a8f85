//! Writing HTML into a string buffer, with escaping.

use anyhow::Result;
use kstring::KString;

pub type Attribute = Option<(&'static str, KString)>;

const DOCTYPE: &str = "<!DOCTYPE html>\n";

// Elements that have no closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "source", "track", "wbr",
];

pub fn att(key: &'static str, val: &str) -> Attribute {
    Some((key, KString::from_ref(val)))
}

pub fn opt_att(key: &'static str, val: Option<&str>) -> Attribute {
    val.map(|val| (key, KString::from_ref(val)))
}

/// Append `s` to `out`, escaped for use in both text and attribute
/// values.
pub fn html_escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

#[derive(Debug, Default)]
pub struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn doctype(&mut self) {
        self.out.push_str(DOCTYPE);
    }

    fn start_tag(&mut self, name: &str, atts: &[Attribute]) {
        self.out.push('<');
        self.out.push_str(name);
        for (key, val) in atts.iter().flatten() {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            html_escape_into(&mut self.out, val);
            self.out.push('"');
        }
        self.out.push('>');
    }

    /// An element with contents written by `body`.
    pub fn element(
        &mut self,
        name: &str,
        atts: &[Attribute],
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        debug_assert!(!VOID_ELEMENTS.contains(&name), "{name} is a void element");
        self.start_tag(name, atts);
        body(self)?;
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
        Ok(())
    }

    /// An element containing just text.
    pub fn text_element(&mut self, name: &str, atts: &[Attribute], text: &str) -> Result<()> {
        self.element(name, atts, |html| {
            html.text(text);
            Ok(())
        })
    }

    /// An element without contents or end tag, like `img`.
    pub fn void(&mut self, name: &str, atts: &[Attribute]) {
        debug_assert!(VOID_ELEMENTS.contains(&name), "{name} is not a void element");
        self.start_tag(name, atts);
    }

    pub fn text(&mut self, s: &str) {
        html_escape_into(&mut self.out, s);
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

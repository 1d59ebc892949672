//! Read-only queries over a rendered page.
//!
//! Only the markup this application renders needs to be understood: every non-void element
//! is closed explicitly, and attribute values are double-quoted with `>` escaped.

use regex::Regex;

lazy_static::lazy_static! {
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref ELEMENT_TAG: Regex =
        Regex::new(r"(?s)<(/?)([A-Za-z][A-Za-z0-9]*)(\s[^>]*)?>").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref ATTRIBUTE: Regex = Regex::new(r#"([\w-]+)="([^"]*)""#).unwrap();
}

/// An element found on a page: its attributes and inner markup.
#[derive(Debug, Clone)]
pub struct Element {
    attributes: String,
    inner: String,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<String> {
        ATTRIBUTE
            .captures_iter(&self.attributes)
            .find(|caps| &caps[1] == name)
            .map(|caps| unescape(&caps[2]))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Visible text: tags stripped, entities decoded and whitespace collapsed.
    pub fn text(&self) -> String {
        visible_text(&self.inner)
    }

    pub fn inner_html(&self) -> &str {
        &self.inner
    }

    /// Elements with `tag` nested inside this one.
    pub fn find_all(&self, tag: &str) -> Vec<Element> {
        elements(&self.inner, tag)
    }

    pub fn find(&self, tag: &str) -> Option<Element> {
        self.find_all(tag).into_iter().next()
    }
}

/// A fetched page.
#[derive(Debug, Clone)]
pub struct Page {
    url: String,
    html: String,
}

impl Page {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Page {
            url: url.into(),
            html: html.into(),
        }
    }

    /// Where the page was served from, after redirects.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn find_all(&self, tag: &str) -> Vec<Element> {
        elements(&self.html, tag)
    }

    pub fn find(&self, tag: &str) -> Option<Element> {
        self.find_all(tag).into_iter().next()
    }

    /// First `tag` element carrying `class`.
    pub fn find_with_class(&self, tag: &str, class: &str) -> Option<Element> {
        self.find_all(tag).into_iter().find(|el| el.has_class(class))
    }

    /// Text of every `tag` element, in document order.
    pub fn texts(&self, tag: &str) -> Vec<String> {
        self.find_all(tag).iter().map(Element::text).collect()
    }

    /// `href` of the first link whose target contains `fragment`.
    pub fn link_containing(&self, fragment: &str) -> Option<String> {
        self.find_all("a")
            .into_iter()
            .filter_map(|a| a.attr("href"))
            .find(|href| href.contains(fragment))
    }

    /// The `<main>` element: page content without navigation and footer.
    pub fn main(&self) -> Option<Element> {
        self.find("main")
    }
}

const VOID_TAGS: &[&str] = &["area", "br", "col", "hr", "img", "input", "link", "meta", "source"];

/// Every `tag` element in `html`, in the order of their opening tags. Opening and closing
/// tags are paired by depth, so an element may contain others of the same tag.
fn elements(html: &str, tag: &str) -> Vec<Element> {
    let void = VOID_TAGS.iter().any(|v| v.eq_ignore_ascii_case(tag));
    let mut open: Vec<(usize, String, usize)> = Vec::new();
    let mut found: Vec<(usize, Element)> = Vec::new();

    for caps in ELEMENT_TAG.captures_iter(html) {
        if !caps[2].eq_ignore_ascii_case(tag) {
            continue;
        }
        let (whole, closing) = match (caps.get(0), caps.get(1)) {
            (Some(whole), Some(closing)) => (whole, !closing.as_str().is_empty()),
            _ => continue,
        };
        let attributes = caps.get(3).map(|m| m.as_str()).unwrap_or_default();

        if closing {
            if let Some((position, attributes, content_start)) = open.pop() {
                let inner = html[content_start..whole.start()].to_string();
                found.push((position, Element { attributes, inner }));
            }
        } else if void || attributes.trim_end().ends_with('/') {
            let element = Element {
                attributes: attributes.trim_end().trim_end_matches('/').to_string(),
                inner: String::new(),
            };
            found.push((whole.start(), element));
        } else {
            open.push((whole.start(), attributes.to_string(), whole.end()));
        }
    }

    found.sort_by_key(|(position, _)| *position);
    found.into_iter().map(|(_, element)| element).collect()
}

fn visible_text(markup: &str) -> String {
    let stripped = TAG.replace_all(markup, " ");
    let decoded = unescape(&stripped);
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

fn unescape(raw: &str) -> String {
    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<html><body>
<nav><a href="/logout/">Log out</a></nav>
<main role="main" class="container">
<div class="alert alert-success" role="alert">New task &quot;Test Task *Selenium*&quot; has been added.</div>
<h1>Tasks in &quot;A new List&quot;</h1>
<table class="table tasks">
<tr><th>Task</th><th>Done</th></tr>
<tr class="task overdue"><td><a href="/task/1/">Order   toner</a></td><td><a href="/toggle_done/1/">Mark done</a></td></tr>
<tr class="task"><td><a href="/task/2/">Call &amp; confirm</a></td><td><a href="/toggle_done/2/">Mark done</a></td></tr>
</table>
</main>
<footer><p class="text-muted">CITS5501-Todo, 2018. Logged in as &quot;staffer&quot;</p></footer>
</body></html>"#;

    #[test]
    fn test_text_is_decoded_and_collapsed() {
        let page = Page::new("/", SAMPLE);
        assert_eq!(page.texts("h1"), vec!["Tasks in \"A new List\"".to_string()]);
        assert_eq!(
            page.find_with_class("div", "alert-success").unwrap().text(),
            "New task \"Test Task *Selenium*\" has been added."
        );
        assert_eq!(
            page.find_with_class("p", "text-muted").unwrap().text(),
            "CITS5501-Todo, 2018. Logged in as \"staffer\""
        );
    }

    #[test]
    fn test_table_rows_and_links() {
        let page = Page::new("/", SAMPLE);
        let table = page.find_with_class("table", "tasks").unwrap();
        let rows = table.find_all("tr");
        assert_eq!(rows.len(), 3);
        assert!(rows[1].has_class("overdue"));
        assert!(!rows[2].has_class("overdue"));

        let first = rows[1].find("td").unwrap().find("a").unwrap();
        assert_eq!(first.text(), "Order toner");
        assert_eq!(first.attr("href").unwrap(), "/task/1/");
        assert_eq!(rows[2].find("td").unwrap().text(), "Call & confirm");

        assert_eq!(page.link_containing("toggle_done").unwrap(), "/toggle_done/1/");
        assert!(page.link_containing("delete").is_none());
    }

    #[test]
    fn test_nested_elements_of_the_same_tag() {
        let page = Page::new(
            "/",
            r#"<div class="card"><div class="card-body"><h3 class="card-title">Order toner</h3>
<div class="comments"><div class="comment">First</div><div class="comment">Second</div></div>
</div></div><div class="wrap"><div class="alert alert-success">Saved</div></div>
<form action="/x/"><input type="text" name="title"><input name="note" value="n" /></form>"#,
        );

        let body = page.find_with_class("div", "card-body").unwrap();
        assert_eq!(body.find("h3").unwrap().text(), "Order toner");
        assert_eq!(page.find_with_class("div", "alert-success").unwrap().text(), "Saved");

        let card = page.find_with_class("div", "card").unwrap();
        assert_eq!(card.text(), "Order toner First Second");
        let comments: Vec<_> = card
            .find_all("div")
            .into_iter()
            .filter(|div| div.has_class("comment"))
            .map(|div| div.text())
            .collect();
        assert_eq!(comments, vec!["First".to_string(), "Second".to_string()]);

        let divs = page.find_all("div");
        assert_eq!(divs.len(), 7);
        assert!(divs[0].has_class("card"));
        assert!(divs[5].has_class("wrap"));

        let inputs = page.find("form").unwrap().find_all("input");
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].attr("name").unwrap(), "title");
        assert_eq!(inputs[1].attr("value").unwrap(), "n");
    }

    #[test]
    fn test_missing_elements() {
        let page = Page::new("/", SAMPLE);
        assert!(page.find("h5").is_none());
        assert!(page.find_with_class("div", "alert-danger").is_none());
    }
}

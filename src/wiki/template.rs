//! Page templates
//!
//! A template is HTML with `{{ title }}` and `{{ body }}` placeholders.
//! Placeholders are HTML-escaped on render. Templates are parsed once at
//! startup; a malformed template is reported as a parse error so the
//! server never starts with a broken set.

use std::collections::HashMap;
use std::path::Path;

use super::error::TemplateError;
use super::page::Page;

/// Templates every wiki server needs
pub const REQUIRED_TEMPLATES: [&str; 2] = ["edit", "view"];

/// File extension of template sources
const TEMPLATE_EXTENSION: &str = "html";

const OPEN_TAG: &str = "{{";
const CLOSE_TAG: &str = "}}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// A parsed template
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(name: &str, source: &str) -> Result<Self, TemplateError> {
        let parse_error = |message: String| TemplateError::Parse {
            name: name.to_string(),
            message,
        };

        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find(OPEN_TAG) {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after_open = &rest[start + OPEN_TAG.len()..];
            let Some(end) = after_open.find(CLOSE_TAG) else {
                let offset = source.len() - rest.len() + start;
                let line = source[..offset].matches('\n').count() + 1;
                return Err(parse_error(format!("unclosed action on line {line}")));
            };

            let field = match after_open[..end].trim() {
                "title" => Field::Title,
                "body" => Field::Body,
                "" => return Err(parse_error("empty action".to_string())),
                other => return Err(parse_error(format!("unknown field '{other}'"))),
            };
            segments.push(Segment::Field(field));
            rest = &after_open[end + CLOSE_TAG.len()..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }

    pub fn render(&self, page: &Page) -> String {
        let body = page.body_text();
        let mut out = String::with_capacity(self.estimated_len() + body.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Field::Title) => escape_html_into(page.title.as_str(), &mut out),
                Segment::Field(Field::Body) => escape_html_into(&body, &mut out),
            }
        }
        out
    }

    fn estimated_len(&self) -> usize {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.len(),
                Segment::Field(_) => 0,
            })
            .sum()
    }
}

/// Named template collection, read-only after startup
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: HashMap<String, Template>,
}

impl TemplateSet {
    /// Load `<dir>/<name>.html` for every required template
    pub fn load_dir(dir: &Path) -> Result<Self, TemplateError> {
        let mut set = Self::default();
        for name in REQUIRED_TEMPLATES {
            let path = dir.join(format!("{name}.{TEMPLATE_EXTENSION}"));
            let source = std::fs::read_to_string(&path)
                .map_err(|source| TemplateError::Io { path, source })?;
            set.insert(Template::parse(name, &source)?);
        }
        Ok(set)
    }

    /// Build a set from in-memory `(name, source)` pairs
    #[cfg(test)]
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, TemplateError> {
        let mut set = Self::default();
        for (name, source) in sources {
            set.insert(Template::parse(name, source)?);
        }
        Ok(set)
    }

    pub fn insert(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn render(&self, name: &str, page: &Page) -> Result<String, TemplateError> {
        self.templates
            .get(name)
            .map(|template| template.render(page))
            .ok_or_else(|| TemplateError::Render {
                name: name.to_string(),
                message: "no such template".to_string(),
            })
    }
}

/// Escape text for embedding in HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html_into(text, &mut out);
    out
}

fn escape_html_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            '\0' => out.push('\u{FFFD}'),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiki::TitleValidator;
    use tempfile::TempDir;

    fn page(title: &str, body: &str) -> Page {
        let title = TitleValidator::new().unwrap().parse(title).unwrap();
        Page::new(title, body.as_bytes().to_vec())
    }

    #[test]
    fn test_render_substitutes_fields() {
        let t = Template::parse("view", "<h1>{{title}}</h1><div>{{ body }}</div>").unwrap();
        let html = t.render(&page("Foo", "Hello, world!"));
        assert_eq!(html, "<h1>Foo</h1><div>Hello, world!</div>");
    }

    #[test]
    fn test_render_escapes_body() {
        let t = Template::parse("view", "{{body}}").unwrap();
        let html = t.render(&page("Foo", "<script>alert(\"x\")</script> & 'y'"));
        assert_eq!(
            html,
            "&lt;script&gt;alert(&#34;x&#34;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
    }

    #[test]
    fn test_render_empty_body() {
        let t = Template::parse("edit", "<textarea>{{body}}</textarea>").unwrap();
        assert_eq!(t.render(&page("New", "")), "<textarea></textarea>");
    }

    #[test]
    fn test_plain_template_without_actions() {
        let t = Template::parse("static", "<p>no placeholders</p>").unwrap();
        assert_eq!(t.render(&page("Foo", "ignored")), "<p>no placeholders</p>");
    }

    #[test]
    fn test_parse_rejects_unknown_field() {
        let err = Template::parse("view", "{{ author }}").unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }));
        assert!(err.to_string().contains("author"));
    }

    #[test]
    fn test_parse_rejects_unclosed_action() {
        let err = Template::parse("view", "<p>\n{{ title </p>").unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_rejects_empty_action() {
        assert!(Template::parse("view", "{{ }}").is_err());
    }

    #[test]
    fn test_set_render_unknown_name() {
        let set = TemplateSet::from_sources([("view", "{{body}}")]).unwrap();
        let err = set.render("edit", &page("Foo", "")).unwrap_err();
        assert!(matches!(err, TemplateError::Render { .. }));
    }

    #[test]
    fn test_load_dir_reads_required_templates() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("view.html"), "<h1>{{title}}</h1>").unwrap();
        std::fs::write(dir.path().join("edit.html"), "<form>{{body}}</form>").unwrap();

        let set = TemplateSet::load_dir(dir.path()).unwrap();
        assert!(set.contains("view"));
        assert!(set.contains("edit"));
        assert_eq!(
            set.render("view", &page("Foo", "")).unwrap(),
            "<h1>Foo</h1>"
        );
    }

    #[test]
    fn test_bundled_templates_parse() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        let set = TemplateSet::load_dir(&dir).unwrap();

        let html = set.render("edit", &page("FrontPage", "x & y")).unwrap();
        assert!(html.contains("action=\"/save/FrontPage\""));
        assert!(html.contains(">x &amp; y</textarea>"));
    }

    #[test]
    fn test_load_dir_missing_template_fails() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("view.html"), "{{title}}").unwrap();

        let err = TemplateSet::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, TemplateError::Io { .. }));
    }

    #[test]
    fn test_load_dir_malformed_template_fails() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("view.html"), "{{title}}").unwrap();
        std::fs::write(dir.path().join("edit.html"), "{{title").unwrap();

        let err = TemplateSet::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_html("/view/Foo"), "/view/Foo");
    }
}

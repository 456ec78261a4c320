//! Page rendering strategies.
//!
//! The strategy is chosen once at startup: when a site templates directory
//! exists, pages render through its `minijinja` layouts; otherwise the
//! built-in HTML page is used.

use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use folio_pages::Page;
use minijinja::{AutoEscape, Environment, Value, context};

/// Renders a visible page to HTML.
pub trait PageRenderer: Send + Sync {
    /// Render `page`, published at `url`.
    fn render(&self, page: &Page, url: &str) -> String;
}

/// Pick the renderer for the configured site templates directory.
pub fn resolve_renderer(site_templates_dir: Option<&Path>) -> Arc<dyn PageRenderer> {
    match site_templates_dir {
        Some(dir) if dir.is_dir() => {
            tracing::info!(dir = %dir.display(), "Rendering pages with site layouts");
            Arc::new(SiteRenderer::new(dir.to_path_buf()))
        }
        Some(dir) => {
            tracing::warn!(dir = %dir.display(), "Site templates directory not found, using default layout");
            Arc::new(DefaultRenderer)
        }
        None => Arc::new(DefaultRenderer),
    }
}

/// Built-in HTML page.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultRenderer;

impl PageRenderer for DefaultRenderer {
    fn render(&self, page: &Page, url: &str) -> String {
        let vars = DefaultVars::new(page, url);
        let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(html, "<title>{}</title>", vars.meta_title);
        if !vars.meta_description.is_empty() {
            let _ = writeln!(
                html,
                "<meta name=\"description\" content=\"{}\">",
                vars.meta_description
            );
        }
        if !vars.meta_keywords.is_empty() {
            let _ = writeln!(
                html,
                "<meta name=\"keywords\" content=\"{}\">",
                vars.meta_keywords
            );
        }
        if !vars.robots.is_empty() {
            let _ = writeln!(html, "<meta name=\"robots\" content=\"{}\">", vars.robots);
        }
        let _ = writeln!(html, "<link rel=\"canonical\" href=\"{}\">", vars.canonical);
        html.push_str("</head>\n<body>\n");
        let _ = writeln!(html, "<h1>{}</h1>", vars.name);
        html.push_str(&page.content);
        html.push_str("\n</body>\n</html>\n");
        html
    }
}

/// Renders pages through layout files of a site templates directory.
///
/// Layouts are `minijinja` templates rendered with HTML auto-escaping. The
/// page body is passed as `content` and inserted unescaped; every other
/// value is escaped. Custom page attributes are available as `data`.
pub struct SiteRenderer {
    dir: PathBuf,
    env: Environment<'static>,
}

impl SiteRenderer {
    /// Create a renderer reading layouts from `dir`.
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        Self { dir, env }
    }

    /// Path of a layout file, if the name stays inside the directory.
    fn layout_path(&self, layout: &str) -> Option<PathBuf> {
        let relative = Path::new(layout);
        let inside = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        (inside && !layout.is_empty()).then(|| self.dir.join(relative))
    }

    fn render_layout(
        &self,
        layout: &str,
        page: &Page,
        url: &str,
    ) -> Result<String, minijinja::Error> {
        let seo = &page.seo;
        let ctx = context! {
            name => &page.name,
            meta_title => seo.meta_title.as_deref().unwrap_or(&page.name),
            meta_description => seo.meta_description.as_deref().unwrap_or_default(),
            meta_keywords => seo.meta_keywords.as_deref().unwrap_or_default(),
            robots => page.robots.directive().unwrap_or_default(),
            canonical => page.robots.canonical.as_deref().unwrap_or(url),
            url => url,
            data => Value::from_serialize(&page.data),
            content => Value::from_safe_string(page.content.clone()),
        };
        self.env.render_str(layout, ctx)
    }
}

impl std::fmt::Debug for SiteRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteRenderer").field("dir", &self.dir).finish_non_exhaustive()
    }
}

impl PageRenderer for SiteRenderer {
    fn render(&self, page: &Page, url: &str) -> String {
        let Some(path) = self.layout_path(&page.layout) else {
            tracing::warn!(page_id = page.id, layout = %page.layout, "Invalid layout name");
            return DefaultRenderer.render(page, url);
        };

        let layout = match std::fs::read_to_string(&path) {
            Ok(layout) => layout,
            Err(e) => {
                tracing::debug!(
                    page_id = page.id,
                    path = %path.display(),
                    error = %e,
                    "Layout not readable, using default layout"
                );
                return DefaultRenderer.render(page, url);
            }
        };

        match self.render_layout(&layout, page, url) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(
                    page_id = page.id,
                    path = %path.display(),
                    error = %e,
                    "Layout failed to render, using default layout"
                );
                DefaultRenderer.render(page, url)
            }
        }
    }
}

/// Escaped values of the built-in page.
struct DefaultVars {
    name: String,
    meta_title: String,
    meta_description: String,
    meta_keywords: String,
    robots: String,
    canonical: String,
}

impl DefaultVars {
    fn new(page: &Page, url: &str) -> Self {
        let escape = |value: &str| html_escape::encode_double_quoted_attribute(value).into_owned();
        let seo = &page.seo;

        Self {
            name: escape(&page.name),
            meta_title: escape(seo.meta_title.as_deref().unwrap_or(&page.name)),
            meta_description: escape(seo.meta_description.as_deref().unwrap_or_default()),
            meta_keywords: escape(seo.meta_keywords.as_deref().unwrap_or_default()),
            robots: escape(&page.robots.directive().unwrap_or_default()),
            canonical: escape(page.robots.canonical.as_deref().unwrap_or(url)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use folio_pages::{Publication, Robots, Seo, Sitemap};
    use pretty_assertions::assert_eq;

    use super::*;

    fn page() -> Page {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Page {
            id: 1,
            parent_id: 0,
            alias: "about".to_owned(),
            name: "About <us>".to_owned(),
            content: "<p>Hello {{ name }}</p>".to_owned(),
            image: None,
            images: None,
            template: "page".to_owned(),
            child_template: None,
            layout: "page.html".to_owned(),
            child_layout: None,
            publication: Publication {
                published: true,
                ..Publication::default()
            },
            seo: Seo {
                meta_description: Some("Who \"we\" are".to_owned()),
                ..Seo::default()
            },
            robots: Robots {
                no_index: true,
                ..Robots::default()
            },
            sitemap: Sitemap::default(),
            data: serde_json::Map::new(),
            created_at: created,
            updated_at: created,
            deleted_at: None,
        }
    }

    #[test]
    fn test_default_renderer_escapes_meta() {
        let html = DefaultRenderer.render(&page(), "/about");

        assert!(html.contains("<title>About &lt;us&gt;</title>"));
        assert!(html.contains("<meta name=\"description\" content=\"Who &quot;we&quot; are\">"));
        assert!(html.contains("<meta name=\"robots\" content=\"noindex\">"));
        assert!(html.contains("<link rel=\"canonical\" href=\"/about\">"));
        assert!(!html.contains("name=\"keywords\""));
        assert!(html.contains("<p>Hello {{ name }}</p>"));
    }

    fn site_with_layout(layout: &str) -> (tempfile::TempDir, SiteRenderer) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.html"), layout).unwrap();
        let renderer = SiteRenderer::new(dir.path().to_path_buf());
        (dir, renderer)
    }

    #[test]
    fn test_site_renderer_applies_layout() {
        let (_dir, renderer) = site_with_layout(
            "<title>{{ meta_title }}</title><main>{{ content }}</main><meta content=\"{{ robots }}\">",
        );

        let html = renderer.render(&page(), "/about");

        assert_eq!(
            html,
            "<title>About &lt;us&gt;</title><main><p>Hello {{ name }}</p></main><meta content=\"noindex\">"
        );
    }

    #[test]
    fn test_site_renderer_keeps_placeholders_in_values_literal() {
        let (_dir, renderer) = site_with_layout("<h1>{{ name }}</h1>");
        let mut page = page();
        page.name = "Tips: {{ url }} and {{ content }}".to_owned();

        let html = renderer.render(&page, "/about");

        assert_eq!(html, "<h1>Tips: {{ url }} and {{ content }}</h1>");
    }

    #[test]
    fn test_site_renderer_escapes_values_but_not_content() {
        let (_dir, renderer) = site_with_layout("{{ meta_description }}|{{ content }}");

        let html = renderer.render(&page(), "/about");

        assert_eq!(html, "Who &quot;we&quot; are|<p>Hello {{ name }}</p>");
    }

    #[test]
    fn test_site_renderer_exposes_custom_data() {
        let (_dir, renderer) = site_with_layout("{% if data._color %}{{ data._color }}{% endif %}");
        let mut page = page();
        page.data.insert("_color".to_owned(), serde_json::json!("<red>"));

        assert_eq!(renderer.render(&page, "/about"), "&lt;red&gt;");
    }

    #[test]
    fn test_site_renderer_falls_back_on_template_error() {
        let (_dir, renderer) = site_with_layout("{% if %}");

        let html = renderer.render(&page(), "/about");

        assert_eq!(html, DefaultRenderer.render(&page(), "/about"));
    }

    #[test]
    fn test_site_renderer_falls_back_for_missing_layout() {
        let dir = tempfile::tempdir().unwrap();

        let html = SiteRenderer::new(dir.path().to_path_buf()).render(&page(), "/about");

        assert_eq!(html, DefaultRenderer.render(&page(), "/about"));
    }

    #[test]
    fn test_site_renderer_rejects_escaping_layout_names() {
        let renderer = SiteRenderer::new(PathBuf::from("/srv/site"));

        assert_eq!(renderer.layout_path("../secret.html"), None);
        assert_eq!(renderer.layout_path("/etc/passwd"), None);
        assert_eq!(renderer.layout_path(""), None);
        assert_eq!(
            renderer.layout_path("blog/post.html"),
            Some(PathBuf::from("/srv/site/blog/post.html"))
        );
    }

    #[test]
    fn test_resolve_renderer_missing_dir_uses_default() {
        let renderer = resolve_renderer(Some(Path::new("/nonexistent/folio/site")));
        assert_eq!(
            renderer.render(&page(), "/about"),
            DefaultRenderer.render(&page(), "/about")
        );
    }
}

//! Page metadata fetching: one HTTP GET per URL, then lightweight HTML
//! sniffing for the Open Graph image, a title, and an icon link.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use url::Url;

use crate::app::Result;
use crate::config::Config;

/// Title, image and icon references extracted from a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkMetadata {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub icon_url: Option<String>,
}

impl LinkMetadata {
    pub fn has_image(&self) -> bool {
        self.image_url.is_some()
    }
}

#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<LinkMetadata>;
}

// Attribute order in real pages goes both ways, so each lookup carries a
// property-first and a content-first pattern.
fn meta_patterns(property: &str) -> [Regex; 2] {
    let p = regex::escape(property);
    [
        Regex::new(&format!(
            r#"(?is)<meta\b[^>]*(?:property|name)\s*=\s*["']{p}["'][^>]*content\s*=\s*["']([^"']*)["']"#
        ))
        .expect("valid meta pattern"),
        Regex::new(&format!(
            r#"(?is)<meta\b[^>]*content\s*=\s*["']([^"']*)["'][^>]*(?:property|name)\s*=\s*["']{p}["']"#
        ))
        .expect("valid meta pattern"),
    ]
}

static OG_IMAGE: Lazy<[Regex; 2]> = Lazy::new(|| meta_patterns("og:image"));
static OG_TITLE: Lazy<[Regex; 2]> = Lazy::new(|| meta_patterns("og:title"));

static TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>([^<]*)</title>").expect("valid title pattern"));

static ICON_LINK: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(
            r#"(?is)<link\b[^>]*rel\s*=\s*["'][^"']*icon[^"']*["'][^>]*href\s*=\s*["']([^"']+)["']"#,
        )
        .expect("valid icon pattern"),
        Regex::new(
            r#"(?is)<link\b[^>]*href\s*=\s*["']([^"']+)["'][^>]*rel\s*=\s*["'][^"']*icon[^"']*["']"#,
        )
        .expect("valid icon pattern"),
    ]
});

fn first_capture(html: &str, patterns: &[Regex]) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.captures(html).and_then(|c| c.get(1)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn absolutize(base: &Url, href: &str) -> Option<String> {
    base.join(href).ok().map(|u| u.to_string())
}

/// Extract [`LinkMetadata`] from an HTML document. Relative image and icon
/// references are resolved against `base`.
pub fn parse_metadata(base: &Url, html: &str) -> LinkMetadata {
    let title = first_capture(html, OG_TITLE.as_slice())
        .or_else(|| first_capture(html, std::slice::from_ref(&*TITLE_TAG)));
    let image_url = first_capture(html, OG_IMAGE.as_slice()).and_then(|u| absolutize(base, &u));
    let icon_url = first_capture(html, ICON_LINK.as_slice()).and_then(|u| absolutize(base, &u));

    LinkMetadata {
        title,
        image_url,
        icon_url,
    }
}

pub struct HttpMetadataFetcher {
    client: Client,
}

impl HttpMetadataFetcher {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(config.stage_timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, url: &str) -> Result<LinkMetadata> {
        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        // Redirects may have moved us; relative references resolve against
        // the final URL.
        let base = response.url().clone();
        let html = response.text().await?;

        Ok(parse_metadata(&base, &html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/articles/1").unwrap()
    }

    #[test]
    fn test_og_tags_property_first() {
        let html = r#"<html><head>
            <meta property="og:title" content="An Article" />
            <meta property="og:image" content="https://cdn.example.com/img.png" />
        </head></html>"#;

        let meta = parse_metadata(&base(), html);
        assert_eq!(meta.title, Some("An Article".into()));
        assert_eq!(meta.image_url, Some("https://cdn.example.com/img.png".into()));
    }

    #[test]
    fn test_og_tags_content_first() {
        let html = r#"<meta content="Reversed" property="og:title">"#;
        let meta = parse_metadata(&base(), html);
        assert_eq!(meta.title, Some("Reversed".into()));
    }

    #[test]
    fn test_title_tag_fallback() {
        let html = "<html><head><title> Plain Title </title></head></html>";
        let meta = parse_metadata(&base(), html);
        assert_eq!(meta.title, Some("Plain Title".into()));
    }

    #[test]
    fn test_relative_image_and_icon_resolved_against_base() {
        let html = r#"
            <meta property="og:image" content="/img/cover.jpg">
            <link rel="shortcut icon" href="favicon.ico">
        "#;

        let meta = parse_metadata(&base(), html);
        assert_eq!(
            meta.image_url,
            Some("https://example.com/img/cover.jpg".into())
        );
        assert_eq!(
            meta.icon_url,
            Some("https://example.com/articles/favicon.ico".into())
        );
    }

    #[test]
    fn test_icon_link_href_first() {
        let html = r#"<link href="/fav.png" rel="icon" type="image/png">"#;
        let meta = parse_metadata(&base(), html);
        assert_eq!(meta.icon_url, Some("https://example.com/fav.png".into()));
    }

    #[test]
    fn test_absent_metadata() {
        let meta = parse_metadata(&base(), "<html><body>nothing here</body></html>");
        assert_eq!(meta, LinkMetadata::default());
        assert!(!meta.has_image());
    }
}

//! Extraction of absolute HTTP(S) links from anchor tags.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref ANCHOR_HREF: Regex = Regex::new(
        r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#
    )
    .expect("anchor pattern should be valid");
}

/// Finds the links of a page.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkParser;

impl LinkParser {
    /// Drop the fragment of `url`.
    pub fn normalize(mut url: Url) -> Url {
        url.set_fragment(None);
        url
    }

    /// Absolute `http`/`https` links of every anchor in `html`, resolved
    /// against `base`, without fragments, each listed once in order of first
    /// appearance. Hrefs that do not resolve to a valid URL are skipped.
    pub fn links(base: &Url, html: &str) -> Vec<Url> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for caps in ANCHOR_HREF.captures_iter(html) {
            let Some(href) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };
            let Ok(url) = base.join(href.as_str().trim()) else {
                continue;
            };
            if !matches!(url.scheme(), "http" | "https") {
                continue;
            }

            let url = Self::normalize(url);
            if seen.insert(url.as_str().to_string()) {
                links.push(url);
            }
        }

        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/docs/index.html").unwrap()
    }

    fn strings(links: Vec<Url>) -> Vec<String> {
        links.into_iter().map(String::from).collect()
    }

    #[test]
    fn test_resolves_relative_links() {
        let html = r#"<a href="guide.html">g</a> <A class="x" HREF='/about'>a</A>
                      <a href="https://other.org/page">o</a>"#;

        assert_eq!(
            strings(LinkParser::links(&base(), html)),
            vec![
                "https://example.com/docs/guide.html",
                "https://example.com/about",
                "https://other.org/page",
            ]
        );
    }

    #[test]
    fn test_removes_fragments_and_duplicates() {
        let html = r##"<a href="page.html#top">1</a><a href="page.html#bottom">2</a>
                       <a href="page.html">3</a><a href="#local">4</a>"##;

        assert_eq!(
            strings(LinkParser::links(&base(), html)),
            vec![
                "https://example.com/docs/page.html",
                "https://example.com/docs/index.html",
            ]
        );
    }

    #[test]
    fn test_skips_non_http_links_and_other_tags() {
        let html = r#"<a href="mailto:me@example.com">m</a>
                      <a href="javascript:void(0)">j</a>
                      <link href="style.css">
                      <area href="map.html">
                      <a name="anchor">no href</a>"#;

        assert!(LinkParser::links(&base(), html).is_empty());
    }

    #[test]
    fn test_multiline_anchor_and_query() {
        let html = "<a\n  id=\"x\"\n  href = \"search?q=rust#results\"\n>r</a>";

        assert_eq!(
            strings(LinkParser::links(&base(), html)),
            vec!["https://example.com/docs/search?q=rust"]
        );
    }
}

//! Page Collector: gathers plain text from a fixed set of company pages.
//!
//! `main` is always the literal input URL. Every other page is a fixed path
//! resolved against the input's scheme and host. Failed or thin pages are
//! skipped; an empty bundle means "no data available", not an error.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::web::html::{html_to_text, truncate_chars};
use crate::web::{parse_http_url, PageFetcher};

/// Pages at or below this many characters carry no usable signal.
pub const MIN_PAGE_CHARS: usize = 200;
/// Per-page cap, bounding the size of later prompts.
pub const MAX_PAGE_CHARS: usize = 2000;

const PAGE_SKIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "footer", "header"];

const DERIVED_PAGES: [(&str, &str); 10] = [
    ("about", "/about"),
    ("about-us", "/about-us"),
    ("careers", "/careers"),
    ("jobs", "/jobs"),
    ("team", "/team"),
    ("culture", "/culture"),
    ("values", "/values"),
    ("mission", "/mission"),
    ("news", "/news"),
    ("blog", "/blog"),
];

/// Page-category label → extracted text, in collection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageBundle {
    pages: Vec<(String, String)>,
}

impl PageBundle {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.pages
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, text)| text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pages.iter().map(|(l, t)| (l.as_str(), t.as_str()))
    }

    fn push(&mut self, label: &str, text: String) {
        self.pages.push((label.to_string(), text));
    }
}

impl<L: Into<String>, T: Into<String>> FromIterator<(L, T)> for PageBundle {
    fn from_iter<I: IntoIterator<Item = (L, T)>>(iter: I) -> Self {
        Self {
            pages: iter
                .into_iter()
                .map(|(label, text)| (label.into(), text.into()))
                .collect(),
        }
    }
}

/// Fetches the candidate pages of `base_url` one after another.
pub async fn collect(fetcher: &dyn PageFetcher, base_url: &str) -> PageBundle {
    let mut targets = vec![("main", base_url.to_string())];

    match parse_http_url(base_url) {
        Ok(base) => {
            for (label, path) in DERIVED_PAGES {
                match base.join(path) {
                    Ok(url) => targets.push((label, url.to_string())),
                    Err(e) => warn!("Could not resolve {label} page against {base_url}: {e}"),
                }
            }
        }
        Err(e) => warn!("{e}; only the main page will be attempted"),
    }

    let mut bundle = PageBundle::default();

    for (label, url) in targets {
        let body = match fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Could not extract {label} page: {e}");
                continue;
            }
        };

        let text = html_to_text(&body, PAGE_SKIPPED_ELEMENTS);
        let chars = text.chars().count();
        if chars <= MIN_PAGE_CHARS {
            debug!("Skipping {label} page: only {chars} characters of text");
            continue;
        }

        bundle.push(label, truncate_chars(&text, MAX_PAGE_CHARS).to_string());
    }

    info!("Collected {} page(s) from {base_url}", bundle.len());
    bundle
}

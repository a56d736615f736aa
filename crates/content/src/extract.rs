//! Web page content extraction.
//!
//! Fetches a page and pulls out title, meta description, and readable
//! body text. Extraction never fails the pipeline: any network or parse
//! problem degrades to an all-empty [`ExtractedContent`] and the caller
//! decides whether empty content is fatal.

use std::{sync::LazyLock, time::Duration};

use {regex::Regex, reqwest::Client, tracing::warn, url::Url};

use crate::tokens::TokenEstimator;

/// Browser user-agent sent with extraction requests; some sites refuse
/// obviously non-browser clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetch timeout.
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Default token budget for extracted content.
const DEFAULT_MAX_TOKENS: usize = 6000;

/// Minimum length for a paragraph to survive the fallback extractor.
const MIN_PARAGRAPH_CHARS: usize = 50;

/// Character budget per token when converting a token budget back to a
/// body-length cap.
const CHARS_PER_TOKEN: usize = 4;

/// Marker appended when the body is cut to fit the token budget.
const TRUNCATION_MARKER: &str = "\n\n[content truncated to fit the model context]";

#[allow(clippy::expect_used)]
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title pattern compiles")
});

#[allow(clippy::expect_used)]
static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("meta pattern compiles"));

#[allow(clippy::expect_used)]
static CONTENT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)content\s*=\s*["']([^"']*)["']"#).expect("content attr pattern compiles")
});

#[allow(clippy::expect_used)]
static ARTICLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(article|main)\b[^>]*>(.*?)</(article|main)>")
        .expect("article pattern compiles")
});

#[allow(clippy::expect_used)]
static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p>").expect("paragraph pattern compiles"));

/// Extracted page content. Empty strings represent extraction failure;
/// fields are never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    pub title: String,
    pub description: String,
    pub main_content: String,
}

impl ExtractedContent {
    /// Combined text the pipeline feeds downstream.
    #[must_use]
    pub fn combined(&self) -> String {
        format!(
            "Title: {}\n\nDescription: {}\n\n{}",
            self.title, self.description, self.main_content
        )
    }
}

#[derive(Debug, thiserror::Error)]
enum ExtractError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status: HTTP {0}")]
    Status(reqwest::StatusCode),
}

/// Fetches web pages and extracts readable content within a token budget.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    client: Client,
    max_tokens: usize,
    estimator: TokenEstimator,
}

impl ContentExtractor {
    /// Create an extractor with the default token budget.
    #[must_use]
    pub fn new(estimator: TokenEstimator) -> Self {
        Self {
            client: Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
            max_tokens: DEFAULT_MAX_TOKENS,
            estimator,
        }
    }

    /// Override the token budget.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Extract title, description, and body text from `url`.
    ///
    /// Degrades to an all-empty result on any failure.
    pub async fn extract(&self, url: &str) -> ExtractedContent {
        match self.fetch(url).await {
            Ok(content) => content,
            Err(err) => {
                warn!(url, error = %err, "content extraction failed, returning empty");
                ExtractedContent::default()
            },
        }
    }

    async fn fetch(&self, url: &str) -> Result<ExtractedContent, ExtractError> {
        let url = Url::parse(url)?;
        match url.scheme() {
            "http" | "https" => {},
            scheme => return Err(ExtractError::UnsupportedScheme(scheme.into())),
        }

        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Status(status));
        }

        let html = response.text().await?;
        let mut content = parse_html(&html);
        self.enforce_token_budget(&mut content);
        Ok(content)
    }

    /// Cut the body (never title/description) so the combined text fits
    /// the token budget, appending a truncation marker.
    fn enforce_token_budget(&self, content: &mut ExtractedContent) {
        let total = self.estimator.estimate(&content.combined());
        if total <= self.max_tokens {
            return;
        }

        let header = format!(
            "Title: {}\n\nDescription: {}\n\n",
            content.title, content.description
        );
        let header_tokens = self.estimator.estimate(&header);
        let body_budget = self.max_tokens.saturating_sub(header_tokens) * CHARS_PER_TOKEN;

        let mut end = body_budget.min(content.main_content.len());
        while end > 0 && !content.main_content.is_char_boundary(end) {
            end -= 1;
        }
        content.main_content.truncate(end);
        content.main_content.push_str(TRUNCATION_MARKER);
    }
}

/// Parse an HTML document into title, description, and body text.
fn parse_html(html: &str) -> ExtractedContent {
    ExtractedContent {
        title: extract_title(html),
        description: extract_description(html),
        main_content: extract_main_content(html),
    }
}

fn extract_title(html: &str) -> String {
    TITLE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| collapse_whitespace(&decode_entities(m.as_str())))
        .unwrap_or_default()
}

/// Meta description, preferring `name="description"` over
/// `property="og:description"`. First match wins; absence is not an error.
fn extract_description(html: &str) -> String {
    let mut og_description = None;
    for tag in META_TAG_RE.find_iter(html) {
        let tag = tag.as_str();
        let lower = tag.to_ascii_lowercase();
        let is_meta_desc =
            lower.contains("name=\"description\"") || lower.contains("name='description'");
        let is_og_desc = lower.contains("property=\"og:description\"")
            || lower.contains("property='og:description'");
        if !is_meta_desc && !is_og_desc {
            continue;
        }
        let Some(content) = CONTENT_ATTR_RE
            .captures(tag)
            .and_then(|caps| caps.get(1))
            .map(|m| decode_entities(m.as_str()))
        else {
            continue;
        };
        if is_meta_desc {
            return content;
        }
        if og_description.is_none() {
            og_description = Some(content);
        }
    }
    og_description.unwrap_or_default()
}

/// Readable body text: the first `<article>`/`<main>` region when present,
/// otherwise the whole document, otherwise paragraph blocks over
/// [`MIN_PARAGRAPH_CHARS`].
fn extract_main_content(html: &str) -> String {
    let region = ARTICLE_RE
        .captures(html)
        .and_then(|caps| caps.get(2))
        .map_or(html, |m| m.as_str());

    let text = html_to_text(region);
    if !text.trim().is_empty() {
        return text;
    }

    PARAGRAPH_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| html_to_text(m.as_str()))
        .filter(|p| p.len() > MIN_PARAGRAPH_CHARS)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Strip tags, drop script/style/head content, decode basic entities, and
/// collapse whitespace. Deliberately lightweight; a full readability crate
/// would be overkill for source material that gets summarized anyway.
fn html_to_text(html: &str) -> String {
    #[allow(clippy::expect_used)]
    static SKIP_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<(script|style|head|nav|noscript)\b.*?</(script|style|head|nav|noscript)>")
            .expect("skip block pattern compiles")
    });
    #[allow(clippy::expect_used)]
    static BLOCK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)</?(p|div|br|h[1-6]|li|tr|section|blockquote)\b[^>]*>")
            .expect("block tag pattern compiles")
    });
    #[allow(clippy::expect_used)]
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern compiles"));

    let without_skipped = SKIP_BLOCK_RE.replace_all(html, "");
    let with_breaks = BLOCK_TAG_RE.replace_all(&without_skipped, "\n");
    let without_tags = TAG_RE.replace_all(&with_breaks, "");
    let decoded = decode_entities(&without_tags);

    decoded
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

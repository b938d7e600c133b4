use std::collections::HashSet;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::Result;

/// Extracts email-like tokens from a page's visible text. The pattern is
/// intentionally permissive; filename-shaped false positives are a known
/// limitation.
pub struct EmailExtractor {
    client: Client,
    email_regex: Regex,
    trailing_regex: Regex,
    excluded_keywords: Vec<String>,
}

impl EmailExtractor {
    pub fn new(
        user_agent: &str,
        timeout_seconds: u64,
        excluded_keywords: Vec<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            email_regex: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap(),
            trailing_regex: Regex::new(r"[^A-Za-z0-9._%+-]+$").unwrap(),
            excluded_keywords,
        })
    }

    /// Fetch failure is an `Err`; the caller downgrades it to an empty set.
    pub async fn extract(&self, page: &Url) -> Result<HashSet<String>> {
        let response = self
            .client
            .get(page.clone())
            .send()
            .await?
            .error_for_status()?;
        let html = response.text().await?;

        let emails = self.extract_from_html(&html);
        debug!("Extracted {} emails from {}", emails.len(), page);
        Ok(emails)
    }

    fn extract_from_html(&self, html: &str) -> HashSet<String> {
        let document = Html::parse_document(html);
        let body_selector = Selector::parse("body").unwrap();

        let text = document
            .select(&body_selector)
            .next()
            .map(|body| body.text().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();

        self.extract_from_text(&text)
    }

    fn extract_from_text(&self, text: &str) -> HashSet<String> {
        self.email_regex
            .find_iter(text)
            .map(|token| self.trailing_regex.replace(token.as_str(), "").into_owned())
            .filter(|email| {
                !self
                    .excluded_keywords
                    .iter()
                    .any(|keyword| email.contains(keyword))
            })
            .collect()
    }
}

use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::Result;

const CONTACT_KEYWORDS: [&str; 2] = ["contact", "support"];

/// Finds a website's contact page by scanning its landing page anchors.
pub struct ContactLocator {
    client: Client,
}

impl ContactLocator {
    pub fn new(user_agent: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self { client })
    }

    /// Fetches `http://<host>/` and returns the first anchor in document
    /// order whose href looks contact-related, resolved to an absolute URL.
    /// `Ok(None)` means the page had no such anchor; a fetch failure is an
    /// `Err` the caller downgrades to "no contact page".
    pub async fn locate(&self, host: &str) -> Result<Option<Url>> {
        let base = format!("http://{}/", host);
        let response = self.client.get(&base).send().await?.error_for_status()?;
        let html = response.text().await?;

        let contact_page = find_contact_href(&html, &base);
        debug!("Contact page for {}: {:?}", host, contact_page);
        Ok(contact_page)
    }
}

fn find_contact_href(html: &str, base: &str) -> Option<Url> {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").unwrap();
    let base_url = Url::parse(base).ok()?;

    document
        .select(&anchor_selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .find(|href| {
            let href = href.to_lowercase();
            CONTACT_KEYWORDS.iter().any(|keyword| href.contains(keyword))
        })
        .and_then(|href| base_url.join(href).ok())
}

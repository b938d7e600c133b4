use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;
use crate::models::Country;
use crate::pipeline::{ContactLocator, EmailExtractor};
use crate::whois::CountryResolver;

/// Outcome of processing one website. An empty email list means the website
/// gets a single `Nil` row: "contact page with no emails" and "no contact
/// page at all" are deliberately indistinguishable here.
#[derive(Debug)]
pub struct WebsiteReport {
    pub website: String,
    pub country: Country,
    pub emails: Vec<String>,
}

/// Seam the dispatcher fans out over; stubbed in tests.
#[async_trait]
pub trait WebsiteProcessor: Send + Sync {
    async fn process(&self, website: &str) -> WebsiteReport;
}

/// Composes contact-page location, email extraction and country resolution
/// for one website. Every underlying failure resolves to an absent/sentinel
/// value, so this task never raises past its boundary.
pub struct WebsitePipeline {
    contact: ContactLocator,
    emails: EmailExtractor,
    resolver: Arc<dyn CountryResolver>,
}

impl WebsitePipeline {
    pub fn new(
        user_agent: &str,
        http_timeout_seconds: u64,
        excluded_email_keywords: Vec<String>,
        resolver: Arc<dyn CountryResolver>,
    ) -> Result<Self> {
        Ok(Self {
            contact: ContactLocator::new(user_agent, http_timeout_seconds)?,
            emails: EmailExtractor::new(user_agent, http_timeout_seconds, excluded_email_keywords)?,
            resolver,
        })
    }
}

#[async_trait]
impl WebsiteProcessor for WebsitePipeline {
    async fn process(&self, website: &str) -> WebsiteReport {
        let contact_page = match self.contact.locate(website).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Root page fetch failed for {}: {}", website, e);
                None
            }
        };

        // Country is attempted regardless of the contact-page outcome.
        let country = self.resolver.registration_country(website).await;

        let emails = match &contact_page {
            Some(page) => match self.emails.extract(page).await {
                Ok(emails) => emails,
                Err(e) => {
                    warn!("Contact page fetch failed for {}: {}", page, e);
                    Default::default()
                }
            },
            None => Default::default(),
        };

        // Stable emission order for an otherwise unordered set.
        let mut emails: Vec<String> = emails.into_iter().collect();
        emails.sort();

        WebsiteReport {
            website: website.to_string(),
            country,
            emails,
        }
    }
}

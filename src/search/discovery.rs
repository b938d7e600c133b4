use std::collections::HashSet;
use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

use crate::config::SearchConfig;
use crate::error::Result;

/// Scrapes search-engine result pages for a keyword and collects candidate
/// website hostnames.
pub struct SearchDiscovery {
    client: Client,
    config: SearchConfig,
}

impl SearchDiscovery {
    pub fn new(config: SearchConfig, user_agent: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    /// Runs one discovery pass for a keyword. Any HTTP failure aborts the
    /// pass; the caller decides how to surface it and proceeds with an empty
    /// set.
    pub async fn discover(&self, keyword: &str, num_results: u32) -> Result<HashSet<String>> {
        let mut websites = HashSet::new();

        for page in 0..self.config.max_pages {
            let start = page * self.config.page_size;
            debug!("Fetching result page {} for '{}'", page + 1, keyword);

            let response = self
                .client
                .get(&self.config.base_url)
                .query(&[
                    ("q", keyword.to_string()),
                    ("num", num_results.to_string()),
                    ("start", start.to_string()),
                ])
                .send()
                .await?
                .error_for_status()?;

            let html = response.text().await?;
            for host in self.extract_hosts(&html) {
                websites.insert(host);
            }

            if websites.len() >= num_results as usize {
                break;
            }

            if page + 1 < self.config.max_pages && self.config.page_delay_jitter_ms > 0 {
                let jitter = fastrand::u64(0..=self.config.page_delay_jitter_ms);
                tokio::time::sleep(Duration::from_millis(jitter)).await;
            }
        }

        info!(
            "Discovery for '{}' yielded {} unique websites",
            keyword,
            websites.len()
        );
        Ok(websites)
    }

    /// Pulls hostnames out of redirect-style result anchors, applying the
    /// denylist and TLD-suffix filters.
    fn extract_hosts(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let anchor_selector = Selector::parse("a").unwrap();

        document
            .select(&anchor_selector)
            .filter_map(|anchor| anchor.value().attr("href"))
            .filter_map(extract_redirect_target)
            .filter_map(|target| host_of(&target))
            .filter(|host| self.is_allowed(host))
            .collect()
    }

    fn is_allowed(&self, host: &str) -> bool {
        !host.ends_with(&self.config.excluded_tld_suffix)
            && !self
                .config
                .denylist
                .iter()
                .any(|denied| host.contains(denied))
    }
}

/// Result anchors wrap the destination in a `url?q=<dest>&...` redirect.
/// Anchors without the marker are skipped.
fn extract_redirect_target(href: &str) -> Option<String> {
    let (_, rest) = href.split_once("url?q=")?;
    let target = rest.split('&').next().unwrap_or(rest);
    (!target.is_empty()).then(|| target.to_string())
}

/// Host component of a URL, keeping an explicit port when present so a
/// scheme-less refetch reaches the same endpoint.
fn host_of(target: &str) -> Option<String> {
    let url = Url::parse(target).ok()?;
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn discovery(denylist: &[&str]) -> SearchDiscovery {
        let config = SearchConfig {
            base_url: "http://localhost/search".to_string(),
            max_pages: 1,
            page_size: 10,
            denylist: denylist.iter().map(|s| s.to_string()).collect(),
            excluded_tld_suffix: ".in".to_string(),
            page_delay_jitter_ms: 0,
        };
        SearchDiscovery::new(config, "Mozilla/5.0", 5).unwrap()
    }

    #[test]
    fn extracts_redirect_targets() {
        assert_eq!(
            extract_redirect_target("/url?q=https://example.com/page&sa=U"),
            Some("https://example.com/page".to_string())
        );
        assert_eq!(extract_redirect_target("/maps?hl=en"), None);
        assert_eq!(extract_redirect_target("/url?q="), None);
    }

    #[test]
    fn keeps_port_in_host() {
        assert_eq!(
            host_of("http://127.0.0.1:8080/x"),
            Some("127.0.0.1:8080".to_string())
        );
        assert_eq!(host_of("https://example.com/"), Some("example.com".to_string()));
        assert_eq!(host_of("not a url"), None);
    }

    #[test]
    fn denylisted_hosts_are_excluded() {
        let discovery = discovery(&["wikipedia", "quora"]);
        let html = r#"
            <a href="/url?q=https://en.wikipedia.org/wiki/X&sa=U">w</a>
            <a href="/url?q=https://www.quora.com/What&sa=U">q</a>
            <a href="/url?q=https://acme-widgets.com/&sa=U">a</a>
        "#;
        let hosts = discovery.extract_hosts(html);
        assert_eq!(hosts, vec!["acme-widgets.com".to_string()]);
    }

    #[test]
    fn excluded_tld_suffix_is_filtered() {
        let discovery = discovery(&[]);
        let html = r#"
            <a href="/url?q=https://factory.co.in/&sa=U">in</a>
            <a href="/url?q=https://factory.example.com/&sa=U">com</a>
        "#;
        let hosts = discovery.extract_hosts(html);
        assert_eq!(hosts, vec!["factory.example.com".to_string()]);
    }

    #[test]
    fn anchors_without_redirect_marker_are_skipped() {
        let discovery = discovery(&[]);
        let html = r#"<a href="/preferences">settings</a><a>bare</a>"#;
        assert!(discovery.extract_hosts(html).is_empty());
    }

    #[tokio::test]
    async fn repeated_hosts_collapse_into_a_set() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(200).body(
                    r#"<a href="/url?q=http://acme.com/a&sa=U">1</a>
                       <a href="/url?q=http://acme.com/b&sa=U">2</a>"#,
                );
            })
            .await;

        let config = SearchConfig {
            base_url: server.url("/search"),
            max_pages: 1,
            page_size: 10,
            denylist: vec![],
            excluded_tld_suffix: ".in".to_string(),
            page_delay_jitter_ms: 0,
        };
        let discovery = SearchDiscovery::new(config, "Mozilla/5.0", 5).unwrap();

        let websites = discovery.discover("acme", 10).await.unwrap();
        assert_eq!(websites.len(), 1);
        assert!(websites.contains("acme.com"));
    }

    #[tokio::test]
    async fn http_failure_aborts_the_pass() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(429);
            })
            .await;

        let config = SearchConfig {
            base_url: server.url("/search"),
            max_pages: 3,
            page_size: 10,
            denylist: vec![],
            excluded_tld_suffix: ".in".to_string(),
            page_delay_jitter_ms: 0,
        };
        let discovery = SearchDiscovery::new(config, "Mozilla/5.0", 5).unwrap();

        assert!(discovery.discover("acme", 10).await.is_err());
    }
}

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::config::WhoisConfig;
use crate::error::{HunterError, Result};
use crate::models::Country;

/// Seam for registration-country lookups, so the pipeline can be driven
/// against a stub in tests. Never fails outward: every outcome is one of the
/// three `Country` states.
#[async_trait]
pub trait CountryResolver: Send + Sync {
    async fn registration_country(&self, domain: &str) -> Country;
}

/// Plain WHOIS client: one query per lookup on TCP port 43, optionally
/// following a single `refer:` redirect to the registry's own server.
pub struct WhoisClient {
    config: WhoisConfig,
}

impl WhoisClient {
    pub fn new(config: WhoisConfig) -> Self {
        Self { config }
    }

    async fn query_server(&self, server: &str, domain: &str) -> Result<String> {
        let timeout = Duration::from_secs(self.config.timeout_seconds);
        let exchange = async {
            let mut stream = TcpStream::connect(server).await?;
            stream.write_all(format!("{}\r\n", domain).as_bytes()).await?;

            let mut raw = Vec::new();
            stream.read_to_end(&mut raw).await?;
            // Registries occasionally answer in legacy encodings.
            Ok::<_, HunterError>(String::from_utf8_lossy(&raw).into_owned())
        };

        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| HunterError::Timeout(timeout))?
    }

    async fn lookup(&self, domain: &str) -> Result<String> {
        let mut response = self.query_server(&self.config.server, domain).await?;

        if self.config.follow_referral {
            if let Some(referral) = parse_field(&response, "refer") {
                let server = if referral.contains(':') {
                    referral
                } else {
                    format!("{}:43", referral)
                };
                debug!("Following WHOIS referral for {} to {}", domain, server);
                match self.query_server(&server, domain).await {
                    Ok(referred) => response = referred,
                    // Keep the first answer; it may still carry a country.
                    Err(e) => warn!("WHOIS referral to {} failed: {}", server, e),
                }
            }
        }

        Ok(response)
    }
}

#[async_trait]
impl CountryResolver for WhoisClient {
    async fn registration_country(&self, domain: &str) -> Country {
        match self.lookup(domain).await {
            Ok(response) => match parse_country(&response) {
                Some(code) => Country::Known(code),
                None => Country::Unavailable,
            },
            Err(e) => {
                warn!("WHOIS lookup failed for {}: {}", domain, e);
                Country::Error
            }
        }
    }
}

/// First non-empty `key: value` line matching `field`, case-insensitively.
fn parse_field(response: &str, field: &str) -> Option<String> {
    response.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if !key.trim().eq_ignore_ascii_case(field) {
            return None;
        }
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn parse_country(response: &str) -> Option<String> {
    parse_field(response, "registrant country").or_else(|| parse_field(response, "country"))
}

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub search: SearchConfig,
    pub extraction: ExtractionConfig,
    pub whois: WhoisConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Search endpoint queried with `q`, `num` and `start` parameters.
    pub base_url: String,
    pub max_pages: u32,
    pub page_size: u32,
    /// Hostnames containing any of these substrings are discarded.
    pub denylist: Vec<String>,
    /// Hostnames ending with this suffix are discarded (e.g. ".in").
    pub excluded_tld_suffix: String,
    /// Upper bound for the random delay between result-page fetches (ms).
    pub page_delay_jitter_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    /// Extracted emails containing any of these substrings are discarded.
    pub excluded_keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhoisConfig {
    /// `host:port` of the WHOIS server queried first.
    pub server: String,
    pub timeout_seconds: u64,
    /// Follow a `refer:` line to the registry's own WHOIS server.
    pub follow_referral: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    pub workers: usize,
    pub http_timeout_seconds: u64,
    pub user_agent: String,
    /// Rows registered in this country are dropped before aggregation.
    #[serde(default)]
    pub excluded_country: Option<String>,
    /// Drop rows for websites that yielded no emails.
    #[serde(default)]
    pub drop_nil_rows: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub directory: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig {
                base_url: "https://www.google.com/search".to_string(),
                max_pages: 10,
                page_size: 10,
                denylist: [
                    "go4worldbusiness",
                    "google.com",
                    "maps",
                    "quora",
                    "tradeindia",
                    "exportersindia",
                    "alibaba",
                    "reddit",
                    "amazon",
                    "wikipedia",
                    "youtube",
                    "thehindubusinessline",
                    "pinterest",
                    "indiamart",
                    "independent",
                    "packagingnews",
                    "justdial",
                    "ec21",
                    "hindustantimes",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                excluded_tld_suffix: ".in".to_string(),
                page_delay_jitter_ms: 500,
            },
            extraction: ExtractionConfig {
                excluded_keywords: [
                    "careers",
                    "donations",
                    "press",
                    "media",
                    "feedback",
                    "communications",
                    "verifications",
                    "editor",
                    "research",
                    "india",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            },
            whois: WhoisConfig {
                server: "whois.iana.org:43".to_string(),
                timeout_seconds: 10,
                follow_referral: true,
            },
            pipeline: PipelineConfig {
                workers: 5,
                http_timeout_seconds: 15,
                user_agent: "Mozilla/5.0".to_string(),
                excluded_country: None,
                drop_nil_rows: false,
            },
            output: OutputConfig {
                directory: "out".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

pub async fn load_config(path: &str) -> Config {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => match serde_yaml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to parse {}: {}. Using defaults.", path, e);
                Config::default()
            }
        },
        Err(e) => {
            warn!("Failed to load {}: {}. Using defaults.", path, e);
            Config::default()
        }
    }
}

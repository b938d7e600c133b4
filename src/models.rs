use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::export::TableExporter;
use crate::pipeline::{Dispatcher, WebsitePipeline};
use crate::search::SearchDiscovery;
use crate::whois::WhoisClient;

/// Errors crossing the CLI boundary, where dialoguer and fs errors mix in.
pub type CliResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Registration country of a website. The three states must stay
/// distinguishable in the output table: a lookup that failed is not the same
/// as one that succeeded without a country field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Country {
    Known(String),
    Unavailable,
    Error,
}

impl Country {
    pub fn label(&self) -> &str {
        match self {
            Country::Known(code) => code,
            Country::Unavailable => "NA",
            Country::Error => "Error",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Country {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Email column of a result row. `Nil` marks a website that yielded no
/// emails (no contact page, or a contact page without any); `Error` marks a
/// website whose task failed outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailField {
    Address(String),
    Nil,
    Error,
}

impl EmailField {
    pub fn label(&self) -> &str {
        match self {
            EmailField::Address(email) => email,
            EmailField::Nil => "Nil",
            EmailField::Error => "Error",
        }
    }
}

impl fmt::Display for EmailField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for EmailField {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub website: String,
    pub country: Country,
    pub email: EmailField,
}

/// Ordered row collection deduplicated by email value. The first occurrence
/// of an address wins; `Nil` and `Error` rows are never considered
/// duplicates of each other.
#[derive(Debug, Default)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
    seen_emails: HashSet<String>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row unless its email address was already recorded.
    /// Returns whether the row was kept.
    pub fn push(&mut self, row: ResultRow) -> bool {
        if let EmailField::Address(email) = &row.email {
            if !self.seen_emails.insert(email.clone()) {
                return false;
            }
        }
        self.rows.push(row);
        true
    }

    /// Appends rows in order, returning how many survived deduplication.
    pub fn extend(&mut self, rows: impl IntoIterator<Item = ResultRow>) -> usize {
        rows.into_iter().filter(|row| self.push(row.clone())).count()
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.seen_emails.clear();
    }
}

pub struct CliApp {
    pub config: Config,
    pub discovery: SearchDiscovery,
    pub dispatcher: Dispatcher,
    pub exporter: TableExporter,
    pub session: Mutex<ResultTable>,
}

impl CliApp {
    pub fn new(config: Config) -> CliResult<Self> {
        let discovery = SearchDiscovery::new(
            config.search.clone(),
            &config.pipeline.user_agent,
            config.pipeline.http_timeout_seconds,
        )?;

        let resolver = Arc::new(WhoisClient::new(config.whois.clone()));
        let pipeline = WebsitePipeline::new(
            &config.pipeline.user_agent,
            config.pipeline.http_timeout_seconds,
            config.extraction.excluded_keywords.clone(),
            resolver,
        )?;
        let dispatcher = Dispatcher::new(Arc::new(pipeline), config.pipeline.clone());
        let exporter = TableExporter::new(&config.output.directory);

        Ok(Self {
            config,
            discovery,
            dispatcher,
            exporter,
            session: Mutex::new(ResultTable::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(website: &str, email: EmailField) -> ResultRow {
        ResultRow {
            website: website.to_string(),
            country: Country::Known("US".to_string()),
            email,
        }
    }

    #[test]
    fn first_email_occurrence_wins() {
        let mut table = ResultTable::new();
        assert!(table.push(row("a.com", EmailField::Address("hi@a.com".into()))));
        assert!(!table.push(row("b.com", EmailField::Address("hi@a.com".into()))));
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].website, "a.com");
    }

    #[test]
    fn sentinel_rows_are_never_deduplicated() {
        let mut table = ResultTable::new();
        assert!(table.push(row("a.com", EmailField::Nil)));
        assert!(table.push(row("b.com", EmailField::Nil)));
        assert!(table.push(row("c.com", EmailField::Error)));
        assert!(table.push(row("d.com", EmailField::Error)));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn country_sentinels_stay_distinguishable() {
        assert_ne!(Country::Unavailable, Country::Error);
        assert_eq!(Country::Unavailable.label(), "NA");
        assert_eq!(Country::Error.label(), "Error");
    }
}

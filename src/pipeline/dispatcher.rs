use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::models::{Country, EmailField, ResultRow};
use crate::pipeline::{WebsiteProcessor, WebsiteReport};

/// `(completed, total, website)`, invoked once per finished task, in
/// completion order, from the coordinating task only.
pub type ProgressCallback = Box<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Fans the per-website pipeline out over a bounded worker pool and folds
/// completions into result rows. One website's failure never aborts the
/// batch: a task that escapes its contract becomes a single error row.
pub struct Dispatcher {
    processor: Arc<dyn WebsiteProcessor>,
    workers: usize,
    excluded_country: Option<String>,
    drop_nil_rows: bool,
}

impl Dispatcher {
    pub fn new(processor: Arc<dyn WebsiteProcessor>, config: PipelineConfig) -> Self {
        Self {
            processor,
            workers: config.workers.max(1),
            excluded_country: config.excluded_country,
            drop_nil_rows: config.drop_nil_rows,
        }
    }

    pub async fn dispatch(
        &self,
        websites: &HashSet<String>,
        progress: Option<ProgressCallback>,
    ) -> Vec<ResultRow> {
        let total = websites.len();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();
        let mut task_websites: HashMap<tokio::task::Id, String> = HashMap::new();

        for website in websites {
            let processor = self.processor.clone();
            let semaphore = semaphore.clone();
            let website = website.clone();
            let handle = tasks.spawn({
                let website = website.clone();
                async move {
                    let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                    processor.process(&website).await
                }
            });
            task_websites.insert(handle.id(), website);
        }

        let mut rows = Vec::new();
        let mut completed = 0usize;

        // Completion order, not submission order.
        while let Some(result) = tasks.join_next_with_id().await {
            completed += 1;
            match result {
                Ok((id, report)) => {
                    let website = task_websites
                        .remove(&id)
                        .unwrap_or_else(|| report.website.clone());
                    if let Some(callback) = &progress {
                        callback(completed, total, &website);
                    }
                    rows.extend(self.rows_for(report));
                }
                Err(join_error) => {
                    let website = task_websites.remove(&join_error.id()).unwrap_or_default();
                    error!("Website task for {} failed: {}", website, join_error);
                    if let Some(callback) = &progress {
                        callback(completed, total, &website);
                    }
                    rows.push(ResultRow {
                        website,
                        country: Country::Error,
                        email: EmailField::Error,
                    });
                }
            }
        }

        info!("Processed {}/{} websites, {} rows", completed, total, rows.len());
        rows
    }

    /// Expands a report into rows, applying the optional business filter.
    /// The filter only ever touches well-formed reports; error rows from
    /// escaped tasks are always kept.
    fn rows_for(&self, report: WebsiteReport) -> Vec<ResultRow> {
        if let Some(excluded) = &self.excluded_country {
            if matches!(&report.country, Country::Known(code) if code == excluded) {
                return Vec::new();
            }
        }

        if report.emails.is_empty() {
            if self.drop_nil_rows {
                return Vec::new();
            }
            return vec![ResultRow {
                website: report.website,
                country: report.country,
                email: EmailField::Nil,
            }];
        }

        report
            .emails
            .into_iter()
            .map(|email| ResultRow {
                website: report.website.clone(),
                country: report.country.clone(),
                email: EmailField::Address(email),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Resolves everything to a fixed country; panics for hosts named in
    /// `panic_on` to exercise the defensive error-row path.
    struct StubProcessor {
        country: Country,
        emails: HashMap<String, Vec<String>>,
        panic_on: Option<String>,
    }

    #[async_trait]
    impl WebsiteProcessor for StubProcessor {
        async fn process(&self, website: &str) -> WebsiteReport {
            if self.panic_on.as_deref() == Some(website) {
                panic!("deliberate task failure");
            }
            WebsiteReport {
                website: website.to_string(),
                country: self.country.clone(),
                emails: self.emails.get(website).cloned().unwrap_or_default(),
            }
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            workers: 5,
            http_timeout_seconds: 5,
            user_agent: "Mozilla/5.0".to_string(),
            excluded_country: None,
            drop_nil_rows: false,
        }
    }

    fn websites(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn every_website_yields_rows_even_when_one_panics() {
        let processor = StubProcessor {
            country: Country::Known("US".to_string()),
            emails: HashMap::from([("a.com".to_string(), vec!["x@a.com".to_string()])]),
            panic_on: Some("bad.com".to_string()),
        };
        let dispatcher = Dispatcher::new(Arc::new(processor), config());

        let rows = dispatcher
            .dispatch(&websites(&["a.com", "b.com", "bad.com"]), None)
            .await;

        assert_eq!(rows.len(), 3);
        let error_row = rows.iter().find(|r| r.website == "bad.com").unwrap();
        assert_eq!(error_row.country, Country::Error);
        assert_eq!(error_row.email, EmailField::Error);
        let nil_row = rows.iter().find(|r| r.website == "b.com").unwrap();
        assert_eq!(nil_row.email, EmailField::Nil);
    }

    #[tokio::test]
    async fn progress_reports_every_completion() {
        let processor = StubProcessor {
            country: Country::Unavailable,
            emails: HashMap::new(),
            panic_on: None,
        };
        let dispatcher = Dispatcher::new(Arc::new(processor), config());

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let progress: ProgressCallback = Box::new(move |completed, total, _website| {
            assert!(completed <= total);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher
            .dispatch(&websites(&["a.com", "b.com", "c.com", "d.com"]), Some(progress))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn excluded_country_rows_are_dropped() {
        let processor = StubProcessor {
            country: Country::Known("CN".to_string()),
            emails: HashMap::from([("a.com".to_string(), vec!["x@a.com".to_string()])]),
            panic_on: None,
        };
        let mut config = config();
        config.excluded_country = Some("CN".to_string());
        let dispatcher = Dispatcher::new(Arc::new(processor), config);

        let rows = dispatcher.dispatch(&websites(&["a.com", "b.com"]), None).await;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn nil_rows_can_be_dropped_by_policy() {
        let processor = StubProcessor {
            country: Country::Known("US".to_string()),
            emails: HashMap::from([("a.com".to_string(), vec!["x@a.com".to_string()])]),
            panic_on: None,
        };
        let mut config = config();
        config.drop_nil_rows = true;
        let dispatcher = Dispatcher::new(Arc::new(processor), config);

        let rows = dispatcher.dispatch(&websites(&["a.com", "empty.com"]), None).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].website, "a.com");
    }

    #[tokio::test]
    async fn multiple_emails_expand_into_multiple_rows() {
        let processor = StubProcessor {
            country: Country::Known("US".to_string()),
            emails: HashMap::from([(
                "a.com".to_string(),
                vec!["ops@a.com".to_string(), "sales@a.com".to_string()],
            )]),
            panic_on: None,
        };
        let dispatcher = Dispatcher::new(Arc::new(processor), config());

        let rows = dispatcher.dispatch(&websites(&["a.com"]), None).await;
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.website == "a.com"));
    }
}

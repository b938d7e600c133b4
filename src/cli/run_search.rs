use std::collections::HashSet;

use dialoguer::{theme::ColorfulTheme, Input};
use tracing::warn;

use crate::models::{CliApp, CliResult, EmailField};
use crate::pipeline::ProgressCallback;

impl CliApp {
    pub async fn run_search(&self) -> CliResult<()> {
        println!("\n🔍 Keyword Email Search");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        let keywords = self.collect_keywords()?;
        if keywords.is_empty() {
            println!("❌ No keywords entered");
            return Ok(());
        }

        let num_results: u32 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Number of search results per keyword")
            .default(10)
            .interact_text()?;

        for keyword in &keywords {
            println!("\n⏳ Searching for '{}'...", keyword);

            let websites = match self.discovery.discover(keyword, num_results).await {
                Ok(websites) => websites,
                Err(e) => {
                    warn!("Discovery failed for '{}': {}", keyword, e);
                    println!("⚠️  Error retrieving search results: {}", e);
                    HashSet::new()
                }
            };

            if websites.is_empty() {
                println!("❌ No websites found for '{}'", keyword);
                continue;
            }

            println!(
                "📊 Number of unique websites found for '{}': {}",
                keyword,
                websites.len()
            );

            let progress: ProgressCallback = Box::new(|completed, total, website| {
                println!("  [{}/{}] 🕷️  {}", completed, total, website);
            });
            let rows = self.dispatcher.dispatch(&websites, Some(progress)).await;

            let emails_found = rows
                .iter()
                .filter(|row| matches!(row.email, EmailField::Address(_)))
                .count();

            let mut session = self.session.lock().await;
            let kept = session.extend(rows);
            println!(
                "✅ '{}': {} emails found, {} new rows after deduplication",
                keyword, emails_found, kept
            );
        }

        self.show_results().await
    }

    fn collect_keywords(&self) -> CliResult<Vec<String>> {
        println!("Enter search keywords, one per line (empty line to finish):");

        let mut keywords = Vec::new();
        loop {
            let keyword: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Keyword")
                .allow_empty(true)
                .interact_text()?;

            let keyword = keyword.trim().to_string();
            if keyword.is_empty() {
                break;
            }
            keywords.push(keyword);
        }

        Ok(keywords)
    }
}

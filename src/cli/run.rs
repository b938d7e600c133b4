use dialoguer::{theme::ColorfulTheme, Select};
use tracing::error;

use crate::cli::MenuAction;
use crate::models::{CliApp, CliResult};

impl CliApp {
    pub async fn run(&self) -> CliResult<()> {
        println!("\n🚀 Welcome to Email Hunter!");
        println!("═══════════════════════════════════════");

        loop {
            let actions = vec![
                MenuAction::RunSearch,
                MenuAction::ShowResults,
                MenuAction::ExportCsv,
                MenuAction::ExportTxt,
                MenuAction::ClearResults,
                MenuAction::Exit,
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("\nSelect an action")
                .default(0)
                .items(&actions)
                .interact()?;

            match &actions[selection] {
                MenuAction::RunSearch => {
                    if let Err(e) = self.run_search().await {
                        error!("Search run failed: {}", e);
                    }
                }
                MenuAction::ShowResults => {
                    if let Err(e) = self.show_results().await {
                        error!("Failed to show results: {}", e);
                    }
                }
                MenuAction::ExportCsv => {
                    if let Err(e) = self.run_export_csv().await {
                        error!("CSV export failed: {}", e);
                    }
                }
                MenuAction::ExportTxt => {
                    if let Err(e) = self.run_export_txt().await {
                        error!("TXT export failed: {}", e);
                    }
                }
                MenuAction::ClearResults => {
                    self.session.lock().await.clear();
                    println!("🗑️  Session results cleared");
                }
                MenuAction::Exit => {
                    println!("\n👋 Thanks for using Email Hunter!");
                    break;
                }
            }
        }

        Ok(())
    }
}

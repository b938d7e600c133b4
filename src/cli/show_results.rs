use crate::export::render_table;
use crate::models::{CliApp, CliResult};

impl CliApp {
    pub async fn show_results(&self) -> CliResult<()> {
        let session = self.session.lock().await;

        println!("\n📋 Session Results");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if session.is_empty() {
            println!("No results yet");
            return Ok(());
        }

        print!("{}", render_table(session.rows()));
        println!("\n📊 {} rows in session", session.len());
        Ok(())
    }
}

use crate::models::{CliApp, CliResult};

impl CliApp {
    pub async fn run_export_csv(&self) -> CliResult<()> {
        let session = self.session.lock().await;
        if session.is_empty() {
            println!("❌ Nothing to export, run a search first");
            return Ok(());
        }

        let path = self.exporter.export_csv(session.rows()).await?;
        println!("✅ Exported {} rows to {}", session.len(), path.display());
        Ok(())
    }

    pub async fn run_export_txt(&self) -> CliResult<()> {
        let session = self.session.lock().await;
        if session.is_empty() {
            println!("❌ Nothing to export, run a search first");
            return Ok(());
        }

        let path = self.exporter.export_txt(session.rows()).await?;
        println!("✅ Exported {} rows to {}", session.len(), path.display());
        Ok(())
    }
}

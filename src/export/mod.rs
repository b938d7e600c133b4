use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::Result;
use crate::models::ResultRow;

const HEADERS: [&str; 3] = ["Website", "Country", "Email"];

/// Writes the session table to timestamped CSV / TXT files under the output
/// directory.
pub struct TableExporter {
    directory: PathBuf,
}

impl TableExporter {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub async fn export_csv(&self, rows: &[ResultRow]) -> Result<PathBuf> {
        let path = self.output_path("csv").await?;

        let mut content = String::from("Website,Country,Email\n");
        for row in rows {
            content.push_str(&format!(
                "{},{},{}\n",
                escape_csv(&row.website),
                escape_csv(row.country.label()),
                escape_csv(row.email.label()),
            ));
        }

        tokio::fs::write(&path, content).await?;
        Ok(path)
    }

    pub async fn export_txt(&self, rows: &[ResultRow]) -> Result<PathBuf> {
        let path = self.output_path("txt").await?;
        tokio::fs::write(&path, render_table(rows)).await?;
        Ok(path)
    }

    async fn output_path(&self, extension: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.directory).await?;
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        Ok(self
            .directory
            .join(format!("website_info_{}.{}", timestamp, extension)))
    }
}

fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Fixed-width table with a serial index, shared by the TXT export and the
/// on-screen results view.
pub fn render_table(rows: &[ResultRow]) -> String {
    let index_width = rows.len().to_string().len().max(1);
    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    for row in rows {
        widths[0] = widths[0].max(row.website.len());
        widths[1] = widths[1].max(row.country.label().len());
        widths[2] = widths[2].max(row.email.label().len());
    }

    let mut out = format!(
        "{:>index_width$}  {:<w0$}  {:<w1$}  {:<w2$}\n",
        "#",
        HEADERS[0],
        HEADERS[1],
        HEADERS[2],
        index_width = index_width,
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
    );
    for (serial, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:>index_width$}  {:<w0$}  {:<w1$}  {:<w2$}\n",
            serial + 1,
            row.website,
            row.country.label(),
            row.email.label(),
            index_width = index_width,
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Country, EmailField};

    fn rows() -> Vec<ResultRow> {
        vec![
            ResultRow {
                website: "acme.com".to_string(),
                country: Country::Known("US".to_string()),
                email: EmailField::Address("sales@acme.com".to_string()),
            },
            ResultRow {
                website: "empty.org".to_string(),
                country: Country::Unavailable,
                email: EmailField::Nil,
            },
        ]
    }

    #[test]
    fn csv_fields_with_commas_are_quoted() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn rendered_table_has_serial_index_and_sentinels() {
        let table = render_table(&rows());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Website"));
        assert!(lines[1].starts_with("1"));
        assert!(lines[2].contains("NA"));
        assert!(lines[2].contains("Nil"));
    }

    #[tokio::test]
    async fn csv_export_writes_header_and_rows() {
        let dir = tempfile::TempDir::new().unwrap();
        let exporter = TableExporter::new(dir.path());

        let path = exporter.export_csv(&rows()).await.unwrap();
        let content = tokio::fs::read_to_string(&path).await.unwrap();

        assert!(content.starts_with("Website,Country,Email\n"));
        assert!(content.contains("acme.com,US,sales@acme.com"));
        assert!(content.contains("empty.org,NA,Nil"));
    }
}

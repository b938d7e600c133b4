#[derive(Debug, Clone)]
pub enum MenuAction {
    RunSearch,
    ShowResults,
    ExportCsv,
    ExportTxt,
    ClearResults,
    Exit,
}

impl std::fmt::Display for MenuAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MenuAction::RunSearch => {
                write!(f, "🔍 Search keywords and harvest contact emails")
            }
            MenuAction::ShowResults => write!(f, "📊 Show session results"),
            MenuAction::ExportCsv => write!(f, "📤 Export results as CSV"),
            MenuAction::ExportTxt => write!(f, "📄 Export results as TXT"),
            MenuAction::ClearResults => write!(f, "🗑️  Clear session results"),
            MenuAction::Exit => write!(f, "🚪 Exit"),
        }
    }
}

pub mod cli;
pub mod run;
pub mod run_export;
pub mod run_search;
pub mod show_results;

pub use cli::MenuAction;

mod contact;
mod dispatcher;
mod emails;
mod website;

pub use contact::ContactLocator;
pub use dispatcher::{Dispatcher, ProgressCallback};
pub use emails::EmailExtractor;
pub use website::{WebsitePipeline, WebsiteProcessor, WebsiteReport};

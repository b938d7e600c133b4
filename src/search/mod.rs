mod discovery;

pub use discovery::SearchDiscovery;

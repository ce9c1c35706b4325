pub mod actions;
pub mod batch;
pub mod config;
pub mod dates;
pub mod history;
pub mod jurisdiction;
pub mod metadata;
pub mod output;
pub mod scraper;
pub mod sources;
pub mod sponsors;
pub mod types;
pub(crate) mod utils;
pub mod votes;

pub use batch::{BatchReport, BatchRunner, ManifestEntry};
pub use config::ScrapeConfig;
pub use jurisdiction::JurisdictionProfile;
pub use output::OutputStore;
pub use scraper::WebScraper;

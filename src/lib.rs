mod error;
mod text_manipulators;

pub mod browser;
pub mod config;
pub mod course_offering;
pub mod logging;
pub mod navigation;
pub mod offering_extractor;
pub mod output_writer;
pub mod scrape_orchestrator;

pub use browser::{BrowserConfig, ChromeBrowser, ScheduleBrowser};
pub use config::ScrapingConfig;
pub use course_offering::{CourseOffering, RawFragment, Semester};
pub use error::{Error, Result};
pub use logging::Verbosity;
pub use navigation::NavigationController;
pub use offering_extractor::OfferingExtractor;
pub use output_writer::OutputWriter;
pub use scrape_orchestrator::ScrapeOrchestrator;
pub use text_manipulators::normalize;

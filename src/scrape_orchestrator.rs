use std::path::PathBuf;

use chrono::Local;
use log::{info, warn};

use crate::{
    Error, Result,
    browser::ScheduleBrowser,
    course_offering::{CourseOffering, Semester},
    logging::Verbosity,
    navigation::NavigationController,
    offering_extractor::OfferingExtractor,
    output_writer::OutputWriter,
    text_manipulators::normalize,
};

/// Picks the discovered semesters named in `requested`, in discovery order.
/// Requested names are normalized the same way menu labels are. An empty
/// request selects every semester. Requested names with no matching term are
/// reported; if none match at all the run cannot proceed.
pub fn resolve_semesters(discovered: &[Semester], requested: &[String]) -> Result<Vec<Semester>> {
    let requested: Vec<String> = requested
        .iter()
        .map(|name| normalize(name))
        .filter(|name| !name.is_empty())
        .collect();
    if requested.is_empty() {
        return Ok(discovered.to_vec());
    }

    for name in &requested {
        if !discovered.iter().any(|semester| &semester.name == name) {
            warn!("Semester {name:?} is not offered by the schedule site");
        }
    }

    let matched: Vec<Semester> = discovered
        .iter()
        .filter(|semester| requested.contains(&semester.name))
        .cloned()
        .collect();
    if matched.is_empty() {
        return Err(Error::NoMatchingSemester {
            requested,
            available: discovered.iter().map(|s| s.name.clone()).collect(),
        });
    }
    Ok(matched)
}

/// Runs the whole pipeline: discover terms, collect listings, extract
/// records, write them out.
pub struct ScrapeOrchestrator<B: ScheduleBrowser> {
    navigator: NavigationController<B>,
    extractor: OfferingExtractor,
    writer: OutputWriter,
    verbosity: Verbosity,
}

impl<B: ScheduleBrowser> ScrapeOrchestrator<B> {
    pub fn new(
        navigator: NavigationController<B>,
        writer: OutputWriter,
        verbosity: Verbosity,
    ) -> Result<Self> {
        Ok(Self {
            navigator,
            extractor: OfferingExtractor::new()?,
            writer,
            verbosity,
        })
    }

    /// Returns the paths of the written files.
    pub fn run(self, requested_semesters: &[String], split_output: bool) -> Result<Vec<PathBuf>> {
        let start_time = Local::now();
        let Self {
            mut navigator,
            extractor,
            writer,
            verbosity,
        } = self;

        let discovered = navigator.discover_semesters()?;
        let semesters = resolve_semesters(&discovered, requested_semesters)?;
        info!(
            "Scraping {}",
            semesters
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let fragments = navigator.collect_fragments(&semesters)?;
        // No longer needed.
        navigator.finish();

        info!("Extracting content from HTML...");
        let total = fragments.len();
        let mut records: Vec<CourseOffering> = Vec::with_capacity(total);
        for (i, fragment) in fragments.iter().enumerate() {
            records.push(extractor.extract_fragment(fragment)?);
            if verbosity.shows_progress() && (i + 1) % 100 == 0 {
                info!("[{}/{}] fragments extracted", i + 1, total);
            }
        }

        info!("Writing to file...");
        let written = writer.write(&records, split_output, &semesters)?;

        let elapsed = Local::now() - start_time;
        info!(
            "Complete. {} offerings in {}.{:03}s",
            records.len(),
            elapsed.num_seconds(),
            elapsed.num_milliseconds() % 1000
        );
        Ok(written)
    }
}

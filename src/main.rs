use clap::Parser;
use log::info;
use schedule_scraper::{
    BrowserConfig, ChromeBrowser, NavigationController, OutputWriter, ScrapeOrchestrator,
    ScrapingConfig, Verbosity, logging::init_logger,
};

/// Scrapes the class schedule site into JSON.
#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// Comma-separated term names to scrape (default: every listed term)
    #[arg(long, value_delimiter = ',')]
    semester: Vec<String>,

    /// Suppress all progress and status output
    #[arg(short, long)]
    quiet: bool,

    /// Show the browser window instead of running headless
    #[arg(short = 's', long)]
    display: bool,

    /// Write one <SemesterName>.json per term instead of data.json
    #[arg(long)]
    separate_output: bool,
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    let verbosity = Verbosity::from_quiet_flag(opts.quiet);
    init_logger(verbosity);

    let config = ScrapingConfig::new()?;
    info!("Starting driver...");
    let browser = ChromeBrowser::launch(&BrowserConfig {
        headless: !opts.display,
        ..BrowserConfig::default()
    })?;
    let navigator = NavigationController::new(browser, &config, verbosity);
    let orchestrator = ScrapeOrchestrator::new(
        navigator,
        OutputWriter::new(config.output_dir.clone()),
        verbosity,
    )?;

    orchestrator.run(&opts.semester, opts.separate_output)?;
    Ok(())
}

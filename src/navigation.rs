use std::{fmt, time::Duration};

use log::{debug, info, warn};

use crate::{
    Result,
    browser::ScheduleBrowser,
    config::ScrapingConfig,
    course_offering::{RawFragment, Semester},
    logging::Verbosity,
    text_manipulators::normalize,
};

/// Element selectors of the schedule search page.
pub mod selectors {
    pub const TERM_SELECT: &str = "select#ctl00_ContentPlaceHolder1_TermDDL";
    pub const TERM_OPTIONS: &str = "select#ctl00_ContentPlaceHolder1_TermDDL > option";
    pub const SHOW_SUBJECTS_BUTTON: &str = "#ctl00_ContentPlaceHolder1_Button1";
    pub const SUBJECT_CODES_TABLE: &str = "table#ctl00_ContentPlaceHolder1_GetSubjectCodesGV";
    pub const SUBJECT_CODE_CELLS: &str =
        "table#ctl00_ContentPlaceHolder1_GetSubjectCodesGV > tbody > tr > td:nth-of-type(2)";
    pub const SUBJECT_INPUT: &str = "#ctl00_ContentPlaceHolder1_ClassSubject";
    pub const SEARCH_BUTTON: &str = "#ctl00_ContentPlaceHolder1_SearchButton";
    pub const RESULT_HEADER: &str = "span#ctl00_ContentPlaceHolder1_ResultSet_LBL > h4";
    pub const COURSE_LISTINGS: &str = "div#class_list > ol > li";

    /// The term menu option carrying the given id.
    pub fn term_option(id: &str) -> String {
        format!(r#"{TERM_OPTIONS}[value="{}"]"#, id.replace('"', "\\\""))
    }
}

/// `id` the result header carries when a search returned offerings.
pub const RESULTS_PRESENT_ID: &str = "test";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationState {
    Idle,
    Loaded,
    TermSelected { semester: String },
    SubjectsListed { semester: String, count: usize },
    Searching { semester: String, subject: String },
    Released,
}

impl fmt::Display for NavigationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationState::Idle => write!(f, "idle"),
            NavigationState::Loaded => write!(f, "loaded"),
            NavigationState::TermSelected { semester } => write!(f, "term selected ({semester})"),
            NavigationState::SubjectsListed { semester, count } => {
                write!(f, "{count} subjects listed ({semester})")
            }
            NavigationState::Searching { semester, subject } => {
                write!(f, "searching {subject} ({semester})")
            }
            NavigationState::Released => write!(f, "released"),
        }
    }
}

/// Walks the schedule site's single postback session through term selection,
/// subject listing and per-subject searches.
///
/// The controller owns the browser exclusively; the session is released by
/// [`NavigationController::finish`] or, failing that, when the controller is dropped.
pub struct NavigationController<B: ScheduleBrowser> {
    browser: B,
    schedule_url: String,
    timeout: Duration,
    verbosity: Verbosity,
    state: NavigationState,
}

impl<B: ScheduleBrowser> NavigationController<B> {
    pub fn new(browser: B, config: &ScrapingConfig, verbosity: Verbosity) -> Self {
        Self {
            browser,
            schedule_url: config.schedule_url.clone(),
            timeout: config.wait_timeout,
            verbosity,
            state: NavigationState::Idle,
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Terms in the order the site's menu lists them.
    pub fn discover_semesters(&mut self) -> Result<Vec<Semester>> {
        self.ensure_loaded()?;
        let names = self.browser.texts(selectors::TERM_OPTIONS)?;
        let ids = self
            .browser
            .attribute_values(selectors::TERM_OPTIONS, "value")?;

        let mut semesters = Vec::with_capacity(names.len());
        for (name, id) in names.iter().zip(ids) {
            let name = normalize(name);
            match id {
                Some(id) => semesters.push(Semester { name, id }),
                None => warn!("Term option {name:?} has no value, skipping it"),
            }
        }
        debug!("Discovered {} terms", semesters.len());
        Ok(semesters)
    }

    /// Collects the listing fragments of every given semester, sequentially
    /// and in site order.
    pub fn collect_fragments(&mut self, semesters: &[Semester]) -> Result<Vec<RawFragment>> {
        let mut fragments = vec![];
        for semester in semesters {
            self.select_term(semester)?;
            let subjects = self.list_subjects(semester)?;

            info!("Extracting courses for {}...", semester.name);
            let total = subjects.len();
            for (i, subject) in subjects.iter().enumerate() {
                if self.verbosity.shows_progress() {
                    info!("[{}/{}] {} {}", i + 1, total, semester.name, subject);
                }
                for html in self.search_subject(semester, subject)? {
                    fragments.push(RawFragment {
                        semester_name: semester.name.clone(),
                        html,
                    });
                }
            }
        }
        Ok(fragments)
    }

    /// Releases the browser session.
    pub fn finish(mut self) {
        self.release_session();
    }

    fn ensure_loaded(&mut self) -> Result<()> {
        if self.state != NavigationState::Idle {
            return Ok(());
        }
        info!("Loading website...");
        self.browser.open(&self.schedule_url)?;
        self.browser.wait_for(selectors::TERM_SELECT, self.timeout)?;
        self.transition(NavigationState::Loaded);
        Ok(())
    }

    fn select_term(&mut self, semester: &Semester) -> Result<()> {
        self.ensure_loaded()?;
        info!("Selecting term {}...", semester.name);
        self.browser
            .wait_for(&selectors::term_option(&semester.id), self.timeout)?;
        self.browser.mark_page()?;
        self.browser
            .select_option(selectors::TERM_SELECT, &semester.id)?;
        self.browser
            .wait_for_postback(selectors::SHOW_SUBJECTS_BUTTON, self.timeout)?;
        self.transition(NavigationState::TermSelected {
            semester: semester.name.clone(),
        });
        Ok(())
    }

    fn list_subjects(&mut self, semester: &Semester) -> Result<Vec<String>> {
        info!("Getting subjects...");
        self.browser.mark_page()?;
        self.browser.click(selectors::SHOW_SUBJECTS_BUTTON)?;
        self.browser
            .wait_for_postback(selectors::SUBJECT_CODES_TABLE, self.timeout)?;
        let subjects: Vec<String> = self
            .browser
            .texts(selectors::SUBJECT_CODE_CELLS)?
            .iter()
            .map(|text| normalize(text))
            .filter(|subject| !subject.is_empty())
            .collect();
        self.transition(NavigationState::SubjectsListed {
            semester: semester.name.clone(),
            count: subjects.len(),
        });
        Ok(subjects)
    }

    /// Listing markup for one subject; empty when the search found nothing.
    fn search_subject(&mut self, semester: &Semester, subject: &str) -> Result<Vec<String>> {
        self.transition(NavigationState::Searching {
            semester: semester.name.clone(),
            subject: subject.to_string(),
        });
        self.browser.fill(selectors::SUBJECT_INPUT, subject)?;
        // The old page still carries the previous subject's results until the postback lands.
        self.browser.mark_page()?;
        self.browser.click(selectors::SEARCH_BUTTON)?;
        self.browser
            .wait_for_postback(selectors::SEARCH_BUTTON, self.timeout)?;

        let header_id = self.browser.attribute(selectors::RESULT_HEADER, "id")?;
        if header_id.as_deref() != Some(RESULTS_PRESENT_ID) {
            debug!("No offerings for {subject} in {}", semester.name);
            return Ok(vec![]);
        }
        self.browser.inner_htmls(selectors::COURSE_LISTINGS)
    }

    fn transition(&mut self, next: NavigationState) {
        debug!("Navigation: {} -> {}", self.state, next);
        self.state = next;
    }

    fn release_session(&mut self) {
        if self.state == NavigationState::Released {
            return;
        }
        debug!("Releasing browser session while {}", self.state);
        self.browser.release();
        self.state = NavigationState::Released;
    }
}

impl<B: ScheduleBrowser> Drop for NavigationController<B> {
    fn drop(&mut self) {
        self.release_session();
    }
}

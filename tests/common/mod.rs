//! A scripted stand-in for the schedule site, driven through `ScheduleBrowser`.
#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc, time::Duration};

use schedule_scraper::{
    Error, Result, ScheduleBrowser, ScrapingConfig,
    navigation::{RESULTS_PRESENT_ID, selectors},
};

pub struct FakeTerm {
    pub name: &'static str,
    pub id: &'static str,
    /// Subject code and the listing markup a search for it returns.
    pub subjects: Vec<(&'static str, Vec<String>)>,
}

#[derive(Debug, Default)]
pub struct FakeLog {
    pub opened: Vec<String>,
    pub searches: Vec<String>,
    pub released: u32,
}

/// What one rendered document shows.
#[derive(Debug, Clone, Default)]
struct Page {
    term: Option<usize>,
    subjects_shown: bool,
    searched: Option<String>,
    /// Set by `mark_page`; a freshly rendered page never carries it.
    marked: bool,
}

/// Postback site: clicks and selections only queue the next page. The old
/// page keeps answering reads until a postback wait observes the new one.
pub struct FakeSchedule {
    terms: Vec<FakeTerm>,
    loaded: bool,
    page: Page,
    pending: Option<Page>,
    subject_input: String,
    log: Rc<RefCell<FakeLog>>,
}

impl FakeSchedule {
    pub fn new(terms: Vec<FakeTerm>) -> (Self, Rc<RefCell<FakeLog>>) {
        let log = Rc::new(RefCell::new(FakeLog::default()));
        let schedule = Self {
            terms,
            loaded: false,
            page: Page::default(),
            pending: None,
            subject_input: String::new(),
            log: log.clone(),
        };
        (schedule, log)
    }

    fn term(&self) -> Option<&FakeTerm> {
        self.page.term.map(|i| &self.terms[i])
    }

    /// Starts a postback that renders `next` once it lands.
    fn post_back(&mut self, next: Page) {
        self.pending = Some(Page {
            marked: false,
            ..next
        });
    }

    fn searched_listings(&self) -> Option<&Vec<String>> {
        let subject = self.page.searched.as_deref()?;
        self.term()?
            .subjects
            .iter()
            .find(|(code, _)| *code == subject)
            .map(|(_, listings)| listings)
    }

    fn present(&self, selector: &str) -> bool {
        if !self.loaded {
            return false;
        }
        match selector {
            selectors::TERM_SELECT
            | selectors::SHOW_SUBJECTS_BUTTON
            | selectors::SEARCH_BUTTON
            | selectors::SUBJECT_INPUT => true,
            selectors::SUBJECT_CODES_TABLE => self.page.subjects_shown,
            other => self
                .terms
                .iter()
                .any(|term| selectors::term_option(term.id) == other),
        }
    }

    fn timeout(selector: &str, timeout: Duration) -> Error {
        Error::NavigationTimeout {
            selector: selector.to_string(),
            timeout,
        }
    }
}

impl ScheduleBrowser for FakeSchedule {
    fn open(&mut self, url: &str) -> Result<()> {
        self.log.borrow_mut().opened.push(url.to_string());
        self.loaded = true;
        self.page = Page::default();
        self.pending = None;
        Ok(())
    }

    fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        if self.present(selector) {
            Ok(())
        } else {
            Err(Self::timeout(selector, timeout))
        }
    }

    fn mark_page(&mut self) -> Result<()> {
        self.page.marked = true;
        Ok(())
    }

    fn wait_for_postback(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        // Without a mark this cannot tell the old page from the new one and
        // returns as soon as the selector matches what is currently shown.
        if self.page.marked {
            match self.pending.take() {
                Some(next) => self.page = next,
                None => return Err(Self::timeout(selector, timeout)),
            }
        }
        self.wait_for(selector, timeout)
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        match selector {
            selectors::SHOW_SUBJECTS_BUTTON if self.page.term.is_some() => {
                let next = Page {
                    subjects_shown: true,
                    searched: None,
                    ..self.page.clone()
                };
                self.post_back(next);
            }
            selectors::SEARCH_BUTTON if self.page.term.is_some() => {
                let subject = self.subject_input.clone();
                let term = self.term().map(|t| t.name).unwrap_or_default();
                self.log
                    .borrow_mut()
                    .searches
                    .push(format!("{term}:{subject}"));
                let next = Page {
                    searched: Some(subject),
                    ..self.page.clone()
                };
                self.post_back(next);
            }
            other => return Err(Error::Browser(format!("nothing clickable at {other}"))),
        }
        Ok(())
    }

    fn select_option(&mut self, selector: &str, value: &str) -> Result<()> {
        let index = self
            .terms
            .iter()
            .position(|term| term.id == value)
            .filter(|_| selector == selectors::TERM_SELECT)
            .ok_or_else(|| Error::Browser(format!("no option {value} in {selector}")))?;
        self.post_back(Page {
            term: Some(index),
            ..Page::default()
        });
        Ok(())
    }

    fn fill(&mut self, selector: &str, text: &str) -> Result<()> {
        if selector != selectors::SUBJECT_INPUT {
            return Err(Error::Browser(format!("no input at {selector}")));
        }
        self.subject_input = text.to_string();
        Ok(())
    }

    fn texts(&mut self, selector: &str) -> Result<Vec<String>> {
        Ok(match selector {
            // The site pads option labels.
            selectors::TERM_OPTIONS => self
                .terms
                .iter()
                .map(|term| format!("  {}\n", term.name))
                .collect(),
            selectors::SUBJECT_CODE_CELLS if self.page.subjects_shown => self
                .term()
                .map(|term| term.subjects.iter().map(|(code, _)| code.to_string()).collect())
                .unwrap_or_default(),
            _ => vec![],
        })
    }

    fn attribute_values(&mut self, selector: &str, name: &str) -> Result<Vec<Option<String>>> {
        Ok(match (selector, name) {
            (selectors::TERM_OPTIONS, "value") => self
                .terms
                .iter()
                .map(|term| Some(term.id.to_string()))
                .collect(),
            (selectors::RESULT_HEADER, "id") => match self.searched_listings() {
                Some(listings) if !listings.is_empty() => {
                    vec![Some(RESULTS_PRESENT_ID.to_string())]
                }
                // Known subject, nothing offered: header without the sentinel.
                Some(_) => vec![Some("ctl00_ContentPlaceHolder1_NoResults".to_string())],
                None => vec![],
            },
            _ => vec![],
        })
    }

    fn inner_htmls(&mut self, selector: &str) -> Result<Vec<String>> {
        Ok(match selector {
            selectors::COURSE_LISTINGS => self.searched_listings().cloned().unwrap_or_default(),
            _ => vec![],
        })
    }

    fn release(&mut self) {
        self.log.borrow_mut().released += 1;
    }
}

pub fn config(output_dir: &std::path::Path) -> ScrapingConfig {
    ScrapingConfig {
        schedule_url: "http://schedule.test".to_string(),
        wait_timeout: Duration::from_millis(5),
        output_dir: output_dir.to_path_buf(),
    }
}

/// One listing item in the site's markup.
pub fn listing(subject: &str, class_nbr: &str, title: &str) -> String {
    let p = "ctl00_ContentPlaceHolder1_ClassList_ctl04_";
    format!(
        r#"
        <span class="ClassTitle"><strong>{subject} 1400</strong> 02</span>
        <table>
          <tr><td id="{p}TableCell11">Class Nbr</td><td id="{p}TableCell13">{class_nbr}</td>
              <td id="{p}TableCell3">Capacity</td><td id="{p}TableCell14">35</td></tr>
          <tr><td id="{p}TableCell7">Title</td><td id="{p}TableCell8">{title}</td>
              <td id="{p}TableCell5">Units</td><td id="{p}TableCell9">4</td></tr>
          <tr><td id="{p}TableCell6">Time</td><td id="{p}TableCell1">1:00 PM&#8211;2:15 PM MoWe</td>
              <td id="{p}TableCell15">Building/Room</td><td id="{p}TableCell2">Bldg 98 Rm C5</td></tr>
          <tr><td id="{p}TableCell16">Date</td><td id="{p}TableCell12">01/19/2021&#8211;05/07/2021</td>
              <td id="{p}TableCell18">Session</td><td id="{p}TableCell17">Regular</td></tr>
          <tr><td id="{p}TableCell19">Instructor</td><td id="{p}TableCell4">Staff</td>
              <td id="{p}TableCell20">Mode</td><td id="{p}TableCell10">Synchronous</td></tr>
        </table>
        "#
    )
}

/// Two terms; MAT has nothing offered in fall.
pub fn two_terms() -> Vec<FakeTerm> {
    vec![
        FakeTerm {
            name: "Fall Semester 2020",
            id: "2207",
            subjects: vec![
                (
                    "CS",
                    vec![
                        listing("CS", "10001", "Intro to Programming"),
                        listing("CS", "10002", "Data Structures"),
                    ],
                ),
                ("MAT", vec![]),
                ("PHY", vec![listing("PHY", "10003", "Mechanics")]),
            ],
        },
        FakeTerm {
            name: "Spring Semester 2021",
            id: "2213",
            subjects: vec![("CS", vec![listing("CS", "20001", "Operating Systems")])],
        },
    ]
}

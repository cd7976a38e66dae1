use scraper::{ElementRef, Html, Selector};

use crate::{
    course_offering::{CourseOffering, RawFragment},
    text_manipulators::{extract_text, normalize},
    Error, Result,
};

/// Marker that ends the section number in a listing's flattened text.
const SECTION_END_MARKER: &str = " Class Nbr";

/// The server renders each value into a `td` whose id is prefixed with
/// page-specific control names; only these suffixes stay the same.
pub mod cell_suffix {
    pub const CLASS_NBR: &str = "TableCell13";
    pub const CAPACITY: &str = "TableCell14";
    pub const TITLE: &str = "TableCell8";
    pub const UNITS: &str = "TableCell9";
    pub const TIME: &str = "TableCell1";
    pub const BUILDING_ROOM: &str = "TableCell2";
    pub const DATE: &str = "TableCell12";
    pub const SESSION: &str = "TableCell17";
    pub const INSTRUCTOR: &str = "TableCell4";
    pub const MODE: &str = "TableCell10";
}

pub fn id_has_suffix(id: &str, suffix: &str) -> bool {
    id.ends_with(suffix)
}

/// Section number heuristic: everything after the first two space-separated
/// tokens of the text preceding " Class Nbr" (e.g. "CS 3000 01 Class Nbr" gives "01").
pub fn section_from_text(flattened: &str) -> Option<String> {
    let head = flattened.split(SECTION_END_MARKER).next()?;
    head.splitn(3, ' ').nth(2).map(normalize)
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::Selector(sel_str.into()))
}

/// Parses listing fragments into offerings.
pub struct OfferingExtractor {
    cell_selector: Selector,
    class_title_selector: Selector,
    strong_selector: Selector,
}

impl OfferingExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            cell_selector: create_selector("td[id]")?,
            class_title_selector: create_selector("span.ClassTitle")?,
            strong_selector: create_selector("strong")?,
        })
    }

    pub fn extract_fragment(&self, fragment: &RawFragment) -> Result<CourseOffering> {
        self.extract(&fragment.semester_name, &fragment.html)
    }

    pub fn extract(&self, semester_name: &str, fragment_html: &str) -> Result<CourseOffering> {
        let document = Html::parse_fragment(fragment_html);
        let malformed = |field: &'static str| Error::MalformedFragment {
            semester: semester_name.to_string(),
            field,
        };
        let cell = |field: &'static str, suffix: &str| {
            self.find_cell(&document, suffix)
                .map(|td| normalize(&extract_text(td)))
                .ok_or_else(|| malformed(field))
        };

        let class_title = document
            .select(&self.class_title_selector)
            .next()
            .and_then(|span| span.select(&self.strong_selector).next())
            .map(|strong| normalize(&extract_text(strong)))
            .ok_or_else(|| malformed("ClassTitle"))?;

        let flattened = normalize(&extract_text(document.root_element()));
        let section = section_from_text(&flattened).ok_or_else(|| malformed("Section"))?;

        Ok(CourseOffering {
            semester: normalize(semester_name),
            class_title,
            section,
            class_nbr: cell("ClassNbr", cell_suffix::CLASS_NBR)?,
            capacity: cell("Capacity", cell_suffix::CAPACITY)?,
            title: cell("Title", cell_suffix::TITLE)?,
            units: cell("Units", cell_suffix::UNITS)?,
            time: cell("Time", cell_suffix::TIME)?,
            building_room: cell("BuildingRoom", cell_suffix::BUILDING_ROOM)?,
            date: cell("Date", cell_suffix::DATE)?,
            session: cell("Session", cell_suffix::SESSION)?,
            instructor: cell("Instructor", cell_suffix::INSTRUCTOR)?,
            mode: cell("Mode", cell_suffix::MODE)?,
        })
    }

    // First cell in document order wins, same as a top-down scan of the listing.
    fn find_cell<'a>(&self, document: &'a Html, suffix: &str) -> Option<ElementRef<'a>> {
        document.select(&self.cell_selector).find(|td| {
            td.value()
                .attr("id")
                .is_some_and(|id| id_has_suffix(id, suffix))
        })
    }
}

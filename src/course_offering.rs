use serde::{Deserialize, Serialize};

/// A term as listed in the schedule's term menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Semester {
    /// Label shown in the term menu, e.g. "Fall Semester 2020".
    pub name: String,
    /// Value of the menu option, needed to reselect the term.
    pub id: String,
}

/// Unparsed markup of one course listing item, tagged with its semester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFragment {
    pub semester_name: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CourseOffering {
    pub semester: String,
    pub class_title: String,
    pub section: String,
    pub class_nbr: String,
    pub capacity: String,
    pub title: String,
    pub units: String,
    pub time: String,
    pub building_room: String,
    pub date: String,
    pub session: String,
    pub instructor: String,
    pub mode: String,
}

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// None of the requested semesters exist in the term menu.
    #[error(
        "none of the requested semesters ({}) match an available term. Available terms: {}",
        .requested.join(", "),
        .available.join(", ")
    )]
    NoMatchingSemester {
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("timed out after {timeout:?} waiting for element: {selector}")]
    NavigationTimeout { selector: String, timeout: Duration },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("course fragment for semester {semester:?} has no anchor for field {field}")]
    MalformedFragment { semester: String, field: &'static str },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("failed to load env variables into config struct: {0}")]
    Config(#[from] envy::Error),
}

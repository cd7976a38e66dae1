use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;

use crate::{
    Error, Result,
    course_offering::{CourseOffering, Semester},
};

/// Name of the file holding every record when output is not split.
pub const COMBINED_FILE_NAME: &str = "data.json";

/// Writes offerings as JSON arrays into an output directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Writes `records` to `data.json`, or with `split_output` to one
    /// `<semester name>.json` per distinct semester name (in the given semester order).
    /// Returns the written paths.
    pub fn write(
        &self,
        records: &[CourseOffering],
        split_output: bool,
        semesters: &[Semester],
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir).map_err(|source| Error::Write {
            path: self.output_dir.clone(),
            source,
        })?;

        if !split_output {
            let path = self.output_dir.join(COMBINED_FILE_NAME);
            write_json(&path, records)?;
            return Ok(vec![path]);
        }

        let mut written = Vec::with_capacity(semesters.len());
        let mut seen_names: Vec<&str> = Vec::with_capacity(semesters.len());
        for semester in semesters {
            // Menu options sharing a label share a file.
            if seen_names.contains(&semester.name.as_str()) {
                continue;
            }
            seen_names.push(&semester.name);
            let subset: Vec<&CourseOffering> = records
                .iter()
                .filter(|record| record.semester == semester.name)
                .collect();
            let path = self.semester_path(&semester.name);
            write_json(&path, &subset)?;
            written.push(path);
        }
        Ok(written)
    }

    fn semester_path(&self, semester_name: &str) -> PathBuf {
        let file_stem = semester_name.replace(['/', '\\'], "-");
        self.output_dir.join(format!("{file_stem}.json"))
    }
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, records: &T) -> Result<()> {
    let json = serde_json::to_string(records)?;
    fs::write(path, json).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {}", path.display());
    Ok(())
}

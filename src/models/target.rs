/// Width section numbers are padded to before they are used as row identifiers.
pub const SECTION_WIDTH: usize = 3;

/// Left-pad a section number with zeros so "1" and "001" name the same row.
pub fn normalize_section(raw: &str) -> String {
    format!("{:0>width$}", raw.trim(), width = SECTION_WIDTH)
}

/// The course being watched and the sections tracked under it.
///
/// Built once at startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    course: String,
    sections: Vec<String>,
}

impl Target {
    /// Sections are normalized and de-duplicated, keeping the first occurrence.
    pub fn new<I, S>(course: impl Into<String>, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for section in sections {
            let section = normalize_section(section.as_ref());
            if !normalized.contains(&section) {
                normalized.push(section);
            }
        }

        Self {
            course: course.into(),
            sections: normalized,
        }
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    /// Identifier of the table row holding one section, e.g. `CS 101-001`.
    pub fn row_id(&self, section: &str) -> String {
        format!("{}-{}", self.course, section)
    }

    /// Department prefix of the course code, used to select the offerings listing.
    pub fn department(&self) -> &str {
        self.course.split(' ').next().unwrap_or(&self.course)
    }

    pub fn offerings_url(&self, base: &str) -> String {
        format!("{base}?COURSE_CODE={}", self.department())
    }
}

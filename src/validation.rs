//! Argument validators used by the command line parser.

use crate::models::{normalize_section, SECTION_WIDTH};

const MAX_COURSE_LENGTH: usize = 32;

/// Accepts course codes such as `CS 101`: ASCII letters, digits and single spaces.
pub fn clap_course_validator(s: &str) -> Result<String, String> {
    let course = s.trim();

    if course.is_empty() {
        return Err("course code cannot be empty".to_string());
    }
    if course.len() > MAX_COURSE_LENGTH {
        return Err(format!(
            "course code is too long ({} characters, max {MAX_COURSE_LENGTH})",
            course.len()
        ));
    }
    if let Some(c) = course
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != ' ')
    {
        return Err(format!("course code contains invalid character '{c}'"));
    }
    if course.contains("  ") {
        return Err("course code contains consecutive spaces".to_string());
    }

    Ok(course.to_string())
}

/// Accepts section numbers of up to three digits and returns them zero-padded.
pub fn clap_section_validator(s: &str) -> Result<String, String> {
    let section = s.trim();

    if section.is_empty() {
        return Err("section cannot be empty".to_string());
    }
    if !section.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("section '{section}' must be a number"));
    }
    if section.len() > SECTION_WIDTH {
        return Err(format!(
            "section '{section}' has more than {SECTION_WIDTH} digits"
        ));
    }

    Ok(normalize_section(section))
}

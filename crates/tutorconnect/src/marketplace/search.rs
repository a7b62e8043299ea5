//! Tutor discovery filters.

use serde::Deserialize;

use crate::model::Teacher;

/// Filter value meaning "no filter" for subject and grade.
pub const ANY: &str = "All";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TutorQuery {
    /// Case-insensitive substring of the teacher's name or bio
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
}

fn active(filter: &Option<String>) -> Option<&str> {
    filter
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty() && *f != ANY)
}

impl TutorQuery {
    pub fn matches(&self, teacher: &Teacher) -> bool {
        let matches_search = active(&self.search).map_or(true, |term| {
            let term = term.to_lowercase();
            teacher.name().to_lowercase().contains(&term)
                || teacher.bio.to_lowercase().contains(&term)
        });
        let matches_subject =
            active(&self.subject).map_or(true, |s| teacher.subjects.iter().any(|t| t == s));
        let matches_grade =
            active(&self.grade).map_or(true, |g| teacher.grades.iter().any(|t| t == g));

        matches_search && matches_subject && matches_grade
    }
}

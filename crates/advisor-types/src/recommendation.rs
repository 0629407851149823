//! Per-query recommendation results.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::course::Course;

/// Level reported when a course code carries no digit.
pub const UNKNOWN_LEVEL: u8 = 99;

/// A matched course with its similarity score and derived level.
///
/// Shares the course with the loaded corpus; results are rebuilt for every
/// query and carry no identity of their own. Serializes flat:
/// `code, name, description, mapped_skills, match_score, level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub course: Arc<Course>,

    /// Cosine similarity rounded to 2 decimal places
    pub match_score: f64,

    /// First digit of the course code, or `UNKNOWN_LEVEL`
    pub level: u8,
}

impl Recommendation {
    pub fn code(&self) -> &str {
        &self.course.code
    }

    pub fn name(&self) -> &str {
        &self.course.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_flat() {
        let course = Arc::new(Course::new("CS101", "Intro to AI", "Basics").with_skills(["Python"]));
        let rec = Recommendation {
            course,
            match_score: 0.57,
            level: 1,
        };

        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["code"], "CS101");
        assert_eq!(value["name"], "Intro to AI");
        assert_eq!(value["mapped_skills"][0]["skill"], "Python");
        assert_eq!(value["match_score"], 0.57);
        assert_eq!(value["level"], 1);
        assert!(value.get("course").is_none());
    }
}

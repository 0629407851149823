//! Course records as held by a loaded engine.
//!
//! A `Course` is created once when the corpus is loaded and never mutated
//! afterwards. Skill names within one course are unique under
//! case-insensitive comparison; the corpus loader enforces this.

use serde::{Deserialize, Serialize};

/// One skill mapped onto a course.
///
/// Only `skill` is interpreted. Any other fields present in the source
/// record (relevance scores, taxonomy codes) are carried through unchanged
/// so they reach API consumers as they were written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMapping {
    /// Skill name
    pub skill: String,

    /// Extra fields from the source record
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SkillMapping {
    /// Create a skill mapping with no extra fields.
    pub fn new(skill: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Case-folded skill name used for duplicate detection.
    pub fn folded_name(&self) -> String {
        self.skill.to_lowercase()
    }
}

/// A university course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Course identifier, e.g. "CS101". May embed a level digit.
    pub code: String,

    /// Course title
    pub name: String,

    /// Course description (possibly empty)
    pub description: String,

    /// Skills mapped onto this course, in first-seen order
    pub mapped_skills: Vec<SkillMapping>,
}

impl Course {
    /// Create a course without skills.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: description.into(),
            mapped_skills: Vec::new(),
        }
    }

    /// Append skills by name.
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mapped_skills
            .extend(skills.into_iter().map(SkillMapping::new));
        self
    }

    /// Iterate over skill names in order.
    pub fn skill_names(&self) -> impl Iterator<Item = &str> {
        self.mapped_skills.iter().map(|s| s.skill.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_mapping_keeps_extra_fields() {
        let json = r#"{"skill": "Python", "relevance": 0.9, "onet": "2.A.1"}"#;
        let mapping: SkillMapping = serde_json::from_str(json).unwrap();
        assert_eq!(mapping.skill, "Python");
        assert_eq!(mapping.extra.len(), 2);

        let back = serde_json::to_value(&mapping).unwrap();
        assert_eq!(back["relevance"], 0.9);
        assert_eq!(back["onet"], "2.A.1");
    }

    #[test]
    fn test_folded_name() {
        assert_eq!(SkillMapping::new("Machine Learning").folded_name(), "machine learning");
    }

    #[test]
    fn test_course_builder() {
        let course = Course::new("CS101", "Intro to AI", "").with_skills(["Python", "Statistics"]);
        let names: Vec<&str> = course.skill_names().collect();
        assert_eq!(names, vec!["Python", "Statistics"]);
        assert!(course.description.is_empty());
    }
}

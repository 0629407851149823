//! Corpus loading.
//!
//! Reads a JSON array of course records, applies defaulting rules once, and
//! drops repeated skills within each course. The resulting `Corpus` is
//! position-stable: nothing reorders or filters it after load.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use advisor_types::{Course, SkillMapping};

use crate::error::EngineError;

/// A course record as written by the description/skill-mapping pipeline.
///
/// Only `name` is mandatory. Other fields the pipeline writes (`id`,
/// `credits`, `taught_in_english`, a placeholder `level`) are ignored.
#[derive(Debug, Deserialize)]
struct CourseRecord {
    #[serde(default)]
    code: Option<String>,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    mapped_skills: Option<Vec<SkillMapping>>,
}

impl CourseRecord {
    fn into_course(self) -> (Course, usize) {
        let skills = self.mapped_skills.unwrap_or_default();
        let before = skills.len();
        let mapped_skills = dedup_skills(skills);
        let dropped = before - mapped_skills.len();

        let course = Course {
            code: self.code.unwrap_or_default(),
            name: self.name,
            description: self.description.unwrap_or_default(),
            mapped_skills,
        };
        (course, dropped)
    }
}

/// Keep the first mapping for each case-folded skill name, in order.
pub(crate) fn dedup_skills(skills: Vec<SkillMapping>) -> Vec<SkillMapping> {
    let mut seen = HashSet::with_capacity(skills.len());
    skills
        .into_iter()
        .filter(|s| seen.insert(s.folded_name()))
        .collect()
}

/// Ordered, immutable course list.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    courses: Vec<Arc<Course>>,
    skills_dropped: usize,
}

impl Corpus {
    /// Build a corpus from already-typed courses, applying skill dedup.
    pub fn from_courses(courses: impl IntoIterator<Item = Course>) -> Self {
        let mut skills_dropped = 0;
        let courses = courses
            .into_iter()
            .map(|mut course| {
                let before = course.mapped_skills.len();
                course.mapped_skills = dedup_skills(std::mem::take(&mut course.mapped_skills));
                skills_dropped += before - course.mapped_skills.len();
                Arc::new(course)
            })
            .collect();
        Self {
            courses,
            skills_dropped,
        }
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Course at corpus position `index`.
    pub fn get(&self, index: usize) -> Option<&Arc<Course>> {
        self.courses.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Course>> {
        self.courses.iter()
    }

    /// Number of skill mappings removed as case-insensitive repeats.
    pub fn skills_dropped(&self) -> usize {
        self.skills_dropped
    }
}

/// Parse a corpus from JSON text. `source` is only used in error reports.
pub fn parse_corpus(json: &str, source: &Path) -> Result<Corpus, EngineError> {
    let records: Vec<CourseRecord> =
        serde_json::from_str(json).map_err(|e| EngineError::DataCorrupt {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut skills_dropped = 0;
    let courses = records
        .into_iter()
        .map(|record| {
            let (course, dropped) = record.into_course();
            skills_dropped += dropped;
            Arc::new(course)
        })
        .collect();

    Ok(Corpus {
        courses,
        skills_dropped,
    })
}

/// Load the corpus file at `path`.
pub fn load_corpus(path: &Path) -> Result<Corpus, EngineError> {
    info!(path = %path.display(), "Loading course data");

    let json = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => EngineError::DataNotFound(path.to_path_buf()),
        _ => EngineError::DataCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    let corpus = parse_corpus(&json, path)?;

    if corpus.skills_dropped > 0 {
        debug!(dropped = corpus.skills_dropped, "Dropped duplicate skill mappings");
    }
    info!(courses = corpus.len(), "Loaded courses");

    Ok(corpus)
}

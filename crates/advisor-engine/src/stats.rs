//! Corpus statistics for data checks.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::corpus::Corpus;
use crate::matcher::derive_level;

/// Summary of a loaded corpus, computed without embedding anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorpusStats {
    pub courses: usize,
    pub missing_description: usize,
    pub without_skills: usize,
    /// Distinct skill names across the corpus (case-insensitive)
    pub distinct_skills: usize,
    /// Skill mappings removed as in-course repeats during load
    pub duplicate_skills_dropped: usize,
    /// Courses whose code also appears on an earlier course
    pub duplicate_codes: usize,
    /// Course count per derived level
    pub levels: BTreeMap<u8, usize>,
}

impl CorpusStats {
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let mut stats = CorpusStats {
            courses: corpus.len(),
            duplicate_skills_dropped: corpus.skills_dropped(),
            ..Default::default()
        };

        let mut skills = HashSet::new();
        let mut codes: HashMap<&str, usize> = HashMap::new();

        for course in corpus.iter() {
            if course.description.trim().is_empty() {
                stats.missing_description += 1;
            }
            if course.mapped_skills.is_empty() {
                stats.without_skills += 1;
            }
            skills.extend(course.mapped_skills.iter().map(|s| s.folded_name()));
            *codes.entry(course.code.as_str()).or_default() += 1;
            *stats.levels.entry(derive_level(&course.code)).or_default() += 1;
        }

        stats.distinct_skills = skills.len();
        stats.duplicate_codes = codes.values().map(|n| n - 1).sum();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_types::Course;

    #[test]
    fn test_stats() {
        let corpus = Corpus::from_courses([
            Course::new("CS101", "Intro to AI", "ML basics").with_skills(["Python", "python"]),
            Course::new("CS101", "Intro to AI (B)", "").with_skills(["PYTHON", "Statistics"]),
            Course::new("EEMBA", "Executive MBA", "  "),
            Course::new("ART200", "Oil Painting", "Studio"),
        ]);
        let stats = CorpusStats::from_corpus(&corpus);

        assert_eq!(stats.courses, 4);
        assert_eq!(stats.missing_description, 2);
        assert_eq!(stats.without_skills, 2);
        assert_eq!(stats.distinct_skills, 2);
        assert_eq!(stats.duplicate_skills_dropped, 1);
        assert_eq!(stats.duplicate_codes, 1);
        assert_eq!(stats.levels.get(&1), Some(&2));
        assert_eq!(stats.levels.get(&2), Some(&1));
        assert_eq!(stats.levels.get(&99), Some(&1));
    }

    #[test]
    fn test_empty_corpus() {
        let stats = CorpusStats::from_corpus(&Corpus::default());
        assert_eq!(stats, CorpusStats::default());
    }
}

//! Document composition.
//!
//! Each course is embedded as one text: the name repeated `TITLE_WEIGHT`
//! times, then the description, then the skill names. Repeating the title
//! pulls the vector toward what the course is called rather than toward
//! long, generic description prose.

use advisor_types::Course;

/// Default number of title repetitions.
pub const TITLE_WEIGHT: usize = 3;

/// Compose the embedding text for `course` with the default title weight.
pub fn compose(course: &Course) -> String {
    compose_with_weight(course, TITLE_WEIGHT)
}

/// Compose `"{name} {name} {name}. {description} {skills}"`, with the name
/// repeated `title_weight` times (at least once).
pub fn compose_with_weight(course: &Course, title_weight: usize) -> String {
    let title = vec![course.name.as_str(); title_weight.max(1)].join(" ");
    let skills = course.skill_names().collect::<Vec<_>>().join(" ");
    format!("{}. {} {}", title, course.description, skills)
}

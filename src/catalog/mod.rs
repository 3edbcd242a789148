//! Read-only catalog of lectures, sections and enrollment.
//!
//! The trade engine never loads data itself. It consumes a [`Catalog`]
//! handle supplied by the caller and treats it as immutable for the
//! lifetime of a search, so it is shared between workers without locking.
//!
//! [`InMemoryCatalog`] is the bundled implementation, built from a list
//! of sections.

mod memory;

pub use memory::InMemoryCatalog;

use std::sync::Arc;

use crate::models::{LectureKey, Schedule, Section, SectionKey};

/// Lookup of sections and per-student enrollment.
///
/// All answers describe the baseline state, before any trade is applied.
pub trait Catalog: Send + Sync {
    /// The section with the given key.
    fn section(&self, key: &SectionKey) -> Option<Arc<Section>>;

    /// All sections of a lecture, ordered by section number.
    fn sections_of(&self, lecture: &LectureKey) -> Vec<Arc<Section>>;

    /// Whether the student is known.
    fn student_exists(&self, student_id: &str) -> bool;

    /// The student's baseline schedule. `None` for unknown students.
    fn schedule_of(&self, student_id: &str) -> Option<Schedule>;

    /// Whether the section exists.
    fn section_exists(&self, key: &SectionKey) -> bool {
        self.section(key).is_some()
    }

    /// Baseline roster of a section. `None` for unknown sections.
    fn enrollment_of(&self, key: &SectionKey) -> Option<Vec<String>> {
        self.section(key).map(|s| s.enrolled.clone())
    }

    /// Section numbers of a lecture, ascending.
    fn section_numbers(&self, lecture: &LectureKey) -> Vec<u32> {
        self.sections_of(lecture).iter().map(|s| s.number).collect()
    }
}

//! In-memory catalog.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::Catalog;
use crate::models::{LectureKey, Schedule, Section, SectionKey};

/// A catalog held entirely in memory.
///
/// Students are registered implicitly by appearing on a roster, or
/// explicitly with [`with_student`](Self::with_student).
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    sections: BTreeMap<SectionKey, Arc<Section>>,
    students: BTreeMap<String, BTreeSet<SectionKey>>,
}

impl InMemoryCatalog {
    /// Builds a catalog from sections.
    ///
    /// A section with a duplicate key replaces the earlier one. Use
    /// [`validate_sections`](crate::validation::validate_sections) first
    /// to reject such input.
    pub fn new(sections: Vec<Section>) -> Self {
        let mut catalog = Self::default();
        for section in sections {
            catalog.add_section(section);
        }
        catalog
    }

    /// Registers a student without any enrollment.
    pub fn with_student(mut self, student_id: impl Into<String>) -> Self {
        self.students.entry(student_id.into()).or_default();
        self
    }

    /// Adds a section (builder form).
    pub fn with_section(mut self, section: Section) -> Self {
        self.add_section(section);
        self
    }

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// All known student ids, ordered.
    pub fn student_ids(&self) -> impl Iterator<Item = &str> {
        self.students.keys().map(String::as_str)
    }

    /// All lectures with at least one section, ordered.
    pub fn lectures(&self) -> BTreeSet<LectureKey> {
        self.sections.keys().map(SectionKey::lecture).collect()
    }

    fn add_section(&mut self, section: Section) {
        let key = section.key();
        if let Some(previous) = self.sections.get(&key) {
            for student in &previous.enrolled {
                if let Some(keys) = self.students.get_mut(student) {
                    keys.remove(&key);
                }
            }
        }
        for student in &section.enrolled {
            self.students
                .entry(student.clone())
                .or_default()
                .insert(key.clone());
        }
        self.sections.insert(key, Arc::new(section));
    }
}

impl Catalog for InMemoryCatalog {
    fn section(&self, key: &SectionKey) -> Option<Arc<Section>> {
        self.sections.get(key).cloned()
    }

    fn sections_of(&self, lecture: &LectureKey) -> Vec<Arc<Section>> {
        let start = lecture.section(0);
        let end = lecture.section(u32::MAX);
        self.sections
            .range(start..=end)
            .map(|(_, s)| Arc::clone(s))
            .collect()
    }

    fn student_exists(&self, student_id: &str) -> bool {
        self.students.contains_key(student_id)
    }

    fn schedule_of(&self, student_id: &str) -> Option<Schedule> {
        let keys = self.students.get(student_id)?;
        Some(Schedule::from_sections(
            keys.iter().filter_map(|k| self.sections.get(k).cloned()),
        ))
    }
}

//! Student schedule model.
//!
//! A schedule is the set of sections one student holds, at most one per
//! lecture code. Sections are shared behind `Arc`, so cloning a schedule
//! copies pointers only; search branches clone schedules freely.
//!
//! Conflict-freedom (no two sections sharing a weekly slot) is checked on
//! demand, not maintained on insert: intermediate search states may
//! conflict.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use super::{Section, SectionKey};
use crate::catalog::Catalog;
use crate::error::{Result, TradeError};

/// The sections held by one student.
///
/// Equality is set equality of the held section keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    sections: BTreeMap<String, Arc<Section>>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schedule from sections. A later section replaces an
    /// earlier one of the same lecture code.
    pub fn from_sections(sections: impl IntoIterator<Item = Arc<Section>>) -> Self {
        let mut schedule = Self::new();
        for section in sections {
            schedule.insert(section);
        }
        schedule
    }

    /// Adds a section (builder form).
    pub fn with_section(mut self, section: Section) -> Self {
        self.insert(Arc::new(section));
        self
    }

    /// Holds `section`, returning the previously held section of its lecture.
    pub fn insert(&mut self, section: Arc<Section>) -> Option<Arc<Section>> {
        self.sections.insert(section.lecture_code.clone(), section)
    }

    /// The held section of a lecture.
    pub fn section_for(&self, lecture_code: &str) -> Option<&Arc<Section>> {
        self.sections.get(lecture_code)
    }

    /// Whether the given section is held.
    pub fn holds(&self, key: &SectionKey) -> bool {
        self.sections
            .get(&key.lecture_code)
            .is_some_and(|s| s.grade == key.grade && s.number == key.number)
    }

    /// Held sections, ordered by lecture code.
    pub fn sections(&self) -> impl Iterator<Item = &Arc<Section>> {
        self.sections.values()
    }

    /// Held lecture codes, ordered.
    pub fn lecture_codes(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Keys of all held sections.
    pub fn keys(&self) -> BTreeSet<SectionKey> {
        self.sections.values().map(|s| s.key()).collect()
    }

    /// Number of held sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether no section is held.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Whether any two held sections share a time slot.
    ///
    /// # Complexity
    /// O(total slots).
    pub fn conflicts(&self) -> bool {
        Self::has_shared_slot(self.sections.values())
    }

    /// Like [`conflicts`](Self::conflicts), but sections of the given
    /// lecture codes are left out of the check.
    pub fn conflicts_ignoring(&self, ignored: &BTreeSet<String>) -> bool {
        Self::has_shared_slot(
            self.sections
                .iter()
                .filter(|(code, _)| !ignored.contains(*code))
                .map(|(_, s)| s),
        )
    }

    /// Pairs of held sections that share at least one slot.
    pub fn conflicting_pairs(&self) -> Vec<(SectionKey, SectionKey)> {
        let held: Vec<&Arc<Section>> = self.sections.values().collect();
        let mut pairs = Vec::new();
        for i in 0..held.len() {
            for j in (i + 1)..held.len() {
                if held[i].overlaps(held[j]) {
                    pairs.push((held[i].key(), held[j].key()));
                }
            }
        }
        pairs
    }

    /// Returns a copy with the section of `lecture_code` swapped for
    /// section `new_number` of the same lecture and grade.
    ///
    /// # Errors
    /// - `LectureNotHeld` if no section of the lecture is held.
    /// - `UnknownSection` if the catalog has no such section.
    pub fn replace_section(
        &self,
        catalog: &dyn Catalog,
        lecture_code: &str,
        new_number: u32,
    ) -> Result<Schedule> {
        let current = self
            .section_for(lecture_code)
            .ok_or_else(|| TradeError::LectureNotHeld {
                lecture_code: lecture_code.to_string(),
            })?;
        let key = SectionKey::new(lecture_code, current.grade, new_number);
        let replacement = catalog
            .section(&key)
            .ok_or(TradeError::UnknownSection(key))?;

        let mut next = self.clone();
        next.insert(replacement);
        Ok(next)
    }

    fn has_shared_slot<'a>(sections: impl Iterator<Item = &'a Arc<Section>>) -> bool {
        let mut seen = HashSet::new();
        for section in sections {
            for slot in &section.time_slots {
                if !seen.insert(*slot) {
                    return true;
                }
            }
        }
        false
    }
}

impl PartialEq for Schedule {
    fn eq(&self, other: &Self) -> bool {
        self.sections.len() == other.sections.len()
            && self.sections.iter().all(|(code, s)| {
                other
                    .sections
                    .get(code)
                    .is_some_and(|o| o.grade == s.grade && o.number == s.number)
            })
    }
}

impl Eq for Schedule {}

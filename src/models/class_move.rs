//! Class move model.
//!
//! A `ClassMove` proposes that one student leaves section `number_from`
//! of a lecture for section `number_to` of the same lecture and grade.
//! On the lecture's section graph it is the directed edge
//! `number_from -> number_to`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{LectureKey, SectionKey};
use crate::catalog::Catalog;

/// A proposed single-student section reassignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassMove {
    /// Moving student.
    pub student_id: String,
    /// Lecture code.
    pub lecture_code: String,
    /// Grade.
    pub grade: u8,
    /// Section the student leaves.
    pub number_from: u32,
    /// Section the student joins.
    pub number_to: u32,
}

impl ClassMove {
    /// Creates a new move.
    pub fn new(
        student_id: impl Into<String>,
        lecture_code: impl Into<String>,
        grade: u8,
        number_from: u32,
        number_to: u32,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            lecture_code: lecture_code.into(),
            grade,
            number_from,
            number_to,
        }
    }

    /// Key of the section being left.
    pub fn from_key(&self) -> SectionKey {
        SectionKey::new(self.lecture_code.clone(), self.grade, self.number_from)
    }

    /// Key of the section being joined.
    pub fn to_key(&self) -> SectionKey {
        SectionKey::new(self.lecture_code.clone(), self.grade, self.number_to)
    }

    /// The section graph this move is an edge of.
    pub fn lecture_key(&self) -> LectureKey {
        LectureKey::new(self.lecture_code.clone(), self.grade)
    }

    /// Whether both endpoints are real sections in the catalog.
    pub fn is_valid(&self, catalog: &dyn Catalog) -> bool {
        catalog.section_exists(&self.from_key()) && catalog.section_exists(&self.to_key())
    }
}

impl fmt::Display for ClassMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} {}->{}",
            self.student_id, self.lecture_code, self.grade, self.number_from, self.number_to
        )
    }
}

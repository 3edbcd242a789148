//! Section ("class") model.
//!
//! A section is one concrete offering of a lecture for a grade. It has a
//! teacher, weekly time slots, and the roster of students enrolled when the
//! catalog was read.
//!
//! # Numbering
//! Section numbers are 1-based and unique only within one
//! `(lecture_code, grade)` pair.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Day of the school week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

/// A weekly (weekday, period) slot.
///
/// Periods are 1-based within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Day of week.
    pub weekday: Weekday,
    /// Period within the day (1-based).
    pub period: u8,
}

/// Identifies one section: `(lecture_code, grade, number)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionKey {
    /// Lecture code (e.g. "MATH").
    pub lecture_code: String,
    /// Grade the lecture is offered for.
    pub grade: u8,
    /// Section number (1-based).
    pub number: u32,
}

/// Identifies one lecture within a grade: the scope of a section graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LectureKey {
    /// Lecture code.
    pub lecture_code: String,
    /// Grade.
    pub grade: u8,
}

/// One offering of a lecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Lecture code.
    pub lecture_code: String,
    /// Grade.
    pub grade: u8,
    /// Section number (1-based).
    pub number: u32,
    /// Teacher name.
    pub teacher: String,
    /// Weekly meeting slots.
    pub time_slots: Vec<TimeSlot>,
    /// Enrolled student ids, in roster order.
    pub enrolled: Vec<String>,
}

impl TimeSlot {
    /// Creates a new slot.
    pub fn new(weekday: Weekday, period: u8) -> Self {
        Self { weekday, period }
    }
}

impl SectionKey {
    /// Creates a new section key.
    pub fn new(lecture_code: impl Into<String>, grade: u8, number: u32) -> Self {
        Self {
            lecture_code: lecture_code.into(),
            grade,
            number,
        }
    }

    /// The lecture this section belongs to.
    pub fn lecture(&self) -> LectureKey {
        LectureKey::new(self.lecture_code.clone(), self.grade)
    }
}

impl LectureKey {
    /// Creates a new lecture key.
    pub fn new(lecture_code: impl Into<String>, grade: u8) -> Self {
        Self {
            lecture_code: lecture_code.into(),
            grade,
        }
    }

    /// Key of section `number` of this lecture.
    pub fn section(&self, number: u32) -> SectionKey {
        SectionKey::new(self.lecture_code.clone(), self.grade, number)
    }
}

impl Section {
    /// Creates a section with no teacher, slots or students.
    pub fn new(lecture_code: impl Into<String>, grade: u8, number: u32) -> Self {
        Self {
            lecture_code: lecture_code.into(),
            grade,
            number,
            teacher: String::new(),
            time_slots: Vec::new(),
            enrolled: Vec::new(),
        }
    }

    /// Sets the teacher.
    pub fn with_teacher(mut self, teacher: impl Into<String>) -> Self {
        self.teacher = teacher.into();
        self
    }

    /// Adds a weekly slot.
    pub fn with_slot(mut self, slot: TimeSlot) -> Self {
        self.time_slots.push(slot);
        self
    }

    /// Adds an enrolled student.
    pub fn with_student(mut self, student_id: impl Into<String>) -> Self {
        self.enrolled.push(student_id.into());
        self
    }

    /// The section's key.
    pub fn key(&self) -> SectionKey {
        SectionKey::new(self.lecture_code.clone(), self.grade, self.number)
    }

    /// The lecture this section belongs to.
    pub fn lecture(&self) -> LectureKey {
        LectureKey::new(self.lecture_code.clone(), self.grade)
    }

    /// Whether the student is on the baseline roster.
    pub fn is_enrolled(&self, student_id: &str) -> bool {
        self.enrolled.iter().any(|s| s == student_id)
    }

    /// Whether two sections meet in a common slot.
    pub fn overlaps(&self, other: &Section) -> bool {
        self.time_slots
            .iter()
            .any(|slot| other.time_slots.contains(slot))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        };
        f.write_str(name)
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.lecture_code, self.grade, self.number)
    }
}

impl fmt::Display for LectureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.lecture_code, self.grade)
    }
}

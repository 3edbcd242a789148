//! Input validation for trade searches.
//!
//! Checks structural integrity of catalog data and search targets before
//! any search runs. Detects:
//! - Duplicate section keys and malformed section numbers or slots
//! - Students listed twice on one roster, or in two sections of a lecture
//! - Targets naming unknown students or sections
//! - Targets that add or drop lectures, or that conflict

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::catalog::Catalog;
use crate::models::{Section, SectionKey};
use crate::search::SearchTargets;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two sections share the same key.
    DuplicateSection,
    /// Section number is 0 (numbers are 1-based).
    InvalidSectionNumber,
    /// A time slot has period 0.
    InvalidTimeSlot,
    /// A student appears twice on one roster.
    DuplicateEnrollment,
    /// A student is enrolled in more than one section of a lecture.
    MultipleSectionsOfLecture,
    /// A student id is not known to the catalog.
    UnknownStudent,
    /// A target schedule holds a section the catalog doesn't have.
    UnknownSection,
    /// A target schedule does not cover exactly the student's lectures.
    LectureMismatch,
    /// A target schedule has overlapping sections.
    ScheduleConflict,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Validates the sections a catalog will be built from.
///
/// Checks:
/// 1. No duplicate section keys
/// 2. Section numbers are 1-based
/// 3. Periods are 1-based
/// 4. No student listed twice on a roster
/// 5. No student enrolled in two sections of the same lecture code
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_sections(sections: &[Section]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut keys = HashSet::new();
    for section in sections {
        let key = section.key();
        if !keys.insert(key.clone()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateSection,
                format!("Duplicate section: {key}"),
            ));
        }

        if section.number == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSectionNumber,
                format!("Section {key} has number 0"),
            ));
        }

        if section.time_slots.iter().any(|slot| slot.period == 0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimeSlot,
                format!("Section {key} has a slot with period 0"),
            ));
        }

        let mut roster = HashSet::new();
        for student in &section.enrolled {
            if !roster.insert(student.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateEnrollment,
                    format!("Student '{student}' listed twice in {key}"),
                ));
            }
        }
    }

    // student -> lecture code -> sections
    let mut held: BTreeMap<&str, BTreeMap<&str, Vec<SectionKey>>> = BTreeMap::new();
    for section in sections {
        let mut seen = HashSet::new();
        for student in &section.enrolled {
            if seen.insert(student.as_str()) {
                held.entry(student.as_str())
                    .or_default()
                    .entry(section.lecture_code.as_str())
                    .or_default()
                    .push(section.key());
            }
        }
    }
    for (student, lectures) in &held {
        for (code, keys) in lectures {
            if keys.len() > 1 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MultipleSectionsOfLecture,
                    format!(
                        "Student '{student}' holds {} sections of lecture '{code}'",
                        keys.len()
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates search targets against a catalog.
///
/// Checks, for every target student:
/// 1. The student exists
/// 2. Every target section exists
/// 3. The target covers exactly the lectures the student takes now
/// 4. The target is conflict-free (the origin's ignored lectures excepted)
///
/// An origin exemption must name a known student.
pub fn validate_targets(catalog: &dyn Catalog, targets: &SearchTargets) -> ValidationResult {
    let mut errors = Vec::new();

    if let Some(origin) = targets.origin() {
        if !catalog.student_exists(&origin.student_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownStudent,
                format!("Unknown origin student '{}'", origin.student_id),
            ));
        }
    }

    for (student, desired) in targets.iter() {
        let Some(current) = catalog.schedule_of(student) else {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownStudent,
                format!("Unknown student '{student}'"),
            ));
            continue;
        };

        for section in desired.sections() {
            if !catalog.section_exists(&section.key()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSection,
                    format!("Target for '{student}' holds unknown section {}", section.key()),
                ));
            }
        }

        let now: Vec<(&str, u8)> = current
            .sections()
            .map(|s| (s.lecture_code.as_str(), s.grade))
            .collect();
        let wanted: Vec<(&str, u8)> = desired
            .sections()
            .map(|s| (s.lecture_code.as_str(), s.grade))
            .collect();
        if now != wanted {
            errors.push(ValidationError::new(
                ValidationErrorKind::LectureMismatch,
                format!("Target for '{student}' does not cover exactly the lectures they take"),
            ));
        }

        let conflicting = match targets.origin() {
            Some(origin) if origin.student_id == *student => {
                desired.conflicts_ignoring(&origin.ignored_lectures)
            }
            _ => desired.conflicts(),
        };
        if conflicting {
            errors.push(ValidationError::new(
                ValidationErrorKind::ScheduleConflict,
                format!("Target for '{student}' has overlapping sections"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

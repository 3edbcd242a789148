//! Shared fixtures for unit tests.

use std::sync::Arc;

use crate::catalog::{Catalog, InMemoryCatalog};
use crate::models::{Section, TimeSlot, Weekday};

pub fn slot(weekday: Weekday, period: u8) -> TimeSlot {
    TimeSlot::new(weekday, period)
}

/// Two lectures for grade 1.
///
/// | Section | Slot | Roster |
/// |---------|------|--------|
/// | MATH#1 | Mon 1 | A |
/// | MATH#2 | Tue 1 | B |
/// | MATH#3 | Wed 1 | C |
/// | ENG#1 | Mon 2 | A, B |
/// | ENG#2 | Tue 2 | C |
pub fn school_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(vec![
        Section::new("MATH", 1, 1)
            .with_teacher("Kim")
            .with_slot(slot(Weekday::Mon, 1))
            .with_student("A"),
        Section::new("MATH", 1, 2)
            .with_teacher("Lee")
            .with_slot(slot(Weekday::Tue, 1))
            .with_student("B"),
        Section::new("MATH", 1, 3)
            .with_teacher("Park")
            .with_slot(slot(Weekday::Wed, 1))
            .with_student("C"),
        Section::new("ENG", 1, 1)
            .with_teacher("Choi")
            .with_slot(slot(Weekday::Mon, 2))
            .with_student("A")
            .with_student("B"),
        Section::new("ENG", 1, 2)
            .with_teacher("Jung")
            .with_slot(slot(Weekday::Tue, 2))
            .with_student("C"),
    ])
}

pub fn shared(catalog: InMemoryCatalog) -> Arc<dyn Catalog> {
    Arc::new(catalog)
}

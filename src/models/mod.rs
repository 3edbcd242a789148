//! Timetable domain models.
//!
//! Provides the value types the trade engine reasons about. Sections are
//! immutable snapshots read from a catalog; schedules and moves are cheap
//! values that search branches clone freely.
//!
//! # Domain Mappings
//!
//! | u-trade | School | Graph view |
//! |---------|--------|------------|
//! | Section | One offering of a lecture | Node |
//! | ClassMove | Student switches offering | Directed edge |
//! | Schedule | A student's timetable | One node per graph |
//! | LectureKey | Lecture within a grade | One section graph |

mod class_move;
mod schedule;
mod section;

pub use class_move::ClassMove;
pub use schedule::Schedule;
pub use section::{LectureKey, Section, SectionKey, TimeSlot, Weekday};

//! Candidate extensions for loose ends.
//!
//! A loose end whose tail joins section `t` left `t` one student over.
//! An extension takes a not-yet-involved student currently in `t` to a
//! section of the same lecture that no move has joined yet. Because that
//! move can break the student's timetable, a bounded local sub-search may
//! also move the student in other lectures the trade already touches.
//!
//! # Ordering
//! Candidates that are conflict-free with the extending move alone come
//! first; candidates needing extra moves follow. Ordering affects only
//! the order trades are found in.

use log::trace;

use super::CancellationToken;
use crate::models::{ClassMove, LectureKey, Schedule};
use crate::trade::{LooseEnd, TradeCapture};

/// One way to extend a loose end.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The newly involved student.
    pub student_id: String,
    /// The extending move first, then any extra moves of the same student.
    pub moves: Vec<ClassMove>,
    /// The student's schedule after all of `moves`.
    pub schedule: Schedule,
}

/// Enumerates conflict-free extensions of one loose end.
///
/// `max_lecture_moves` bounds the moves per candidate, the extending move
/// included. Returns nothing once `cancel` is signalled.
pub fn candidates_for(
    capture: &TradeCapture,
    loose_end: &LooseEnd,
    max_lecture_moves: usize,
    cancel: &CancellationToken,
) -> Vec<Candidate> {
    let tail = &loose_end.tail;
    let lecture = tail.lecture_key();
    let catalog = capture.catalog().as_ref();

    let targeted = capture.targeted_numbers(&lecture);
    let destinations: Vec<u32> = catalog
        .section_numbers(&lecture)
        .into_iter()
        .filter(|n| !targeted.contains(n))
        .collect();

    let Ok(roster) = capture.enroll_list_of(&tail.to_key()) else {
        return Vec::new();
    };
    let involved = capture.involved_students();
    let students: Vec<&String> = roster
        .iter()
        .filter(|s| !involved.contains(s.as_str()))
        .collect();

    let other_lectures: Vec<LectureKey> = capture
        .involved_lectures()
        .into_iter()
        .filter(|l| *l != lecture)
        .collect();
    let extra_budget = max_lecture_moves.saturating_sub(1);

    let mut immediate = Vec::new();
    let mut adjusted = Vec::new();

    for &destination in &destinations {
        for &student in &students {
            if cancel.is_cancelled() {
                return Vec::new();
            }

            let primary = ClassMove::new(
                student.as_str(),
                tail.lecture_code.as_str(),
                tail.grade,
                tail.number_to,
                destination,
            );
            let swapped = match capture
                .schedule_of(student)
                .and_then(|s| s.replace_section(catalog, &tail.lecture_code, destination))
            {
                Ok(s) => s,
                Err(e) => {
                    trace!("skipping {primary}: {e}");
                    continue;
                }
            };

            let mut found = Vec::new();
            local_adjustments(
                capture,
                &other_lectures,
                0,
                extra_budget,
                student,
                swapped,
                vec![primary],
                &mut found,
            );

            for candidate in found {
                if candidate.moves.len() == 1 {
                    immediate.push(candidate);
                } else {
                    adjusted.push(candidate);
                }
            }
        }
    }

    immediate.extend(adjusted);
    immediate
}

/// Depth-first over `lectures[idx..]`: leave each lecture alone or move
/// the student to another untargeted section of it, while `budget` lasts.
/// Every conflict-free leaf becomes a candidate.
#[allow(clippy::too_many_arguments)]
fn local_adjustments(
    capture: &TradeCapture,
    lectures: &[LectureKey],
    idx: usize,
    budget: usize,
    student: &str,
    schedule: Schedule,
    moves: Vec<ClassMove>,
    found: &mut Vec<Candidate>,
) {
    if idx == lectures.len() {
        if !schedule.conflicts() {
            found.push(Candidate {
                student_id: student.to_string(),
                moves,
                schedule,
            });
        }
        return;
    }

    let lecture = &lectures[idx];

    if budget > 0 {
        let held = schedule
            .section_for(&lecture.lecture_code)
            .filter(|s| s.grade == lecture.grade)
            .map(|s| s.number);
        if let Some(current) = held {
            let catalog = capture.catalog().as_ref();
            let targeted = capture.targeted_numbers(lecture);
            for number in catalog.section_numbers(lecture) {
                if number == current || targeted.contains(&number) {
                    continue;
                }
                let Ok(next) = schedule.replace_section(catalog, &lecture.lecture_code, number)
                else {
                    continue;
                };
                let mut next_moves = moves.clone();
                next_moves.push(ClassMove::new(
                    student,
                    lecture.lecture_code.as_str(),
                    lecture.grade,
                    current,
                    number,
                ));
                local_adjustments(
                    capture,
                    lectures,
                    idx + 1,
                    budget - 1,
                    student,
                    next,
                    next_moves,
                    found,
                );
            }
        }
    }

    local_adjustments(capture, lectures, idx + 1, budget, student, schedule, moves, found);
}

//! Trade capture: the transactional move ledger.
//!
//! A `TradeCapture` records applied `ClassMove`s in order and keeps two
//! derived caches: each touched student's effective schedule and each
//! touched section's effective roster. Entries appear only when an
//! applied move touches them; reads of untouched students or sections
//! fall through to the catalog without populating anything.
//!
//! # Invariants
//! - The effective schedule of student X equals X's catalog schedule with
//!   every applied move of X replayed, in ledger order.
//! - `pop(n)` after `n` successful `add`s restores the ledger and both
//!   caches exactly.
//! - `add` is atomic: on error nothing changes.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use super::cycles::is_set_of_cycles;
use crate::catalog::Catalog;
use crate::error::{InvalidMoveReason, Result, TradeError};
use crate::models::{ClassMove, LectureKey, Schedule, SectionKey};

/// An ordered, append-only ledger of applied moves with cached state.
///
/// Cloning copies the ledger and both caches (schedules share their
/// sections), so each search branch can own an independent capture.
#[derive(Clone)]
pub struct TradeCapture {
    catalog: Arc<dyn Catalog>,
    moves: Vec<ClassMove>,
    schedules: HashMap<String, Schedule>,
    enrollments: HashMap<SectionKey, Vec<String>>,
    undo: Vec<UndoRecord>,
}

/// Cache entries overwritten by one `add`, for `pop`.
#[derive(Debug, Clone)]
struct UndoRecord {
    schedule: Option<Schedule>,
    from_roster: Option<Vec<String>>,
    to_roster: Option<Vec<String>>,
}

impl TradeCapture {
    /// Creates an empty capture over the catalog.
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            catalog,
            moves: Vec::new(),
            schedules: HashMap::new(),
            enrollments: HashMap::new(),
            undo: Vec::new(),
        }
    }

    /// Creates a capture and applies `moves` in order.
    ///
    /// # Errors
    /// The first rejected move's error; nothing is applied in that case.
    pub fn with_moves(
        catalog: Arc<dyn Catalog>,
        moves: impl IntoIterator<Item = ClassMove>,
    ) -> Result<Self> {
        let mut capture = Self::new(catalog);
        capture.add_all(moves)?;
        Ok(capture)
    }

    /// The catalog this capture reads baseline state from.
    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    /// Applies one move.
    ///
    /// The move must be valid (both endpoints exist) and its student must
    /// currently be on the source section's effective roster. On success
    /// the student's schedule swaps sections, the student leaves the
    /// source roster, joins the destination roster, and the move is
    /// appended to the ledger.
    ///
    /// # Errors
    /// `TradeError::InvalidMove`; the capture is left unchanged.
    pub fn add(&mut self, mv: ClassMove) -> Result<()> {
        if !mv.is_valid(self.catalog.as_ref()) {
            return Err(invalid(mv, InvalidMoveReason::UnknownSection));
        }

        let from_key = mv.from_key();
        let to_key = mv.to_key();

        let mut from_roster = match self.enroll_list_of(&from_key) {
            Ok(roster) => roster,
            Err(_) => return Err(invalid(mv, InvalidMoveReason::UnknownSection)),
        };
        let Some(pos) = from_roster.iter().position(|s| *s == mv.student_id) else {
            return Err(invalid(mv, InvalidMoveReason::NotEnrolled));
        };

        let current = match self.schedule_of(&mv.student_id) {
            Ok(schedule) if schedule.holds(&from_key) => schedule,
            _ => return Err(invalid(mv, InvalidMoveReason::LectureNotHeld)),
        };
        let next = match current.replace_section(
            self.catalog.as_ref(),
            &mv.lecture_code,
            mv.number_to,
        ) {
            Ok(next) => next,
            Err(_) => return Err(invalid(mv, InvalidMoveReason::LectureNotHeld)),
        };

        from_roster.remove(pos);
        let mut to_roster = if to_key == from_key {
            from_roster.clone()
        } else {
            match self.enroll_list_of(&to_key) {
                Ok(roster) => roster,
                Err(_) => return Err(invalid(mv, InvalidMoveReason::UnknownSection)),
            }
        };
        to_roster.push(mv.student_id.clone());

        // Nothing below can fail.
        let record = UndoRecord {
            schedule: self.schedules.insert(mv.student_id.clone(), next),
            from_roster: self.enrollments.insert(from_key, from_roster),
            to_roster: self.enrollments.insert(to_key, to_roster),
        };
        self.undo.push(record);
        self.moves.push(mv);
        Ok(())
    }

    /// Applies moves in order, all or nothing.
    ///
    /// # Errors
    /// The first rejected move's error; moves applied before it are popped.
    pub fn add_all(&mut self, moves: impl IntoIterator<Item = ClassMove>) -> Result<()> {
        let mut applied = 0;
        for mv in moves {
            if let Err(e) = self.add(mv) {
                self.pop(applied);
                return Err(e);
            }
            applied += 1;
        }
        Ok(())
    }

    /// Reverts the last `n` applied moves (fewer if the ledger is shorter).
    ///
    /// Returns the reverted moves in ledger order.
    pub fn pop(&mut self, n: usize) -> Vec<ClassMove> {
        let mut popped = Vec::with_capacity(n.min(self.moves.len()));
        for _ in 0..n {
            let (Some(mv), Some(record)) = (self.moves.pop(), self.undo.pop()) else {
                break;
            };
            // Reverse order of `add`, so from == to restores correctly.
            restore(&mut self.enrollments, mv.to_key(), record.to_roster);
            restore(&mut self.enrollments, mv.from_key(), record.from_roster);
            restore(&mut self.schedules, mv.student_id.clone(), record.schedule);
            popped.push(mv);
        }
        popped.reverse();
        popped
    }

    /// Applied moves, in ledger order.
    pub fn moves(&self) -> &[ClassMove] {
        &self.moves
    }

    /// Number of applied moves.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Whether no move has been applied.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Whether the moves of every lecture decompose into disjoint cycles.
    pub fn does_form_trade(&self) -> bool {
        self.moves_by_lecture()
            .values()
            .all(|group| is_set_of_cycles(group.iter().copied()))
    }

    /// The student's effective schedule.
    ///
    /// # Errors
    /// `UnknownStudent` if neither the cache nor the catalog knows them.
    pub fn schedule_of(&self, student_id: &str) -> Result<Schedule> {
        if let Some(schedule) = self.schedules.get(student_id) {
            return Ok(schedule.clone());
        }
        self.catalog
            .schedule_of(student_id)
            .ok_or_else(|| TradeError::UnknownStudent(student_id.to_string()))
    }

    /// The section's effective roster.
    ///
    /// # Errors
    /// `UnknownSection` if the catalog has no such section.
    pub fn enroll_list_of(&self, key: &SectionKey) -> Result<Vec<String>> {
        if let Some(roster) = self.enrollments.get(key) {
            return Ok(roster.clone());
        }
        self.catalog
            .enrollment_of(key)
            .ok_or_else(|| TradeError::UnknownSection(key.clone()))
    }

    /// Whether the student has any applied move.
    pub fn involves(&self, student_id: &str) -> bool {
        self.moves.iter().any(|m| m.student_id == student_id)
    }

    /// Students with at least one applied move, ordered.
    pub fn involved_students(&self) -> BTreeSet<&str> {
        self.moves.iter().map(|m| m.student_id.as_str()).collect()
    }

    /// Effective schedules of all involved students.
    pub fn affected_schedules(&self) -> BTreeMap<&str, &Schedule> {
        self.schedules
            .iter()
            .filter(|(id, _)| self.involves(id))
            .map(|(id, s)| (id.as_str(), s))
            .collect()
    }

    /// Moves grouped by lecture, each group in ledger order.
    pub fn moves_by_lecture(&self) -> BTreeMap<LectureKey, Vec<&ClassMove>> {
        let mut groups: BTreeMap<LectureKey, Vec<&ClassMove>> = BTreeMap::new();
        for mv in &self.moves {
            groups.entry(mv.lecture_key()).or_default().push(mv);
        }
        groups
    }

    /// Section numbers of a lecture already joined by some move.
    pub fn targeted_numbers(&self, lecture: &LectureKey) -> BTreeSet<u32> {
        self.moves
            .iter()
            .filter(|m| m.lecture_code == lecture.lecture_code && m.grade == lecture.grade)
            .map(|m| m.number_to)
            .collect()
    }

    /// Lectures with at least one applied move.
    pub fn involved_lectures(&self) -> BTreeSet<LectureKey> {
        self.moves.iter().map(ClassMove::lecture_key).collect()
    }
}

fn invalid(mv: ClassMove, reason: InvalidMoveReason) -> TradeError {
    TradeError::InvalidMove { mv, reason }
}

fn restore<K: Hash + Eq, V>(map: &mut HashMap<K, V>, key: K, previous: Option<V>) {
    match previous {
        Some(value) => {
            map.insert(key, value);
        }
        None => {
            map.remove(&key);
        }
    }
}

impl PartialEq for TradeCapture {
    /// Compares ledgers and caches; the catalog handle is not compared.
    fn eq(&self, other: &Self) -> bool {
        self.moves == other.moves
            && self.schedules == other.schedules
            && self.enrollments == other.enrollments
    }
}

impl fmt::Debug for TradeCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradeCapture")
            .field("moves", &self.moves)
            .field("schedules", &self.schedules.len())
            .field("enrollments", &self.enrollments.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{school_catalog, shared};
    use proptest::prelude::*;

    fn capture() -> TradeCapture {
        TradeCapture::new(shared(school_catalog()))
    }

    fn math(student: &str, from: u32, to: u32) -> ClassMove {
        ClassMove::new(student, "MATH", 1, from, to)
    }

    #[test]
    fn test_add_updates_caches() {
        let mut c = capture();
        c.add(math("A", 1, 2)).unwrap();

        assert_eq!(c.len(), 1);
        assert!(c.schedule_of("A").unwrap().holds(&SectionKey::new("MATH", 1, 2)));
        assert!(c.enroll_list_of(&SectionKey::new("MATH", 1, 1)).unwrap().is_empty());
        assert_eq!(
            c.enroll_list_of(&SectionKey::new("MATH", 1, 2)).unwrap(),
            vec!["B".to_string(), "A".to_string()]
        );
        // Untouched entries come from the catalog.
        assert!(c.schedule_of("C").unwrap().holds(&SectionKey::new("MATH", 1, 3)));
    }

    #[test]
    fn test_add_rejects_unknown_endpoint() {
        let mut c = capture();
        let err = c.add(math("A", 1, 9)).unwrap_err();
        assert_eq!(
            err,
            TradeError::InvalidMove {
                mv: math("A", 1, 9),
                reason: InvalidMoveReason::UnknownSection
            }
        );
        assert!(c.is_empty());
    }

    #[test]
    fn test_add_rejects_non_enrolled() {
        let mut c = capture();
        let err = c.add(math("B", 1, 3)).unwrap_err();
        assert!(matches!(
            err,
            TradeError::InvalidMove {
                reason: InvalidMoveReason::NotEnrolled,
                ..
            }
        ));
        assert_eq!(c, capture());
    }

    #[test]
    fn test_add_uses_effective_roster() {
        let mut c = capture();
        c.add(math("A", 1, 2)).unwrap();
        // A has left section 1, so moving A out of it again fails.
        assert!(c.add(math("A", 1, 3)).is_err());
        // But A can now leave section 2.
        c.add(math("A", 2, 3)).unwrap();
        assert!(c.schedule_of("A").unwrap().holds(&SectionKey::new("MATH", 1, 3)));
    }

    #[test]
    fn test_pop_restores_exactly() {
        let mut c = capture();
        c.add(math("A", 1, 2)).unwrap();
        let before = c.clone();

        c.add(math("B", 2, 1)).unwrap();
        c.add(ClassMove::new("C", "ENG", 1, 2, 1)).unwrap();
        let popped = c.pop(2);

        assert_eq!(popped, vec![math("B", 2, 1), ClassMove::new("C", "ENG", 1, 2, 1)]);
        assert_eq!(c, before);
    }

    #[test]
    fn test_pop_to_empty_matches_fresh() {
        let mut c = capture();
        c.add(math("A", 1, 2)).unwrap();
        c.add(math("B", 2, 1)).unwrap();
        assert_eq!(c.pop(10).len(), 2);
        assert_eq!(c, capture());
    }

    #[test]
    fn test_same_section_move_round_trips() {
        let mut c = capture();
        c.add(ClassMove::new("A", "ENG", 1, 1, 1)).unwrap();
        assert_eq!(
            c.enroll_list_of(&SectionKey::new("ENG", 1, 1)).unwrap(),
            vec!["B".to_string(), "A".to_string()]
        );
        c.pop(1);
        assert_eq!(c, capture());
    }

    #[test]
    fn test_clone_isolation() {
        let mut original = capture();
        original.add(math("A", 1, 2)).unwrap();
        let snapshot = original.clone();

        let mut branch = original.clone();
        branch.add(math("B", 2, 3)).unwrap();
        branch.pop(2);

        assert_eq!(original, snapshot);
        assert!(original
            .schedule_of("A")
            .unwrap()
            .holds(&SectionKey::new("MATH", 1, 2)));
    }

    #[test]
    fn test_add_all_is_atomic() {
        let mut c = capture();
        let err = c
            .add_all(vec![math("A", 1, 2), math("B", 2, 1), math("C", 1, 3)])
            .unwrap_err();
        assert!(err.is_invalid_move());
        assert_eq!(c, capture());
    }

    #[test]
    fn test_does_form_trade() {
        let mut c = capture();
        assert!(c.does_form_trade());
        c.add(math("A", 1, 2)).unwrap();
        assert!(!c.does_form_trade());
        c.add(math("B", 2, 1)).unwrap();
        assert!(c.does_form_trade());
        c.add(ClassMove::new("C", "ENG", 1, 2, 1)).unwrap();
        assert!(!c.does_form_trade());
    }

    #[test]
    fn test_involvement_queries() {
        let mut c = capture();
        c.add(math("A", 1, 2)).unwrap();
        c.add(math("B", 2, 3)).unwrap();
        assert!(c.involves("A"));
        assert!(!c.involves("C"));
        assert_eq!(c.involved_students().into_iter().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(
            c.targeted_numbers(&LectureKey::new("MATH", 1)).into_iter().collect::<Vec<_>>(),
            vec![2, 3]
        );
        assert_eq!(c.affected_schedules().len(), 2);
        assert_eq!(c.involved_lectures().len(), 1);
    }

    #[test]
    fn test_unknown_student_schedule() {
        let c = capture();
        assert_eq!(
            c.schedule_of("ghost").unwrap_err(),
            TradeError::UnknownStudent("ghost".into())
        );
    }

    const STUDENTS: [&str; 3] = ["A", "B", "C"];
    const LECTURES: [&str; 2] = ["MATH", "ENG"];

    /// Section 4 exists in neither lecture and ENG has no section 3, so
    /// generated sequences mix valid and rejected moves.
    fn arb_move() -> impl Strategy<Value = ClassMove> {
        (0usize..3, 0usize..2, 1u32..5, 1u32..5).prop_map(|(s, l, from, to)| {
            ClassMove::new(STUDENTS[s], LECTURES[l], 1, from, to)
        })
    }

    /// The student's catalog schedule with their ledger moves replayed.
    fn replayed(c: &TradeCapture, student: &str) -> Schedule {
        let catalog = c.catalog().as_ref();
        c.moves()
            .iter()
            .filter(|m| m.student_id == student)
            .fold(catalog.schedule_of(student).unwrap(), |s, m| {
                s.replace_section(catalog, &m.lecture_code, m.number_to)
                    .unwrap()
            })
    }

    proptest! {
        #[test]
        fn prop_schedules_match_ledger_replay(
            moves in prop::collection::vec(arb_move(), 0..16)
        ) {
            let mut c = capture();
            for mv in moves {
                let before = c.clone();
                if c.add(mv).is_err() {
                    prop_assert_eq!(&c, &before);
                }
                for student in STUDENTS {
                    prop_assert_eq!(c.schedule_of(student).unwrap(), replayed(&c, student));
                }
            }
        }

        #[test]
        fn prop_pop_restores_snapshot_and_clones_are_isolated(
            prefix in prop::collection::vec(arb_move(), 0..8),
            suffix in prop::collection::vec(arb_move(), 0..12)
        ) {
            let mut original = capture();
            for mv in prefix {
                let _ = original.add(mv);
            }
            let snapshot = original.clone();

            let mut branch = original.clone();
            let mut applied = 0;
            for mv in suffix {
                if branch.add(mv).is_ok() {
                    applied += 1;
                }
            }
            prop_assert_eq!(&original, &snapshot);

            let popped = branch.pop(applied);
            prop_assert_eq!(popped.len(), applied);
            prop_assert_eq!(&branch, &snapshot);
        }
    }
}

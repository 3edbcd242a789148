//! Per-student view of a completed trade.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::TradeCapture;
use crate::models::{ClassMove, SectionKey};

/// A completed trade, grouped for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeReport {
    /// All moves, in ledger order.
    pub moves: Vec<ClassMove>,
    /// Moves per student, each list in ledger order.
    pub moves_by_student: BTreeMap<String, Vec<ClassMove>>,
    /// Resulting sections per involved student.
    pub resulting_sections: BTreeMap<String, Vec<SectionKey>>,
}

impl TradeReport {
    /// Builds a report from a capture.
    pub fn from_capture(capture: &TradeCapture) -> Self {
        let mut moves_by_student: BTreeMap<String, Vec<ClassMove>> = BTreeMap::new();
        for mv in capture.moves() {
            moves_by_student
                .entry(mv.student_id.clone())
                .or_default()
                .push(mv.clone());
        }

        let resulting_sections = capture
            .affected_schedules()
            .into_iter()
            .map(|(id, schedule)| (id.to_string(), schedule.keys().into_iter().collect()))
            .collect();

        Self {
            moves: capture.moves().to_vec(),
            moves_by_student,
            resulting_sections,
        }
    }

    /// Number of students taking part.
    pub fn student_count(&self) -> usize {
        self.moves_by_student.len()
    }
}

impl From<&TradeCapture> for TradeReport {
    fn from(capture: &TradeCapture) -> Self {
        Self::from_capture(capture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{school_catalog, shared};

    #[test]
    fn test_report_groups_by_student() {
        let capture = TradeCapture::with_moves(
            shared(school_catalog()),
            vec![
                ClassMove::new("A", "MATH", 1, 1, 2),
                ClassMove::new("C", "ENG", 1, 2, 1),
                ClassMove::new("B", "MATH", 1, 2, 1),
                ClassMove::new("A", "ENG", 1, 1, 2),
            ],
        )
        .unwrap();
        let report = TradeReport::from(&capture);

        assert_eq!(report.moves.len(), 4);
        assert_eq!(report.student_count(), 3);
        assert_eq!(report.moves_by_student["A"].len(), 2);
        assert_eq!(report.moves_by_student["A"][0].lecture_code, "MATH");
        assert_eq!(
            report.resulting_sections["A"],
            vec![SectionKey::new("ENG", 1, 2), SectionKey::new("MATH", 1, 2)]
        );
    }

    #[test]
    fn test_report_serializes() {
        let capture = TradeCapture::with_moves(
            shared(school_catalog()),
            vec![
                ClassMove::new("A", "MATH", 1, 1, 2),
                ClassMove::new("B", "MATH", 1, 2, 1),
            ],
        )
        .unwrap();
        let report = TradeReport::from_capture(&capture);
        let json = serde_json::to_string(&report).unwrap();
        let back: TradeReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
        assert!(json.contains("\"moves_by_student\""));
    }
}

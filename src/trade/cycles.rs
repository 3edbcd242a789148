//! Cycle analysis over the move ledger.
//!
//! Within one lecture, each move is the edge `number_from -> number_to` on
//! the section graph. A set of moves is a settled trade for that lecture
//! when its edges decompose into vertex-disjoint simple cycles: every
//! student leaving a section is replaced by exactly one arriving student.
//!
//! # Algorithm
//! Pick any unconsumed move as a root, follow `number_to -> number_from`
//! links, consuming each move, until the walk returns to the root's
//! `number_from`. A dead end or a repeated endpoint fails the set.
//! Open walks are extended backwards as well to find their loose ends.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::TradeCapture;
use crate::models::ClassMove;

/// The open endpoints of a maximal move chain that is not yet a cycle.
///
/// `head.number_from` is the section that still needs an arriving
/// student; `tail.number_to` is the section that still needs a leaving one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LooseEnd {
    /// First move of the chain.
    pub head: ClassMove,
    /// Last move of the chain.
    pub tail: ClassMove,
}

/// Whether the moves (all of one lecture) decompose into vertex-disjoint
/// simple cycles that use every move exactly once.
///
/// The empty set is trivially a set of cycles.
///
/// # Complexity
/// O(n²) in the number of moves.
pub fn is_set_of_cycles<'a>(moves: impl IntoIterator<Item = &'a ClassMove>) -> bool {
    let mut pool: Vec<&ClassMove> = moves.into_iter().collect();

    // Disjoint simple cycles leave and enter each section at most once.
    let mut sources = HashSet::new();
    let mut sinks = HashSet::new();
    for mv in &pool {
        if !sources.insert(mv.number_from) || !sinks.insert(mv.number_to) {
            return false;
        }
    }

    while !pool.is_empty() {
        let root = pool.remove(0);
        let mut at = root.number_to;
        while at != root.number_from {
            match pool.iter().position(|m| m.number_from == at) {
                Some(i) => at = pool.remove(i).number_to,
                None => return false,
            }
        }
    }
    true
}

/// Loose ends of every lecture whose moves are not yet a set of cycles.
///
/// Each move belongs to exactly one chain or closed cycle; closed cycles
/// inside an unsettled lecture yield nothing. Results are ordered by
/// lecture, then by the ledger position of each chain's first-seen move.
pub fn head_tail_tuples_of_noncycles(capture: &TradeCapture) -> Vec<LooseEnd> {
    capture
        .moves_by_lecture()
        .into_values()
        .filter(|group| !is_set_of_cycles(group.iter().copied()))
        .flat_map(open_chains)
        .collect()
}

fn open_chains(mut pool: Vec<&ClassMove>) -> Vec<LooseEnd> {
    let mut ends = Vec::new();

    while !pool.is_empty() {
        let root = pool.remove(0);

        let mut tail = root;
        let mut closed = root.number_to == root.number_from;
        while !closed {
            match pool.iter().position(|m| m.number_from == tail.number_to) {
                Some(i) => {
                    tail = pool.remove(i);
                    closed = tail.number_to == root.number_from;
                }
                None => break,
            }
        }
        if closed {
            continue;
        }

        let mut head = root;
        while let Some(i) = pool.iter().position(|m| m.number_to == head.number_from) {
            head = pool.remove(i);
        }

        ends.push(LooseEnd {
            head: head.clone(),
            tail: tail.clone(),
        });
    }

    ends
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{school_catalog, shared};
    use proptest::prelude::*;

    fn mv(student: &str, from: u32, to: u32) -> ClassMove {
        ClassMove::new(student, "MATH", 1, from, to)
    }

    #[test]
    fn test_two_cycle() {
        let moves = [mv("A", 1, 2), mv("B", 2, 1)];
        assert!(is_set_of_cycles(&moves));
    }

    #[test]
    fn test_open_chain() {
        let moves = [mv("A", 1, 2), mv("B", 2, 3)];
        assert!(!is_set_of_cycles(&moves));
    }

    #[test]
    fn test_two_disjoint_cycles() {
        let moves = [mv("A", 1, 2), mv("C", 3, 4), mv("B", 2, 1), mv("D", 4, 3)];
        assert!(is_set_of_cycles(&moves));
    }

    #[test]
    fn test_cycles_sharing_a_section_are_rejected() {
        let moves = [mv("A", 1, 2), mv("B", 2, 1), mv("C", 1, 3), mv("D", 3, 1)];
        assert!(!is_set_of_cycles(&moves));
    }

    #[test]
    fn test_self_loop_and_empty() {
        assert!(is_set_of_cycles(&[mv("A", 2, 2)]));
        assert!(is_set_of_cycles(&[] as &[ClassMove]));
    }

    #[test]
    fn test_cycle_with_leftover() {
        let moves = [mv("A", 1, 2), mv("B", 2, 1), mv("C", 3, 4)];
        assert!(!is_set_of_cycles(&moves));
    }

    fn capture_with(moves: Vec<ClassMove>) -> TradeCapture {
        TradeCapture::with_moves(shared(school_catalog()), moves).unwrap()
    }

    #[test]
    fn test_loose_ends_of_chain() {
        // A: 1->2, B: 2->3 leaves section 1 short and section 3 over.
        let c = capture_with(vec![mv("B", 2, 3), mv("A", 1, 2)]);
        let ends = head_tail_tuples_of_noncycles(&c);
        assert_eq!(
            ends,
            vec![LooseEnd {
                head: mv("A", 1, 2),
                tail: mv("B", 2, 3)
            }]
        );
    }

    #[test]
    fn test_loose_ends_skip_settled_lectures() {
        let c = capture_with(vec![
            mv("A", 1, 2),
            mv("B", 2, 1),
            ClassMove::new("C", "ENG", 1, 2, 1),
        ]);
        let ends = head_tail_tuples_of_noncycles(&c);
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].head, ClassMove::new("C", "ENG", 1, 2, 1));
        assert_eq!(ends[0].tail, ends[0].head);
    }

    #[test]
    fn test_no_loose_ends_for_trade() {
        let c = capture_with(vec![mv("A", 1, 2), mv("B", 2, 1)]);
        assert!(head_tail_tuples_of_noncycles(&c).is_empty());
    }

    #[test]
    fn test_closed_cycle_inside_open_lecture_yields_nothing() {
        let ends = open_chains(vec![
            &mv("A", 1, 2),
            &mv("B", 2, 1),
            &mv("C", 3, 4),
        ]);
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].head, mv("C", 3, 4));
    }

    /// Reference decision: in/out degree at most one everywhere and equal
    /// at every section.
    fn degrees_balanced(edges: &[(u32, u32)]) -> bool {
        let mut out = std::collections::HashMap::new();
        let mut inn = std::collections::HashMap::new();
        for &(f, t) in edges {
            *out.entry(f).or_insert(0) += 1;
            *inn.entry(t).or_insert(0) += 1;
        }
        out.values().all(|&d| d == 1)
            && inn.values().all(|&d| d == 1)
            && out.keys().all(|k| inn.contains_key(k))
            && inn.keys().all(|k| out.contains_key(k))
    }

    proptest! {
        #[test]
        fn prop_matches_degree_characterisation(
            edges in prop::collection::vec((1u32..6, 1u32..6), 0..8)
        ) {
            let moves: Vec<ClassMove> = edges
                .iter()
                .enumerate()
                .map(|(i, &(f, t))| mv(&format!("S{i}"), f, t))
                .collect();
            prop_assert_eq!(is_set_of_cycles(&moves), degrees_balanced(&edges));
        }

        #[test]
        fn prop_permuted_cycle_is_accepted(len in 1usize..7, rotate in 0usize..7) {
            let mut moves: Vec<ClassMove> = (0..len)
                .map(|i| mv(&format!("S{i}"), i as u32 + 1, ((i + 1) % len) as u32 + 1))
                .collect();
            moves.rotate_left(rotate % len);
            moves.reverse();
            prop_assert!(is_set_of_cycles(&moves));
            if len > 1 {
                moves.pop();
                prop_assert!(!is_set_of_cycles(&moves));
            }
        }
    }
}

//! Search bounds and targets.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::Schedule;

/// Bounds and parallelism for a trade search.
///
/// # Example
/// ```
/// use u_trade::search::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_max_depth(4)
///     .with_threads(2);
/// assert_eq!(config.max_depth, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum recursion depth. Partial trades at this depth are dropped.
    pub max_depth: usize,
    /// Maximum lectures one newly involved student may move in a single
    /// expansion step (the extending move included).
    pub max_lecture_moves_per_student: usize,
    /// Worker threads for top-level batches.
    pub threads: usize,
    /// Cartesian combinations per batch. `None` splits the top-level
    /// combinations evenly over `threads`.
    pub batch_size: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_lecture_moves_per_student: 2,
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            batch_size: None,
        }
    }
}

impl SearchConfig {
    /// Sets the maximum depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the per-student lecture move bound.
    pub fn with_max_lecture_moves_per_student(mut self, max: usize) -> Self {
        self.max_lecture_moves_per_student = max;
        self
    }

    /// Sets the worker thread count (at least 1).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Sets a fixed batch size (at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size.max(1));
        self
    }
}

/// Lectures of the origin student that are exempt from conflict checks.
///
/// The origin is the student who asked for the trade. Lectures they did
/// not select for trading may overlap in the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginExemption {
    /// The origin student.
    pub student_id: String,
    /// Lecture codes whose conflicts are ignored.
    pub ignored_lectures: BTreeSet<String>,
}

impl OriginExemption {
    /// Creates an exemption with no ignored lectures.
    pub fn new(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            ignored_lectures: BTreeSet::new(),
        }
    }

    /// Ignores conflicts of one lecture.
    pub fn with_ignored_lecture(mut self, lecture_code: impl Into<String>) -> Self {
        self.ignored_lectures.insert(lecture_code.into());
        self
    }
}

/// Desired schedules that a trade must reach, plus the origin exemption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchTargets {
    targets: BTreeMap<String, Schedule>,
    origin: Option<OriginExemption>,
}

impl SearchTargets {
    /// Creates empty targets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `student_id` to end with `desired`.
    pub fn with_target(mut self, student_id: impl Into<String>, desired: Schedule) -> Self {
        self.targets.insert(student_id.into(), desired);
        self
    }

    /// Sets the origin exemption.
    pub fn with_origin(mut self, origin: OriginExemption) -> Self {
        self.origin = Some(origin);
        self
    }

    /// The desired schedule of a student.
    pub fn get(&self, student_id: &str) -> Option<&Schedule> {
        self.targets.get(student_id)
    }

    /// Targets ordered by student id.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Schedule)> {
        self.targets.iter()
    }

    /// The origin exemption, if any.
    pub fn origin(&self) -> Option<&OriginExemption> {
        self.origin.as_ref()
    }

    /// Number of targeted students.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no student is targeted.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// A copy with additional targets.
    pub fn extended(&self, additions: impl IntoIterator<Item = (String, Schedule)>) -> Self {
        let mut next = self.clone();
        next.targets.extend(additions);
        next
    }
}

//! Timetable quality metrics (KPIs).
//!
//! Computes compactness indicators for one student's weekly timetable,
//! used to compare a trade's resulting schedules with the current ones.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Held periods | Distinct (day, period) slots with a class |
//! | Active days | Days with at least one class |
//! | Empty periods | Free periods between a day's first and last class |
//! | Last-period days | Days whose last class is in the final period |
//! | Compactness | Held periods / periods spanned, over all days |

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Schedule, Weekday};

/// Timetable performance indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableKpi {
    /// Distinct occupied slots.
    pub held_periods: usize,
    /// Days with at least one class.
    pub active_days: usize,
    /// Free periods enclosed by classes on the same day.
    pub empty_periods: usize,
    /// Days that run until `periods_per_day`.
    pub last_period_days: usize,
    /// `held_periods / spanned periods` (1.0 for an empty timetable).
    pub compactness: f64,
    /// Empty periods per day.
    pub empty_by_day: BTreeMap<Weekday, usize>,
}

impl TimetableKpi {
    /// Computes KPIs for a schedule.
    ///
    /// # Arguments
    /// * `schedule` - The timetable to measure.
    /// * `periods_per_day` - Number of the final period of a school day.
    pub fn calculate(schedule: &Schedule, periods_per_day: u8) -> Self {
        let mut by_day: BTreeMap<Weekday, BTreeSet<u8>> = BTreeMap::new();
        for section in schedule.sections() {
            for slot in &section.time_slots {
                by_day.entry(slot.weekday).or_default().insert(slot.period);
            }
        }

        let mut held_periods = 0;
        let mut spanned = 0;
        let mut last_period_days = 0;
        let mut empty_by_day = BTreeMap::new();

        for (day, periods) in &by_day {
            let (Some(&first), Some(&last)) = (periods.first(), periods.last()) else {
                continue;
            };
            let span = usize::from(last - first) + 1;
            held_periods += periods.len();
            spanned += span;
            empty_by_day.insert(*day, span - periods.len());
            if last >= periods_per_day {
                last_period_days += 1;
            }
        }

        let compactness = if spanned == 0 {
            1.0
        } else {
            held_periods as f64 / spanned as f64
        };

        Self {
            held_periods,
            active_days: by_day.len(),
            empty_periods: empty_by_day.values().sum(),
            last_period_days,
            compactness,
            empty_by_day,
        }
    }

    /// Whether this timetable is at least as compact as `other`: no more
    /// empty periods and no more days ending on the final period.
    pub fn no_worse_than(&self, other: &TimetableKpi) -> bool {
        self.empty_periods <= other.empty_periods && self.last_period_days <= other.last_period_days
    }
}

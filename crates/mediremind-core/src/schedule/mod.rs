//! Reminder schedule generation.
//!
//! Expands a medication record's frequency and duration templates into
//! concrete dated reminders. Occurrences are a derived view: the record and
//! the catalogs are the source of truth, nothing here is persisted.

mod generator;

pub use generator::{
    end_date, generate, generate_all, next_occurrence, ScheduleWindow, MAX_HORIZON_DAYS,
};

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::catalog::TimeOfDay;

/// One concrete reminder: take `dose_label` of a medication at `date` `time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOccurrence {
    pub medication_id: String,
    pub medication_name: String,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub dose_label: String,
}

impl ReminderOccurrence {
    pub fn at(&self) -> NaiveDateTime {
        self.date.and_time(self.time.as_naive_time())
    }
}

/// Ascending by date, then time, then medication id.
impl Ord for ReminderOccurrence {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.date, self.time, &self.medication_id)
            .cmp(&(other.date, other.time, &other.medication_id))
            .then_with(|| self.dose_label.cmp(&other.dose_label))
            .then_with(|| self.medication_name.cmp(&other.medication_name))
    }
}

impl PartialOrd for ReminderOccurrence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(id: &str, day: u32, hour: u8) -> ReminderOccurrence {
        ReminderOccurrence {
            medication_id: id.into(),
            medication_name: id.to_uppercase(),
            date: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
            time: TimeOfDay::new(hour, 0).unwrap(),
            dose_label: "1 tablet".into(),
        }
    }

    #[test]
    fn orders_by_date_time_then_id() {
        let mut v = vec![occ("b", 2, 9), occ("a", 2, 9), occ("z", 1, 21), occ("a", 1, 21)];
        v.sort();
        let keys: Vec<(u32, &str)> = v
            .iter()
            .map(|o| (chrono::Datelike::day(&o.date), o.medication_id.as_str()))
            .collect();
        assert_eq!(keys, vec![(1, "a"), (1, "z"), (2, "a"), (2, "b")]);
    }

    #[test]
    fn at_combines_date_and_time() {
        let o = occ("a", 3, 15);
        assert_eq!(o.at().to_string(), "2026-02-03 15:00:00");
    }
}

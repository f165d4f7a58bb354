//! Predefined dosing templates.
//!
//! Both catalogs are closed enums: a stored id either resolves to a variant
//! or is rejected with a `ValidationError`, never silently defaulted.

mod duration;
mod frequency;
mod time_of_day;

pub use duration::{Duration, ONGOING_DAYS};
pub use frequency::Frequency;
pub use time_of_day::TimeOfDay;

use serde::Serialize;

/// Flat view of a frequency template for listing.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyTemplate {
    pub id: &'static str,
    pub label: &'static str,
    pub daily_times: Vec<TimeOfDay>,
}

/// Flat view of a duration template for listing.
#[derive(Debug, Clone, Serialize)]
pub struct DurationTemplate {
    pub id: &'static str,
    pub label: &'static str,
    pub days: i32,
}

impl From<Frequency> for FrequencyTemplate {
    fn from(f: Frequency) -> Self {
        Self {
            id: f.id(),
            label: f.label(),
            daily_times: f.daily_times().to_vec(),
        }
    }
}

impl From<Duration> for DurationTemplate {
    fn from(d: Duration) -> Self {
        Self {
            id: d.id(),
            label: d.label(),
            days: d.days(),
        }
    }
}

pub fn frequency_templates() -> Vec<FrequencyTemplate> {
    Frequency::ALL.into_iter().map(Into::into).collect()
}

pub fn duration_templates() -> Vec<DurationTemplate> {
    Duration::ALL.into_iter().map(Into::into).collect()
}

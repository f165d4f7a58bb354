//! Occurrence expansion.
//!
//! ## Window
//!
//! ```text
//! record:  start ───────────────── end      (end = start + days - 1, or unbounded)
//! horizon:        as_of ─────── as_of + horizon_days - 1
//! emitted:        max(start, as_of) ── min(end, horizon end)
//! ```
//!
//! Every function here is pure: no I/O, no clock reads.

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use super::ReminderOccurrence;
use crate::error::ValidationError;
use crate::medication::MedicationRecord;

/// Longest horizon accepted by the generator, about ten years.
pub const MAX_HORIZON_DAYS: u32 = 3660;

/// Inclusive date range that will receive reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleWindow {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl ScheduleWindow {
    /// Intersect a treatment range with a generation horizon.
    ///
    /// Returns `Ok(None)` when the intersection is empty: treatment over
    /// before `as_of`, not started within the horizon, or a zero horizon.
    ///
    /// # Errors
    /// `InvalidValue` for `horizon_days` above [`MAX_HORIZON_DAYS`] or a
    /// horizon end past the last representable date.
    pub fn compute(
        start: NaiveDate,
        end: Option<NaiveDate>,
        as_of: NaiveDate,
        horizon_days: u32,
    ) -> Result<Option<Self>, ValidationError> {
        if horizon_days > MAX_HORIZON_DAYS {
            return Err(horizon_error(format!(
                "{horizon_days} exceeds the maximum of {MAX_HORIZON_DAYS} days"
            )));
        }
        let Some(span) = horizon_days.checked_sub(1) else {
            return Ok(None);
        };
        let horizon_last = as_of
            .checked_add_days(Days::new(u64::from(span)))
            .ok_or_else(|| horizon_error(format!("{horizon_days} days past {as_of} is out of range")))?;

        let first = start.max(as_of);
        let last = end.map_or(horizon_last, |end| end.min(horizon_last));
        Ok((first <= last).then_some(Self { first, last }))
    }

    pub fn day_count(&self) -> u64 {
        (self.last - self.first).num_days() as u64 + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last;
        self.first.iter_days().take_while(move |d| *d <= last)
    }
}

fn horizon_error(message: String) -> ValidationError {
    ValidationError::InvalidValue {
        field: "horizon_days".into(),
        message,
    }
}

/// Last treatment day for a record, `None` when the duration is ongoing.
///
/// # Errors
/// `UnknownDuration` when the record's duration id does not resolve.
pub fn end_date(record: &MedicationRecord) -> Result<Option<NaiveDate>, ValidationError> {
    let duration = record.duration()?;
    Ok(match duration.bounded_days() {
        // A zero-day treatment ends before it starts.
        Some(0) => record.start_date.pred_opt(),
        Some(days) => record
            .start_date
            .checked_add_days(Days::new(u64::from(days) - 1)),
        None => None,
    })
}

/// Expand one record into its reminders within `[as_of, as_of + horizon_days)`.
///
/// Output is ascending by (date, time). Records with reminders disabled or an
/// "as needed" frequency yield nothing.
///
/// # Errors
/// `UnknownFrequency` / `UnknownDuration` when the record's template ids do
/// not resolve. Ids are checked even when reminders are disabled.
/// `InvalidValue` for a horizon above [`MAX_HORIZON_DAYS`].
pub fn generate(
    record: &MedicationRecord,
    as_of: NaiveDate,
    horizon_days: u32,
) -> Result<Vec<ReminderOccurrence>, ValidationError> {
    let frequency = record.frequency()?;
    let end = end_date(record)?;

    if !record.reminders_enabled {
        debug!(medication = %record.id, "reminders disabled, skipping");
        return Ok(Vec::new());
    }

    let times = frequency.daily_times();
    if times.is_empty() {
        return Ok(Vec::new());
    }

    let Some(window) = ScheduleWindow::compute(record.start_date, end, as_of, horizon_days)? else {
        debug!(medication = %record.id, %as_of, horizon_days, "schedule window empty");
        return Ok(Vec::new());
    };

    let mut out = Vec::with_capacity(window.day_count() as usize * times.len());
    for date in window.days() {
        for &time in times {
            out.push(ReminderOccurrence {
                medication_id: record.id.clone(),
                medication_name: record.name.clone(),
                date,
                time,
                dose_label: record.dosage.clone(),
            });
        }
    }

    debug!(
        medication = %record.id,
        first = %window.first,
        last = %window.last,
        count = out.len(),
        "generated reminders"
    );
    Ok(out)
}

/// Expand many records into a single merged, ordered sequence.
///
/// # Errors
/// The first record whose templates do not resolve.
pub fn generate_all(
    records: &[MedicationRecord],
    as_of: NaiveDate,
    horizon_days: u32,
) -> Result<Vec<ReminderOccurrence>, ValidationError> {
    let mut all = Vec::new();
    for record in records {
        all.extend(generate(record, as_of, horizon_days)?);
    }
    all.sort();
    Ok(all)
}

/// First reminder at or after `now` across all records.
///
/// # Errors
/// The first record whose templates do not resolve.
pub fn next_occurrence(
    records: &[MedicationRecord],
    now: NaiveDateTime,
    horizon_days: u32,
) -> Result<Option<ReminderOccurrence>, ValidationError> {
    Ok(generate_all(records, now.date(), horizon_days)?
        .into_iter()
        .find(|o| o.at() >= now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Duration, Frequency, TimeOfDay};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn record(freq: Frequency, dur: Duration, start: NaiveDate) -> MedicationRecord {
        MedicationRecord::new("Amoxicillin", "500mg", freq, dur, start).with_id("amox")
    }

    #[test]
    fn amoxicillin_three_times_daily_for_a_week() {
        let rec = record(Frequency::ThreeTimesDaily, Duration::SevenDays, day(1));
        let occ = generate(&rec, day(1), 30).unwrap();

        assert_eq!(occ.len(), 21);
        assert_eq!(occ.first().unwrap().date, day(1));
        assert_eq!(occ.last().unwrap().date, day(7));
        for (i, chunk) in occ.chunks(3).enumerate() {
            assert!(chunk.iter().all(|o| o.date == day(1 + i as u32)));
            let times: Vec<String> = chunk.iter().map(|o| o.time.to_string()).collect();
            assert_eq!(times, vec!["09:00", "15:00", "21:00"]);
        }
        assert!(occ.windows(2).all(|w| w[0] < w[1]));
        assert!(occ.iter().all(|o| o.dose_label == "500mg"));
    }

    #[test]
    fn as_needed_yields_nothing() {
        let rec = record(Frequency::AsNeeded, Duration::NinetyDays, day(1));
        assert!(generate(&rec, day(1), 365).unwrap().is_empty());
    }

    #[test]
    fn disabled_reminders_short_circuit() {
        let mut rec = record(Frequency::TwiceDaily, Duration::SevenDays, day(1));
        rec.reminders_enabled = false;
        assert!(generate(&rec, day(1), 30).unwrap().is_empty());
    }

    #[test]
    fn disabled_reminders_still_validate_ids() {
        let mut rec = record(Frequency::TwiceDaily, Duration::SevenDays, day(1));
        rec.reminders_enabled = false;
        rec.frequency_id = "x".into();
        assert_eq!(
            generate(&rec, day(1), 30),
            Err(ValidationError::UnknownFrequency("x".into()))
        );
    }

    #[test]
    fn unknown_templates_fail() {
        let mut rec = record(Frequency::TwiceDaily, Duration::SevenDays, day(1));
        rec.duration_id = "99".into();
        assert_eq!(
            generate(&rec, day(1), 30),
            Err(ValidationError::UnknownDuration("99".into()))
        );
    }

    #[test]
    fn ongoing_is_capped_by_horizon() {
        let rec = record(Frequency::OnceDaily, Duration::Ongoing, day(1));
        let occ = generate(&rec, day(1), 10).unwrap();
        assert_eq!(occ.len(), 10);
        assert_eq!(occ.last().unwrap().date, day(10));
    }

    #[test]
    fn as_of_mid_course_skips_past_days() {
        let rec = record(Frequency::TwiceDaily, Duration::SevenDays, day(1));
        let occ = generate(&rec, day(5), 30).unwrap();
        assert_eq!(occ.len(), 3 * 2);
        assert_eq!(occ[0].date, day(5));
    }

    #[test]
    fn as_of_after_course_is_empty() {
        let rec = record(Frequency::TwiceDaily, Duration::SevenDays, day(1));
        assert!(generate(&rec, day(8), 30).unwrap().is_empty());
    }

    #[test]
    fn future_start_beyond_horizon_is_empty() {
        let rec = record(Frequency::TwiceDaily, Duration::SevenDays, day(20));
        assert!(generate(&rec, day(1), 5).unwrap().is_empty());
        let occ = generate(&rec, day(1), 21).unwrap();
        assert_eq!(occ.len(), 2 * 2);
    }

    #[test]
    fn zero_horizon_is_empty() {
        let rec = record(Frequency::OnceDaily, Duration::Ongoing, day(1));
        assert!(generate(&rec, day(1), 0).unwrap().is_empty());
    }

    #[test]
    fn generation_is_deterministic() {
        let rec = record(Frequency::FourTimesDaily, Duration::FourteenDays, day(3));
        assert_eq!(generate(&rec, day(1), 30), generate(&rec, day(1), 30));
    }

    #[test]
    fn merged_ties_break_on_medication_id() {
        let b = record(Frequency::OnceDaily, Duration::SevenDays, day(1)).with_id("b");
        let a = record(Frequency::TwiceDaily, Duration::SevenDays, day(1)).with_id("a");
        let all = generate_all(&[b, a], day(1), 1).unwrap();
        let ids: Vec<(&str, String)> = all
            .iter()
            .map(|o| (o.medication_id.as_str(), o.time.to_string()))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("a", "09:00".to_string()),
                ("b", "09:00".to_string()),
                ("a", "21:00".to_string()),
            ]
        );
    }

    #[test]
    fn next_occurrence_skips_earlier_times_today() {
        let rec = record(Frequency::ThreeTimesDaily, Duration::SevenDays, day(1));
        let now = day(2).and_hms_opt(10, 30, 0).unwrap();
        let next = next_occurrence(&[rec], now, 30).unwrap().unwrap();
        assert_eq!(next.date, day(2));
        assert_eq!(next.time, TimeOfDay::new(15, 0).unwrap());
    }

    #[test]
    fn next_occurrence_none_after_course() {
        let rec = record(Frequency::OnceDaily, Duration::SevenDays, day(1));
        let now = day(7).and_hms_opt(22, 0, 0).unwrap();
        assert_eq!(next_occurrence(&[rec], now, 30).unwrap(), None);
    }

    #[test]
    fn end_date_for_bounded_and_ongoing() {
        let rec = record(Frequency::OnceDaily, Duration::SevenDays, day(1));
        assert_eq!(end_date(&rec).unwrap(), Some(day(7)));
        let rec = record(Frequency::OnceDaily, Duration::Ongoing, day(1));
        assert_eq!(end_date(&rec).unwrap(), None);
    }

    #[test]
    fn window_compute_edges() {
        assert_eq!(
            ScheduleWindow::compute(day(1), Some(day(7)), day(3), 2).unwrap(),
            Some(ScheduleWindow { first: day(3), last: day(4) })
        );
        assert_eq!(ScheduleWindow::compute(day(10), Some(day(9)), day(1), 30).unwrap(), None);
        assert_eq!(ScheduleWindow::compute(day(1), None, day(1), 0).unwrap(), None);
    }

    #[test]
    fn oversized_horizon_is_rejected() {
        let err = ScheduleWindow::compute(day(1), None, day(1), u32::MAX).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "horizon_days"));

        let rec = record(Frequency::OnceDaily, Duration::Ongoing, day(1));
        assert!(generate(&rec, day(1), MAX_HORIZON_DAYS + 1).is_err());
        assert_eq!(generate(&rec, day(1), MAX_HORIZON_DAYS).unwrap().len(), MAX_HORIZON_DAYS as usize);
    }

    #[test]
    fn horizon_past_last_date_is_rejected() {
        assert!(ScheduleWindow::compute(NaiveDate::MAX, None, NaiveDate::MAX, 2).is_err());
        assert_eq!(
            ScheduleWindow::compute(NaiveDate::MAX, None, NaiveDate::MAX, 1).unwrap(),
            Some(ScheduleWindow { first: NaiveDate::MAX, last: NaiveDate::MAX })
        );
    }
}

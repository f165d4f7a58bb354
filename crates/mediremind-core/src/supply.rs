//! Supply tracking and refill detection.
//!
//! Pure functions over a [`MedicationRecord`]. Nothing here writes back to the
//! record; [`consume_dose`] returns the new supply for the store to apply.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ValidationError;
use crate::medication::MedicationRecord;

/// Derived supply state for one medication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyStatus {
    pub refill_due: bool,
    /// `None` when supply is untracked or the frequency is "as needed".
    pub estimated_days_remaining: Option<u32>,
}

/// Result of taking one dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumeResult {
    /// Supply after the dose, `None` when the record does not track supply.
    pub updated_supply: Option<u32>,
    /// The dose was taken with no supply left; supply stays clamped at zero.
    pub underflow: bool,
}

/// Evaluate refill state and remaining days.
///
/// # Errors
/// `UnknownFrequency` when the record's frequency id does not resolve.
pub fn evaluate(record: &MedicationRecord) -> Result<SupplyStatus, ValidationError> {
    let frequency = record.frequency()?;

    let refill_due = match (record.current_supply, record.refill_threshold) {
        (Some(supply), Some(threshold)) if record.refill_reminders_enabled => supply <= threshold,
        _ => false,
    };

    let estimated_days_remaining = match (record.current_supply, frequency.doses_per_day()) {
        (Some(_), 0) | (None, _) => None,
        (Some(supply), per_day) => Some(supply / per_day),
    };

    Ok(SupplyStatus {
        refill_due,
        estimated_days_remaining,
    })
}

/// Decrement supply by one dose.
///
/// Clamps at zero and flags `underflow` instead of going negative.
pub fn consume_dose(record: &MedicationRecord) -> ConsumeResult {
    match record.current_supply {
        None => ConsumeResult {
            updated_supply: None,
            underflow: false,
        },
        Some(0) => {
            warn!(medication = %record.id, "dose taken with no supply left");
            ConsumeResult {
                updated_supply: Some(0),
                underflow: true,
            }
        }
        Some(n) => ConsumeResult {
            updated_supply: Some(n - 1),
            underflow: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Duration, Frequency};
    use chrono::NaiveDate;

    fn record(freq: Frequency) -> MedicationRecord {
        MedicationRecord::new(
            "Metformin",
            "850mg",
            freq,
            Duration::Ongoing,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        )
    }

    #[test]
    fn refill_flips_at_threshold() {
        let mut rec = record(Frequency::OnceDaily).with_supply(10, 5);
        assert!(!evaluate(&rec).unwrap().refill_due);

        for _ in 0..5 {
            rec.current_supply = consume_dose(&rec).updated_supply;
        }
        assert_eq!(rec.current_supply, Some(5));
        assert!(evaluate(&rec).unwrap().refill_due);
    }

    #[test]
    fn refill_never_due_when_disabled_or_incomplete() {
        let mut rec = record(Frequency::OnceDaily).with_supply(1, 5);
        rec.refill_reminders_enabled = false;
        assert!(!evaluate(&rec).unwrap().refill_due);

        let mut rec = record(Frequency::OnceDaily).with_supply(1, 5);
        rec.refill_threshold = None;
        assert!(!evaluate(&rec).unwrap().refill_due);
    }

    #[test]
    fn days_remaining_from_daily_dose_count() {
        let rec = record(Frequency::ThreeTimesDaily).with_supply(20, 5);
        assert_eq!(evaluate(&rec).unwrap().estimated_days_remaining, Some(6));

        let rec = record(Frequency::AsNeeded).with_supply(20, 5);
        assert_eq!(evaluate(&rec).unwrap().estimated_days_remaining, None);

        let rec = record(Frequency::OnceDaily);
        assert_eq!(evaluate(&rec).unwrap().estimated_days_remaining, None);
    }

    #[test]
    fn evaluate_rejects_unknown_frequency() {
        let mut rec = record(Frequency::OnceDaily);
        rec.frequency_id = "0".into();
        assert!(matches!(
            evaluate(&rec),
            Err(ValidationError::UnknownFrequency(_))
        ));
    }

    #[test]
    fn consume_clamps_and_reports_underflow() {
        let rec = record(Frequency::OnceDaily).with_supply(1, 0);
        let r = consume_dose(&rec);
        assert_eq!(r, ConsumeResult { updated_supply: Some(0), underflow: false });

        let rec = record(Frequency::OnceDaily).with_supply(0, 0);
        let r = consume_dose(&rec);
        assert_eq!(r, ConsumeResult { updated_supply: Some(0), underflow: true });
    }

    #[test]
    fn consume_without_tracking_is_noop() {
        let rec = record(Frequency::OnceDaily);
        assert_eq!(
            consume_dose(&rec),
            ConsumeResult { updated_supply: None, underflow: false }
        );
        assert_eq!(rec.current_supply, None);
    }
}

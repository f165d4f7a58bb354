use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::MedicationRecord;
use crate::catalog::{Duration, Frequency};
use crate::error::ValidationError;

/// Raw values collected by an "add medication" form.
///
/// Every field is text as the user typed or picked it; [`MedicationForm::build`]
/// turns it into a validated [`MedicationRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicationForm {
    pub name: String,
    pub dosage: String,
    /// Frequency id or label.
    pub frequency: String,
    /// Duration id, label or day count.
    pub duration: String,
    /// `YYYY-MM-DD`.
    pub start_date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_true")]
    pub reminder_enabled: bool,
    #[serde(default)]
    pub refill_reminder: bool,
    /// Empty when supply is not tracked.
    #[serde(default)]
    pub current_supply: String,
    /// Empty when no threshold is set.
    #[serde(default)]
    pub refill_at: String,
}

fn default_true() -> bool {
    true
}

impl MedicationForm {
    /// Validate and convert into a record with a fresh id.
    ///
    /// # Errors
    /// The first field that fails validation, in form order.
    pub fn build(&self) -> Result<MedicationRecord, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let frequency: Frequency = self.frequency.parse()?;
        let duration: Duration = self.duration.parse()?;
        let start_date = parse_date(&self.start_date)?;
        let current_supply = parse_count("current_supply", &self.current_supply)?;
        let refill_threshold = parse_count("refill_at", &self.refill_at)?;

        if self.refill_reminder && (current_supply.is_none() || refill_threshold.is_none()) {
            return Err(ValidationError::InvalidValue {
                field: "refill_reminder".into(),
                message: "refill reminders need both current supply and a refill level".into(),
            });
        }

        let mut record =
            MedicationRecord::new(name, self.dosage.trim(), frequency, duration, start_date);
        record.current_supply = current_supply;
        record.refill_threshold = refill_threshold;
        record.refill_reminders_enabled = self.refill_reminder;
        record.reminders_enabled = self.reminder_enabled;
        record.notes = self.notes.trim().to_string();
        Ok(record)
    }
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
/// `MalformedDate` for anything else.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::MalformedDate(raw.to_string()))
}

fn parse_count(field: &str, raw: &str) -> Result<Option<u32>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u32>()
        .map(Some)
        .map_err(|_| ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("'{raw}' is not a non-negative whole number"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> MedicationForm {
        MedicationForm {
            name: " Amoxicillin ".into(),
            dosage: "500mg".into(),
            frequency: "Three times daily".into(),
            duration: "1".into(),
            start_date: "2026-01-05".into(),
            reminder_enabled: true,
            ..Default::default()
        }
    }

    #[test]
    fn builds_trimmed_record() {
        let rec = form().build().unwrap();
        assert_eq!(rec.name, "Amoxicillin");
        assert_eq!(rec.frequency_id, "3");
        assert_eq!(rec.duration_id, "1");
        assert_eq!(rec.start_date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(rec.current_supply, None);
        assert!(rec.reminders_enabled);
        assert!(!rec.id.is_empty());
    }

    #[test]
    fn empty_name_is_rejected_first() {
        let f = MedicationForm {
            name: "".into(),
            frequency: "bogus".into(),
            ..form()
        };
        assert_eq!(f.build(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn unpicked_frequency_is_unknown() {
        let f = MedicationForm {
            frequency: "".into(),
            ..form()
        };
        assert_eq!(f.build(), Err(ValidationError::UnknownFrequency("".into())));
    }

    #[test]
    fn bad_duration_and_date() {
        let f = MedicationForm {
            duration: "21 days".into(),
            ..form()
        };
        assert!(matches!(f.build(), Err(ValidationError::UnknownDuration(_))));

        let f = MedicationForm {
            start_date: "05/01/2026".into(),
            ..form()
        };
        assert!(matches!(f.build(), Err(ValidationError::MalformedDate(_))));
    }

    #[test]
    fn supply_fields_parse_or_fail() {
        let f = MedicationForm {
            current_supply: "30".into(),
            refill_at: "5".into(),
            refill_reminder: true,
            ..form()
        };
        let rec = f.build().unwrap();
        assert_eq!(rec.current_supply, Some(30));
        assert_eq!(rec.refill_threshold, Some(5));
        assert!(rec.refill_reminders_enabled);

        let f = MedicationForm {
            current_supply: "-3".into(),
            ..form()
        };
        assert!(matches!(
            f.build(),
            Err(ValidationError::InvalidValue { field, .. }) if field == "current_supply"
        ));
    }

    #[test]
    fn refill_reminder_requires_both_numbers() {
        let f = MedicationForm {
            current_supply: "30".into(),
            refill_reminder: true,
            ..form()
        };
        assert!(matches!(
            f.build(),
            Err(ValidationError::InvalidValue { field, .. }) if field == "refill_reminder"
        ));
    }
}

//! Medication records.
//!
//! The record is owned by the medication store. The core reads it to derive
//! reminder occurrences and supply state and never mutates it in place.

mod form;

pub use form::{parse_date, MedicationForm};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{Duration, Frequency};
use crate::error::ValidationError;

/// A medication the user has recorded.
///
/// `frequency_id` and `duration_id` are kept as raw catalog ids and resolved
/// when a schedule is generated; see [`MedicationRecord::frequency`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationRecord {
    pub id: String,
    pub name: String,
    /// Free-text dose, e.g. "500mg".
    pub dosage: String,
    pub frequency_id: String,
    pub duration_id: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub current_supply: Option<u32>,
    #[serde(default)]
    pub refill_threshold: Option<u32>,
    #[serde(default)]
    pub refill_reminders_enabled: bool,
    #[serde(default = "default_true")]
    pub reminders_enabled: bool,
    #[serde(default)]
    pub notes: String,
}

fn default_true() -> bool {
    true
}

impl MedicationRecord {
    /// Create a record with reminders on and no supply tracking.
    pub fn new(
        name: impl Into<String>,
        dosage: impl Into<String>,
        frequency: Frequency,
        duration: Duration,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            dosage: dosage.into(),
            frequency_id: frequency.id().to_string(),
            duration_id: duration.id().to_string(),
            start_date,
            current_supply: None,
            refill_threshold: None,
            refill_reminders_enabled: false,
            reminders_enabled: true,
            notes: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_supply(mut self, current_supply: u32, refill_threshold: u32) -> Self {
        self.current_supply = Some(current_supply);
        self.refill_threshold = Some(refill_threshold);
        self.refill_reminders_enabled = true;
        self
    }

    /// # Errors
    /// `UnknownFrequency` when `frequency_id` is not in the catalog.
    pub fn frequency(&self) -> Result<Frequency, ValidationError> {
        Frequency::from_id(&self.frequency_id)
    }

    /// # Errors
    /// `UnknownDuration` when `duration_id` is not in the catalog.
    pub fn duration(&self) -> Result<Duration, ValidationError> {
        Duration::from_id(&self.duration_id)
    }

    /// Check every invariant the schedule and supply engines rely on.
    ///
    /// # Errors
    /// The first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        self.frequency()?;
        self.duration()?;
        Ok(())
    }
}

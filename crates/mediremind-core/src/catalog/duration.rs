use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Sentinel day count for an open-ended treatment.
pub const ONGOING_DAYS: i32 = -1;

/// Treatment length template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duration {
    SevenDays,
    FourteenDays,
    ThirtyDays,
    NinetyDays,
    Ongoing,
}

impl Duration {
    pub const ALL: [Duration; 5] = [
        Duration::SevenDays,
        Duration::FourteenDays,
        Duration::ThirtyDays,
        Duration::NinetyDays,
        Duration::Ongoing,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Duration::SevenDays => "1",
            Duration::FourteenDays => "2",
            Duration::ThirtyDays => "3",
            Duration::NinetyDays => "4",
            Duration::Ongoing => "5",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Duration::SevenDays => "7 days",
            Duration::FourteenDays => "14 days",
            Duration::ThirtyDays => "30 days",
            Duration::NinetyDays => "90 days",
            Duration::Ongoing => "Ongoing",
        }
    }

    /// Raw day count, `ONGOING_DAYS` for `Ongoing`.
    pub fn days(self) -> i32 {
        match self {
            Duration::SevenDays => 7,
            Duration::FourteenDays => 14,
            Duration::ThirtyDays => 30,
            Duration::NinetyDays => 90,
            Duration::Ongoing => ONGOING_DAYS,
        }
    }

    /// Day count for bounded durations, `None` when ongoing.
    pub fn bounded_days(self) -> Option<u32> {
        u32::try_from(self.days()).ok()
    }

    pub fn is_ongoing(self) -> bool {
        self.bounded_days().is_none()
    }

    /// Resolve a stored id.
    ///
    /// # Errors
    /// Returns `UnknownDuration` when the id is not in the catalog.
    pub fn from_id(id: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|d| d.id() == id.trim())
            .ok_or_else(|| ValidationError::UnknownDuration(id.to_string()))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts the id, the label (`"14 days"`, `"ongoing"`), or a bare day
/// count (`"14"`, `"-1"`). Ids are checked first, so `"3"` is 30 days.
impl FromStr for Duration {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.id() == needle || d.label().eq_ignore_ascii_case(needle))
            .or_else(|| {
                let days: i32 = needle.parse().ok()?;
                Self::ALL.into_iter().find(|d| d.days() == days)
            })
            .ok_or_else(|| ValidationError::UnknownDuration(s.to_string()))
    }
}

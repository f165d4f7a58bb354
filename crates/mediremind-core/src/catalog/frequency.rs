use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::TimeOfDay;
use crate::error::ValidationError;

const ONCE: &[TimeOfDay] = &[TimeOfDay::at(9, 0)];
const TWICE: &[TimeOfDay] = &[TimeOfDay::at(9, 0), TimeOfDay::at(21, 0)];
const THREE: &[TimeOfDay] = &[TimeOfDay::at(9, 0), TimeOfDay::at(15, 0), TimeOfDay::at(21, 0)];
const FOUR: &[TimeOfDay] = &[
    TimeOfDay::at(9, 0),
    TimeOfDay::at(13, 0),
    TimeOfDay::at(17, 0),
    TimeOfDay::at(21, 0),
];

/// Dosing frequency template.
///
/// Each variant expands to a fixed list of daily reminder times. `AsNeeded`
/// has no times and therefore never produces scheduled reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    OnceDaily,
    TwiceDaily,
    ThreeTimesDaily,
    FourTimesDaily,
    AsNeeded,
}

impl Frequency {
    pub const ALL: [Frequency; 5] = [
        Frequency::OnceDaily,
        Frequency::TwiceDaily,
        Frequency::ThreeTimesDaily,
        Frequency::FourTimesDaily,
        Frequency::AsNeeded,
    ];

    /// Stable id used by forms and storage.
    pub fn id(self) -> &'static str {
        match self {
            Frequency::OnceDaily => "1",
            Frequency::TwiceDaily => "2",
            Frequency::ThreeTimesDaily => "3",
            Frequency::FourTimesDaily => "4",
            Frequency::AsNeeded => "5",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::OnceDaily => "Once daily",
            Frequency::TwiceDaily => "Twice daily",
            Frequency::ThreeTimesDaily => "Three times daily",
            Frequency::FourTimesDaily => "Four times daily",
            Frequency::AsNeeded => "As needed",
        }
    }

    /// Reminder times for one day, ascending.
    pub fn daily_times(self) -> &'static [TimeOfDay] {
        match self {
            Frequency::OnceDaily => ONCE,
            Frequency::TwiceDaily => TWICE,
            Frequency::ThreeTimesDaily => THREE,
            Frequency::FourTimesDaily => FOUR,
            Frequency::AsNeeded => &[],
        }
    }

    pub fn doses_per_day(self) -> u32 {
        self.daily_times().len() as u32
    }

    pub fn is_as_needed(self) -> bool {
        self.daily_times().is_empty()
    }

    /// Resolve a stored id.
    ///
    /// # Errors
    /// Returns `UnknownFrequency` when the id is not in the catalog.
    pub fn from_id(id: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|f| f.id() == id.trim())
            .ok_or_else(|| ValidationError::UnknownFrequency(id.to_string()))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either the id (`"3"`) or the label, case-insensitively
/// (`"three times daily"`).
impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.id() == needle || f.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ValidationError::UnknownFrequency(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_times_daily_expands_to_fixed_times() {
        let times: Vec<String> = Frequency::ThreeTimesDaily
            .daily_times()
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(times, vec!["09:00", "15:00", "21:00"]);
    }

    #[test]
    fn as_needed_has_no_times() {
        assert!(Frequency::AsNeeded.is_as_needed());
        assert_eq!(Frequency::AsNeeded.doses_per_day(), 0);
    }

    #[test]
    fn daily_times_are_strictly_ascending() {
        for f in Frequency::ALL {
            let times = f.daily_times();
            assert!(times.windows(2).all(|w| w[0] < w[1]), "{f} not ascending");
        }
    }

    #[test]
    fn ids_round_trip() {
        for f in Frequency::ALL {
            assert_eq!(Frequency::from_id(f.id()).unwrap(), f);
        }
    }

    #[test]
    fn unknown_id_is_an_error() {
        assert_eq!(
            Frequency::from_id("9"),
            Err(ValidationError::UnknownFrequency("9".into()))
        );
        assert!(Frequency::from_id("").is_err());
    }

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!("twice daily".parse::<Frequency>().unwrap(), Frequency::TwiceDaily);
        assert_eq!("AS NEEDED".parse::<Frequency>().unwrap(), Frequency::AsNeeded);
        assert_eq!("4".parse::<Frequency>().unwrap(), Frequency::FourTimesDaily);
        assert!("hourly".parse::<Frequency>().is_err());
    }
}

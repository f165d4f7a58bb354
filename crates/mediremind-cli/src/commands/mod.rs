pub mod auth;
pub mod catalog;
pub mod config;
pub mod history;
pub mod med;
pub mod schedule;
pub mod supply;

use chrono::{Local, NaiveDate};
use mediremind_core::medication::parse_date;
use mediremind_core::ValidationError;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// `--as-of` value or today's local date.
pub fn date_or_today(raw: Option<&str>) -> Result<NaiveDate, ValidationError> {
    match raw {
        Some(raw) => parse_date(raw),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

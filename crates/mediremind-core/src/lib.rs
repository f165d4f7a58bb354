//! # MediRemind Core Library
//!
//! Business logic for the MediRemind medication-reminder assistant. Every
//! front-end (the bundled CLI, a mobile shell) is a thin layer that feeds raw
//! form values in and renders what comes out.
//!
//! ## Architecture
//!
//! - **Catalogs**: closed sets of frequency and duration templates
//! - **Schedule**: pure expansion of a record into dated reminders
//! - **Supply**: refill detection and dose consumption
//! - **Auth**: lock-screen state machine with biometric probe and PIN fallback
//! - **Storage**: SQLite medication store and TOML configuration
//!
//! ## Key Components
//!
//! - [`generate`]: reminder occurrences for one record
//! - [`AuthGate`]: lock-screen state machine
//! - [`Database`]: medication and dose-log persistence
//! - [`Config`]: application configuration management

pub mod auth;
pub mod catalog;
pub mod error;
pub mod events;
pub mod medication;
pub mod schedule;
pub mod storage;
pub mod supply;

pub use auth::{AuthGate, AuthOutcome, AuthStatus, Authenticator, DeviceCapability, NavigationSignal};
pub use catalog::{Duration, Frequency, TimeOfDay};
pub use error::{CollaboratorError, ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use medication::{MedicationForm, MedicationRecord};
pub use schedule::{generate, generate_all, next_occurrence, ReminderOccurrence};
pub use storage::{Config, Database, DoseLogEntry, MedicationStore};
pub use supply::{consume_dose, evaluate, ConsumeResult, SupplyStatus};

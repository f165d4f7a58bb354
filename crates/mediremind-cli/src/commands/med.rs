use clap::Subcommand;
use mediremind_core::schedule::end_date;
use mediremind_core::storage::Database;
use mediremind_core::{evaluate, Config, CoreError, MedicationForm, MedicationStore};
use serde::Serialize;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum MedAction {
    /// Add a medication
    Add {
        /// Medication name
        name: String,
        /// Dose per reminder (e.g. "500mg")
        #[arg(long, default_value = "")]
        dosage: String,
        /// Frequency id or label (see `catalog`)
        #[arg(long)]
        frequency: String,
        /// Duration id, label or day count (see `catalog`)
        #[arg(long)]
        duration: String,
        /// Start date YYYY-MM-DD (default: today)
        #[arg(long)]
        start: Option<String>,
        #[arg(long, default_value = "")]
        notes: String,
        /// Do not generate reminders for this medication
        #[arg(long)]
        no_reminders: bool,
        /// Units currently on hand
        #[arg(long)]
        supply: Option<u32>,
        /// Refill when supply drops to this level
        #[arg(long)]
        refill_at: Option<u32>,
        /// Enable refill reminders
        #[arg(long)]
        refill_reminder: bool,
        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },
    /// List medications
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one medication with its supply state
    Show {
        id: String,
    },
    /// Remove a medication
    Remove {
        id: String,
    },
}

#[derive(Serialize)]
struct MedicationView<'a> {
    #[serde(flatten)]
    record: &'a mediremind_core::MedicationRecord,
    frequency: String,
    duration: String,
    end_date: Option<chrono::NaiveDate>,
    supply: mediremind_core::SupplyStatus,
}

pub fn run(action: MedAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        MedAction::Add {
            name,
            dosage,
            frequency,
            duration,
            start,
            notes,
            no_reminders,
            supply,
            refill_at,
            refill_reminder,
            json,
        } => {
            let config = Config::load_or_default();
            let refill_reminder =
                refill_reminder || (config.supply.refill_reminders && supply.is_some());
            let refill_at = refill_at.or_else(|| {
                refill_reminder.then_some(config.supply.default_refill_threshold)
            });
            let start_date = super::date_or_today(start.as_deref())?;

            let form = MedicationForm {
                name,
                dosage,
                frequency,
                duration,
                start_date: start_date.format("%Y-%m-%d").to_string(),
                notes,
                reminder_enabled: !no_reminders,
                refill_reminder,
                current_supply: supply.map(|s| s.to_string()).unwrap_or_default(),
                refill_at: refill_at.map(|s| s.to_string()).unwrap_or_default(),
            };
            let record = form.build()?;
            db.add(&record)?;
            tracing::info!(id = %record.id, name = %record.name, "medication added");
            if json {
                print_json(&record)?;
            } else {
                println!("{}", record.id);
            }
        }
        MedAction::List { json } => {
            let records = db.list()?;
            if json {
                print_json(&records)?;
            } else if records.is_empty() {
                println!("no medications");
            } else {
                for r in &records {
                    let frequency = r
                        .frequency()
                        .map(|f| f.label().to_string())
                        .unwrap_or_else(|e| e.to_string());
                    let supply = r
                        .current_supply
                        .map(|s| format!("  supply {s}"))
                        .unwrap_or_default();
                    println!("{}  {}  {}  {}{}", r.id, r.name, r.dosage, frequency, supply);
                }
            }
        }
        MedAction::Show { id } => {
            let record = db.get(&id)?.ok_or_else(|| CoreError::NotFound(id.clone()))?;
            let view = MedicationView {
                frequency: record.frequency()?.label().to_string(),
                duration: record.duration()?.label().to_string(),
                end_date: end_date(&record)?,
                supply: evaluate(&record)?,
                record: &record,
            };
            print_json(&view)?;
        }
        MedAction::Remove { id } => {
            if db.remove(&id)? {
                println!("removed {id}");
            } else {
                return Err(CoreError::NotFound(id).into());
            }
        }
    }
    Ok(())
}

use chrono::Utc;
use clap::Subcommand;
use mediremind_core::storage::Database;
use mediremind_core::{evaluate, CoreError, Event, MedicationStore, SupplyStatus};
use serde::Serialize;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum SupplyAction {
    /// Refill state for every tracked medication (or one)
    Status {
        id: Option<String>,
    },
    /// Record one dose taken and decrement supply
    Take {
        id: String,
    },
    /// Set supply after a refill
    Set {
        id: String,
        amount: u32,
    },
}

#[derive(Serialize)]
struct SupplyRow {
    id: String,
    name: String,
    current_supply: Option<u32>,
    refill_threshold: Option<u32>,
    #[serde(flatten)]
    status: SupplyStatus,
}

pub fn run(action: SupplyAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        SupplyAction::Status { id } => {
            let records = match id {
                Some(id) => vec![db.get(&id)?.ok_or(CoreError::NotFound(id))?],
                None => db.list()?,
            };
            let mut rows = Vec::with_capacity(records.len());
            for r in records {
                rows.push(SupplyRow {
                    status: evaluate(&r)?,
                    id: r.id,
                    name: r.name,
                    current_supply: r.current_supply,
                    refill_threshold: r.refill_threshold,
                });
            }
            print_json(&rows)?;
        }
        SupplyAction::Take { id } => {
            let events = db.take_dose(&id, Utc::now())?;
            for event in &events {
                if let Event::DoseConsumed { underflow: true, .. } = event {
                    eprintln!("warning: no supply left for {id}");
                }
            }
            print_json(&events)?;
        }
        SupplyAction::Set { id, amount } => {
            db.set_supply(&id, Some(amount))?;
            tracing::info!(%id, amount, "supply updated");
            println!("ok");
        }
    }
    Ok(())
}

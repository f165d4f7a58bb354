use clap::Args;
use mediremind_core::storage::Database;
use mediremind_core::MedicationStore;

use super::{print_json, CmdResult};

#[derive(Args)]
pub struct HistoryArgs {
    /// Only this medication
    #[arg(long)]
    med: Option<String>,
    #[arg(long)]
    json: bool,
}

pub fn run(args: HistoryArgs) -> CmdResult {
    let db = Database::open()?;
    let entries = db.dose_history(args.med.as_deref())?;
    if args.json {
        print_json(&entries)?;
    } else if entries.is_empty() {
        println!("no doses logged");
    } else {
        for e in &entries {
            println!(
                "{}  {}  {}  {}",
                e.taken_at.format("%Y-%m-%d %H:%M"),
                e.medication_name,
                e.dosage,
                e.status
            );
        }
    }
    Ok(())
}

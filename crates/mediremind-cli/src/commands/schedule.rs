use clap::Args;
use mediremind_core::storage::Database;
use mediremind_core::{generate_all, next_occurrence, Config, CoreError, MedicationStore};

use super::{date_or_today, print_json, CmdResult};

#[derive(Args)]
pub struct ScheduleArgs {
    /// First day to show, YYYY-MM-DD (default: today)
    #[arg(long)]
    as_of: Option<String>,
    /// Number of days to expand (default: schedule.horizon_days)
    #[arg(long)]
    horizon: Option<u32>,
    /// Only this medication
    #[arg(long)]
    med: Option<String>,
    /// Only the next upcoming reminder
    #[arg(long)]
    next: bool,
    #[arg(long)]
    json: bool,
}

pub fn run(args: ScheduleArgs) -> CmdResult {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let horizon = args.horizon.unwrap_or(config.schedule.horizon_days);

    let records = match &args.med {
        Some(id) => vec![db.get(id)?.ok_or_else(|| CoreError::NotFound(id.clone()))?],
        None => db.list()?,
    };

    if args.next {
        let now = match args.as_of.as_deref() {
            Some(raw) => date_or_today(Some(raw))?.and_time(chrono::NaiveTime::MIN),
            None => chrono::Local::now().naive_local(),
        };
        let next = next_occurrence(&records, now, horizon)?;
        if args.json {
            print_json(&next)?;
        } else {
            match next {
                Some(o) => println!("{} {}  {}  {}", o.date, o.time, o.medication_name, o.dose_label),
                None => println!("no upcoming reminders"),
            }
        }
        return Ok(());
    }

    let as_of = date_or_today(args.as_of.as_deref())?;
    let occurrences = generate_all(&records, as_of, horizon)?;
    if args.json {
        print_json(&occurrences)?;
    } else if occurrences.is_empty() {
        println!("no reminders in the next {horizon} days");
    } else {
        for o in &occurrences {
            println!("{} {}  {}  {}", o.date, o.time, o.medication_name, o.dose_label);
        }
    }
    Ok(())
}

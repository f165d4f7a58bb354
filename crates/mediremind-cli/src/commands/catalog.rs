use clap::Args;
use mediremind_core::catalog::{duration_templates, frequency_templates};
use serde_json::json;

use super::{print_json, CmdResult};

#[derive(Args)]
pub struct CatalogArgs {
    #[arg(long)]
    json: bool,
}

pub fn run(args: CatalogArgs) -> CmdResult {
    let frequencies = frequency_templates();
    let durations = duration_templates();

    if args.json {
        print_json(&json!({ "frequencies": frequencies, "durations": durations }))?;
        return Ok(());
    }

    println!("Frequencies:");
    for f in &frequencies {
        let times: Vec<String> = f.daily_times.iter().map(ToString::to_string).collect();
        let times = if times.is_empty() { "-".to_string() } else { times.join(", ") };
        println!("  {}  {:<18} {}", f.id, f.label, times);
    }
    println!("Durations:");
    for d in &durations {
        println!("  {}  {}", d.id, d.label);
    }
    Ok(())
}

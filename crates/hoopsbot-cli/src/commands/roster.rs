//! Roster inspection for operators.

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use hoopsbot_core::config::Config;
use hoopsbot_core::roster::{next_birthday, years_word, RosterEntry};

#[derive(Subcommand)]
pub enum RosterAction {
    /// Validate the roster and list upcoming birthdays
    Check,
}

pub fn run(action: RosterAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RosterAction::Check => check(),
    }
}

fn check() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let roster = RosterEntry::from_config(&config.roster);
    let skipped = config.roster.len() - roster.len();

    println!(
        "{} roster entries, {} skipped as invalid",
        roster.len(),
        skipped
    );
    if roster.is_empty() {
        return Ok(());
    }

    let today = Local::now().date_naive();
    let mut upcoming: Vec<(NaiveDate, i32, &str)> = roster
        .iter()
        .filter_map(|e| next_birthday(e, today).map(|(date, age)| (date, age, e.name.as_str())))
        .collect();
    upcoming.sort();

    println!("\nUpcoming birthdays:");
    for (date, age, name) in upcoming {
        println!("  {date}  {name} (turns {age} {})", years_word(age));
    }
    Ok(())
}

//! Roster handling and birthday matching.

use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::config::RosterEntryConfig;

/// A validated roster member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub birthdate: NaiveDate,
}

/// A member whose birthday falls on the checked date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Birthday {
    pub name: String,
    pub age: i32,
}

impl RosterEntry {
    /// Parse config entries into validated roster members.
    ///
    /// Entries with an unparseable birthdate are skipped with a warning;
    /// a bad line in the roster must never take the bot down.
    pub fn from_config(entries: &[RosterEntryConfig]) -> Vec<RosterEntry> {
        entries
            .iter()
            .filter_map(|e| {
                match NaiveDate::parse_from_str(&e.birthdate, "%Y-%m-%d") {
                    Ok(birthdate) => Some(RosterEntry {
                        name: e.name.clone(),
                        birthdate,
                    }),
                    Err(err) => {
                        warn!(name = %e.name, birthdate = %e.birthdate, error = %err,
                            "skipping roster entry with invalid birthdate");
                        None
                    }
                }
            })
            .collect()
    }
}

/// Russian plural form of "год" for an age.
pub fn years_word(age: i32) -> &'static str {
    let age = age.rem_euclid(100);
    if (11..=14).contains(&age) {
        return "лет";
    }
    match age % 10 {
        1 => "год",
        2..=4 => "года",
        _ => "лет",
    }
}

/// Roster members whose birthday (month and day, year ignored) falls on
/// `date`. Age is the plain year difference.
pub fn birthdays_on(date: NaiveDate, roster: &[RosterEntry]) -> Vec<Birthday> {
    roster
        .iter()
        .filter(|e| e.birthdate.month() == date.month() && e.birthdate.day() == date.day())
        .map(|e| Birthday {
            name: e.name.clone(),
            age: date.year() - e.birthdate.year(),
        })
        .collect()
}

/// Congratulation message for one birthday.
pub fn birthday_message(b: &Birthday) -> String {
    format!(
        "🎉 Сегодня день рождения у {} ({} {})! \n Поздравляем! 🎂",
        b.name,
        b.age,
        years_word(b.age)
    )
}

/// Next occurrence of a member's birthday on or after `today`, with the
/// age they turn. Uses the same month-and-day matching as
/// [`birthdays_on`], so a Feb 29 birthdate lands on the next leap year.
pub fn next_birthday(entry: &RosterEntry, today: NaiveDate) -> Option<(NaiveDate, i32)> {
    // Eight years covers the longest gap between leap years.
    for year in today.year()..=today.year() + 8 {
        if let Some(date) =
            NaiveDate::from_ymd_opt(year, entry.birthdate.month(), entry.birthdate.day())
        {
            if date >= today {
                return Some((date, year - entry.birthdate.year()));
            }
        }
    }
    None
}

//! Attendance collection from the weekly training poll.
//!
//! On Wednesday and Saturday mornings the bot looks up the latest
//! Sunday training poll through the history gateway, buckets the votes
//! by option text, and appends the target day's turnout to the month's
//! sheet. The sheet append is the step's effect, so its dedup id is
//! recorded only after the append succeeds.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::info;

use crate::dedup::{NotificationId, SentLog};
use crate::error::Result;
use crate::history::{PollHistory, PollOptionResults, PollResults};
use crate::sheets::{sheet_for_month, AttendanceStore};
use crate::slots::TrainingDay;

/// Search string for finding the weekly poll in chat history.
pub const POLL_SEARCH: &str = "Тренировки на неделе";

/// How far back to search. The poll goes out on Sunday and collection
/// runs Wednesday and Saturday, so one week always covers it.
pub const POLL_LOOKBACK_DAYS: i64 = 7;

/// Header row written when a month's sheet is first used.
pub const SHEET_HEADER: [&str; 5] = [
    "Дата опроса",
    "День недели",
    "Тренировка",
    "Участники",
    "Количество",
];

/// Votes from one weekly poll, bucketed by what the option means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteBreakdown {
    pub tuesday: Vec<String>,
    pub friday: Vec<String>,
    pub coach: Vec<String>,
    pub skipping: Vec<String>,
}

impl VoteBreakdown {
    pub fn for_day(&self, day: TrainingDay) -> &[String] {
        match day {
            TrainingDay::Tuesday => &self.tuesday,
            TrainingDay::Friday => &self.friday,
        }
    }
}

/// Voter names for an option. Anonymous polls report only counts, so
/// numbered placeholders stand in for the missing names.
fn voters(option: &PollOptionResults) -> Vec<String> {
    if !option.voter_names.is_empty() {
        option.voter_names.clone()
    } else {
        (1..=option.voter_count)
            .map(|i| format!("Участник_{i}"))
            .collect()
    }
}

/// Bucket poll options by substring of the lowercased text. The first
/// matching bucket wins, so an option naming a day never lands in the
/// refusal bucket even when it also contains "нет".
pub fn categorize_votes(poll: &PollResults) -> VoteBreakdown {
    let mut breakdown = VoteBreakdown::default();
    for option in &poll.options {
        let text = option.text.to_lowercase();
        let names = voters(option);
        if text.contains("вторник") {
            breakdown.tuesday.extend(names);
        } else if text.contains("пятница") {
            breakdown.friday.extend(names);
        } else if text.contains("тренер") {
            breakdown.coach.extend(names);
        } else if text.contains("нет") {
            breakdown.skipping.extend(names);
        }
    }
    breakdown
}

/// Sheet row for one collected training day. Duplicate names are
/// dropped keeping first occurrence. `None` when nobody signed up.
pub fn attendance_row(
    poll_date: NaiveDate,
    day: TrainingDay,
    voters: &[String],
) -> Option<Vec<String>> {
    let mut seen = std::collections::HashSet::new();
    let unique: Vec<&str> = voters
        .iter()
        .map(String::as_str)
        .filter(|name| seen.insert(*name))
        .collect();
    if unique.is_empty() {
        return None;
    }
    Some(vec![
        poll_date.format("%Y-%m-%d").to_string(),
        day.label().to_string(),
        format!("{} тренировка", day.label()),
        unique.join(", "),
        unique.len().to_string(),
    ])
}

/// Run one attendance collection: find the poll, pick the target day's
/// voters and append them to the sheet of the poll's month. Returns
/// whether a row was appended.
pub async fn collect_attendance<H, S>(
    history: &H,
    store: &S,
    log: &mut SentLog,
    today: NaiveDate,
    target: TrainingDay,
) -> Result<bool>
where
    H: PollHistory,
    S: AttendanceStore,
{
    let since = today - Duration::days(POLL_LOOKBACK_DAYS);
    let Some(poll) = history.latest_training_poll(POLL_SEARCH, since).await? else {
        info!("no training poll to collect from");
        return Ok(false);
    };

    let poll_date = poll.date.date();
    let id = NotificationId::attendance(poll_date, target.label());
    if log.has(&id) {
        info!(id = %id, "attendance already collected, skipping");
        return Ok(false);
    }

    let breakdown = categorize_votes(&poll);
    let Some(row) = attendance_row(poll_date, target, breakdown.for_day(target)) else {
        info!(day = target.label(), "nobody signed up, nothing to record");
        return Ok(false);
    };

    let sheet = sheet_for_month(poll_date.year(), poll_date.month());
    let mut rows = Vec::new();
    if store.read_all_rows(&sheet).await?.is_empty() {
        rows.push(SHEET_HEADER.iter().map(|s| s.to_string()).collect());
    }
    rows.push(row);
    store.append_rows(&sheet, rows).await?;

    info!(day = target.label(), sheet = %sheet, "attendance row appended");
    log.record(id);
    Ok(true)
}

//! Time-window classification.
//!
//! The bot runs from a scheduler roughly every thirty minutes, so every
//! recurring action is gated on a half-hour window: the action's hour
//! must match and the minute must fall in `[0, 30)`. All window logic
//! lives here; the orchestrator computes one [`TimeSlot`] per invocation
//! and threads it through the detectors as a value, so a slot boundary
//! cannot be crossed mid-run.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};

/// A recurring training day the attendance pipeline reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingDay {
    Tuesday,
    Friday,
}

impl TrainingDay {
    /// Russian label as it appears in poll options and sheet rows.
    pub fn label(self) -> &'static str {
        match self {
            TrainingDay::Tuesday => "Вторник",
            TrainingDay::Friday => "Пятница",
        }
    }
}

/// The set of windows open at one instant, computed once per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub now: NaiveDateTime,
    pub today: NaiveDate,
    /// 09:00-09:29 every day.
    pub birthday_window: bool,
    /// Sunday 09:00-09:29.
    pub weekly_poll_window: bool,
    /// Wednesday collects Tuesday attendance, Saturday collects Friday.
    pub attendance_target: Option<TrainingDay>,
    /// Last calendar day of the month, 09:00-09:29.
    pub monthly_report_window: bool,
    /// Monday 10:00-10:29.
    pub motivation_poll_window: bool,
    /// 23:30-23:59, the day's final trigger.
    pub last_slot_of_day: bool,
}

fn in_half_hour(now: NaiveDateTime, hour: u32) -> bool {
    now.hour() == hour && now.minute() < 30
}

/// Last calendar day of `date`'s month: first day of the next month
/// minus one day, which keeps leap Februaries and December correct.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (next_year, next_month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // The first of a month always exists.
    NaiveDate::from_ymd_opt(next_year, next_month, 1).expect("first of month") - Duration::days(1)
}

impl TimeSlot {
    /// Classify one instant against every recurring window.
    pub fn at(now: NaiveDateTime) -> Self {
        let today = now.date();
        let weekday = today.weekday();
        let morning = in_half_hour(now, 9);

        let attendance_target = if morning {
            match weekday {
                Weekday::Wed => Some(TrainingDay::Tuesday),
                Weekday::Sat => Some(TrainingDay::Friday),
                _ => None,
            }
        } else {
            None
        };

        TimeSlot {
            now,
            today,
            birthday_window: morning,
            weekly_poll_window: morning && weekday == Weekday::Sun,
            attendance_target,
            monthly_report_window: morning && today == month_end(today),
            motivation_poll_window: weekday == Weekday::Mon && in_half_hour(now, 10),
            last_slot_of_day: now.hour() == 23 && now.minute() >= 30,
        }
    }
}

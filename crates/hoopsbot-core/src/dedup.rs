//! Notification deduplication.
//!
//! The log lives for exactly one invocation and is discarded on exit,
//! so the at-most-once guarantee is per process lifetime. Across
//! invocations the bot relies on each observed condition holding only
//! within one half-hour window; if the process restarts mid-window a
//! duplicate is possible. This is a known limitation, not a bug.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;

/// Opaque identity of one notification. Two ids are equal iff they were
/// derived from the same event kind and subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn birthday(date: NaiveDate, name: &str) -> Self {
        Self(format!("birthday_{date}_{name}"))
    }

    pub fn birthday_poll(date: NaiveDate, name: &str) -> Self {
        Self(format!("birthday_poll_{date}_{name}"))
    }

    pub fn sighting(game_url: &str) -> Self {
        Self(format!("pullup_{game_url}"))
    }

    /// Team seen but no game link resolved; scoped to the day so the
    /// fallback is not repeated every half hour.
    pub fn sighting_no_link(team: &str, date: NaiveDate) -> Self {
        Self(format!("pullup_nolink_{team}_{date}"))
    }

    pub fn game_start(game_url: &str) -> Self {
        Self(format!("game_start_{game_url}"))
    }

    pub fn game_end(game_url: &str) -> Self {
        Self(format!("game_end_{game_url}"))
    }

    pub fn weekly_poll(date: NaiveDate) -> Self {
        Self(format!("weekly_poll_{date}"))
    }

    pub fn motivation_poll(date: NaiveDate) -> Self {
        Self(format!("motivation_poll_{date}"))
    }

    pub fn attendance(poll_date: NaiveDate, training_label: &str) -> Self {
        Self(format!("attendance_{poll_date}_{training_label}"))
    }

    pub fn monthly_report(year: i32, month: u32) -> Self {
        Self(format!("monthly_report_{year}-{month:02}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Process-lifetime record of sent notifications. Grows monotonically,
/// never evicts.
#[derive(Debug, Default)]
pub struct SentLog {
    sent: HashSet<NotificationId>,
}

impl SentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, id: &NotificationId) -> bool {
        self.sent.contains(id)
    }

    pub fn record(&mut self, id: NotificationId) {
        self.sent.insert(id);
    }

    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }
}

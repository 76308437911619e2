//! Monthly attendance statistics.
//!
//! Aggregates the rows of one month's sheet into totals, per-day and
//! per-person counts, and renders the Russian report sent to the chat
//! on the last day of the month. Sheets hand rows back as plain
//! strings, so any row that is too short or has a non-numeric count
//! column is skipped, which also drops the header row.

use std::collections::BTreeMap;

/// How many names the most/least active sections show.
const RANKING_SIZE: usize = 3;

/// Per-day totals over one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayStats {
    pub trainings: u32,
    pub participants: u32,
}

/// Aggregated view of one month's attendance sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyStats {
    pub total_trainings: u32,
    pub total_participants: u32,
    /// Per-day totals in first-seen row order.
    pub by_day: Vec<(String, DayStats)>,
    pub by_person: BTreeMap<String, u32>,
}

impl MonthlyStats {
    /// Aggregate raw sheet rows shaped
    /// `[date, day, training, participants, count]`.
    pub fn from_rows(rows: &[Vec<String>]) -> Self {
        let mut stats = MonthlyStats::default();
        for row in rows {
            if row.len() < 5 {
                continue;
            }
            let Ok(count) = row[4].parse::<u32>() else {
                continue;
            };
            stats.total_trainings += 1;
            stats.total_participants += count;

            let day = &row[1];
            match stats.by_day.iter_mut().find(|(d, _)| d == day) {
                Some((_, day_stats)) => {
                    day_stats.trainings += 1;
                    day_stats.participants += count;
                }
                None => stats.by_day.push((
                    day.clone(),
                    DayStats {
                        trainings: 1,
                        participants: count,
                    },
                )),
            }

            for person in row[3].split(", ") {
                let person = person.trim();
                // Legacy rows carry a bare placeholder with no number.
                if person.is_empty() || person == "Участник" {
                    continue;
                }
                *stats.by_person.entry(person.to_string()).or_insert(0) += 1;
            }
        }
        stats
    }

    pub fn is_empty(&self) -> bool {
        self.total_trainings == 0
    }

    /// People ranked by attendance, most active first. Ties stay in
    /// alphabetical order.
    pub fn ranked(&self) -> Vec<(&str, u32)> {
        let mut ranked: Vec<(&str, u32)> = self
            .by_person
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

/// The chat report for one month's stats.
pub fn report_message(stats: &MonthlyStats) -> String {
    let mut message = String::from("📊 Месячный отчет по тренировкам\n\n");
    if stats.is_empty() {
        message.push_str("❌ Данные за месяц отсутствуют");
        return message;
    }

    message.push_str(&format!(
        "🏀 Всего тренировок: {}\n",
        stats.total_trainings
    ));
    message.push_str(&format!(
        "👥 Общее количество участников: {}\n\n",
        stats.total_participants
    ));

    message.push_str("📅 По дням недели:\n");
    for (day, day_stats) in &stats.by_day {
        message.push_str(&format!(
            "  {day}: {} тренировок, {} участников\n",
            day_stats.trainings, day_stats.participants
        ));
    }

    let ranked = stats.ranked();
    if !ranked.is_empty() {
        let most_active = &ranked[..ranked.len().min(RANKING_SIZE)];
        message.push_str("\n🏆 Самые активные участники:\n");
        for (person, count) in most_active {
            message.push_str(&format!("  {person}: {count} тренировок\n"));
        }

        let least_active = &ranked[ranked.len().saturating_sub(RANKING_SIZE)..];
        message.push_str("\n📉 Менее активные участники:\n");
        for (person, count) in least_active {
            message.push_str(&format!("  {person}: {count} тренировок\n"));
        }
    }

    message
}

//! Game page extraction and start/end decisions.
//!
//! Extraction is heuristic: every field runs through an ordered list of
//! pure strategies until one yields a non-empty value. The first tier
//! works on the game page markup; the rendered tier reuses the
//! text-only strategies on the render gateway's output.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::{Regex, RegexBuilder};

use crate::error::ValidationError;
use crate::html::{normalize_entities, strip_tags};

/// What could be read off a game page. Every field is optional;
/// downstream code substitutes neutral placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameInfo {
    pub time: Option<String>,
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub score: Option<String>,
}

/// Accepted schedule formats. Time-only values are anchored to today.
const TIME_ONLY_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];
const DATED_FORMATS: [&str; 3] = ["%d.%m.%Y %H:%M", "%Y-%m-%d %H:%M", "%d/%m/%Y %H:%M"];

/// Compiled extraction rules for game pages.
///
/// Label-value captures run over raw markup or rendered text and are
/// bounded by line breaks and tag openers, so a capture never swallows
/// the rest of the document.
pub struct GameRules {
    calendar_markup: Regex,
    time_class: Regex,
    time_in_text: Regex,
    protocol_team: [Regex; 2],
    labeled_team: [Regex; 2],
    header: Regex,
    versus: Regex,
    score_class: Regex,
    labeled_score: Regex,
    score_value: Regex,
}

impl GameRules {
    /// # Errors
    ///
    /// Returns an error when a built-in pattern fails to compile, which
    /// indicates a packaging defect rather than bad input.
    pub fn new() -> Result<Self, ValidationError> {
        let build = |pattern: &str| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| ValidationError::InvalidValue {
                    field: "game rules".into(),
                    message: format!("{pattern}: {e}"),
                })
        };

        Ok(Self {
            calendar_markup: build(r"fa-calendar[^>]*>\s*([^<]+)")?,
            time_class: build(
                r#"class\s*=\s*["'][^"']*\b(?:game-time|time)\b[^"']*["'][^>]*>\s*([^<]+)"#,
            )?,
            time_in_text: build(
                r"\b(\d{1,2}[./]\d{1,2}[./]\d{4}\s+\d{1,2}:\d{2}|\d{4}-\d{2}-\d{2}\s+\d{1,2}:\d{2}|\d{1,2}:\d{2}(?::\d{2})?)\b",
            )?,
            protocol_team: [
                build(r"protocol\.team1\.TeamRegionName[:\s]*([^\n\r<]+)")?,
                build(r"protocol\.team2\.TeamRegionName[:\s]*([^\n\r<]+)")?,
            ],
            labeled_team: [
                build(r"(?:Команда|Team)\s*1[:\s]+([^\n\r<]+)")?,
                build(r"(?:Команда|Team)\s*2[:\s]+([^\n\r<]+)")?,
            ],
            header: build(r"(?s)<h[1-3][^>]*>(.*?)</h[1-3]>")?,
            versus: build(r"\s+(?:против|vs)\s+")?,
            score_class: build(
                r#"class\s*=\s*["'][^"']*\b(?:score|center)\b[^"']*["'][^>]*>\s*([^<]+)"#,
            )?,
            labeled_score: build(r"Счет[:\s]*(\d+\s*[:\-–]\s*\d+)")?,
            score_value: build(r"\d+\s*[:\-–]\s*\d+")?,
        })
    }

    /// Does the string carry a final-looking numeric score.
    pub fn is_score(&self, s: &str) -> bool {
        self.score_value.is_match(s)
    }

    /// Markup-tier extraction over the raw game page.
    pub fn extract(&self, html: &str) -> GameInfo {
        let html = normalize_entities(html);

        let time = first_value(&[
            capture(&self.calendar_markup, &html),
            capture(&self.time_class, &html),
            capture(&self.time_in_text, &strip_tags(&html)),
        ]);
        let (team1, team2) = self.extract_teams(&html);
        let score = first_value(&[
            capture(&self.score_class, &html),
            capture(&self.labeled_score, &html),
        ]);

        GameInfo {
            time,
            team1,
            team2,
            score,
        }
    }

    /// Text-tier extraction over rendered page text.
    pub fn extract_from_text(&self, text: &str) -> GameInfo {
        let time = capture(&self.time_in_text, text);
        let (team1, team2) = self.labeled_teams(text);
        let score = first_value(&[
            capture(&self.labeled_score, text),
            self.score_value.find(text).map(|m| m.as_str().to_string()),
        ]);

        GameInfo {
            time,
            team1,
            team2,
            score,
        }
    }

    fn extract_teams(&self, html: &str) -> (Option<String>, Option<String>) {
        let (t1, t2) = self.labeled_teams(html);
        if t1.is_some() && t2.is_some() {
            return (t1, t2);
        }
        for m in self.header.captures_iter(html) {
            let inner = strip_tags(&m[1]);
            let mut parts = self.versus.splitn(&inner, 2);
            if let (Some(a), Some(b)) = (parts.next(), parts.next()) {
                let a = a.trim();
                let b = b.trim();
                if !a.is_empty() && !b.is_empty() {
                    return (Some(a.to_string()), Some(b.to_string()));
                }
            }
        }
        (t1, t2)
    }

    fn labeled_teams(&self, haystack: &str) -> (Option<String>, Option<String>) {
        let team1 = first_value(&[
            capture(&self.protocol_team[0], haystack),
            capture(&self.labeled_team[0], haystack),
        ]);
        let team2 = first_value(&[
            capture(&self.protocol_team[1], haystack),
            capture(&self.labeled_team[1], haystack),
        ]);
        (team1, team2)
    }
}

fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn first_value(candidates: &[Option<String>]) -> Option<String> {
    candidates.iter().flatten().next().cloned()
}

/// Parse a scraped schedule string. Time-only values are given
/// `today`'s date so they compare like dated ones.
pub fn parse_game_datetime(raw: &str, today: NaiveDate) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in TIME_ONLY_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(raw, fmt) {
            return Some(today.and_time(t));
        }
    }
    for fmt in DATED_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    None
}

/// Whether a start notification is due this run.
///
/// Fires when the game is today and `now` sits in the same half hour as
/// the scheduled minute, or when the game is tomorrow and this is the
/// day's last trigger. The carry-forward gives a just-after-midnight
/// game exactly one chance; a transient failure there is accepted.
pub fn should_announce_start(game_time: &str, now: NaiveDateTime, last_slot_of_day: bool) -> bool {
    let Some(game_dt) = parse_game_datetime(game_time, now.date()) else {
        return false;
    };

    if game_dt.date() == now.date() {
        let same_half = if game_dt.minute() < 30 {
            now.minute() < 30
        } else {
            now.minute() >= 30
        };
        return now.hour() == game_dt.hour() && same_half;
    }

    game_dt.date() == now.date() + Duration::days(1) && last_slot_of_day
}

/// Pre-game announcement.
pub fn start_message(info: &GameInfo, game_url: &str) -> String {
    let team1 = info.team1.as_deref().unwrap_or("Команда 1");
    let team2 = info.team2.as_deref().unwrap_or("Команда 2");
    let time = info.time.as_deref().unwrap_or("");
    format!("🏀 Игра {team1} против {team2} начинается в {time}!\n\nСсылка на игру: {game_url}")
}

/// Final-score announcement.
pub fn end_message(info: &GameInfo, score: &str, game_url: &str) -> String {
    let team1 = info.team1.as_deref().unwrap_or("Команда 1");
    let team2 = info.team2.as_deref().unwrap_or("Команда 2");
    format!(
        "🏁 Игра закончилась!\n\n🏀 {team1} vs {team2}\n📊 Счет: {score}\n\nСсылка на статистику: {game_url}"
    )
}

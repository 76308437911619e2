//! TOML-based bot configuration and environment credentials.
//!
//! The config file holds everything an operator may tune without
//! rebuilding: the monitored site, team name patterns, the roster,
//! poll texts and timeouts. Secrets never live in the file; they are
//! read from the environment at startup (`Credentials`).
//!
//! Configuration is stored at `~/.config/hoopsbot/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Monitored site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_url")]
    pub url: String,
    /// Substring opening the scoreboard block on the page.
    #[serde(default = "default_block_start")]
    pub block_start: String,
    /// Substring closing the scoreboard block.
    #[serde(default = "default_block_end")]
    pub block_end: String,
    /// Visible link text that identifies the game page anchor.
    #[serde(default = "default_link_phrase")]
    pub link_phrase: String,
    /// Fallback href substrings when no anchor text matches.
    #[serde(default = "default_link_keywords")]
    pub link_keywords: Vec<String>,
}

/// Team name matching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamConfig {
    /// Ordered, case-insensitive regex patterns. The first pattern with
    /// a match wins, so more specific variants must come first.
    #[serde(default = "default_team_patterns")]
    pub patterns: Vec<String>,
}

/// Poll texts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollsConfig {
    #[serde(default = "default_weekly_question")]
    pub weekly_question: String,
    #[serde(default = "default_weekly_options")]
    pub weekly_options: Vec<String>,
    #[serde(default = "default_weekly_explanation")]
    pub weekly_explanation: String,
    #[serde(default = "default_motivation_question")]
    pub motivation_question: String,
    #[serde(default = "default_motivation_options")]
    pub motivation_options: Vec<String>,
    #[serde(default = "default_motivation_explanation")]
    pub motivation_explanation: String,
}

/// Network timeouts, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_fetch_secs")]
    pub fetch_secs: u64,
    #[serde(default = "default_render_secs")]
    pub render_secs: u64,
}

/// One roster member as written in the config file. The birthdate stays
/// a string here; parsing and validation happen in [`crate::roster`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntryConfig {
    pub name: String,
    /// `YYYY-MM-DD`.
    pub birthdate: String,
}

/// Bot configuration.
///
/// Serialized to/from TOML at `~/.config/hoopsbot/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub team: TeamConfig,
    #[serde(default)]
    pub polls: PollsConfig,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    #[serde(default)]
    pub roster: Vec<RosterEntryConfig>,
}

// Default functions
fn default_site_url() -> String {
    "http://letobasket.ru/".into()
}
fn default_block_start() -> String {
    "Табло игры".into()
}
fn default_block_end() -> String {
    "online видеотрансляции игр доступны на странице".into()
}
fn default_link_phrase() -> String {
    "СТРАНИЦА ИГРЫ".into()
}
fn default_link_keywords() -> Vec<String> {
    ["game", "match", "podrobno", "id"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_team_patterns() -> Vec<String> {
    // Most specific first: the trailing-word variant must win over the
    // bare spaced name so farm-team qualifiers stay in the match.
    [
        r"pull up\s+\w+",
        "pullup",
        "pull up",
        "pull-up",
        "пуллап",
        "пулл ап",
        "пулл-ап",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_weekly_question() -> String {
    "🏀 Тренировки на неделе СШОР ВО".into()
}
fn default_weekly_options() -> Vec<String> {
    [
        "🏀 Вторник 19:00",
        "🏀 Пятница 20:30",
        "👨‍🏫 Тренер",
        "❌ Нет",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_weekly_explanation() -> String {
    "Выберите тренировки, на которые планируете прийти на этой неделе".into()
}
fn default_motivation_question() -> String {
    "💪 Что больше всего мотивирует команду PullUP?".into()
}
fn default_motivation_options() -> Vec<String> {
    [
        "🏆 Победы и трофеи",
        "👥 Командный дух",
        "🏀 Любовь к баскетболу",
        "💪 Физическая подготовка",
        "🎯 Цели и амбиции",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_motivation_explanation() -> String {
    "Помогите понять, что движет командой! 💪".into()
}
fn default_fetch_secs() -> u64 {
    15
}
fn default_render_secs() -> u64 {
    30
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: default_site_url(),
            block_start: default_block_start(),
            block_end: default_block_end(),
            link_phrase: default_link_phrase(),
            link_keywords: default_link_keywords(),
        }
    }
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            patterns: default_team_patterns(),
        }
    }
}

impl Default for PollsConfig {
    fn default() -> Self {
        Self {
            weekly_question: default_weekly_question(),
            weekly_options: default_weekly_options(),
            weekly_explanation: default_weekly_explanation(),
            motivation_question: default_motivation_question(),
            motivation_options: default_motivation_options(),
            motivation_explanation: default_motivation_explanation(),
        }
    }
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            fetch_secs: default_fetch_secs(),
            render_secs: default_render_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            team: TeamConfig::default(),
            polls: PollsConfig::default(),
            timeouts: TimeoutsConfig::default(),
            roster: Vec::new(),
        }
    }
}

/// Returns the config directory, `~/.config/hoopsbot[-dev]/`.
///
/// HOOPSBOT_ENV=dev selects the development directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn config_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HOOPSBOT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("hoopsbot-dev")
    } else {
        base_dir.join("hoopsbot")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

impl Config {
    fn path() -> Result<PathBuf> {
        if let Ok(p) = std::env::var("HOOPSBOT_CONFIG") {
            return Ok(PathBuf::from(p));
        }
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content, &path),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &std::path::Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ConfigError::ParseFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

/// Secrets and chat coordinates, read from the environment.
///
/// Only the bot token and chat id are mandatory; everything else
/// degrades the matching feature to a logged no-op when absent.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub bot_token: String,
    pub chat_id: i64,
    /// Forum topic for polls and reports, when the chat uses topics.
    pub announcements_topic_id: Option<i64>,
    pub spreadsheet_id: Option<String>,
    pub sheets_token: Option<String>,
    pub history_api_url: Option<String>,
    pub history_api_token: Option<String>,
    pub render_api_url: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnv` if `BOT_TOKEN` or `CHAT_ID` is
    /// absent, and `ConfigError::InvalidValue` if a numeric variable
    /// does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but with an injectable
    /// variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = lookup("BOT_TOKEN")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnv("BOT_TOKEN".into()))?;
        let chat_id_raw = lookup("CHAT_ID")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnv("CHAT_ID".into()))?;
        let chat_id = chat_id_raw
            .parse::<i64>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "CHAT_ID".into(),
                message: e.to_string(),
            })?;

        let announcements_topic_id = match lookup("ANNOUNCEMENTS_TOPIC_ID") {
            Some(v) if !v.is_empty() => {
                Some(v.parse::<i64>().map_err(|e| ConfigError::InvalidValue {
                    key: "ANNOUNCEMENTS_TOPIC_ID".into(),
                    message: e.to_string(),
                })?)
            }
            _ => None,
        };

        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

        Ok(Self {
            bot_token,
            chat_id,
            announcements_topic_id,
            spreadsheet_id: non_empty(lookup("SPREADSHEET_ID")),
            sheets_token: non_empty(lookup("GOOGLE_SHEETS_TOKEN")),
            history_api_url: non_empty(lookup("HISTORY_API_URL")),
            history_api_token: non_empty(lookup("HISTORY_API_TOKEN")),
            render_api_url: non_empty(lookup("RENDER_API_URL")),
        })
    }
}

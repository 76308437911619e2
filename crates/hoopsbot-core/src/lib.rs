//! # Hoopsbot Core Library
//!
//! Core logic for Hoopsbot, a scheduled Telegram bot for an amateur
//! basketball team. An external scheduler starts the process roughly
//! every thirty minutes; each invocation samples the clock once, runs
//! every check that is due, and exits.
//!
//! ## Architecture
//!
//! - **Scheduling**: a pure time-window classifier maps the sampled
//!   clock to the set of open windows (birthdays, polls, attendance,
//!   monthly report)
//! - **Dedup**: every outgoing notification carries a stable id and is
//!   recorded in a sent log after a confirmed send; the log lives for
//!   the process lifetime, so retries within one run are suppressed
//!   while a later invocation may repeat a send inside the same window
//! - **Detectors**: heuristic scrapers for the league site scoreboard
//!   and for game pages, organized as ordered strategy lists
//! - **Integrations**: Telegram Bot API, a chat-history gateway for
//!   poll results, Google Sheets for attendance storage, and a render
//!   gateway for script-heavy pages
//!
//! ## Key Components
//!
//! - [`TimeSlot`]: windows open at one instant
//! - [`SentLog`] and [`Dispatcher`]: at-most-once dispatch per id
//! - [`SightingRules`] and [`GameRules`]: compiled page detectors
//! - [`Runner`]: one invocation end to end

pub mod attendance;
pub mod config;
pub mod dedup;
pub mod error;
pub mod fetch;
pub mod game;
pub mod history;
pub mod html;
pub mod notify;
pub mod polls;
pub mod roster;
pub mod run;
pub mod sheets;
pub mod sighting;
pub mod slots;
pub mod stats;
pub mod telegram;

pub use config::{Config, Credentials};
pub use dedup::{NotificationId, SentLog};
pub use error::{ConfigError, CoreError, FetchError, Result, ValidationError};
pub use game::{GameInfo, GameRules};
pub use notify::Dispatcher;
pub use run::Runner;
pub use sighting::{Sighting, SightingRules};
pub use slots::{TimeSlot, TrainingDay};
pub use stats::MonthlyStats;
pub use telegram::{MessageChannel, PollSpec, TelegramBot};

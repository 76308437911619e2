//! One scheduled invocation end to end.
//!
//! The runner owns every collaborator plus the process-lifetime sent
//! log. `run_once` samples the clock once, classifies it into a
//! [`TimeSlot`] and walks the checks in a fixed order; a failing step
//! is logged and the remaining steps still run.

use std::time::Duration;

use chrono::{Datelike, NaiveDateTime};
use tracing::{info, warn};

use crate::attendance::collect_attendance;
use crate::config::{Config, Credentials};
use crate::dedup::{NotificationId, SentLog};
use crate::error::Result;
use crate::fetch::{PageFetcher, RenderGateway};
use crate::game::{self, GameInfo, GameRules};
use crate::history::{HistoryGateway, HistoryProvider, PollHistory};
use crate::notify::Dispatcher;
use crate::polls;
use crate::roster::{self, RosterEntry};
use crate::sheets::{sheet_for_month, AttendanceStore, SheetsClient};
use crate::sighting::{no_link_message, sighting_message, SightingRules};
use crate::slots::TimeSlot;
use crate::stats::{report_message, MonthlyStats};
use crate::telegram::{MessageChannel, TelegramBot};

/// All collaborators for one process, wired once at startup.
pub struct Runner<C, H, S> {
    channel: C,
    history: H,
    store: Option<S>,
    fetcher: PageFetcher,
    render: Option<RenderGateway>,
    sighting_rules: SightingRules,
    game_rules: GameRules,
    config: Config,
    roster: Vec<RosterEntry>,
    topic: Option<i64>,
    log: SentLog,
}

impl Runner<TelegramBot, HistoryProvider, SheetsClient> {
    /// Wire the production collaborators from configuration and
    /// credentials. Optional credentials select degraded providers
    /// instead of failing.
    pub fn from_parts(config: Config, creds: &Credentials) -> Result<Self> {
        let channel = TelegramBot::new(&creds.bot_token, creds.chat_id);

        let history = match (&creds.history_api_url, &creds.history_api_token) {
            (Some(url), Some(token)) => {
                HistoryProvider::Gateway(HistoryGateway::new(url, token, creds.chat_id))
            }
            _ => HistoryProvider::Disabled,
        };

        let store = match (&creds.spreadsheet_id, &creds.sheets_token) {
            (Some(id), Some(token)) => Some(SheetsClient::new(id, token)),
            _ => None,
        };

        let fetcher = PageFetcher::new(Duration::from_secs(config.timeouts.fetch_secs))?;
        let render = creds
            .render_api_url
            .as_deref()
            .map(|url| RenderGateway::new(url, Duration::from_secs(config.timeouts.render_secs)))
            .transpose()?;

        let sighting_rules = SightingRules::from_config(&config.site, &config.team)?;
        let game_rules = GameRules::new()?;
        let roster = RosterEntry::from_config(&config.roster);

        Ok(Self {
            channel,
            history,
            store,
            fetcher,
            render,
            sighting_rules,
            game_rules,
            roster,
            topic: creds.announcements_topic_id,
            config,
            log: SentLog::new(),
        })
    }
}

impl<C, H, S> Runner<C, H, S>
where
    C: MessageChannel,
    H: PollHistory,
    S: AttendanceStore,
{
    /// Run every check due at `now`.
    pub async fn run_once(&mut self, now: NaiveDateTime) {
        let slot = TimeSlot::at(now);
        info!(now = %now, "starting scheduled checks");

        if let Err(e) = self.birthday_step(&slot).await {
            warn!(step = "birthdays", error = %e, "step failed");
        }
        if let Err(e) = self.site_step(&slot).await {
            warn!(step = "site", error = %e, "step failed");
        }
        if let Err(e) = self.motivation_step(&slot).await {
            warn!(step = "motivation poll", error = %e, "step failed");
        }
        if let Err(e) = self.weekly_poll_step(&slot).await {
            warn!(step = "weekly poll", error = %e, "step failed");
        }
        if let Err(e) = self.attendance_step(&slot).await {
            warn!(step = "attendance", error = %e, "step failed");
        }
        if let Err(e) = self.report_step(&slot).await {
            warn!(step = "monthly report", error = %e, "step failed");
        }

        info!(sent = self.log.len(), "all checks done");
    }

    /// Congratulation message per celebrant, plus one celebration poll
    /// for the first name on the list.
    async fn birthday_step(&mut self, slot: &TimeSlot) -> Result<()> {
        if !slot.birthday_window {
            return Ok(());
        }
        let birthdays = roster::birthdays_on(slot.today, &self.roster);
        if birthdays.is_empty() {
            info!("no birthdays today");
            return Ok(());
        }

        let mut dispatcher = Dispatcher::new(&self.channel, &mut self.log);
        for birthday in &birthdays {
            dispatcher
                .dispatch_message(
                    NotificationId::birthday(slot.today, &birthday.name),
                    None,
                    || roster::birthday_message(birthday),
                )
                .await;
        }
        if let Some(first) = birthdays.first() {
            dispatcher
                .dispatch_poll(
                    NotificationId::birthday_poll(slot.today, &first.name),
                    None,
                    || polls::birthday_poll(&first.name),
                )
                .await;
        }
        Ok(())
    }

    /// Scan the league page for the team; a sighting with a game link
    /// chains into the start and end checks even when the sighting
    /// itself was already announced.
    async fn site_step(&mut self, slot: &TimeSlot) -> Result<()> {
        let html = self.fetcher.fetch(&self.config.site.url).await?;
        let Some(sighting) = self.sighting_rules.detect(&html) else {
            info!("team not on the scoreboard");
            return Ok(());
        };
        info!(team = %sighting.team, url = ?sighting.game_url, "team sighted");

        match &sighting.game_url {
            Some(url) => {
                let url = url.clone();
                {
                    let team = &sighting.team;
                    let mut dispatcher = Dispatcher::new(&self.channel, &mut self.log);
                    dispatcher
                        .dispatch_message(NotificationId::sighting(&url), None, || {
                            sighting_message(team, &url)
                        })
                        .await;
                }
                self.game_checks(slot, &url).await?;
            }
            None => {
                let team = &sighting.team;
                let mut dispatcher = Dispatcher::new(&self.channel, &mut self.log);
                dispatcher
                    .dispatch_message(
                        NotificationId::sighting_no_link(team, slot.today),
                        None,
                        || no_link_message(team),
                    )
                    .await;
            }
        }
        Ok(())
    }

    async fn game_checks(&mut self, slot: &TimeSlot, game_url: &str) -> Result<()> {
        let html = self.fetcher.fetch(game_url).await?;
        let info = self.game_rules.extract(&html);
        info!(
            time = ?info.time,
            team1 = ?info.team1,
            team2 = ?info.team2,
            score = ?info.score,
            "game page parsed"
        );

        if let Some(time) = &info.time {
            if game::should_announce_start(time, slot.now, slot.last_slot_of_day) {
                let mut dispatcher = Dispatcher::new(&self.channel, &mut self.log);
                dispatcher
                    .dispatch_message(NotificationId::game_start(game_url), None, || {
                        game::start_message(&info, game_url)
                    })
                    .await;
            }
        }

        // The markup tier misses scores that only fill in client side,
        // so the render gateway serves as a second tier.
        let final_info = match &info.score {
            Some(score) if self.game_rules.is_score(score) => Some(info.clone()),
            _ => self.rendered_game_info(game_url).await,
        };
        if let Some(final_info) = final_info {
            let score = final_info
                .score
                .clone()
                .filter(|s| self.game_rules.is_score(s));
            if let Some(score) = score {
                let mut dispatcher = Dispatcher::new(&self.channel, &mut self.log);
                dispatcher
                    .dispatch_message(NotificationId::game_end(game_url), None, || {
                        game::end_message(&final_info, &score, game_url)
                    })
                    .await;
            }
        }
        Ok(())
    }

    async fn rendered_game_info(&self, game_url: &str) -> Option<GameInfo> {
        let render = self.render.as_ref()?;
        match render.render(game_url).await {
            Ok(text) => Some(self.game_rules.extract_from_text(&text)),
            Err(e) => {
                warn!(error = %e, "render gateway failed, skipping rendered tier");
                None
            }
        }
    }

    async fn motivation_step(&mut self, slot: &TimeSlot) -> Result<()> {
        if !slot.motivation_poll_window {
            return Ok(());
        }
        let polls_cfg = &self.config.polls;
        let mut dispatcher = Dispatcher::new(&self.channel, &mut self.log);
        dispatcher
            .dispatch_poll(NotificationId::motivation_poll(slot.today), None, || {
                polls::motivation_poll(polls_cfg)
            })
            .await;
        Ok(())
    }

    async fn weekly_poll_step(&mut self, slot: &TimeSlot) -> Result<()> {
        if !slot.weekly_poll_window {
            return Ok(());
        }
        let polls_cfg = &self.config.polls;
        let topic = self.topic;
        let mut dispatcher = Dispatcher::new(&self.channel, &mut self.log);
        dispatcher
            .dispatch_poll(NotificationId::weekly_poll(slot.today), topic, || {
                polls::weekly_training_poll(polls_cfg)
            })
            .await;
        Ok(())
    }

    async fn attendance_step(&mut self, slot: &TimeSlot) -> Result<()> {
        let Some(target) = slot.attendance_target else {
            return Ok(());
        };
        let Some(store) = &self.store else {
            warn!("sheets credentials missing, skipping attendance collection");
            return Ok(());
        };
        collect_attendance(&self.history, store, &mut self.log, slot.today, target).await?;
        Ok(())
    }

    async fn report_step(&mut self, slot: &TimeSlot) -> Result<()> {
        if !slot.monthly_report_window {
            return Ok(());
        }
        let Some(store) = &self.store else {
            warn!("sheets credentials missing, skipping monthly report");
            return Ok(());
        };
        let sheet = sheet_for_month(slot.today.year(), slot.today.month());
        let rows = store.read_all_rows(&sheet).await?;
        let stats = MonthlyStats::from_rows(&rows);

        let topic = self.topic;
        let mut dispatcher = Dispatcher::new(&self.channel, &mut self.log);
        dispatcher
            .dispatch_message(
                NotificationId::monthly_report(slot.today.year(), slot.today.month()),
                topic,
                || report_message(&stats),
            )
            .await;
        Ok(())
    }
}

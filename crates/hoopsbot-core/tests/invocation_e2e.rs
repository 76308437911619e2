//! End-to-end flows over mocked HTTP collaborators.
//!
//! Each test wires real components against mockito servers the same way
//! one scheduled invocation does, and checks the at-most-once dispatch
//! contract on the wire.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use mockito::Matcher;

use hoopsbot_core::attendance::collect_attendance;
use hoopsbot_core::config::{Config, RosterEntryConfig};
use hoopsbot_core::fetch::PageFetcher;
use hoopsbot_core::game;
use hoopsbot_core::history::HistoryGateway;
use hoopsbot_core::roster::{self, RosterEntry};
use hoopsbot_core::sheets::{sheet_for_month, AttendanceStore, SheetsClient};
use hoopsbot_core::sighting::sighting_message;
use hoopsbot_core::stats::{report_message, MonthlyStats};
use hoopsbot_core::{
    Dispatcher, GameRules, NotificationId, SentLog, SightingRules, TelegramBot, TimeSlot,
    TrainingDay,
};

const TG_OK: &str = r#"{"ok":true,"result":{"message_id":10}}"#;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

/// Test: a birthday in the morning window produces exactly one chat
/// message even when the check runs twice.
#[tokio::test]
async fn test_birthday_window_sends_exactly_once() {
    let mut tg = mockito::Server::new_async().await;
    let expected_text = "🎉 Сегодня день рождения у A (25 лет)! \n Поздравляем! 🎂";
    let send = tg
        .mock("POST", "/bottok/sendMessage")
        .match_body(Matcher::Json(serde_json::json!({
            "chat_id": 42,
            "text": expected_text,
        })))
        .with_body(TG_OK)
        .create_async()
        .await;

    let bot = TelegramBot::new("tok", 42).with_api_base(&tg.url());
    let roster = RosterEntry::from_config(&[RosterEntryConfig {
        name: "A".into(),
        birthdate: "2000-05-21".into(),
    }]);
    let mut log = SentLog::new();

    let slot = TimeSlot::at(at(2025, 5, 21, 9, 10));
    assert!(slot.birthday_window);

    for _ in 0..2 {
        let mut dispatcher = Dispatcher::new(&bot, &mut log);
        for birthday in roster::birthdays_on(slot.today, &roster) {
            dispatcher
                .dispatch_message(
                    NotificationId::birthday(slot.today, &birthday.name),
                    None,
                    || roster::birthday_message(&birthday),
                )
                .await;
        }
    }

    send.assert_async().await;
}

/// Test: a league page sighting resolves the game link, and the game
/// page's schedule triggers the start announcement in the matching
/// half hour.
#[tokio::test]
async fn test_sighting_chain_announces_game_start() {
    let mut site = mockito::Server::new_async().await;
    let mut tg = mockito::Server::new_async().await;

    site.mock("GET", "/")
        .with_body(
            r#"<html><body>
                <h2>Табло игры</h2>
                <div>19:00 PullUP - Тигры</div>
                <a href="game.html?gameId=7">СТРАНИЦА ИГРЫ</a>
                <p>online видеотрансляции игр доступны на странице лиги</p>
            </body></html>"#,
        )
        .create_async()
        .await;
    site.mock("GET", "/game.html")
        .match_query(Matcher::UrlEncoded("gameId".into(), "7".into()))
        .with_body(
            r#"<html><body>
                <span class="fa-calendar"> 19:00</span>
                <h2>PullUP против Тигры</h2>
            </body></html>"#,
        )
        .create_async()
        .await;

    let sent = tg
        .mock("POST", "/bottok/sendMessage")
        .with_body(TG_OK)
        .expect(2)
        .create_async()
        .await;

    let mut config = Config::default();
    config.site.url = site.url();
    let rules = SightingRules::from_config(&config.site, &config.team).unwrap();
    let game_rules = GameRules::new().unwrap();
    let fetcher = PageFetcher::new(Duration::from_secs(5)).unwrap();
    let bot = TelegramBot::new("tok", 42).with_api_base(&tg.url());
    let mut log = SentLog::new();

    let slot = TimeSlot::at(at(2025, 5, 21, 19, 10));

    let html = fetcher.fetch(&config.site.url).await.unwrap();
    let sighting = rules.detect(&html).unwrap();
    assert_eq!(sighting.team, "PullUP");
    let url = sighting.game_url.clone().unwrap();

    let mut dispatcher = Dispatcher::new(&bot, &mut log);
    dispatcher
        .dispatch_message(NotificationId::sighting(&url), None, || {
            sighting_message(&sighting.team, &url)
        })
        .await;

    let game_html = fetcher.fetch(&url).await.unwrap();
    let info = game_rules.extract(&game_html);
    assert_eq!(info.time.as_deref(), Some("19:00"));
    assert_eq!(info.team1.as_deref(), Some("PullUP"));
    assert_eq!(info.team2.as_deref(), Some("Тигры"));

    let time = info.time.clone().unwrap();
    assert!(game::should_announce_start(
        &time,
        slot.now,
        slot.last_slot_of_day
    ));
    dispatcher
        .dispatch_message(NotificationId::game_start(&url), None, || {
            game::start_message(&info, &url)
        })
        .await;

    sent.assert_async().await;
}

/// Test: attendance collection reads the Sunday poll from the history
/// gateway and appends exactly one header-plus-row write to the month's
/// sheet, with a repeat collection deduplicated.
#[tokio::test]
async fn test_attendance_collection_appends_sheet_row() {
    let mut history_srv = mockito::Server::new_async().await;
    let mut sheets_srv = mockito::Server::new_async().await;

    let poll_json = serde_json::json!({
        "polls": [{
            "question": "🏀 Тренировки на неделе СШОР ВО",
            "date": "2025-05-18T09:05:00",
            "is_anonymous": false,
            "options": [
                {"text": "🏀 Вторник 19:00", "voter_count": 2, "voter_names": ["Аня", "Борис"]},
                {"text": "❌ Нет", "voter_count": 1, "voter_names": ["Дима"]}
            ]
        }]
    });
    history_srv
        .mock("GET", Matcher::Regex("^/polls/search".into()))
        .with_body(poll_json.to_string())
        .create_async()
        .await;

    sheets_srv
        .mock("GET", "/v4/spreadsheets/sheet1/values/Trainings_2025-05")
        .with_body(r#"{"range":"'Trainings_2025-05'!A1:Z1000"}"#)
        .create_async()
        .await;
    let append = sheets_srv
        .mock("POST", "/v4/spreadsheets/sheet1/values/Trainings_2025-05:append")
        .match_query(Matcher::UrlEncoded(
            "valueInputOption".into(),
            "USER_ENTERED".into(),
        ))
        .match_body(Matcher::Json(serde_json::json!({
            "values": [
                ["Дата опроса", "День недели", "Тренировка", "Участники", "Количество"],
                ["2025-05-18", "Вторник", "Вторник тренировка", "Аня, Борис", "2"]
            ]
        })))
        .with_body("{}")
        .create_async()
        .await;

    let history = HistoryGateway::new(&history_srv.url(), "htok", 42);
    let store = SheetsClient::new("sheet1", "stok").with_base_url(&sheets_srv.url());
    let mut log = SentLog::new();
    let today = NaiveDate::from_ymd_opt(2025, 5, 21).unwrap();

    let appended = collect_attendance(&history, &store, &mut log, today, TrainingDay::Tuesday)
        .await
        .unwrap();
    assert!(appended);

    let again = collect_attendance(&history, &store, &mut log, today, TrainingDay::Tuesday)
        .await
        .unwrap();
    assert!(!again);

    append.assert_async().await;
}

/// Test: the monthly report renders sheet rows into the Russian summary
/// and goes to the announcements topic exactly once.
#[tokio::test]
async fn test_monthly_report_over_the_wire() {
    let mut sheets_srv = mockito::Server::new_async().await;
    let mut tg = mockito::Server::new_async().await;

    sheets_srv
        .mock("GET", "/v4/spreadsheets/sheet1/values/Trainings_2025-05")
        .with_body(
            serde_json::json!({
                "values": [
                    ["Дата опроса", "День недели", "Тренировка", "Участники", "Количество"],
                    ["2025-05-06", "Вторник", "Вторник тренировка", "Аня, Борис", "2"]
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let expected_report = indoc::indoc! {"
        📊 Месячный отчет по тренировкам

        🏀 Всего тренировок: 1
        👥 Общее количество участников: 2

        📅 По дням недели:
          Вторник: 1 тренировок, 2 участников

        🏆 Самые активные участники:
          Аня: 1 тренировок
          Борис: 1 тренировок

        📉 Менее активные участники:
          Аня: 1 тренировок
          Борис: 1 тренировок
    "};
    let send = tg
        .mock("POST", "/bottok/sendMessage")
        .match_body(Matcher::Json(serde_json::json!({
            "chat_id": 42,
            "text": expected_report,
            "message_thread_id": 5,
        })))
        .with_body(TG_OK)
        .create_async()
        .await;

    let store = SheetsClient::new("sheet1", "stok").with_base_url(&sheets_srv.url());
    let bot = TelegramBot::new("tok", 42).with_api_base(&tg.url());
    let mut log = SentLog::new();

    let rows = store.read_all_rows(&sheet_for_month(2025, 5)).await.unwrap();
    let stats = MonthlyStats::from_rows(&rows);

    for _ in 0..2 {
        let mut dispatcher = Dispatcher::new(&bot, &mut log);
        dispatcher
            .dispatch_message(NotificationId::monthly_report(2025, 5), Some(5), || {
                report_message(&stats)
            })
            .await;
    }

    send.assert_async().await;
}

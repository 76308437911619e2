//! Privileged chat-history read path.
//!
//! Bot accounts cannot read chat history, so poll results come through
//! a separate gateway service holding user-session credentials. The
//! gateway only searches and returns candidates; picking the right poll
//! stays here where it can be tested. Without gateway credentials the
//! provider degrades to a warning and "no poll found".

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::HistoryError;

/// One option of a finished poll, with voters when the poll was open.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PollOptionResults {
    pub text: String,
    #[serde(default)]
    pub voter_count: u32,
    #[serde(default)]
    pub voter_names: Vec<String>,
}

/// A poll message as the gateway reports it.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PollResults {
    pub question: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub is_anonymous: bool,
    pub options: Vec<PollOptionResults>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    polls: Vec<PollResults>,
}

/// Read access to past polls.
pub trait PollHistory {
    /// Latest Sunday training poll matching `query` since `since`.
    fn latest_training_poll(
        &self,
        query: &str,
        since: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Option<PollResults>, HistoryError>> + Send;
}

/// HTTP client for the history gateway.
#[derive(Debug, Clone)]
pub struct HistoryGateway {
    client: reqwest::Client,
    base_url: String,
    token: String,
    chat_id: i64,
}

impl HistoryGateway {
    pub fn new(base_url: &str, token: &str, chat_id: i64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            chat_id,
        }
    }

    async fn search(
        &self,
        query: &str,
        since: NaiveDate,
    ) -> Result<Vec<PollResults>, HistoryError> {
        let url = format!(
            "{}/polls/search?chat_id={}&query={}&since={}",
            self.base_url,
            self.chat_id,
            urlencoding::encode(query),
            since
        );
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 404 {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(HistoryError::Status {
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| HistoryError::UnexpectedResponse(e.to_string()))?;
        Ok(body.polls)
    }
}

/// The poll the attendance pipeline wants: newest candidate whose
/// question mentions trainings and which was posted on a Sunday.
pub fn pick_sunday_training_poll(polls: Vec<PollResults>) -> Option<PollResults> {
    polls.into_iter().find(|p| {
        p.question.to_lowercase().contains("тренировки") && p.date.weekday() == Weekday::Sun
    })
}

impl PollHistory for HistoryGateway {
    async fn latest_training_poll(
        &self,
        query: &str,
        since: NaiveDate,
    ) -> Result<Option<PollResults>, HistoryError> {
        let polls = self.search(query, since).await?;
        let picked = pick_sunday_training_poll(polls);
        match &picked {
            Some(p) => info!(date = %p.date, "found training poll"),
            None => info!("no recent Sunday training poll found"),
        }
        Ok(picked)
    }
}

/// Provider selected at startup from the available credentials.
pub enum HistoryProvider {
    Gateway(HistoryGateway),
    Disabled,
}

impl PollHistory for HistoryProvider {
    async fn latest_training_poll(
        &self,
        query: &str,
        since: NaiveDate,
    ) -> Result<Option<PollResults>, HistoryError> {
        match self {
            HistoryProvider::Gateway(g) => g.latest_training_poll(query, since).await,
            HistoryProvider::Disabled => {
                warn!("history gateway credentials missing, skipping poll readback");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll(question: &str, date: &str) -> PollResults {
        PollResults {
            question: question.into(),
            date: NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M").unwrap(),
            is_anonymous: false,
            options: vec![],
        }
    }

    #[test]
    fn picks_newest_sunday_training_poll() {
        // 2025-05-25 is a Sunday, 2025-05-24 a Saturday.
        let polls = vec![
            poll("🏀 Тренировки на неделе СШОР ВО", "2025-05-24 09:00"),
            poll("🏀 Тренировки на неделе СШОР ВО", "2025-05-25 09:00"),
            poll("🏀 Тренировки на неделе СШОР ВО", "2025-05-18 09:00"),
        ];
        let picked = pick_sunday_training_poll(polls).unwrap();
        assert_eq!(picked.date.date(), NaiveDate::from_ymd_opt(2025, 5, 25).unwrap());
    }

    #[test]
    fn ignores_polls_without_training_question() {
        let polls = vec![poll("Кто победит?", "2025-05-25 09:00")];
        assert!(pick_sunday_training_poll(polls).is_none());
    }

    #[tokio::test]
    async fn gateway_searches_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/polls/search?chat_id=-100&query=%D0%A2%D1%80%D0%B5%D0%BD%D0%B8%D1%80%D0%BE%D0%B2%D0%BA%D0%B8%20%D0%BD%D0%B0%20%D0%BD%D0%B5%D0%B4%D0%B5%D0%BB%D0%B5&since=2025-05-18",
            )
            .match_header("authorization", "Bearer tok")
            .with_body(
                r#"{"polls":[{"question":"🏀 Тренировки на неделе","date":"2025-05-25T09:00:00","is_anonymous":false,"options":[{"text":"🏀 Вторник 19:00","voter_count":2,"voter_names":["Аня","Борис"]}]}]}"#,
            )
            .create_async()
            .await;

        let gateway = HistoryGateway::new(&server.url(), "tok", -100);
        let picked = gateway
            .latest_training_poll(
                "Тренировки на неделе",
                NaiveDate::from_ymd_opt(2025, 5, 18).unwrap(),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(picked.options[0].voter_names, vec!["Аня", "Борис"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn gateway_treats_404_as_no_poll() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let gateway = HistoryGateway::new(&server.url(), "tok", -100);
        let picked = gateway
            .latest_training_poll("x", NaiveDate::from_ymd_opt(2025, 5, 18).unwrap())
            .await
            .unwrap();
        assert!(picked.is_none());
    }

    #[tokio::test]
    async fn disabled_provider_yields_nothing() {
        let provider = HistoryProvider::Disabled;
        let picked = provider
            .latest_training_poll("x", NaiveDate::from_ymd_opt(2025, 5, 18).unwrap())
            .await
            .unwrap();
        assert!(picked.is_none());
    }
}

//! Notification dispatch.
//!
//! Every outgoing message and poll funnels through [`Dispatcher`],
//! which consults the sent log before touching the network. An id is
//! recorded only after the channel confirms the send, so a failed send
//! is retried on the next invocation instead of being lost.

use tracing::{info, warn};

use crate::dedup::{NotificationId, SentLog};
use crate::telegram::{MessageChannel, PollSpec};

pub struct Dispatcher<'a, C: MessageChannel> {
    channel: &'a C,
    log: &'a mut SentLog,
}

impl<'a, C: MessageChannel> Dispatcher<'a, C> {
    pub fn new(channel: &'a C, log: &'a mut SentLog) -> Self {
        Self { channel, log }
    }

    /// Send a text message at most once per id. The renderer runs only
    /// when the id is new. Returns whether a send happened.
    pub async fn dispatch_message(
        &mut self,
        id: NotificationId,
        thread_id: Option<i64>,
        render: impl FnOnce() -> String,
    ) -> bool {
        if self.log.has(&id) {
            info!(id = %id, "notification already sent, skipping");
            return false;
        }
        let text = render();
        match self.channel.send_message(&text, thread_id).await {
            Ok(()) => {
                info!(id = %id, "notification sent");
                self.log.record(id);
                true
            }
            Err(e) => {
                warn!(id = %id, error = %e, "send failed, will retry next run");
                false
            }
        }
    }

    /// Send a poll at most once per id. Same contract as
    /// [`dispatch_message`](Self::dispatch_message).
    pub async fn dispatch_poll(
        &mut self,
        id: NotificationId,
        thread_id: Option<i64>,
        build: impl FnOnce() -> PollSpec,
    ) -> bool {
        if self.log.has(&id) {
            info!(id = %id, "poll already sent, skipping");
            return false;
        }
        let spec = build();
        match self.channel.send_poll(&spec, thread_id).await {
            Ok(message_id) => {
                info!(id = %id, message_id, "poll sent");
                self.log.record(id);
                true
            }
            Err(e) => {
                warn!(id = %id, error = %e, "poll send failed, will retry next run");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TelegramError;
    use std::sync::Mutex;

    /// Channel fake that records sends and can be told to fail.
    #[derive(Default)]
    struct RecordingChannel {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    impl MessageChannel for RecordingChannel {
        async fn send_message(
            &self,
            text: &str,
            _thread_id: Option<i64>,
        ) -> Result<(), TelegramError> {
            if self.fail {
                return Err(TelegramError::Api {
                    method: "sendMessage".into(),
                    description: "boom".into(),
                });
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn send_poll(
            &self,
            spec: &PollSpec,
            _thread_id: Option<i64>,
        ) -> Result<i64, TelegramError> {
            if self.fail {
                return Err(TelegramError::Api {
                    method: "sendPoll".into(),
                    description: "boom".into(),
                });
            }
            self.sent.lock().unwrap().push(spec.question.clone());
            Ok(1)
        }
    }

    fn id() -> NotificationId {
        NotificationId::game_start("http://example.com/g1")
    }

    #[tokio::test]
    async fn renderer_runs_at_most_once_per_id() {
        let channel = RecordingChannel::default();
        let mut log = SentLog::new();
        let mut dispatcher = Dispatcher::new(&channel, &mut log);

        let mut renders = 0;
        let sent = dispatcher
            .dispatch_message(id(), None, || {
                renders += 1;
                "первое".into()
            })
            .await;
        assert!(sent);

        let sent = dispatcher
            .dispatch_message(id(), None, || {
                renders += 1;
                "второе".into()
            })
            .await;
        assert!(!sent);

        assert_eq!(renders, 1);
        assert_eq!(channel.sent.lock().unwrap().as_slice(), ["первое"]);
    }

    #[tokio::test]
    async fn failed_send_is_not_recorded() {
        let channel = RecordingChannel {
            fail: true,
            ..Default::default()
        };
        let mut log = SentLog::new();
        let mut dispatcher = Dispatcher::new(&channel, &mut log);

        let sent = dispatcher.dispatch_message(id(), None, || "x".into()).await;
        assert!(!sent);
        assert!(!log.has(&id()));

        // Next cycle with a healthy channel goes through.
        let channel = RecordingChannel::default();
        let mut dispatcher = Dispatcher::new(&channel, &mut log);
        let sent = dispatcher.dispatch_message(id(), None, || "x".into()).await;
        assert!(sent);
        assert!(log.has(&id()));
    }

    #[tokio::test]
    async fn poll_dispatch_shares_the_dedup_log() {
        let channel = RecordingChannel::default();
        let mut log = SentLog::new();
        let mut dispatcher = Dispatcher::new(&channel, &mut log);

        let date = chrono::NaiveDate::from_ymd_opt(2025, 5, 25).unwrap();
        let spec = PollSpec {
            question: "Тренировки на неделе".into(),
            options: vec!["а".into(), "б".into()],
            is_anonymous: false,
            allows_multiple_answers: true,
            explanation: None,
        };

        let first = dispatcher
            .dispatch_poll(NotificationId::weekly_poll(date), Some(5), || spec.clone())
            .await;
        let second = dispatcher
            .dispatch_poll(NotificationId::weekly_poll(date), Some(5), || spec.clone())
            .await;
        assert!(first);
        assert!(!second);
        assert_eq!(channel.sent.lock().unwrap().len(), 1);
    }
}

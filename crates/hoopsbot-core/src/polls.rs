//! Poll builders.
//!
//! The weekly training poll is open and multi-answer so attendance can
//! be read back per person; the fun polls keep Telegram's defaults
//! (anonymous, single answer).

use crate::config::PollsConfig;
use crate::telegram::PollSpec;

/// Sunday poll asking who comes to which training.
pub fn weekly_training_poll(cfg: &PollsConfig) -> PollSpec {
    PollSpec {
        question: cfg.weekly_question.clone(),
        options: cfg.weekly_options.clone(),
        is_anonymous: false,
        allows_multiple_answers: true,
        explanation: Some(cfg.weekly_explanation.clone()),
    }
}

/// Monday team-motivation poll.
pub fn motivation_poll(cfg: &PollsConfig) -> PollSpec {
    PollSpec {
        question: cfg.motivation_question.clone(),
        options: cfg.motivation_options.clone(),
        is_anonymous: true,
        allows_multiple_answers: false,
        explanation: Some(cfg.motivation_explanation.clone()),
    }
}

/// Congratulation poll for the first birthday person of the day.
pub fn birthday_poll(name: &str) -> PollSpec {
    PollSpec {
        question: format!("🎉 Как поздравить {name} с днем рождения?"),
        options: [
            "🎂 Торт и свечи",
            "🏀 Баскетбольный матч",
            "🎁 Подарок",
            "🍕 Пицца",
            "🎵 Музыка",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
        is_anonymous: true,
        allows_multiple_answers: false,
        explanation: Some("Выберите способ поздравления! 🎉".into()),
    }
}

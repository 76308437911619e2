//! Team-sighting detection on the league site.
//!
//! The site publishes a scoreboard block between two fixed text
//! markers. Detection walks that block with an ordered pattern list;
//! the game link is then looked up across the whole page, first by the
//! anchor's visible label, then by href keywords.

use regex::{Regex, RegexBuilder};
use url::Url;

use crate::config::{SiteConfig, TeamConfig};
use crate::error::ValidationError;
use crate::html::{extract_links, normalize_entities, strip_tags, Link};

/// A detected appearance of the team on the monitored page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sighting {
    /// Team label exactly as matched, trimmed.
    pub team: String,
    /// Absolute game page URL, when one could be resolved.
    pub game_url: Option<String>,
}

/// Compiled detection rules.
pub struct SightingRules {
    base_url: String,
    block_start: String,
    block_end: String,
    patterns: Vec<Regex>,
    link_phrase_lc: String,
    link_keywords: Vec<String>,
}

impl SightingRules {
    /// Compile the configured patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if a team pattern is not a valid regex.
    pub fn from_config(site: &SiteConfig, team: &TeamConfig) -> Result<Self, ValidationError> {
        let patterns = team
            .patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ValidationError::InvalidValue {
                        field: "team.patterns".into(),
                        message: format!("{p}: {e}"),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            base_url: site.url.clone(),
            block_start: site.block_start.clone(),
            block_end: site.block_end.clone(),
            patterns,
            link_phrase_lc: site.link_phrase.to_lowercase(),
            link_keywords: site
                .link_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        })
    }

    /// Run detection over raw page HTML.
    pub fn detect(&self, html: &str) -> Option<Sighting> {
        let text = strip_tags(&normalize_entities(html));
        let block = scoreboard_block(&text, &self.block_start, &self.block_end)?;
        let team = self.find_team(block)?;
        let game_url = self
            .find_game_link(&extract_links(html))
            .and_then(|href| resolve_href(&self.base_url, &href));
        Some(Sighting { team, game_url })
    }

    /// First match of the first pattern that hits anywhere in the block.
    pub fn find_team(&self, block: &str) -> Option<String> {
        for pattern in &self.patterns {
            if let Some(m) = pattern.find(block) {
                return Some(m.as_str().trim().to_string());
            }
        }
        None
    }

    /// The game page href: an anchor labeled with the known phrase, or
    /// failing that the first href carrying a game-ish keyword.
    pub fn find_game_link(&self, links: &[Link]) -> Option<String> {
        for link in links {
            if link.text.to_lowercase().contains(&self.link_phrase_lc) {
                return Some(link.href.clone());
            }
        }
        for link in links {
            let href_lc = link.href.to_lowercase();
            if self.link_keywords.iter().any(|k| href_lc.contains(k)) {
                return Some(link.href.clone());
            }
        }
        None
    }
}

/// Slice between the first occurrences of the two markers. Yields
/// nothing when either marker is missing or the start marker comes
/// after the end marker.
pub fn scoreboard_block<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let start_idx = text.find(start)?;
    let end_idx = text.find(end)?;
    if start_idx >= end_idx {
        return None;
    }
    Some(&text[start_idx..end_idx])
}

/// Absolute form of a possibly relative href.
pub fn resolve_href(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(String::from)
}

/// Chat announcement for a sighting with a game page.
pub fn sighting_message(team: &str, game_url: &str) -> String {
    format!("🏀 Найдена команда {team}!\n\n📋 СТРАНИЦА ИГРЫ: {game_url}")
}

/// Fallback announcement when no game link could be resolved.
pub fn no_link_message(team: &str) -> String {
    format!("🏀 Найдена команда {team}, но ссылка на страницу игры не найдена")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> SightingRules {
        SightingRules::from_config(&SiteConfig::default(), &TeamConfig::default()).unwrap()
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let team = TeamConfig {
            patterns: vec!["pull(up".into()],
        };
        assert!(SightingRules::from_config(&SiteConfig::default(), &team).is_err());
    }

    #[test]
    fn block_requires_both_markers_in_order() {
        assert_eq!(
            scoreboard_block("до Табло игры список online видеотрансляции игр доступны на странице хвост",
                "Табло игры",
                "online видеотрансляции игр доступны на странице"),
            Some("Табло игры список ")
        );
        assert!(scoreboard_block("Табло игры без конца", "Табло игры", "конец-маркер").is_none());
        assert!(scoreboard_block("без начала", "Табло игры", "без").is_none());
        // End marker before start marker.
        assert!(scoreboard_block("конец Табло", "Табло", "конец").is_none());
    }

    #[test]
    fn trailing_word_pattern_wins() {
        let found = rules().find_team("мы играем PULL UP фарм сегодня");
        assert_eq!(found.as_deref(), Some("PULL UP фарм"));
    }

    #[test]
    fn bare_variants_still_match() {
        let r = rules();
        assert_eq!(r.find_team("сегодня PullUP на площадке").as_deref(), Some("PullUP"));
        assert_eq!(r.find_team("команда Пулл-Ап в зале").as_deref(), Some("Пулл-Ап"));
        assert_eq!(r.find_team("никого нет"), None);
    }

    #[test]
    fn link_phrase_beats_keyword_fallback() {
        let links = vec![
            Link {
                href: "/podrobno.html?id=5".into(),
                text: "подробнее".into(),
            },
            Link {
                href: "/game.html?gameId=9".into(),
                text: "страница игры".into(),
            },
        ];
        assert_eq!(
            rules().find_game_link(&links).as_deref(),
            Some("/game.html?gameId=9")
        );
    }

    #[test]
    fn keyword_fallback_scans_hrefs() {
        let links = vec![
            Link {
                href: "/news.html".into(),
                text: "новости".into(),
            },
            Link {
                href: "/match-42".into(),
                text: "тут".into(),
            },
        ];
        assert_eq!(rules().find_game_link(&links).as_deref(), Some("/match-42"));
        assert_eq!(rules().find_game_link(&links[..1]), None);
    }

    #[test]
    fn resolve_href_joins_relative_and_keeps_absolute() {
        assert_eq!(
            resolve_href("http://letobasket.ru/", "game.html?gameId=1").as_deref(),
            Some("http://letobasket.ru/game.html?gameId=1")
        );
        assert_eq!(
            resolve_href("http://letobasket.ru/", "http://other.ru/g").as_deref(),
            Some("http://other.ru/g")
        );
        assert!(resolve_href("not a base", "x").is_none());
    }

    #[test]
    fn detect_combines_block_team_and_link() {
        let html = r#"
            <h2>Табло игры</h2>
            <div>19:00 PullUP - Тигры</div>
            <a href="game.html?gameId=7">СТРАНИЦА ИГРЫ</a>
            <p>online видеотрансляции игр доступны на странице лиги</p>
        "#;
        let sighting = rules().detect(html).unwrap();
        assert_eq!(sighting.team, "PullUP");
        assert_eq!(
            sighting.game_url.as_deref(),
            Some("http://letobasket.ru/game.html?gameId=7")
        );
    }

    #[test]
    fn detect_without_markers_yields_nothing() {
        assert!(rules().detect("<div>PullUP</div>").is_none());
    }

    #[test]
    fn detect_with_unresolvable_link_keeps_team() {
        let html = r#"
            Табло игры: PullUP сегодня
            <p>online видеотрансляции игр доступны на странице</p>
        "#;
        let sighting = rules().detect(html).unwrap();
        assert_eq!(sighting.team, "PullUP");
        assert!(sighting.game_url.is_none());
    }

    #[test]
    fn announcement_texts() {
        assert_eq!(
            sighting_message("PullUP", "http://letobasket.ru/game.html?gameId=7"),
            "🏀 Найдена команда PullUP!\n\n📋 СТРАНИЦА ИГРЫ: http://letobasket.ru/game.html?gameId=7"
        );
        assert_eq!(
            no_link_message("PullUP фарм"),
            "🏀 Найдена команда PullUP фарм, но ссылка на страницу игры не найдена"
        );
    }
}

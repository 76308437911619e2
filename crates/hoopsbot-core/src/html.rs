//! Low-level HTML string helpers.
//!
//! Deliberately naive, tailored to the league site's markup. Tag and
//! attribute scanning is ASCII case-insensitive; visible text keeps its
//! original casing for the callers to compare as they see fit.

/// A hyperlink as found on the page: raw href plus visible text with
/// nested tags stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

/// Remove all HTML tags `<...>` from the string, then collapse whitespace.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&out)
}

/// Minimal HTML entity decoding: handle `&nbsp;` and `&amp;` only.
pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ").replace("&amp;", "&")
}

/// Collapse sequences of whitespace into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Fast ASCII-only lowercasing for tag/attribute matching. Byte layout
/// is preserved, so offsets found here are valid in the original.
fn to_lowercase_fast(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Collect every `<a href=...>` on the page, in document order.
/// Anchors without an href are skipped.
pub fn extract_links(html: &str) -> Vec<Link> {
    let lc = to_lowercase_fast(html);
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(rel) = lc[pos..].find("<a") {
        let start = pos + rel;
        let after = start + 2;
        // Require a delimiter after "<a" so "<abbr" is not an anchor.
        match lc.as_bytes().get(after) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' => {}
            _ => {
                pos = after;
                continue;
            }
        }
        let Some(open_end_rel) = html[start..].find('>') else {
            break;
        };
        let open_end = start + open_end_rel;
        let open_tag = &html[start..open_end];

        let content_start = open_end + 1;
        let Some(close_rel) = lc[content_start..].find("</a") else {
            break;
        };
        let content_end = content_start + close_rel;

        if let Some(href) = find_attr(open_tag, "href") {
            out.push(Link {
                href,
                text: strip_tags(&html[content_start..content_end]),
            });
        }
        pos = content_end + 3;
    }
    out
}

/// Value of `name=...` inside one opening tag. Handles double-quoted,
/// single-quoted and bare values.
fn find_attr(tag: &str, name: &str) -> Option<String> {
    let lc = to_lowercase_fast(tag);
    let bytes = tag.as_bytes();
    let mut search = 0;

    while let Some(rel) = lc[search..].find(name) {
        let at = search + rel;
        let preceded = at > 0 && bytes[at - 1].is_ascii_whitespace();
        let mut i = at + name.len();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if !preceded || i >= bytes.len() || bytes[i] != b'=' {
            search = at + name.len();
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        return match bytes[i] {
            b'"' | b'\'' => {
                let quote = bytes[i] as char;
                let val_start = i + 1;
                tag[val_start..]
                    .find(quote)
                    .map(|e| tag[val_start..val_start + e].to_string())
            }
            _ => {
                let val_start = i;
                let end = tag[val_start..]
                    .find(|c: char| c.is_whitespace())
                    .map(|e| val_start + e)
                    .unwrap_or(tag.len());
                Some(tag[val_start..end].to_string())
            }
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_tags_removes_markup_and_collapses_ws() {
        let html = "<div>Табло   игры</div>\n<p>PullUP  <b>vs</b> Тигры</p>";
        assert_eq!(strip_tags(html), "Табло игры PullUP vs Тигры");
    }

    #[test]
    fn normalize_entities_handles_nbsp_and_amp() {
        assert_eq!(normalize_entities("a&nbsp;b&amp;c"), "a b&c");
    }

    #[test]
    fn extract_links_collects_href_and_visible_text() {
        let html = r#"<a href="game.html?id=1">СТРАНИЦА ИГРЫ</a> <a href='/other'>далее</a>"#;
        let links = extract_links(html);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].href, "game.html?id=1");
        assert_eq!(links[0].text, "СТРАНИЦА ИГРЫ");
        assert_eq!(links[1].href, "/other");
    }

    #[test]
    fn extract_links_strips_nested_tags_from_text() {
        let html = r#"<a href="/g"><b>СТРАНИЦА</b> <i>ИГРЫ</i></a>"#;
        let links = extract_links(html);
        assert_eq!(links[0].text, "СТРАНИЦА ИГРЫ");
    }

    #[test]
    fn extract_links_skips_anchors_without_href() {
        let html = r#"<a name="top">якорь</a><a href="/g">игра</a>"#;
        let links = extract_links(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "/g");
    }

    #[test]
    fn extract_links_ignores_other_tags_starting_with_a() {
        let html = r#"<abbr title="x">т</abbr><a href="/g">игра</a>"#;
        let links = extract_links(html);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn find_attr_handles_unquoted_values() {
        let html = "<a href=game.html?gameId=2>игра</a>";
        let links = extract_links(html);
        assert_eq!(links[0].href, "game.html?gameId=2");
    }

    #[test]
    fn attr_name_must_be_a_whole_word() {
        // data-href must not satisfy an href lookup.
        let html = r#"<a data-href="/wrong">нет</a><a href="/right">да</a>"#;
        let links = extract_links(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "/right");
    }
}

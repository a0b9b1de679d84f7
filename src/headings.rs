use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Attribute stamped on every heading this module has already shifted, so a
/// second pass leaves it alone.
const SHIFTED_ATTR: &str = "data-outline";

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<h([1-6])((?:\s[^>]*)?)>(.*?)</h[1-6]>").expect("valid heading regex")
});

/// Book intros sit under the book title (h2): h1→h2, h2→h3, h3→h4.
pub fn normalize_book_intro(html: &str) -> String {
    shift_headings(html, |level| match level {
        1 => 2,
        2 => 3,
        3 => 4,
        other => other,
    })
}

/// Chapter intros and commentary sit under the chapter heading (h2):
/// h1→h3, h2→h4, h3→h4, h4→h5.
pub fn normalize_chapter_intro(html: &str) -> String {
    shift_headings(html, |level| match level {
        1 => 3,
        2 | 3 => 4,
        4 => 5,
        other => other,
    })
}

/// Commentary shares the chapter-intro outline.
pub fn normalize_commentary(html: &str) -> String {
    normalize_chapter_intro(html)
}

/// Translation-word definitions render their word as h3 under the section h2.
pub fn normalize_tw_definition(html: &str) -> String {
    shift_headings(html, |level| match level {
        1 => 3,
        2 => 4,
        other => other,
    })
}

fn shift_headings(html: &str, map_level: impl Fn(u8) -> u8) -> String {
    HEADING_RE
        .replace_all(html, |caps: &Captures<'_>| {
            let attrs = &caps[2];
            if attrs.contains(SHIFTED_ATTR) {
                return caps[0].to_owned();
            }
            let level = caps[1].parse::<u8>().unwrap_or(6);
            let shifted = map_level(level);
            format!(
                "<h{shifted}{attrs} {SHIFTED_ATTR}>{}</h{shifted}>",
                &caps[3]
            )
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_intro_levels_shift_in_one_pass() {
        let html = "<h1>Intro</h1><h2>Part</h2><h3>Sub</h3><h5>Keep</h5>";
        assert_eq!(
            normalize_book_intro(html),
            "<h2 data-outline>Intro</h2><h3 data-outline>Part</h3>\
<h4 data-outline>Sub</h4><h5 data-outline>Keep</h5>"
        );
    }

    #[test]
    fn chapter_intro_levels_shift_in_one_pass() {
        let html = "<h1 id=\"a\">A</h1><h2>B</h2><h3>C</h3><h4>D</h4>";
        assert_eq!(
            normalize_chapter_intro(html),
            "<h3 id=\"a\" data-outline>A</h3><h4 data-outline>B</h4>\
<h4 data-outline>C</h4><h5 data-outline>D</h5>"
        );
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let html = "<p>x</p>\n<h1>One</h1>\n<h2>Two\nlines</h2><h3>Three</h3>";
        let once = normalize_book_intro(html);
        assert_eq!(normalize_book_intro(&once), once);

        let once = normalize_chapter_intro(html);
        assert_eq!(normalize_chapter_intro(&once), once);
    }

    #[test]
    fn text_mentioning_tags_is_untouched() {
        let html = "<p>h1 and h2 are levels</p>";
        assert_eq!(normalize_book_intro(html), html);
    }
}

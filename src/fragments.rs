use std::collections::BTreeSet;

use regex::Regex;

use crate::bible_books;
use crate::headings;
use crate::model::{BcBook, ChapterNum, LangDirection, ResourceBook, TnBook, TqBook, TwBook};

pub const HR: &str = "<hr/>";
pub const END_OF_CHAPTER: &str = "<div class=\"end-of-chapter\"></div>";
pub const DIV_END: &str = "</div>";
pub const ROW_BEGIN: &str = "<div class='row'>";
pub const COLUMN_LEFT_BEGIN: &str = "<div class='column-left'>";
pub const COLUMN_RIGHT_BEGIN: &str = "<div class='column-right'>";

const LTR_BEGIN: &str = "<div style='direction: ltr;'>";
const RTL_BEGIN: &str = "<div style='direction: rtl;'>";

/// `None` for a code outside the canonical table.
pub fn book_title(book_code: &str) -> Option<String> {
    bible_books::book_name(book_code)
        .map(|name| format!("<h2 style='text-align:center;'>{name}</h2>"))
}

pub fn chapter_heading(chapter: ChapterNum) -> String {
    format!("<h2 class=\"chapter\">Chapter {chapter}</h2>")
}

pub fn resource_type_heading(resource_type_name: &str) -> String {
    format!("<h2>{resource_type_name}</h2>")
}

fn with_rule(html: String) -> String {
    format!("{html}{HR}")
}

pub fn tn_book_intro(tn_book: &TnBook) -> String {
    if tn_book.book_intro.trim().is_empty() {
        return String::new();
    }
    with_rule(headings::normalize_book_intro(&tn_book.book_intro))
}

pub fn bc_book_intro(bc_book: &BcBook) -> String {
    if bc_book.book_intro.trim().is_empty() {
        return String::new();
    }
    with_rule(headings::normalize_book_intro(&bc_book.book_intro))
}

pub fn chapter_intro(tn_book: &TnBook, chapter: ChapterNum) -> String {
    match tn_book.chapters.get(&chapter) {
        Some(tn_chapter) if !tn_chapter.intro_html.trim().is_empty() => {
            with_rule(headings::normalize_chapter_intro(&tn_chapter.intro_html))
        }
        _ => String::new(),
    }
}

pub fn chapter_commentary(bc_book: &BcBook, chapter: ChapterNum) -> String {
    match bc_book.chapters.get(&chapter) {
        Some(bc_chapter) if !bc_chapter.commentary.trim().is_empty() => {
            with_rule(headings::normalize_commentary(&bc_chapter.commentary))
        }
        _ => String::new(),
    }
}

/// Verse notes of one chapter in ascending verse order, set in two columns.
pub fn tn_chapter_verses(tn_book: &TnBook, chapter: ChapterNum) -> String {
    let Some(tn_chapter) = tn_book.chapters.get(&chapter) else {
        return String::new();
    };
    if tn_chapter.verses.is_empty() {
        return String::new();
    }
    let notes: String = tn_chapter.verses.values().map(String::as_str).collect();
    format!("<div style='column-count: 2;'>{notes}</div>{HR}")
}

pub fn tq_chapter_verses(tq_book: &TqBook, chapter: ChapterNum) -> String {
    let Some(tq_chapter) = tq_book.chapters.get(&chapter) else {
        return String::new();
    };
    if tq_chapter.verses.is_empty() {
        return String::new();
    }
    let questions: String = tq_chapter.verses.values().map(String::as_str).collect();
    format!(
        "<h3>{}</h3><div style='column-count:2;'>{questions}</div>{HR}",
        tq_book.resource_type_name
    )
}

/// Compiled `\b<word>\b` patterns for every distinct word of a TW book, in the
/// book's order. Built once per TW book and reused for every verse.
#[derive(Debug)]
pub struct TwWordMatcher<'a> {
    tw_book: &'a TwBook,
    words: Vec<(&'a str, Regex)>,
}

impl<'a> TwWordMatcher<'a> {
    pub fn new(tw_book: &'a TwBook) -> Self {
        let mut seen = BTreeSet::new();
        let mut words = Vec::new();
        for pair in &tw_book.name_content_pairs {
            let word = pair.localized_word.as_str();
            if word.is_empty() || !seen.insert(word) {
                continue;
            }
            match Regex::new(&format!(r"\b{}\b", regex::escape(word))) {
                Ok(word_re) => words.push((word, word_re)),
                Err(err) => {
                    tracing::warn!(word, error = %err, "skip translation word pattern");
                }
            }
        }
        Self { tw_book, words }
    }

    pub fn tw_book(&self) -> &'a TwBook {
        self.tw_book
    }

    /// Distinct words occurring as standalone tokens in `verse_html`.
    pub fn matches(&self, verse_html: &str) -> Vec<&'a str> {
        self.words
            .iter()
            .filter(|(_, word_re)| word_re.is_match(verse_html))
            .map(|(word, _)| *word)
            .collect()
    }
}

/// `<ul>` of links to the definitions of the words used in one verse, or
/// empty when none occur.
pub fn translation_word_links(matcher: &TwWordMatcher<'_>, verse_html: &str) -> String {
    let words = matcher.matches(verse_html);
    if words.is_empty() {
        return String::new();
    }
    let lang_code = &matcher.tw_book().lang_code;
    let mut html = String::from("<ul>");
    for word in words {
        html.push_str(&format!("<li><a href=\"#{lang_code}-{word}\">{word}</a></li>"));
    }
    html.push_str("</ul>");
    html
}

/// Per-verse TW block: a `{name} {chapter}:{verse}` heading over the links.
pub fn translation_word_verse_block(
    matcher: &TwWordMatcher<'_>,
    chapter: ChapterNum,
    verse: &str,
    verse_html: &str,
) -> String {
    let links = translation_word_links(matcher, verse_html);
    if links.is_empty() {
        return links;
    }
    format!(
        "<h4>{} {chapter}:{verse}</h4>{links}",
        matcher.tw_book().resource_type_name
    )
}

pub fn direction_html(direction: LangDirection) -> &'static str {
    match direction {
        LangDirection::Ltr => LTR_BEGIN,
        LangDirection::Rtl => RTL_BEGIN,
    }
}

/// Opening direction wrapper for any book kind.
pub fn language_direction_html(book: &impl ResourceBook) -> &'static str {
    direction_html(book.lang_direction())
}

pub fn has_footnotes(html: &str) -> bool {
    html.contains("<div class=\"footnotes\"")
}

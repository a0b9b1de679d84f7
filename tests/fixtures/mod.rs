#![allow(dead_code)]

use std::collections::BTreeMap;

use interleaved_doc::model::{
    BcBook, BcChapter, Book, LangDirection, ResourceBundle, TnBook, TnChapter, TqBook, TqChapter,
    TwBook, TwNameContentPair, UsfmBook, UsfmChapter, VerseRef,
};

pub fn verse_html(verse: &str, text: &str) -> String {
    format!("<p><span class=\"v-num\"><sup><b>{verse}</b></sup></span>{text}</p>")
}

/// Scripture whose chapter `n` holds the given verse texts, numbered from 1.
pub fn usfm_book(
    lang_code: &str,
    book_code: &str,
    lang_direction: LangDirection,
    chapters: &[(u32, &[&str])],
) -> UsfmBook {
    let chapters = chapters
        .iter()
        .map(|(chapter, texts)| {
            let verses: BTreeMap<VerseRef, String> = texts
                .iter()
                .enumerate()
                .map(|(idx, text)| {
                    let verse = (idx + 1).to_string();
                    let html = verse_html(&verse, text);
                    (VerseRef::new(verse), html)
                })
                .collect();
            let mut content = format!("<h2 class=\"chapter\">Chapter {chapter}</h2>");
            for html in verses.values() {
                content.push_str(html);
            }
            (*chapter, UsfmChapter { content, verses })
        })
        .collect();
    UsfmBook {
        lang_code: lang_code.to_owned(),
        lang_name: lang_code.to_owned(),
        book_code: book_code.to_owned(),
        resource_type_name: "Unlocked Literal Bible".to_owned(),
        lang_direction,
        chapters,
    }
}

pub fn tn_book(
    lang_code: &str,
    book_code: &str,
    lang_direction: LangDirection,
    chapters: &[u32],
) -> TnBook {
    let chapters = chapters
        .iter()
        .map(|chapter| {
            let mut verses = BTreeMap::new();
            verses.insert(
                VerseRef::from("1"),
                format!("<p>Note {lang_code} {chapter}:1</p>"),
            );
            (
                *chapter,
                TnChapter {
                    intro_html: "<h1>General notes</h1><p>Structure.</p>".to_owned(),
                    verses,
                },
            )
        })
        .collect();
    TnBook {
        lang_code: lang_code.to_owned(),
        lang_name: lang_code.to_owned(),
        book_code: book_code.to_owned(),
        resource_type_name: "Translation Notes".to_owned(),
        lang_direction,
        book_intro: "<h1>Introduction</h1><p>Background.</p>".to_owned(),
        chapters,
    }
}

pub fn tq_book(lang_code: &str, book_code: &str, chapters: &[u32]) -> TqBook {
    let chapters = chapters
        .iter()
        .map(|chapter| {
            let mut verses = BTreeMap::new();
            verses.insert(
                VerseRef::from("1"),
                format!("<p>Question {lang_code} {chapter}:1?</p>"),
            );
            (*chapter, TqChapter { verses })
        })
        .collect();
    TqBook {
        lang_code: lang_code.to_owned(),
        lang_name: lang_code.to_owned(),
        book_code: book_code.to_owned(),
        resource_type_name: "Translation Questions".to_owned(),
        lang_direction: LangDirection::Ltr,
        chapters,
    }
}

pub fn tw_book(lang_code: &str, book_code: &str, words: &[&str]) -> TwBook {
    TwBook {
        lang_code: lang_code.to_owned(),
        lang_name: lang_code.to_owned(),
        book_code: book_code.to_owned(),
        resource_type_name: "Translation Words".to_owned(),
        lang_direction: LangDirection::Ltr,
        name_content_pairs: words
            .iter()
            .map(|word| TwNameContentPair {
                localized_word: (*word).to_owned(),
                content: format!("<h3 data-outline>{word}</h3><p>Definition.</p>"),
            })
            .collect(),
    }
}

pub fn bc_book(lang_code: &str, book_code: &str, chapters: &[u32]) -> BcBook {
    BcBook {
        lang_code: lang_code.to_owned(),
        book_code: book_code.to_owned(),
        resource_type_name: "Bible Commentary".to_owned(),
        lang_direction: LangDirection::Ltr,
        book_intro: "<h1>About the letter</h1>".to_owned(),
        chapters: chapters
            .iter()
            .map(|chapter| {
                (
                    *chapter,
                    BcChapter {
                        commentary: format!("<h1>Commentary</h1><p>On {book_code} {chapter}</p>"),
                    },
                )
            })
            .collect(),
    }
}

pub fn bundle(books: Vec<Book>) -> ResourceBundle {
    books.into_iter().collect()
}

pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// Text between the opening and closing body tags.
pub fn body(html: &str) -> &str {
    let start = html.find("<body>\n").map_or(0, |idx| idx + "<body>\n".len());
    let end = html.rfind("\n</body>").unwrap_or(html.len());
    &html[start..end]
}

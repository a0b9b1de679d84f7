use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use anyhow::Context as _;
use regex::Regex;

use crate::bible_books;
use crate::book_then_lang;
use crate::fragments::{self, TwWordMatcher};
use crate::lang_then_book;
use crate::links;
use crate::model::{
    AssemblyLayout, AssemblyStrategy, ChapterNum, ResourceBundle, TwBook, UsfmBook, VerseRef,
};

const BASE_CSS: &str = "\
body { font-family: serif; }
.chapter { page-break-before: always; }
.v-num { font-size: 0.75em; }
.footnotes { font-size: 0.8em; }
.end-of-chapter { page-break-after: always; }
.row { display: flex; }
.column { flex: 50%; }
.column-left { flex: 50%; padding-right: 0.5em; }
.column-right { flex: 50%; padding-left: 0.5em; }
";

const COMPACT_CSS: &str = "\
body { font-size: 10pt; line-height: 1.2; }
h2, h3, h4 { margin: 0.4em 0 0.2em; }
p { margin: 0.2em 0; }
.end-of-chapter { page-break-after: auto; }
";

/// Everything up to and including the opening `<body>` tag.
pub fn document_header(layout: AssemblyLayout) -> String {
    let compact_css = if layout.is_compact() { COMPACT_CSS } else { "" };
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n<style>\n{BASE_CSS}{compact_css}</style>\n</head>\n<body>\n"
    )
}

pub fn document_footer() -> &'static str {
    "\n</body>\n</html>\n"
}

/// A verse that uses a translation word.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct WordUse {
    pub book_code: String,
    pub chapter: ChapterNum,
    pub verse: VerseRef,
}

impl WordUse {
    fn anchor(&self, lang_code: &str) -> String {
        let book_number = bible_books::book_number(&self.book_code).unwrap_or_default();
        format!(
            "#{lang_code}-{book_number:03}-ch-{}-v-{}",
            links::zero_pad(&self.chapter.to_string()),
            links::zero_pad(self.verse.as_str())
        )
    }

    fn label(&self) -> String {
        let book_name = bible_books::book_name(&self.book_code).unwrap_or(self.book_code.as_str());
        format!("{book_name} {}:{}", self.chapter, self.verse)
    }
}

/// Word to the verses of `usfm_books` using it, in canonical book order.
pub fn translation_word_uses<'a>(
    matcher: &TwWordMatcher<'a>,
    usfm_books: &[&UsfmBook],
) -> BTreeMap<&'a str, Vec<WordUse>> {
    let mut ordered: Vec<&UsfmBook> = usfm_books.to_vec();
    ordered.sort_by_key(|book| bible_books::canonical_position(&book.book_code));

    let mut uses: BTreeMap<&str, Vec<WordUse>> = BTreeMap::new();
    for usfm in ordered {
        for (chapter, usfm_chapter) in &usfm.chapters {
            for (verse, verse_html) in &usfm_chapter.verses {
                for word in matcher.matches(verse_html) {
                    uses.entry(word).or_default().push(WordUse {
                        book_code: usfm.book_code.clone(),
                        chapter: *chapter,
                        verse: verse.clone(),
                    });
                }
            }
        }
    }
    uses
}

fn uses_html(lang_code: &str, uses: &[WordUse]) -> String {
    if uses.is_empty() {
        return String::new();
    }
    let mut html = String::from("<h4>Uses:</h4><ul>");
    for word_use in uses {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>",
            word_use.anchor(lang_code),
            word_use.label()
        ));
    }
    html.push_str("</ul>");
    html
}

/// Gives the definition's word heading its anchor id. A definition without a
/// matching `<h3>` gets one prepended.
fn anchored_definition(lang_code: &str, word: &str, content: &str) -> String {
    let id = format!("{lang_code}-{word}");
    let pattern = format!(r"<h3([^>]*)>(\s*{})", regex::escape(word));
    match Regex::new(&pattern) {
        Ok(heading_re) if heading_re.is_match(content) => heading_re
            .replacen(content, 1, |caps: &regex::Captures<'_>| {
                format!("<h3 id=\"{id}\"{}>{}", &caps[1], &caps[2])
            })
            .into_owned(),
        _ => format!("<h3 id=\"{id}\">{word}</h3>{content}"),
    }
}

/// The document-tail definitions of one TW language. Non-compact layouts list
/// the verses of `usfm_books` that use each word.
pub fn translation_words_section(
    tw_book: &TwBook,
    usfm_books: &[&UsfmBook],
    layout: AssemblyLayout,
) -> String {
    if tw_book.name_content_pairs.is_empty() {
        return String::new();
    }

    let matcher = TwWordMatcher::new(tw_book);
    let uses = if layout.is_compact() {
        BTreeMap::new()
    } else {
        translation_word_uses(&matcher, usfm_books)
    };

    let mut html = String::new();
    html.push_str(fragments::language_direction_html(tw_book));
    html.push_str(&fragments::resource_type_heading(&tw_book.resource_type_name));
    for pair in &tw_book.name_content_pairs {
        let word = pair.localized_word.as_str();
        html.push_str(&anchored_definition(&tw_book.lang_code, word, &pair.content));
        if let Some(word_uses) = uses.get(word) {
            html.push_str(&uses_html(&tw_book.lang_code, word_uses));
        }
        html.push_str(fragments::HR);
    }
    html.push_str(fragments::DIV_END);
    html
}

/// One TW book per language, each paired with that language's primary USFM
/// books (the first per book code).
fn translation_word_sections(
    bundle: &ResourceBundle,
    layout: AssemblyLayout,
) -> impl Iterator<Item = String> + '_ {
    let mut seen_langs = BTreeSet::new();
    let tw_books: Vec<&TwBook> = bundle
        .tw_books
        .iter()
        .filter(|tw_book| seen_langs.insert(tw_book.lang_code.as_str()))
        .collect();

    tw_books.into_iter().map(move |tw_book| {
        let mut seen_books = BTreeSet::new();
        let usfm_books: Vec<&UsfmBook> = bundle
            .usfm_books
            .iter()
            .filter(|usfm| usfm.lang_code == tw_book.lang_code)
            .filter(|usfm| seen_books.insert(usfm.book_code.as_str()))
            .collect();
        tracing::debug!(
            lang_code = %tw_book.lang_code,
            words = tw_book.name_content_pairs.len(),
            "emit translation words"
        );
        translation_words_section(tw_book, &usfm_books, layout)
    })
}

/// Lazily yields the whole document: header, content in `strategy` order,
/// translation word definitions, footer.
pub fn assemble_fragments(
    bundle: &ResourceBundle,
    strategy: AssemblyStrategy,
    layout: AssemblyLayout,
) -> impl Iterator<Item = String> + '_ {
    tracing::info!(
        strategy = strategy.as_str(),
        layout = layout.as_str(),
        "assemble document"
    );
    let content: Box<dyn Iterator<Item = String> + '_> = match strategy {
        AssemblyStrategy::LanguageBookOrder => Box::new(
            lang_then_book::assemble_content_by_lang_then_book(bundle, layout),
        ),
        AssemblyStrategy::BookLanguageOrder => Box::new(
            book_then_lang::assemble_content_by_book_then_lang(bundle, layout),
        ),
    };

    std::iter::once(document_header(layout))
        .chain(content)
        .chain(translation_word_sections(bundle, layout).filter(|html| !html.is_empty()))
        .chain(std::iter::once(document_footer().to_owned()))
}

pub fn assemble_document(
    bundle: &ResourceBundle,
    strategy: AssemblyStrategy,
    layout: AssemblyLayout,
) -> String {
    assemble_fragments(bundle, strategy, layout).collect()
}

/// Streams the document into `out` fragment by fragment.
pub fn write_document<W: Write>(
    out: &mut W,
    bundle: &ResourceBundle,
    strategy: AssemblyStrategy,
    layout: AssemblyLayout,
) -> anyhow::Result<u64> {
    let mut written = 0u64;
    for fragment in assemble_fragments(bundle, strategy, layout) {
        out.write_all(fragment.as_bytes())
            .context("write document fragment")?;
        written += fragment.len() as u64;
    }
    out.flush().context("flush document")?;
    Ok(written)
}

use std::collections::BTreeSet;

use anyhow::Context as _;

use crate::bible_books;
use crate::dispatch::{self, BookThenLangAssembler, ResourcePresence};
use crate::fragments::{self, TwWordMatcher};
use crate::model::{
    AssemblyLayout, BcBook, ChapterNum, ResourceBook, ResourceBundle, TnBook, TqBook, TwBook,
    UsfmBook,
};

/// Every language's books for one book code, each list sorted by language code.
#[derive(Debug, Clone)]
pub struct BookGroup<'a> {
    pub book_code: &'a str,
    pub usfm_books: Vec<&'a UsfmBook>,
    pub tn_books: Vec<&'a TnBook>,
    pub tq_books: Vec<&'a TqBook>,
    pub tw_books: Vec<&'a TwBook>,
    pub bc_books: Vec<&'a BcBook>,
}

impl BookGroup<'_> {
    pub fn presence(&self) -> ResourcePresence {
        ResourcePresence {
            usfm: !self.usfm_books.is_empty(),
            tn: !self.tn_books.is_empty(),
            tq: !self.tq_books.is_empty(),
            tw: !self.tw_books.is_empty(),
            usfm2: false,
            bc: !self.bc_books.is_empty(),
        }
    }
}

fn for_book<'a, B: ResourceBook>(books: &'a [B], book_code: &str) -> Vec<&'a B> {
    let mut matched: Vec<&B> = books
        .iter()
        .filter(|book| book.book_code() == book_code)
        .collect();
    matched.sort_by(|a, b| a.lang_code().cmp(b.lang_code()));
    matched
}

/// Books in canonical order across every language that requested them.
pub fn group_by_book_then_lang(bundle: &ResourceBundle) -> Vec<BookGroup<'_>> {
    let book_codes = bible_books::canonical_order(
        bundle
            .usfm_books
            .iter()
            .map(ResourceBook::book_code)
            .chain(bundle.tn_books.iter().map(ResourceBook::book_code))
            .chain(bundle.tq_books.iter().map(ResourceBook::book_code))
            .chain(bundle.tw_books.iter().map(ResourceBook::book_code))
            .chain(bundle.bc_books.iter().map(ResourceBook::book_code)),
    );

    book_codes
        .into_iter()
        .map(|book_code| BookGroup {
            book_code,
            usfm_books: for_book(&bundle.usfm_books, book_code),
            tn_books: for_book(&bundle.tn_books, book_code),
            tq_books: for_book(&bundle.tq_books, book_code),
            tw_books: for_book(&bundle.tw_books, book_code),
            bc_books: for_book(&bundle.bc_books, book_code),
        })
        .collect()
}

impl<'a> BookGroup<'a> {
    /// Languages in column order: scripture languages sorted, then any
    /// language that only has help resources.
    pub fn column_langs(&self) -> Vec<&'a str> {
        let scripture: BTreeSet<&'a str> = self
            .usfm_books
            .iter()
            .map(|book| book.lang_code.as_str())
            .collect();
        let helps: BTreeSet<&'a str> = self
            .tn_books
            .iter()
            .map(|book| book.lang_code.as_str())
            .chain(self.tq_books.iter().map(|book| book.lang_code.as_str()))
            .chain(self.tw_books.iter().map(|book| book.lang_code.as_str()))
            .chain(self.bc_books.iter().map(|book| book.lang_code.as_str()))
            .filter(|lang| !scripture.contains(lang))
            .collect();
        scripture.into_iter().chain(helps).collect()
    }
}

/// Reorders books so that the books of paired languages alternate.
///
/// `langs` are taken two at a time; the books of each pair are interleaved
/// position by position (leftover books of the longer side follow).
fn interleave_pairs<'a, B: ResourceBook>(books: &[&'a B], langs: &[&str]) -> Vec<&'a B> {
    let mut out = Vec::with_capacity(books.len());
    for pair in langs.chunks(2) {
        let of_lang = |lang: &str| -> Vec<&'a B> {
            books
                .iter()
                .copied()
                .filter(|book| book.lang_code() == lang)
                .collect()
        };
        let left = of_lang(pair[0]);
        let right = pair.get(1).map(|&lang| of_lang(lang)).unwrap_or_default();
        for idx in 0..left.len().max(right.len()) {
            out.extend(left.get(idx).copied());
            out.extend(right.get(idx).copied());
        }
    }
    out
}

/// Pairs scripture languages by sorted code, smaller code first, and
/// alternates their books. With a single language the input comes back
/// unchanged.
pub fn ensure_primary_usfm_books_for_different_languages_are_adjacent<'a>(
    usfm_books: &[&'a UsfmBook],
) -> Vec<&'a UsfmBook> {
    let langs: Vec<&str> = usfm_books
        .iter()
        .map(|book| book.lang_code.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if langs.len() < 2 {
        return usfm_books.to_vec();
    }
    interleave_pairs(usfm_books, &langs)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn column_begin(self) -> &'static str {
        match self {
            Self::Left => fragments::COLUMN_LEFT_BEGIN,
            Self::Right => fragments::COLUMN_RIGHT_BEGIN,
        }
    }

    fn push_column(self, html: &mut String, content: &str) {
        html.push_str(self.column_begin());
        html.push_str(content);
        html.push_str(fragments::DIV_END);
    }
}

/// Lays out sided cells in rows of a left and a right column. A left cell
/// always starts a new row; a missing column is emitted empty so every row
/// holds a left then a right column.
fn two_column_rows(cells: &[(Side, String)]) -> String {
    let mut html = String::new();
    let mut left_only = false;
    for (side, content) in cells {
        match side {
            Side::Left => {
                if left_only {
                    Side::Right.push_column(&mut html, "");
                    html.push_str(fragments::DIV_END);
                }
                html.push_str(fragments::ROW_BEGIN);
                Side::Left.push_column(&mut html, content);
                left_only = true;
            }
            Side::Right => {
                if !left_only {
                    html.push_str(fragments::ROW_BEGIN);
                    Side::Left.push_column(&mut html, "");
                }
                Side::Right.push_column(&mut html, content);
                html.push_str(fragments::DIV_END);
                left_only = false;
            }
        }
    }
    if left_only {
        Side::Right.push_column(&mut html, "");
        html.push_str(fragments::DIV_END);
    }
    html
}

fn wrap_direction(book: &impl ResourceBook, content: &str) -> String {
    format!(
        "{}{content}{}",
        fragments::language_direction_html(book),
        fragments::DIV_END
    )
}

/// Column placement shared by every resource kind of one book, so a language
/// keeps its side from scripture through notes and questions.
struct Columns<'a> {
    layout: AssemblyLayout,
    langs: Vec<&'a str>,
}

impl<'a> Columns<'a> {
    fn new(group: &BookGroup<'a>, layout: AssemblyLayout) -> Self {
        Self {
            layout,
            langs: group.column_langs(),
        }
    }

    /// Left for the even positions of the column order, right for the odd.
    fn side_of(&self, lang_code: &str) -> Side {
        match self.langs.iter().position(|lang| *lang == lang_code) {
            Some(idx) if idx % 2 == 1 => Side::Right,
            _ => Side::Left,
        }
    }

    fn order<'b, B: ResourceBook>(&self, books: &[&'b B]) -> Vec<&'b B> {
        if self.layout.is_two_column() {
            interleave_pairs(books, &self.langs)
        } else {
            books.to_vec()
        }
    }

    fn per_language<B: ResourceBook>(
        &self,
        books: &[&B],
        content: impl Fn(&B) -> String,
    ) -> String {
        self.render(&self.order(books), content)
    }

    /// Emits one cell per book with non-empty content, in the given order:
    /// sequentially in one-column layouts, in left/right rows in two-column
    /// layouts.
    fn render<B: ResourceBook>(
        &self,
        ordered: &[&B],
        content: impl Fn(&B) -> String,
    ) -> String {
        let cells = ordered.iter().filter_map(|book| {
            let html = content(*book);
            (!html.is_empty()).then(|| (book.lang_code(), wrap_direction(*book, &html)))
        });
        if self.layout.is_two_column() {
            let cells: Vec<(Side, String)> = cells
                .map(|(lang_code, html)| (self.side_of(lang_code), html))
                .collect();
            two_column_rows(&cells)
        } else {
            cells.map(|(_, html)| html).collect()
        }
    }
}

/// Lazily assembles every book. A book that fails is logged and left out.
pub fn assemble_content_by_book_then_lang(
    bundle: &ResourceBundle,
    layout: AssemblyLayout,
) -> impl Iterator<Item = String> + '_ {
    group_by_book_then_lang(bundle)
        .into_iter()
        .filter_map(move |group| {
            let assembler = dispatch::select_book_then_lang(group.presence(), layout);
            tracing::debug!(book_code = group.book_code, ?assembler, "dispatch book");
            match assemble_book(&group, assembler, layout) {
                Ok(html) => Some(html),
                Err(err) => {
                    tracing::warn!(
                        book_code = group.book_code,
                        error = %format!("{err:#}"),
                        "skip book"
                    );
                    None
                }
            }
        })
        .filter(|html| !html.is_empty())
}

pub fn assemble_book(
    group: &BookGroup<'_>,
    assembler: BookThenLangAssembler,
    layout: AssemblyLayout,
) -> anyhow::Result<String> {
    match assembler {
        BookThenLangAssembler::UsfmByChapter => {
            let chapters = chapter_union(&group.usfm_books, |book| book.chapters.keys());
            assemble_usfm_by_chapter(group, layout, chapters)
        }
        BookThenLangAssembler::UsfmByChapter2cSlSr => {
            let chapters = chapter_union(&group.usfm_books, |book| book.chapters.keys());
            assemble_usfm_by_chapter_2c_sl_sr(group, layout, chapters)
        }
        BookThenLangAssembler::TnByChapter => {
            let chapters = chapter_union(&group.tn_books, |book| book.chapters.keys());
            assemble_tn_by_chapter(group, layout, chapters)
        }
        BookThenLangAssembler::TqByChapter => {
            let chapters = chapter_union(&group.tq_books, |book| book.chapters.keys());
            assemble_tq_by_chapter(group, layout, chapters)
        }
        BookThenLangAssembler::TwByChapter => {
            if group.bc_books.is_empty() {
                return Ok(String::new());
            }
            let chapters = chapter_union(&group.bc_books, |book| book.chapters.keys());
            assemble_tw_by_chapter(group, layout, chapters)
        }
        BookThenLangAssembler::Empty => Ok(String::new()),
    }
}

fn chapter_union<'a, B, I>(books: &[&'a B], chapters: impl Fn(&'a B) -> I) -> BTreeSet<ChapterNum>
where
    I: Iterator<Item = &'a ChapterNum>,
{
    books
        .iter()
        .copied()
        .flat_map(|book| chapters(book).copied())
        .collect()
}

pub fn assemble_usfm_by_chapter(
    group: &BookGroup<'_>,
    layout: AssemblyLayout,
    chapters: BTreeSet<ChapterNum>,
) -> anyhow::Result<String> {
    assemble_by_chapter(group, layout, chapters, true)
}

pub fn assemble_usfm_by_chapter_2c_sl_sr(
    group: &BookGroup<'_>,
    layout: AssemblyLayout,
    chapters: BTreeSet<ChapterNum>,
) -> anyhow::Result<String> {
    assemble_by_chapter(group, layout, chapters, true)
}

pub fn assemble_tn_by_chapter(
    group: &BookGroup<'_>,
    layout: AssemblyLayout,
    chapters: BTreeSet<ChapterNum>,
) -> anyhow::Result<String> {
    assemble_by_chapter(group, layout, chapters, false)
}

pub fn assemble_tq_by_chapter(
    group: &BookGroup<'_>,
    layout: AssemblyLayout,
    chapters: BTreeSet<ChapterNum>,
) -> anyhow::Result<String> {
    assemble_by_chapter(group, layout, chapters, false)
}

/// Commentary only; translation words are emitted once at the document tail.
pub fn assemble_tw_by_chapter(
    group: &BookGroup<'_>,
    layout: AssemblyLayout,
    chapters: BTreeSet<ChapterNum>,
) -> anyhow::Result<String> {
    let columns = Columns::new(group, layout);
    let mut html = book_heading(group, &columns)?;
    for chapter in chapters {
        html.push_str(&fragments::chapter_heading(chapter));
        html.push_str(&columns.per_language(&group.bc_books, |bc| {
            fragments::chapter_commentary(bc, chapter)
        }));
        html.push_str(fragments::END_OF_CHAPTER);
    }
    Ok(html)
}

/// Book title followed by each language's book intros.
fn book_heading(group: &BookGroup<'_>, columns: &Columns<'_>) -> anyhow::Result<String> {
    let mut html = fragments::book_title(group.book_code)
        .with_context(|| format!("unknown book code: {}", group.book_code))?;
    html.push_str(&columns.per_language(&group.tn_books, fragments::tn_book_intro));
    html.push_str(&columns.per_language(&group.bc_books, fragments::bc_book_intro));
    Ok(html)
}

fn assemble_by_chapter(
    group: &BookGroup<'_>,
    layout: AssemblyLayout,
    chapters: BTreeSet<ChapterNum>,
    with_scripture: bool,
) -> anyhow::Result<String> {
    let matchers: Vec<TwWordMatcher<'_>> = if layout.is_compact() {
        Vec::new()
    } else {
        group.tw_books.iter().copied().map(TwWordMatcher::new).collect()
    };

    let columns = Columns::new(group, layout);
    let usfm_books = if layout.is_two_column() {
        ensure_primary_usfm_books_for_different_languages_are_adjacent(&group.usfm_books)
    } else {
        group.usfm_books.clone()
    };

    let mut html = book_heading(group, &columns)?;
    for chapter in chapters {
        if !with_scripture {
            html.push_str(&fragments::chapter_heading(chapter));
        }

        html.push_str(&columns.per_language(&group.tn_books, |tn| {
            fragments::chapter_intro(tn, chapter)
        }));
        html.push_str(&columns.per_language(&group.bc_books, |bc| {
            fragments::chapter_commentary(bc, chapter)
        }));

        if with_scripture {
            html.push_str(&columns.render(&usfm_books, |usfm| {
                usfm.chapters
                    .get(&chapter)
                    .map(|usfm_chapter| usfm_chapter.content.clone())
                    .unwrap_or_default()
            }));
        }

        html.push_str(&columns.per_language(&group.tn_books, |tn| {
            fragments::tn_chapter_verses(tn, chapter)
        }));
        html.push_str(&columns.per_language(&group.tq_books, |tq| {
            fragments::tq_chapter_verses(tq, chapter)
        }));

        for matcher in &matchers {
            let tw_book = matcher.tw_book();
            let usfm_chapter = group
                .usfm_books
                .iter()
                .find(|usfm| usfm.lang_code == tw_book.lang_code)
                .and_then(|usfm| usfm.chapters.get(&chapter));
            let Some(usfm_chapter) = usfm_chapter else {
                continue;
            };
            let mut links = String::new();
            for (verse_ref, verse_html) in &usfm_chapter.verses {
                links.push_str(&fragments::translation_word_verse_block(
                    matcher,
                    chapter,
                    verse_ref.as_str(),
                    verse_html,
                ));
            }
            if !links.is_empty() {
                html.push_str(&wrap_direction(tw_book, &links));
            }
        }

        html.push_str(fragments::END_OF_CHAPTER);
    }
    Ok(html)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::model::LangDirection;

    fn usfm(lang_code: &str, book_code: &str) -> UsfmBook {
        UsfmBook {
            lang_code: lang_code.to_owned(),
            lang_name: lang_code.to_owned(),
            book_code: book_code.to_owned(),
            resource_type_name: "ulb".to_owned(),
            lang_direction: LangDirection::Ltr,
            chapters: BTreeMap::new(),
        }
    }

    fn langs<'a>(books: &[&'a UsfmBook]) -> Vec<&'a str> {
        books.iter().map(|book| book.lang_code.as_str()).collect()
    }

    #[test]
    fn single_language_is_unchanged() {
        let a = usfm("en", "col");
        let b = usfm("en", "col");
        let books = vec![&a, &b];
        let out = ensure_primary_usfm_books_for_different_languages_are_adjacent(&books);
        assert_eq!(out.len(), 2);
        assert!(std::ptr::eq(out[0], &a));
        assert!(std::ptr::eq(out[1], &b));
    }

    #[test]
    fn two_languages_alternate_smaller_code_first() {
        let sw1 = usfm("sw", "col");
        let en1 = usfm("en", "col");
        let sw2 = usfm("sw", "col");
        let en2 = usfm("en", "col");
        let books = vec![&sw1, &en1, &sw2, &en2];
        let out = ensure_primary_usfm_books_for_different_languages_are_adjacent(&books);
        assert_eq!(langs(&out), vec!["en", "sw", "en", "sw"]);
        assert!(std::ptr::eq(out[0], &en1));
        assert!(std::ptr::eq(out[1], &sw1));
    }

    #[test]
    fn unpaired_cell_gets_its_own_row() {
        let cells = vec![
            (Side::Left, "A".to_owned()),
            (Side::Right, "B".to_owned()),
            (Side::Left, "C".to_owned()),
        ];
        assert_eq!(
            two_column_rows(&cells),
            "<div class='row'><div class='column-left'>A</div><div class='column-right'>B</div></div>\
<div class='row'><div class='column-left'>C</div><div class='column-right'></div></div>"
        );
    }

    #[test]
    fn right_cell_without_left_gets_empty_left_column() {
        let cells = vec![
            (Side::Right, "B".to_owned()),
            (Side::Left, "C".to_owned()),
            (Side::Left, "D".to_owned()),
        ];
        assert_eq!(
            two_column_rows(&cells),
            "<div class='row'><div class='column-left'></div><div class='column-right'>B</div></div>\
<div class='row'><div class='column-left'>C</div><div class='column-right'></div></div>\
<div class='row'><div class='column-left'>D</div><div class='column-right'></div></div>"
        );
    }

    #[test]
    fn column_order_follows_scripture_languages() {
        let en = usfm("en", "col");
        let sw = usfm("sw", "col");
        let tn = TnBook {
            lang_code: "sw".to_owned(),
            lang_name: "sw".to_owned(),
            book_code: "col".to_owned(),
            resource_type_name: "tn".to_owned(),
            lang_direction: LangDirection::Ltr,
            book_intro: String::new(),
            chapters: BTreeMap::new(),
        };
        let group = BookGroup {
            book_code: "col",
            usfm_books: vec![&sw, &en],
            tn_books: vec![&tn],
            tq_books: Vec::new(),
            tw_books: Vec::new(),
            bc_books: Vec::new(),
        };
        let columns = Columns::new(&group, AssemblyLayout::TwoColumnScriptureLeftScriptureRight);
        assert_eq!(columns.langs, vec!["en", "sw"]);
        assert_eq!(columns.side_of("en"), Side::Left);
        assert_eq!(columns.side_of("sw"), Side::Right);
    }
}

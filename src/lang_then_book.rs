use std::collections::BTreeSet;

use anyhow::Context as _;

use crate::bible_books;
use crate::dispatch::{self, LangThenBookAssembler, ResourcePresence};
use crate::fragments::{self, TwWordMatcher};
use crate::model::{
    AssemblyLayout, BcBook, ChapterNum, LangDirection, ResourceBook, ResourceBundle, TnBook,
    TqBook, TwBook, UsfmBook,
};

/// Everything requested for one language and one book.
#[derive(Debug, Clone, Copy)]
pub struct LangBookGroup<'a> {
    pub lang_code: &'a str,
    pub book_code: &'a str,
    pub usfm: Option<&'a UsfmBook>,
    pub usfm2: Option<&'a UsfmBook>,
    pub tn: Option<&'a TnBook>,
    pub tq: Option<&'a TqBook>,
    pub tw: Option<&'a TwBook>,
    pub bc: Option<&'a BcBook>,
}

impl LangBookGroup<'_> {
    pub fn presence(&self) -> ResourcePresence {
        ResourcePresence {
            usfm: self.usfm.is_some(),
            tn: self.tn.is_some(),
            tq: self.tq.is_some(),
            tw: self.tw.is_some(),
            usfm2: self.usfm2.is_some(),
            bc: self.bc.is_some(),
        }
    }

    /// Direction of the first book present, scripture first.
    pub fn lang_direction(&self) -> LangDirection {
        self.usfm
            .map(ResourceBook::lang_direction)
            .or(self.tn.map(ResourceBook::lang_direction))
            .or(self.tq.map(ResourceBook::lang_direction))
            .or(self.bc.map(ResourceBook::lang_direction))
            .or(self.tw.map(ResourceBook::lang_direction))
            .unwrap_or_default()
    }
}

fn matching<'a, B: ResourceBook>(
    books: &'a [B],
    lang_code: &'a str,
    book_code: &'a str,
) -> impl Iterator<Item = &'a B> {
    books
        .iter()
        .filter(move |book| book.lang_code() == lang_code && book.book_code() == book_code)
}

fn group_key<B: ResourceBook>(book: &B) -> (&str, usize, &str) {
    (
        book.lang_code(),
        bible_books::canonical_position(book.book_code()),
        book.book_code(),
    )
}

/// Groups by language code (ascending), then by book in canonical order.
/// Within a group the first book of each kind wins; a second USFM book becomes
/// the secondary scripture.
pub fn group_by_lang_then_book(bundle: &ResourceBundle) -> Vec<LangBookGroup<'_>> {
    let keys: BTreeSet<(&str, usize, &str)> = bundle
        .usfm_books
        .iter()
        .map(group_key)
        .chain(bundle.tn_books.iter().map(group_key))
        .chain(bundle.tq_books.iter().map(group_key))
        .chain(bundle.tw_books.iter().map(group_key))
        .chain(bundle.bc_books.iter().map(group_key))
        .collect();

    keys.into_iter()
        .map(|(lang_code, _, book_code)| {
            let mut usfm = matching(&bundle.usfm_books, lang_code, book_code);
            LangBookGroup {
                lang_code,
                book_code,
                usfm: usfm.next(),
                usfm2: usfm.next(),
                tn: matching(&bundle.tn_books, lang_code, book_code).next(),
                tq: matching(&bundle.tq_books, lang_code, book_code).next(),
                tw: matching(&bundle.tw_books, lang_code, book_code).next(),
                bc: matching(&bundle.bc_books, lang_code, book_code).next(),
            }
        })
        .collect()
}

/// Lazily assembles every (language, book) group. A group that fails is
/// logged and left out.
pub fn assemble_content_by_lang_then_book(
    bundle: &ResourceBundle,
    layout: AssemblyLayout,
) -> impl Iterator<Item = String> + '_ {
    group_by_lang_then_book(bundle)
        .into_iter()
        .filter_map(move |group| {
            let assembler = dispatch::select_lang_then_book(group.presence());
            tracing::debug!(
                lang_code = group.lang_code,
                book_code = group.book_code,
                ?assembler,
                "dispatch group"
            );
            match assemble_group(&group, assembler, layout) {
                Ok(html) => Some(html),
                Err(err) => {
                    tracing::warn!(
                        lang_code = group.lang_code,
                        book_code = group.book_code,
                        error = %format!("{err:#}"),
                        "skip group"
                    );
                    None
                }
            }
        })
        .filter(|html| !html.is_empty())
}

pub fn assemble_group(
    group: &LangBookGroup<'_>,
    assembler: LangThenBookAssembler,
    layout: AssemblyLayout,
) -> anyhow::Result<String> {
    match assembler {
        LangThenBookAssembler::UsfmByBook => assemble_usfm_by_book(group, layout),
        LangThenBookAssembler::TnByBook => assemble_tn_by_book(group, layout),
        LangThenBookAssembler::TqByBook => assemble_tq_by_book(group, layout),
        LangThenBookAssembler::TwByBook => assemble_tw_by_book(group),
        LangThenBookAssembler::Empty => Ok(String::new()),
    }
}

pub fn assemble_usfm_by_book(
    group: &LangBookGroup<'_>,
    layout: AssemblyLayout,
) -> anyhow::Result<String> {
    let chapters = group
        .usfm
        .map(|usfm| usfm.chapters.keys().copied().collect())
        .unwrap_or_default();
    assemble_by_book(group, layout, chapters)
}

pub fn assemble_tn_by_book(
    group: &LangBookGroup<'_>,
    layout: AssemblyLayout,
) -> anyhow::Result<String> {
    let chapters = group
        .tn
        .map(|tn| tn.chapters.keys().copied().collect())
        .unwrap_or_default();
    assemble_by_book(group, layout, chapters)
}

pub fn assemble_tq_by_book(
    group: &LangBookGroup<'_>,
    layout: AssemblyLayout,
) -> anyhow::Result<String> {
    let chapters = group
        .tq
        .map(|tq| tq.chapters.keys().copied().collect())
        .unwrap_or_default();
    assemble_by_book(group, layout, chapters)
}

/// Commentary only; translation words are emitted once at the document tail.
pub fn assemble_tw_by_book(group: &LangBookGroup<'_>) -> anyhow::Result<String> {
    let Some(bc) = group.bc else {
        return Ok(String::new());
    };
    let title = book_title(group.book_code)?;

    let mut html = String::new();
    html.push_str(fragments::direction_html(group.lang_direction()));
    html.push_str(&fragments::bc_book_intro(bc));
    html.push_str(&title);
    for chapter in bc.chapters.keys().copied() {
        html.push_str(&fragments::chapter_heading(chapter));
        html.push_str(&fragments::chapter_commentary(bc, chapter));
        html.push_str(fragments::END_OF_CHAPTER);
    }
    html.push_str(fragments::DIV_END);
    Ok(html)
}

fn book_title(book_code: &str) -> anyhow::Result<String> {
    fragments::book_title(book_code).with_context(|| format!("unknown book code: {book_code}"))
}

fn assemble_by_book(
    group: &LangBookGroup<'_>,
    layout: AssemblyLayout,
    chapters: Vec<ChapterNum>,
) -> anyhow::Result<String> {
    let title = book_title(group.book_code)?;
    let matcher = group
        .tw
        .filter(|_| !layout.is_compact())
        .map(TwWordMatcher::new);

    let mut html = String::new();
    html.push_str(fragments::direction_html(group.lang_direction()));
    if let Some(tn) = group.tn {
        html.push_str(&fragments::tn_book_intro(tn));
    }
    if let Some(bc) = group.bc {
        html.push_str(&fragments::bc_book_intro(bc));
    }
    html.push_str(&title);

    for chapter in chapters {
        let usfm_chapter = group.usfm.and_then(|usfm| usfm.chapters.get(&chapter));

        let mut help = String::new();
        if let Some(tn) = group.tn {
            help.push_str(&fragments::chapter_intro(tn, chapter));
        }
        if let Some(bc) = group.bc {
            help.push_str(&fragments::chapter_commentary(bc, chapter));
        }
        if let Some(tn) = group.tn {
            help.push_str(&fragments::tn_chapter_verses(tn, chapter));
        }
        if let Some(tq) = group.tq {
            help.push_str(&fragments::tq_chapter_verses(tq, chapter));
        }
        if let (Some(matcher), Some(usfm_chapter)) = (&matcher, usfm_chapter) {
            for (verse_ref, verse_html) in &usfm_chapter.verses {
                help.push_str(&fragments::translation_word_verse_block(
                    matcher,
                    chapter,
                    verse_ref.as_str(),
                    verse_html,
                ));
            }
        }

        match usfm_chapter {
            Some(usfm_chapter) => {
                html.push_str(&usfm_chapter.content);
                if !help.is_empty() && !fragments::has_footnotes(&usfm_chapter.content) {
                    html.push_str(fragments::HR);
                }
            }
            None => html.push_str(&fragments::chapter_heading(chapter)),
        }
        html.push_str(&help);

        if let Some(usfm2_chapter) = group.usfm2.and_then(|usfm2| usfm2.chapters.get(&chapter)) {
            html.push_str(&usfm2_chapter.content);
        }
        html.push_str(fragments::END_OF_CHAPTER);
    }

    html.push_str(fragments::DIV_END);
    Ok(html)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::model::Book;

    fn usfm(lang_code: &str, book_code: &str, resource_type_name: &str) -> Book {
        Book::Usfm(UsfmBook {
            lang_code: lang_code.to_owned(),
            lang_name: lang_code.to_owned(),
            book_code: book_code.to_owned(),
            resource_type_name: resource_type_name.to_owned(),
            lang_direction: LangDirection::Ltr,
            chapters: BTreeMap::new(),
        })
    }

    #[test]
    fn groups_by_language_then_canonical_book() {
        let bundle: ResourceBundle = [
            usfm("sw", "col", "ulb"),
            usfm("en", "rev", "ulb"),
            usfm("en", "gen", "ulb"),
            usfm("en", "gen", "udb"),
        ]
        .into_iter()
        .collect();

        let groups = group_by_lang_then_book(&bundle);
        let keys: Vec<(&str, &str)> = groups
            .iter()
            .map(|group| (group.lang_code, group.book_code))
            .collect();
        assert_eq!(keys, vec![("en", "gen"), ("en", "rev"), ("sw", "col")]);

        let gen_group = &groups[0];
        assert_eq!(
            gen_group.usfm.map(|book| book.resource_type_name.as_str()),
            Some("ulb")
        );
        assert_eq!(
            gen_group.usfm2.map(|book| book.resource_type_name.as_str()),
            Some("udb")
        );
        assert!(groups[1].usfm2.is_none());
    }
}

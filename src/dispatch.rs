use crate::model::AssemblyLayout;

/// Which resource kinds are present for one assembly group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourcePresence {
    pub usfm: bool,
    pub tn: bool,
    pub tq: bool,
    pub tw: bool,
    /// Second USFM resource for the same language and book.
    pub usfm2: bool,
    pub bc: bool,
}

/// Assembler for one (language, book) group under language-then-book order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LangThenBookAssembler {
    UsfmByBook,
    TnByBook,
    TqByBook,
    TwByBook,
    Empty,
}

/// Assembler for one book under book-then-language order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookThenLangAssembler {
    UsfmByChapter,
    UsfmByChapter2cSlSr,
    TnByChapter,
    TqByChapter,
    TwByChapter,
    Empty,
}

/// Scripture drives the group whenever present; otherwise the first help
/// resource in notes, questions, words/commentary order does. The secondary
/// USFM only matters once a primary exists.
pub fn select_lang_then_book(presence: ResourcePresence) -> LangThenBookAssembler {
    let ResourcePresence {
        usfm, tn, tq, tw, bc, ..
    } = presence;
    match (usfm, tn, tq, tw || bc) {
        (true, _, _, _) => LangThenBookAssembler::UsfmByBook,
        (false, true, _, _) => LangThenBookAssembler::TnByBook,
        (false, false, true, _) => LangThenBookAssembler::TqByBook,
        (false, false, false, true) => LangThenBookAssembler::TwByBook,
        (false, false, false, false) => LangThenBookAssembler::Empty,
    }
}

/// `presence.usfm2` is ignored: under book-then-language every USFM book of
/// every language participates.
pub fn select_book_then_lang(
    presence: ResourcePresence,
    layout: AssemblyLayout,
) -> BookThenLangAssembler {
    let ResourcePresence {
        usfm, tn, tq, tw, bc, ..
    } = presence;
    match (usfm, layout.is_two_column(), tn, tq, tw || bc) {
        (true, false, _, _, _) => BookThenLangAssembler::UsfmByChapter,
        (true, true, _, _, _) => BookThenLangAssembler::UsfmByChapter2cSlSr,
        (false, _, true, _, _) => BookThenLangAssembler::TnByChapter,
        (false, _, false, true, _) => BookThenLangAssembler::TqByChapter,
        (false, _, false, false, true) => BookThenLangAssembler::TwByChapter,
        (false, _, false, false, false) => BookThenLangAssembler::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripture_takes_priority_in_lang_then_book() {
        let presence = ResourcePresence {
            usfm: true,
            tn: true,
            tq: true,
            tw: true,
            usfm2: true,
            bc: true,
        };
        assert_eq!(
            select_lang_then_book(presence),
            LangThenBookAssembler::UsfmByBook
        );
    }

    #[test]
    fn help_resources_cascade_without_scripture() {
        let tn_only = ResourcePresence {
            tn: true,
            tq: true,
            ..ResourcePresence::default()
        };
        assert_eq!(select_lang_then_book(tn_only), LangThenBookAssembler::TnByBook);

        let tq_only = ResourcePresence {
            tq: true,
            bc: true,
            ..ResourcePresence::default()
        };
        assert_eq!(select_lang_then_book(tq_only), LangThenBookAssembler::TqByBook);

        let bc_only = ResourcePresence {
            bc: true,
            ..ResourcePresence::default()
        };
        assert_eq!(select_lang_then_book(bc_only), LangThenBookAssembler::TwByBook);

        // A lone secondary USFM has no primary to anchor it.
        let usfm2_only = ResourcePresence {
            usfm2: true,
            ..ResourcePresence::default()
        };
        assert_eq!(select_lang_then_book(usfm2_only), LangThenBookAssembler::Empty);
    }

    #[test]
    fn layout_picks_book_then_lang_scripture_variant() {
        let presence = ResourcePresence {
            usfm: true,
            tn: true,
            ..ResourcePresence::default()
        };
        assert_eq!(
            select_book_then_lang(presence, AssemblyLayout::OneColumnCompact),
            BookThenLangAssembler::UsfmByChapter
        );
        assert_eq!(
            select_book_then_lang(
                presence,
                AssemblyLayout::TwoColumnScriptureLeftScriptureRightCompact
            ),
            BookThenLangAssembler::UsfmByChapter2cSlSr
        );

        let tw_only = ResourcePresence {
            tw: true,
            ..ResourcePresence::default()
        };
        assert_eq!(
            select_book_then_lang(tw_only, AssemblyLayout::OneColumn),
            BookThenLangAssembler::TwByChapter
        );
    }
}

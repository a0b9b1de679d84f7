use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type ChapterNum = u32;

/// Verse key inside a chapter, e.g. `"01"` or `"4-5"`.
///
/// Ordering is numeric on the leading digits so that `"2"` sorts before `"10"`;
/// ties (and refs without digits) fall back to the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerseRef(String);

impl VerseRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn leading_number(&self) -> Option<u32> {
        let digits: String = self.0.chars().take_while(char::is_ascii_digit).collect();
        digits.parse().ok()
    }
}

impl Ord for VerseRef {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.leading_number(), other.leading_number()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for VerseRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VerseRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LangDirection {
    #[default]
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum AssemblyStrategy {
    #[serde(rename = "lbo")]
    #[value(name = "lbo")]
    LanguageBookOrder,
    #[serde(rename = "blo")]
    #[value(name = "blo")]
    BookLanguageOrder,
}

impl AssemblyStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LanguageBookOrder => "lbo",
            Self::BookLanguageOrder => "blo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum AssemblyLayout {
    #[serde(rename = "1c")]
    #[value(name = "1c")]
    OneColumn,
    #[serde(rename = "1c_c")]
    #[value(name = "1c_c")]
    OneColumnCompact,
    #[serde(rename = "2c_sl_sr")]
    #[value(name = "2c_sl_sr")]
    TwoColumnScriptureLeftScriptureRight,
    #[serde(rename = "2c_sl_sr_c")]
    #[value(name = "2c_sl_sr_c")]
    TwoColumnScriptureLeftScriptureRightCompact,
}

impl AssemblyLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneColumn => "1c",
            Self::OneColumnCompact => "1c_c",
            Self::TwoColumnScriptureLeftScriptureRight => "2c_sl_sr",
            Self::TwoColumnScriptureLeftScriptureRightCompact => "2c_sl_sr_c",
        }
    }

    pub fn is_compact(self) -> bool {
        matches!(
            self,
            Self::OneColumnCompact | Self::TwoColumnScriptureLeftScriptureRightCompact
        )
    }

    pub fn is_two_column(self) -> bool {
        matches!(
            self,
            Self::TwoColumnScriptureLeftScriptureRight
                | Self::TwoColumnScriptureLeftScriptureRightCompact
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkSize {
    #[default]
    Chapter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub lang_code: String,
    pub resource_type: String,
    pub book_code: String,
}

impl ResourceRequest {
    pub fn new(lang_code: &str, resource_type: &str, book_code: &str) -> Self {
        Self {
            lang_code: lang_code.to_owned(),
            resource_type: resource_type.to_owned(),
            book_code: book_code.to_owned(),
        }
    }

    /// `tn` and `tn-condensed` both count as notes.
    pub fn is_tn(&self) -> bool {
        self.resource_type.contains("tn")
    }

    pub fn is_tw(&self) -> bool {
        self.resource_type.contains("tw")
    }

    pub fn is_usfm(&self) -> bool {
        USFM_RESOURCE_TYPES.contains(&self.resource_type.as_str())
    }
}

pub const USFM_RESOURCE_TYPES: &[&str] = &[
    "avd", "ayt", "blv", "cuv", "f10", "nav", "reg", "ugnt", "uhb", "ulb", "usfm",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsfmChapter {
    pub content: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub verses: BTreeMap<VerseRef, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsfmBook {
    pub lang_code: String,
    pub lang_name: String,
    pub book_code: String,
    pub resource_type_name: String,
    #[serde(default)]
    pub lang_direction: LangDirection,
    pub chapters: BTreeMap<ChapterNum, UsfmChapter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TnChapter {
    #[serde(default)]
    pub intro_html: String,
    #[serde(default)]
    pub verses: BTreeMap<VerseRef, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TnBook {
    pub lang_code: String,
    pub lang_name: String,
    pub book_code: String,
    pub resource_type_name: String,
    #[serde(default)]
    pub lang_direction: LangDirection,
    #[serde(default)]
    pub book_intro: String,
    pub chapters: BTreeMap<ChapterNum, TnChapter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TqChapter {
    #[serde(default)]
    pub verses: BTreeMap<VerseRef, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TqBook {
    pub lang_code: String,
    pub lang_name: String,
    pub book_code: String,
    pub resource_type_name: String,
    #[serde(default)]
    pub lang_direction: LangDirection,
    pub chapters: BTreeMap<ChapterNum, TqChapter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwNameContentPair {
    pub localized_word: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwBook {
    pub lang_code: String,
    pub lang_name: String,
    pub book_code: String,
    pub resource_type_name: String,
    #[serde(default)]
    pub lang_direction: LangDirection,
    pub name_content_pairs: Vec<TwNameContentPair>,
}

impl TwBook {
    /// Case-insensitive by localized word; the sort is stable so equal keys
    /// keep their insertion order.
    pub fn sort_name_content_pairs(&mut self) {
        self.name_content_pairs
            .sort_by_cached_key(|pair| pair.localized_word.to_lowercase());
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BcChapter {
    pub commentary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BcBook {
    pub lang_code: String,
    pub book_code: String,
    pub resource_type_name: String,
    #[serde(default)]
    pub lang_direction: LangDirection,
    #[serde(default)]
    pub book_intro: String,
    pub chapters: BTreeMap<ChapterNum, BcChapter>,
}

/// Accessors shared by every parsed book kind.
pub trait ResourceBook {
    fn lang_code(&self) -> &str;
    fn book_code(&self) -> &str;
    fn lang_direction(&self) -> LangDirection;
}

macro_rules! impl_resource_book {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ResourceBook for $ty {
                fn lang_code(&self) -> &str {
                    &self.lang_code
                }

                fn book_code(&self) -> &str {
                    &self.book_code
                }

                fn lang_direction(&self) -> LangDirection {
                    self.lang_direction
                }
            }
        )+
    };
}

impl_resource_book!(UsfmBook, TnBook, TqBook, TwBook, BcBook);

/// One parsed book of any resource kind, as it arrives from the parser layer.
///
/// Externally tagged (`{"usfm": {...}}`): an internal tag would buffer the
/// chapter maps and lose their integer keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Book {
    Usfm(UsfmBook),
    Tn(TnBook),
    Tq(TqBook),
    Tw(TwBook),
    Bc(BcBook),
}

impl Book {
    fn as_resource_book(&self) -> &dyn ResourceBook {
        match self {
            Self::Usfm(book) => book,
            Self::Tn(book) => book,
            Self::Tq(book) => book,
            Self::Tw(book) => book,
            Self::Bc(book) => book,
        }
    }

    pub fn lang_code(&self) -> &str {
        self.as_resource_book().lang_code()
    }

    pub fn book_code(&self) -> &str {
        self.as_resource_book().book_code()
    }
}

/// Parsed books partitioned by kind, each sequence in input order.
#[derive(Debug, Clone, Default)]
pub struct ResourceBundle {
    pub usfm_books: Vec<UsfmBook>,
    pub tn_books: Vec<TnBook>,
    pub tq_books: Vec<TqBook>,
    pub tw_books: Vec<TwBook>,
    pub bc_books: Vec<BcBook>,
}

impl ResourceBundle {
    pub fn is_empty(&self) -> bool {
        self.usfm_books.is_empty()
            && self.tn_books.is_empty()
            && self.tq_books.is_empty()
            && self.tw_books.is_empty()
            && self.bc_books.is_empty()
    }
}

impl FromIterator<Book> for ResourceBundle {
    fn from_iter<I: IntoIterator<Item = Book>>(iter: I) -> Self {
        let mut bundle = Self::default();
        for book in iter {
            match book {
                Book::Usfm(book) => bundle.usfm_books.push(book),
                Book::Tn(book) => bundle.tn_books.push(book),
                Book::Tq(book) => bundle.tq_books.push(book),
                Book::Tw(mut book) => {
                    book.sort_name_content_pairs();
                    bundle.tw_books.push(book);
                }
                Book::Bc(book) => bundle.bc_books.push(book),
            }
        }
        bundle
    }
}

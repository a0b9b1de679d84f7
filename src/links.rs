//! Rewrites resource cross-references embedded in help Markdown.
//!
//! References to resources present in the current document become anchor
//! links; everything else degrades to plain text. Nothing here fails.

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::bible_books;
use crate::model::ResourceRequest;
use crate::tw::{self, TranslationWordIndex};

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid link regex")
}

// Prefixed list of TW wiki links: `(See also: [[rc://…/word]], [[rc://…/word2]])`.
static TW_WIKI_PREFIXED_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(concat!(
        r"\((?P<prefix>[^()\[\]]+?):\s*",
        r"(?P<links>\[\[rc://[^\[\]()]+?/tw/(?:dict/)?bible/(?:kt|names|other)/[^\[\]]+?\]\]",
        r"(?:\s*,\s*\[\[rc://[^\[\]()]+?/tw/(?:dict/)?bible/(?:kt|names|other)/[^\[\]]+?\]\])*)",
        r"\s*\)"
    ))
});

static TW_WIKI_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"\[\[rc://(?P<lang>[^\[\]()/]+)/tw/(?:dict/)?bible/(?:kt|names|other)/(?P<word>[^\[\]]+?)\]\]")
});

static TW_RC_MARKDOWN_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(concat!(
        r"\[(?P<text>[^\[\]]*)\]\(rc://(?P<lang>[^\s\[\]()/]+)/tw/(?:dict/)?bible/",
        r"(?:kt|names|other)/(?P<word>[\w\-]+)\)"
    ))
});

static TW_RC_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"rc://(?P<lang>[^\s\[\]()/]+)/tw/(?:dict/)?bible/(?:kt|names|other)/(?P<word>[\w\-]+)")
});

static TW_MARKDOWN_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(concat!(
        r"(?P<dot>\s*·\s*)?\[(?P<text>[^\[\]()]+?)\]",
        r"\((?:\.+/)+(?:kt|names|other)/(?P<word>[^\[\]()/]+?)\.md\)"
    ))
});

// TA links are dropped outright; prefixed forms first so no "(See: )" is left.
static TA_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\([^()\[\]]*?:\s*\[\[rc://[^\[\]()]+?/ta/man/[^\[\]]+?\]\]\s*\)",
        r"\([^()\[\]]*?:\s*\[[^\[\]]*\]\s*\(rc://[^()\s]+?/ta/man/[^()\s]+?\)\s*\)",
        r"\([^()\[\]]*?:\s*\[[^\[\]]*\]\s*\(https://[^()\s]+?-ta-[^()\s]*?\.md\)\s*\)",
        r",?\s*\[\[rc://[^\[\]()]+?/ta/man/[^\[\]]+?\]\]",
        r"\[[^\[\]]*\]\s*\(rc://[^()\s]+?/ta/man/[^()\s]+?\)",
        r"\[[^\[\]]*\]\s*\(https://[^()\s]+?-ta-[^()\s]*?\.md\)",
    ]
    .into_iter()
    .map(re)
    .collect()
});

static TN_RC_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(concat!(
        r"\[(?P<text>[^\[\]]+?)\]\(rc://(?P<lang>[^/()\s]+)/tn/help/",
        r"(?P<book>[^/()\s]+)/(?P<chap>\d+)/(?P<verse>[^/()\s]+)\)"
    ))
});

static TN_RELATIVE_BOOK_PAREN_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(concat!(
        r"\(\[(?P<text>[^\[\]]+?)\]\((?:\.\./)+(?P<book>\w+)/(?P<chap>\d+)/",
        r"(?P<verse>[^/()\s]+?)\.md\)\)"
    ))
});

static TN_RELATIVE_CHAPTER_PAREN_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"\(\[(?P<text>[^\[\]]+?)\]\((?:\.\./)+(?P<chap>\d+)/(?P<verse>[^/()\s]+?)\.md\)\)")
});

static TN_RELATIVE_BOOK_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(concat!(
        r"\[(?P<text>[^\[\]]+?)\]\((?:\.\./)+(?P<book>\w+)/(?P<chap>\d+)/",
        r"(?P<verse>[^/()\s]+?)\.md\)"
    ))
});

static TN_RELATIVE_CHAPTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"\[(?P<text>[^\[\]]+?)\]\((?:\.\./)+(?P<chap>\d+)/(?P<verse>[^/()\s]+?)\.md\)")
});

static TN_OBS_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"\[(?P<text>[^\[\]]+?)\]\s*\(rc://[^/()\s]+/tn/help/obs/[^()\s]+\)")
});

struct TwResolver<'a> {
    lang_code: &'a str,
    tw_requested: bool,
    tw_index: &'a TranslationWordIndex,
}

impl TwResolver<'_> {
    fn localized(&self, word: &str) -> Option<String> {
        if !self.tw_requested {
            return None;
        }
        let path = self.tw_index.get(word)?;
        tw::read_localized_word(path)
    }

    fn anchor(&self, localized: &str) -> String {
        format!("[{localized}](#{}-{localized})", self.lang_code)
    }

    /// Anchor when the word resolves, bare word otherwise.
    fn link_or_word(&self, word: &str) -> String {
        match self.localized(word) {
            Some(localized) => self.anchor(&localized),
            None => {
                tracing::debug!(lang_code = self.lang_code, word, "unresolved translation word link");
                word.to_owned()
            }
        }
    }
}

/// Rewrites translation-word references in `md`.
///
/// A word resolves when a TW resource for `lang_code` is requested and the
/// word's file is in `tw_index`.
pub fn rewrite_tw_links(
    md: &str,
    lang_code: &str,
    requested: &[ResourceRequest],
    tw_index: &TranslationWordIndex,
) -> String {
    let resolver = TwResolver {
        lang_code,
        tw_requested: requested
            .iter()
            .any(|request| request.lang_code == lang_code && request.is_tw()),
        tw_index,
    };

    let out = TW_WIKI_PREFIXED_RE.replace_all(md, |caps: &Captures<'_>| {
        let mut items = Vec::new();
        let mut resolved_any = false;
        for link in TW_WIKI_RE.captures_iter(&caps["links"]) {
            let word = &link["word"];
            match resolver.localized(word) {
                Some(localized) => {
                    resolved_any = true;
                    items.push(resolver.anchor(&localized));
                }
                None => items.push(word.to_owned()),
            }
        }
        if resolved_any {
            format!("({}: {})", &caps["prefix"], items.join(", "))
        } else {
            String::new()
        }
    });

    let out = TW_WIKI_RE.replace_all(&out, |caps: &Captures<'_>| {
        resolver.link_or_word(&caps["word"])
    });

    let out = TW_RC_MARKDOWN_RE.replace_all(&out, |caps: &Captures<'_>| {
        let word = &caps["word"];
        match resolver.localized(word) {
            Some(localized) => resolver.anchor(&localized),
            None if caps["text"].trim().is_empty() => word.to_owned(),
            None => caps["text"].to_owned(),
        }
    });

    // A bare reference that is still the target of a Markdown link is left
    // alone rather than rewritten into a nested link.
    let haystack: &str = &out;
    let out = TW_RC_RE.replace_all(haystack, |caps: &Captures<'_>| {
        let start = caps.get(0).map_or(0, |m| m.start());
        if haystack[..start].ends_with("](") {
            return caps[0].to_owned();
        }
        resolver.link_or_word(&caps["word"])
    });

    let out = TW_MARKDOWN_RE.replace_all(&out, |caps: &Captures<'_>| {
        match resolver.localized(&caps["word"]) {
            Some(localized) => {
                let dot = caps.name("dot").map_or("", |m| m.as_str());
                format!("{dot}{}", resolver.anchor(&localized))
            }
            None => String::new(),
        }
    });

    out.into_owned()
}

struct TnResolver<'a> {
    lang_code: &'a str,
    requested: &'a [ResourceRequest],
    assets_dir: &'a Path,
}

impl TnResolver<'_> {
    fn request_for(&self, lang_code: &str, book_code: &str) -> Option<&ResourceRequest> {
        self.requested.iter().find(|request| {
            request.lang_code == lang_code && request.is_tn() && request.book_code == book_code
        })
    }

    /// Book of the first TN request in this language; relative links without a
    /// book segment point into it.
    fn current_book(&self) -> Option<&str> {
        self.requested
            .iter()
            .find(|request| request.lang_code == self.lang_code && request.is_tn())
            .map(|request| request.book_code.as_str())
    }

    /// `#<lang>-<book_3>-tn-ch-<chap_3>-v-<verse_3>` when the TN resource is
    /// requested and the verse note exists on disk.
    fn anchor(&self, lang_code: &str, book_code: &str, chap: &str, verse: &str) -> Option<String> {
        let request = self.request_for(lang_code, book_code)?;
        let note_path = self
            .assets_dir
            .join(format!("{}_{}", request.lang_code, request.resource_type))
            .join(format!("{}_tn", request.lang_code))
            .join(book_code)
            .join(chap)
            .join(format!("{verse}.md"));
        if !note_path.is_file() {
            tracing::debug!(path = %note_path.display(), "translation note target missing");
            return None;
        }
        let book_number = bible_books::book_number(book_code)?;
        Some(format!(
            "#{}-{book_number:03}-tn-ch-{}-v-{}",
            request.lang_code,
            zero_pad(chap),
            zero_pad(verse)
        ))
    }
}

pub fn zero_pad(value: &str) -> String {
    format!("{value:0>3}")
}

/// Removes translation-academy references and rewrites translation-note
/// references in `md`.
pub fn rewrite_ta_and_tn_links(
    md: &str,
    lang_code: &str,
    requested: &[ResourceRequest],
    assets_dir: &Path,
) -> String {
    let mut out = md.to_owned();
    for ta_re in TA_RES.iter() {
        out = ta_re.replace_all(&out, "").into_owned();
    }

    let resolver = TnResolver {
        lang_code,
        requested,
        assets_dir,
    };

    out = TN_RC_RE
        .replace_all(&out, |caps: &Captures<'_>| {
            let text = &caps["text"];
            if &caps["book"] == "obs" {
                return caps[0].to_owned();
            }
            match resolver.anchor(&caps["lang"], &caps["book"], &caps["chap"], &caps["verse"]) {
                Some(anchor) => format!("[{text}]({anchor})"),
                None => text.to_owned(),
            }
        })
        .into_owned();

    let relative = |caps: &Captures<'_>, parens: bool| {
        let text = &caps["text"];
        let book = match caps.name("book") {
            Some(book) => Some(book.as_str()),
            None => resolver.current_book(),
        };
        let anchor =
            book.and_then(|book| resolver.anchor(lang_code, book, &caps["chap"], &caps["verse"]));
        match (anchor, parens) {
            (Some(anchor), true) => format!("([{text}]({anchor}))"),
            (Some(anchor), false) => format!("[{text}]({anchor})"),
            (None, true) => format!("({text})"),
            (None, false) => text.to_owned(),
        }
    };

    for (relative_re, parens) in [
        (&*TN_RELATIVE_BOOK_PAREN_RE, true),
        (&*TN_RELATIVE_CHAPTER_PAREN_RE, true),
        (&*TN_RELATIVE_BOOK_RE, false),
        (&*TN_RELATIVE_CHAPTER_RE, false),
    ] {
        out = relative_re
            .replace_all(&out, |caps: &Captures<'_>| relative(caps, parens))
            .into_owned();
    }

    TN_OBS_RE.replace_all(&out, "$text").into_owned()
}

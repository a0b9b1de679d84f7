use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::bundle::Bundle;
use crate::cli::TwBookArgs;
use crate::headings;
use crate::links;
use crate::markdown;
use crate::model::{Book, LangDirection, ResourceRequest, TwBook, TwNameContentPair};

/// Translation-word file stem → path of its Markdown definition.
pub type TranslationWordIndex = BTreeMap<String, PathBuf>;

const CATEGORIES: &[&str] = &["kt", "names", "other"];

/// Indexes `{tw_dir}/bible/{kt,names,other}/*.md`. When a stem appears in more
/// than one category the first category wins.
pub fn translation_word_index(tw_dir: &Path) -> anyhow::Result<TranslationWordIndex> {
    let mut index = TranslationWordIndex::new();
    for category in CATEGORIES {
        let dir = tw_dir.join("bible").join(category);
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "translation word category missing");
            continue;
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("read translation word dir: {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("md") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            index.entry(stem.to_owned()).or_insert(path);
        }
    }
    Ok(index)
}

/// Display form of a word from its definition file: the text of the first
/// `# ` heading, reduced to its first comma-separated form.
pub fn localized_translation_word(markdown: &str) -> String {
    let first_line = markdown.lines().next().unwrap_or_default();
    let Some((_, heading)) = first_line.split_once("# ") else {
        return String::new();
    };
    let word = match heading.split_once(',') {
        Some((first, _)) => first,
        None => heading,
    };
    word.trim().to_owned()
}

/// Reads a definition file and returns its localized word, or `None` when the
/// file cannot be read or has no heading.
pub fn read_localized_word(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let word = localized_translation_word(&contents);
            (!word.is_empty()).then_some(word)
        }
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "read translation word");
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct TwBookSource<'a> {
    pub tw_dir: &'a Path,
    pub lang_code: &'a str,
    pub lang_name: &'a str,
    pub book_code: &'a str,
    pub resource_type_name: &'a str,
    pub lang_direction: LangDirection,
    pub assets_dir: &'a Path,
}

/// Builds a [`TwBook`] from a translation-words checkout: each definition has
/// its boilerplate sections removed and its links rewritten, then is rendered
/// to HTML with the word heading at h3.
pub fn load_tw_book(
    source: &TwBookSource<'_>,
    requested: &[ResourceRequest],
) -> anyhow::Result<TwBook> {
    let index = translation_word_index(source.tw_dir)?;
    tracing::info!(
        lang_code = source.lang_code,
        words = index.len(),
        dir = %source.tw_dir.display(),
        "load translation words"
    );

    let mut name_content_pairs = Vec::with_capacity(index.len());
    for (stem, path) in &index {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read translation word: {}", path.display()))?;
        let mut localized_word = localized_translation_word(&contents);
        if localized_word.is_empty() {
            localized_word = stem.clone();
        }

        let md = markdown::remove_sections(&contents, markdown::SECTIONS_TO_REMOVE);
        let md = links::rewrite_tw_links(&md, source.lang_code, requested, &index);
        let md = links::rewrite_ta_and_tn_links(&md, source.lang_code, requested, source.assets_dir);
        let html = headings::normalize_tw_definition(&markdown::markdown_to_html(&md));

        name_content_pairs.push(TwNameContentPair {
            localized_word,
            content: html,
        });
    }

    let mut book = TwBook {
        lang_code: source.lang_code.to_owned(),
        lang_name: source.lang_name.to_owned(),
        book_code: source.book_code.to_owned(),
        resource_type_name: source.resource_type_name.to_owned(),
        lang_direction: source.lang_direction,
        name_content_pairs,
    };
    book.sort_name_content_pairs();
    Ok(book)
}

/// Builds a TW book and writes it as a bundle `books` entry.
pub fn run(args: TwBookArgs) -> anyhow::Result<()> {
    let out_path = PathBuf::from(&args.out);
    if out_path.exists() && !args.force {
        anyhow::bail!("tw book output already exists: {}", out_path.display());
    }

    let requested = match &args.bundle {
        Some(bundle) => Bundle::load(Path::new(bundle))?.request.resource_requests,
        None => vec![ResourceRequest::new(&args.lang_code, "tw", &args.book_code)],
    };
    let lang_name = if args.lang_name.is_empty() {
        args.lang_code.as_str()
    } else {
        args.lang_name.as_str()
    };
    let tw_dir = PathBuf::from(&args.dir);
    let assets_dir = match &args.assets_dir {
        Some(dir) => PathBuf::from(dir),
        None => tw_dir.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let source = TwBookSource {
        tw_dir: &tw_dir,
        lang_code: &args.lang_code,
        lang_name,
        book_code: &args.book_code,
        resource_type_name: &args.resource_type_name,
        lang_direction: args.lang_direction,
        assets_dir: &assets_dir,
    };
    let book = Book::Tw(load_tw_book(&source, &requested)?);

    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create tw book parent dir: {}", parent.display()))?;
    }
    let mut out_options = OpenOptions::new();
    out_options.write(true);
    if args.force {
        out_options.create(true).truncate(true);
    } else {
        out_options.create_new(true);
    }
    let mut out = out_options
        .open(&out_path)
        .with_context(|| format!("open tw book output: {}", out_path.display()))?;
    serde_json::to_writer_pretty(&mut out, &book).context("serialize tw book")?;
    out.write_all(b"\n")
        .with_context(|| format!("write tw book output: {}", out_path.display()))?;
    out.flush()
        .with_context(|| format!("flush tw book output: {}", out_path.display()))?;

    tracing::info!(out = %out_path.display(), "wrote tw book");
    Ok(())
}

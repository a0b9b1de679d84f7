use pulldown_cmark::{Options, Parser};

/// Section headings dropped from help Markdown before rendering.
pub const SECTIONS_TO_REMOVE: &[&str] = &[
    "Examples from the Bible stories",
    "Links",
    "Picture of",
    "Pictures",
];

/// Removes every ATX section whose title starts with one of `headings`, up to
/// the next heading of the same or a higher level.
pub fn remove_sections(md: &str, headings: &[&str]) -> String {
    let mut out = String::with_capacity(md.len());
    let mut skipping_below: Option<usize> = None;

    for line in md.split_inclusive('\n') {
        if let Some((level, title)) = atx_heading(line) {
            if let Some(skip_level) = skipping_below
                && level > skip_level
            {
                continue;
            }
            skipping_below = None;
            if headings.iter().any(|heading| title.starts_with(heading)) {
                skipping_below = Some(level);
                continue;
            }
        } else if skipping_below.is_some() {
            continue;
        }
        out.push_str(line);
    }

    out
}

fn atx_heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_end();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    Some((level, rest.trim()))
}

pub fn markdown_to_html(md: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(md, options);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

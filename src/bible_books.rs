/// Canonical book table: `(code, name, number)`.
///
/// Numbers follow the USFM convention, which leaves 40 unused between the
/// testaments.
const BOOKS: &[(&str, &str, u32)] = &[
    ("gen", "Genesis", 1),
    ("exo", "Exodus", 2),
    ("lev", "Leviticus", 3),
    ("num", "Numbers", 4),
    ("deu", "Deuteronomy", 5),
    ("jos", "Joshua", 6),
    ("jdg", "Judges", 7),
    ("rut", "Ruth", 8),
    ("1sa", "1 Samuel", 9),
    ("2sa", "2 Samuel", 10),
    ("1ki", "1 Kings", 11),
    ("2ki", "2 Kings", 12),
    ("1ch", "1 Chronicles", 13),
    ("2ch", "2 Chronicles", 14),
    ("ezr", "Ezra", 15),
    ("neh", "Nehemiah", 16),
    ("est", "Esther", 17),
    ("job", "Job", 18),
    ("psa", "Psalms", 19),
    ("pro", "Proverbs", 20),
    ("ecc", "Ecclesiastes", 21),
    ("sng", "Song of Solomon", 22),
    ("isa", "Isaiah", 23),
    ("jer", "Jeremiah", 24),
    ("lam", "Lamentations", 25),
    ("ezk", "Ezekiel", 26),
    ("dan", "Daniel", 27),
    ("hos", "Hosea", 28),
    ("jol", "Joel", 29),
    ("amo", "Amos", 30),
    ("oba", "Obadiah", 31),
    ("jon", "Jonah", 32),
    ("mic", "Micah", 33),
    ("nam", "Nahum", 34),
    ("hab", "Habakkuk", 35),
    ("zep", "Zephaniah", 36),
    ("hag", "Haggai", 37),
    ("zec", "Zechariah", 38),
    ("mal", "Malachi", 39),
    ("mat", "Matthew", 41),
    ("mrk", "Mark", 42),
    ("luk", "Luke", 43),
    ("jhn", "John", 44),
    ("act", "Acts", 45),
    ("rom", "Romans", 46),
    ("1co", "1 Corinthians", 47),
    ("2co", "2 Corinthians", 48),
    ("gal", "Galatians", 49),
    ("eph", "Ephesians", 50),
    ("php", "Philippians", 51),
    ("col", "Colossians", 52),
    ("1th", "1 Thessalonians", 53),
    ("2th", "2 Thessalonians", 54),
    ("1ti", "1 Timothy", 55),
    ("2ti", "2 Timothy", 56),
    ("tit", "Titus", 57),
    ("phm", "Philemon", 58),
    ("heb", "Hebrews", 59),
    ("jas", "James", 60),
    ("1pe", "1 Peter", 61),
    ("2pe", "2 Peter", 62),
    ("1jn", "1 John", 63),
    ("2jn", "2 John", 64),
    ("3jn", "3 John", 65),
    ("jud", "Jude", 66),
    ("rev", "Revelation", 67),
];

fn entry(book_code: &str) -> Option<&'static (&'static str, &'static str, u32)> {
    BOOKS
        .iter()
        .find(|(code, _, _)| code.eq_ignore_ascii_case(book_code))
}

pub fn book_name(book_code: &str) -> Option<&'static str> {
    entry(book_code).map(|(_, name, _)| *name)
}

pub fn book_number(book_code: &str) -> Option<u32> {
    entry(book_code).map(|(_, _, number)| *number)
}

/// Zero-based position in canonical order; unknown codes sort last.
pub fn canonical_position(book_code: &str) -> usize {
    BOOKS
        .iter()
        .position(|(code, _, _)| code.eq_ignore_ascii_case(book_code))
        .unwrap_or(BOOKS.len())
}

/// Sorts and deduplicates book codes in canonical order.
pub fn canonical_order<'a>(book_codes: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut codes: Vec<&str> = book_codes.into_iter().collect();
    codes.sort_by_key(|code| (canonical_position(code), *code));
    codes.dedup();
    codes
}

pub fn is_known_book(book_code: &str) -> bool {
    entry(book_code).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_sixty_six_books() {
        assert_eq!(BOOKS.len(), 66);
    }

    #[test]
    fn new_testament_numbering_skips_forty() {
        assert_eq!(book_number("mal"), Some(39));
        assert_eq!(book_number("mat"), Some(41));
        assert_eq!(book_number("col"), Some(52));
        assert_eq!(book_number("rev"), Some(67));
    }

    #[test]
    fn canonical_order_sorts_and_dedups() {
        let codes = canonical_order(["3jn", "col", "1jn", "col", "gen"]);
        assert_eq!(codes, vec!["gen", "col", "1jn", "3jn"]);
    }

    #[test]
    fn unknown_codes_have_no_name() {
        assert_eq!(book_name("xyz"), None);
        assert_eq!(canonical_position("xyz"), 66);
    }
}

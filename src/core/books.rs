//! Book Canon & Aliases
//!
//! The fixed 66-book canon (ids 0..65 in canonical order) and the table of
//! spoken/misheard aliases used to rewrite book names.

use std::collections::HashMap;
use tracing::{debug, warn};

use super::phonetic::soundex;

/// Canonical book names, indexed by book id
pub const BOOKS: [&str; 66] = [
    "Genesis",
    "Exodus",
    "Leviticus",
    "Numbers",
    "Deuteronomy",
    "Joshua",
    "Judges",
    "Ruth",
    "1 Samuel",
    "2 Samuel",
    "1 Kings",
    "2 Kings",
    "1 Chronicles",
    "2 Chronicles",
    "Ezra",
    "Nehemiah",
    "Esther",
    "Job",
    "Psalms",
    "Proverbs",
    "Ecclesiastes",
    "Song of Solomon",
    "Isaiah",
    "Jeremiah",
    "Lamentations",
    "Ezekiel",
    "Daniel",
    "Hosea",
    "Joel",
    "Amos",
    "Obadiah",
    "Jonah",
    "Micah",
    "Nahum",
    "Habakkuk",
    "Zephaniah",
    "Haggai",
    "Zechariah",
    "Malachi",
    "Matthew",
    "Mark",
    "Luke",
    "John",
    "Acts",
    "Romans",
    "1 Corinthians",
    "2 Corinthians",
    "Galatians",
    "Ephesians",
    "Philippians",
    "Colossians",
    "1 Thessalonians",
    "2 Thessalonians",
    "1 Timothy",
    "2 Timothy",
    "Titus",
    "Philemon",
    "Hebrews",
    "James",
    "1 Peter",
    "2 Peter",
    "1 John",
    "2 John",
    "3 John",
    "Jude",
    "Revelation",
];

/// Built-in ASR mishearing aliases, in canon order
const DEFAULT_ALIASES: &[(&str, &[&str])] = &[
    ("Genesis", &["genesis", "genes is", "jenesis", "gen is", "gen"]),
    ("Exodus", &["exodus", "ex o dus", "eksodus", "egzodus", "exo dus"]),
    ("Leviticus", &["leviticus", "levi ticus", "levitikas", "levi ticas"]),
    ("Numbers", &["numbers", "numbas", "num bers", "numberss"]),
    ("Deuteronomy", &["deuteronomy", "deutronomy", "deut er onomy", "dueteronomy"]),
    ("Joshua", &["joshua", "josh u a", "josh"]),
    ("Judges", &["judges", "judjes", "jud ges"]),
    ("Ruth", &["ruth", "root"]),
    ("1 Samuel", &["1 samuel", "first samuel", "samuel one", "one samuel"]),
    ("2 Samuel", &["2 samuel", "second samuel", "samuel two", "two samuel"]),
    ("1 Kings", &["1 kings", "first kings", "kings one", "one kings"]),
    ("2 Kings", &["2 kings", "second kings", "kings two", "two kings"]),
    ("1 Chronicles", &["1 chronicles", "first chronicles", "chronicles one", "one chronicles"]),
    ("2 Chronicles", &["2 chronicles", "second chronicles", "chronicles two", "two chronicles"]),
    ("Ezra", &["ezra", "ez ra"]),
    ("Nehemiah", &["nehemiah", "nee a my a", "ne he miah"]),
    ("Esther", &["esther", "es ter"]),
    ("Job", &["job", "jobe"]),
    ("Psalms", &["psalms", "psalm", "salms", "sams", "songs", "sam"]),
    ("Proverbs", &["proverbs", "pro verbs", "provabs", "proverb"]),
    ("Ecclesiastes", &["ecclesiastes", "ecclesiastis", "eclesiastes", "ecclesi asties"]),
    ("Song of Solomon", &["song of solomon", "song of songs", "songs of solomon", "song songs"]),
    ("Isaiah", &["isaiah", "isaya", "izaya", "i say a"]),
    ("Jeremiah", &["jeremiah", "jeremiya", "jeramaya", "jerry my a"]),
    ("Lamentations", &["lamentations", "lament ations", "lamen tations"]),
    ("Ezekiel", &["ezekiel", "eze kyle", "ezikel", "e zekiel"]),
    ("Daniel", &["daniel", "dan yel", "danyel"]),
    ("Hosea", &["hosea", "ho zay a"]),
    ("Joel", &["joel", "joe l"]),
    ("Amos", &["amos", "aim us"]),
    ("Obadiah", &["obadiah", "oba dye a"]),
    ("Jonah", &["jonah", "jo na"]),
    ("Micah", &["micah", "my ka"]),
    ("Nahum", &["nahum", "nay hum"]),
    ("Habakkuk", &["habakkuk", "ha back uk", "habakuk"]),
    ("Zephaniah", &["zephaniah", "zef a nye a"]),
    ("Haggai", &["haggai", "hag eye"]),
    ("Zechariah", &["zechariah", "zeck a rye a"]),
    ("Malachi", &["malachi", "mal a ky"]),
    ("Matthew", &["matthew", "mathew", "mat stew", "math you", "matt you", "mat you"]),
    ("Mark", &["mark", "mak", "marc"]),
    ("Luke", &["luke", "look", "luk", "luuk"]),
    ("John", &["john", "jon", "jawn", "jaan"]),
    ("Acts", &["acts", "act", "aks", "ax"]),
    ("Romans", &["romans", "rowmans", "romins", "romanz"]),
    (
        "1 Corinthians",
        &[
            "1 corinthians",
            "first corinthians",
            "corinthians one",
            "fast corinthians",
            "core into shians",
            "one corinthians",
        ],
    ),
    ("2 Corinthians", &["2 corinthians", "second corinthians", "corinthians two", "two corinthians"]),
    ("Galatians", &["galatians", "galashians", "galations", "gala shuns"]),
    ("Ephesians", &["ephesians", "efeeshians", "efesians", "e fee shuns"]),
    ("Philippians", &["philippians", "philipians", "flipians", "fill ip e uns"]),
    ("Colossians", &["colossians", "colashians", "co losh uns"]),
    (
        "1 Thessalonians",
        &[
            "1 thessalonians",
            "first thessalonians",
            "the salon onions one",
            "thessalonians one",
            "one thessalonians",
        ],
    ),
    (
        "2 Thessalonians",
        &[
            "2 thessalonians",
            "second thessalonians",
            "the salon onions two",
            "thessalonians two",
            "two thessalonians",
        ],
    ),
    ("1 Timothy", &["1 timothy", "first timothy", "timothy one", "one timothy"]),
    ("2 Timothy", &["2 timothy", "second timothy", "timothy two", "two timothy"]),
    ("Titus", &["titus", "tight us", "tie tus"]),
    ("Philemon", &["philemon", "filemon", "fill e mon"]),
    ("Hebrews", &["hebrews", "heb ruse", "he brews"]),
    ("James", &["james", "jams", "jamz"]),
    ("1 Peter", &["1 peter", "first peter", "peter one", "one peter"]),
    ("2 Peter", &["2 peter", "second peter", "peter two", "two peter"]),
    ("1 John", &["1 john", "first john", "john one", "one john"]),
    ("2 John", &["2 john", "second john", "john two", "two john"]),
    ("3 John", &["3 john", "third john", "john three", "three john"]),
    ("Jude", &["jude", "jud", "jood"]),
    ("Revelation", &["revelation", "revelations", "rev elation", "revel ation"]),
];

/// Book id (0..65) for a canonical name, case-insensitive
pub fn book_id(name: &str) -> Option<usize> {
    BOOKS.iter().position(|b| b.eq_ignore_ascii_case(name.trim()))
}

/// Canonical name for a book id
pub fn book_name(id: usize) -> Option<&'static str> {
    BOOKS.get(id).copied()
}

/// Canonical spelling of a book name given in any case
pub fn canonical_book(name: &str) -> Option<&'static str> {
    book_id(name).and_then(book_name)
}

/// A single alias → canonical book mapping
#[derive(Debug, Clone)]
pub struct AliasEntry {
    /// Lowercase spoken form
    pub alias: String,
    /// Canonical book name
    pub book: &'static str,
    /// Soundex code of the alias, if it has letters
    pub code: Option<String>,
}

/// All aliases, longest first.
///
/// Scans walk this order, so where two aliases start at the same word the
/// longer one wins.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::with_custom(&HashMap::new())
    }
}

impl AliasTable {
    /// Built-in table merged with user aliases keyed by canonical name
    pub fn with_custom(custom: &HashMap<String, Vec<String>>) -> Self {
        let mut entries = Vec::new();

        for (book, aliases) in DEFAULT_ALIASES {
            let Some(book) = canonical_book(book) else {
                continue;
            };
            for alias in aliases.iter() {
                entries.push(AliasEntry::new(alias, book));
            }
        }

        // Deterministic order for user entries
        let mut custom: Vec<_> = custom.iter().collect();
        custom.sort_by(|a, b| a.0.cmp(b.0));
        for (book, aliases) in custom {
            let Some(canonical) = canonical_book(book) else {
                warn!("⚠️ Ignoring aliases for unknown book '{}'", book);
                continue;
            };
            for alias in aliases {
                let alias = alias.trim().to_lowercase();
                if alias.is_empty() || entries.iter().any(|e| e.alias == alias) {
                    continue;
                }
                debug!("➕ Custom alias '{}' -> {}", alias, canonical);
                entries.push(AliasEntry::new(&alias, canonical));
            }
        }

        // Stable: equal lengths keep canon order
        entries.sort_by(|a, b| b.alias.len().cmp(&a.alias.len()));

        Self { entries }
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a book span (canonical name or alias) to its canonical name
    pub fn resolve(&self, span: &str) -> Option<&'static str> {
        let lower = span.trim().to_lowercase();
        canonical_book(&lower).or_else(|| {
            self.entries
                .iter()
                .find(|e| e.alias == lower)
                .map(|e| e.book)
        })
    }
}

impl AliasEntry {
    fn new(alias: &str, book: &'static str) -> Self {
        Self {
            alias: alias.to_string(),
            book,
            code: soundex(alias),
        }
    }
}

//! Name root derivation
//!
//! Rules accumulate into one root set, in order:
//! 1. Given-name lexicon entry
//! 2. Locative prefix (`von Humboldt` → place, humboldt)
//! 3. Surname lexicon entry (whole surname, else its last word)
//! 4. Occupational surname variant (`Schmidt` → smith bundle)
//! 5. Compound split of the surname on letter runs
//! 6. Plain words of the given name and surname

use crate::lexicon::{Lexicon, LexiconEntry};
use std::collections::BTreeSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const NOTE_LEXICON: &str = "lexicon";
const NOTE_HEURISTIC: &str = "heuristic";
const NOTE_COMPOUND: &str = "compound";

/// Derived roots for one person
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Etymology {
    /// Sorted, unique, never empty
    pub roots: Vec<String>,
    /// Gloss fragments joined with "; " (may be empty)
    pub gloss: String,
    /// Rule notes joined with " + "
    pub source: String,
    /// Origin of the first lexicon entry that matched
    pub origin: Option<String>,
}

/// Fold diacritics, lowercase, keep `a-z`, whitespace and `-`
pub fn clean(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_whitespace() || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

fn words(s: &str) -> Vec<&str> {
    s.split_whitespace().collect()
}

/// Words of at least two characters
fn root_words(s: &str) -> impl Iterator<Item = &str> {
    s.split_whitespace().filter(|w| w.chars().count() >= 2)
}

/// "vinci" → "Vinci", "la-mancha" → "La-Mancha"
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut start = true;
    for c in word.chars() {
        if start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        start = !c.is_alphabetic();
    }
    out
}

#[derive(Default)]
struct Accumulator {
    roots: BTreeSet<String>,
    parts: Vec<String>,
    notes: BTreeSet<&'static str>,
    origin: Option<String>,
}

impl Accumulator {
    fn add_roots<'a>(&mut self, roots: impl IntoIterator<Item = &'a str>) {
        self.roots.extend(roots.into_iter().map(str::to_string));
    }

    fn add_entry(&mut self, entry: &LexiconEntry) {
        self.add_roots(entry.roots.iter().copied());
        self.parts.push(entry.meaning.to_string());
        self.notes.insert(NOTE_LEXICON);
        if self.origin.is_none() {
            self.origin = Some(entry.origin.to_string());
        }
    }
}

/// Derive roots from a person's name parts
///
/// Returns `None` when every part is empty after cleaning. Without a surname
/// the full-name words after the first stand in for it.
pub fn derive(lexicon: &Lexicon, full_name: &str, given_name: &str, surname: &str) -> Option<Etymology> {
    let full = clean(full_name);
    let given = clean(given_name);
    let sur = clean(surname);
    if full.is_empty() && given.is_empty() && sur.is_empty() {
        return None;
    }

    let full_words = words(&full);
    let given_key = if given.is_empty() {
        full_words.first().copied().unwrap_or("").to_string()
    } else {
        given
    };
    let surname_key = if sur.is_empty() {
        full_words.iter().skip(1).copied().collect::<Vec<_>>().join(" ")
    } else {
        sur.clone()
    };
    let surname_last = words(&surname_key).last().copied().unwrap_or("");
    // Variant and compound checks only look at a real surname
    let variant_key = match (sur.is_empty(), full_words.as_slice()) {
        (false, _) => sur.as_str(),
        (true, [_, .., last]) => *last,
        _ => "",
    };

    let mut acc = Accumulator::default();

    if let Some(entry) = lexicon.given(&given_key) {
        acc.add_entry(entry);
    }

    if full_words.len() >= 2 && lexicon.is_locative_prefix(full_words[0]) {
        let place = full_words[full_words.len() - 1];
        acc.add_roots(["place", place]);
        acc.parts.push(format!("from {}", title_case(place)));
        acc.notes.insert(NOTE_HEURISTIC);
    }

    if let Some(entry) = lexicon
        .surname(&surname_key)
        .or_else(|| lexicon.surname(surname_last))
    {
        acc.add_entry(entry);
    }

    if let Some((occupation, roots)) = lexicon.occupational_variant(variant_key) {
        acc.add_roots(roots.iter().copied());
        acc.parts.push(occupation.to_string());
        acc.notes.insert(NOTE_HEURISTIC);
    }

    let chunks: Vec<&str> = variant_key
        .split(|c: char| !c.is_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if chunks.len() >= 2 {
        acc.add_roots(chunks);
        acc.notes.insert(NOTE_COMPOUND);
    }

    acc.add_roots(root_words(&given_key));
    acc.add_roots(root_words(&surname_key));

    if acc.roots.is_empty() {
        // Only one-letter words: keep them rather than return nothing
        acc.add_roots(words(&full));
        acc.add_roots(words(&given_key));
        acc.add_roots(words(&surname_key));
    }

    let source = if acc.notes.is_empty() {
        NOTE_HEURISTIC.to_string()
    } else {
        acc.notes.iter().copied().collect::<Vec<_>>().join(" + ")
    };

    Some(Etymology {
        roots: acc.roots.into_iter().collect(),
        gloss: acc.parts.join("; "),
        source,
        origin: acc.origin,
    })
}

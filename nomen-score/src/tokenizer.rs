//! Name tokenization
//!
//! Word tokens from every name part, plus up to [`MAX_TRIGRAMS`] overlapping
//! 3-character fragments of the longest word. Fragments give unseen surnames
//! partial overlap with known ones ("schmidt" and "schmitt" share "sch", "chm").

use std::collections::BTreeSet;

/// Ordered so PMI sums always run in the same order
pub type TokenSet = BTreeSet<String>;

pub const MAX_TRIGRAMS: usize = 5;

/// Tokens shorter than this (in characters) are dropped
pub const MIN_TOKEN_CHARS: usize = 2;

/// ASCII letters plus the Latin-1 letter ranges À-Ö, Ø-ö, ø-ÿ
fn is_name_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, 'À'..='Ö' | 'Ø'..='ö' | 'ø'..='ÿ')
}

/// Replace anything but name letters and whitespace with a space, then lowercase
pub fn clean(s: &str) -> String {
    s.chars()
        .map(|c| if is_name_letter(c) || c.is_whitespace() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

fn words(s: &str) -> Vec<String> {
    clean(s).split_whitespace().map(str::to_string).collect()
}

fn trigrams(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .windows(3)
        .take(MAX_TRIGRAMS)
        .map(|w| w.iter().collect())
        .collect()
}

/// Tokens for one record from its full, given and family name
///
/// Longest-word ties go to the lexicographically smallest word, so
/// re-tokenizing the joined output yields the same set.
pub fn name_tokens(full_name: &str, given_name: &str, surname: &str) -> TokenSet {
    let parts: Vec<String> = [full_name, given_name, surname]
        .iter()
        .flat_map(|s| words(s))
        .collect();

    let longest = parts.iter().max_by(|a, b| {
        a.chars()
            .count()
            .cmp(&b.chars().count())
            .then_with(|| b.cmp(a))
    });

    let mut tokens: TokenSet = parts.iter().cloned().collect();
    if let Some(word) = longest {
        tokens.extend(trigrams(word));
    }

    tokens.retain(|t| t.chars().count() >= MIN_TOKEN_CHARS);
    tokens
}

//! SPARQL query text
//!
//! Every query binds `?person ?personLabel ?occupationLabel`. User-supplied
//! text only ever enters a query through [`string_literal`].

use nomen_common::{Error, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Wikidata class of occupation items (`wd:Q28640`)
pub const OCCUPATION_CLASS: &str = "Q28640";

const PLACEHOLDERS: [&str; 4] = ["{LANGS}", "{LIMIT}", "{SURNAME_FILTER}", "{OCCUPATION_FILTER}"];

const DISCOVERY_TEMPLATE: &str = r#"SELECT DISTINCT ?person ?personLabel ?surnameLabel ?occupationLabel WHERE {
  ?person wdt:P31 wd:Q5 ;
          wdt:P734 ?surname ;
          wdt:P106 ?occupation .
  SERVICE wikibase:label { bd:serviceParam wikibase:language "{LANGS}". }
  {SURNAME_FILTER}
  {OCCUPATION_FILTER}
}
LIMIT {LIMIT}"#;

/// Quote `value` as a SPARQL string literal
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Occupation item carrying the exact English label `label`
pub fn occupation_lookup(label: &str) -> String {
    format!(
        "SELECT ?occ WHERE {{\n  ?occ rdfs:label {}@en .\n  ?occ wdt:P31 wd:{} .\n}} LIMIT 1",
        string_literal(label.trim()),
        OCCUPATION_CLASS
    )
}

/// People whose occupation is `qid`, or a subclass of it when `transitive`
///
/// `qid` must already be a bare item id (see [`is_item_id`]).
pub fn people_by_occupation(qid: &str, limit: u32, transitive: bool) -> String {
    let occupation = if transitive {
        format!(
            "?person wdt:P106 ?occupation .\n  ?occupation wdt:P279* wd:{} .",
            qid
        )
    } else {
        format!("?person wdt:P106 wd:{} .\n  BIND(wd:{} AS ?occupation)", qid, qid)
    };

    format!(
        "SELECT ?person ?personLabel ?occupationLabel ?givenNameLabel ?familyNameLabel WHERE {{\n  \
         {}\n  \
         OPTIONAL {{ ?person wdt:P735 ?givenName . }}\n  \
         OPTIONAL {{ ?person wdt:P734 ?familyName . }}\n  \
         SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"[AUTO_LANGUAGE],en\". }}\n\
         }} LIMIT {}",
        occupation, limit
    )
}

/// `Q` followed by digits
pub fn is_item_id(id: &str) -> bool {
    id.strip_prefix('Q')
        .map(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Item id at the end of an entity URI (`http://www.wikidata.org/entity/Q42` → `Q42`)
pub fn item_id(uri: &str) -> Option<&str> {
    uri.trim()
        .rsplit('/')
        .next()
        .filter(|id| is_item_id(id))
}

/// Case-insensitive OR of `^<prefix>.*` alternatives, `None` without usable prefixes
///
/// Prefixes are regex-escaped; the result is raw pattern text, not yet a
/// SPARQL literal.
pub fn surname_pattern<S: AsRef<str>>(prefixes: &[S]) -> Option<String> {
    let alternatives: Vec<String> = prefixes
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .map(|p| format!("^{}.*", regex::escape(p)))
        .collect();

    if alternatives.is_empty() {
        None
    } else {
        Some(format!("({})", alternatives.join("|")))
    }
}

/// Whether discovery also requires the occupation label to match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryMode {
    /// Surname filter only
    #[default]
    Open,
    /// Surname filter plus `CONTAINS(LCASE(?occupationLabel), occupation)`
    Strict,
}

impl DiscoveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryMode::Open => "open",
            DiscoveryMode::Strict => "strict",
        }
    }

    /// Occupation filter clause for `occupation`
    pub fn occupation_filter(&self, occupation: &str) -> String {
        match self {
            DiscoveryMode::Open => "# open mode: no occupation filter".to_string(),
            DiscoveryMode::Strict => format!(
                "FILTER ( CONTAINS(LCASE(STR(?occupationLabel)), {}) )",
                string_literal(&occupation.trim().to_lowercase())
            ),
        }
    }
}

impl FromStr for DiscoveryMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(DiscoveryMode::Open),
            "strict" => Ok(DiscoveryMode::Strict),
            other => Err(format!("unknown mode '{}' (expected open or strict)", other)),
        }
    }
}

impl fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discovery query text with `{LANGS}`, `{LIMIT}`, `{SURNAME_FILTER}` and
/// `{OCCUPATION_FILTER}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    text: String,
}

impl QueryTemplate {
    pub fn builtin() -> Self {
        Self {
            text: DISCOVERY_TEMPLATE.to_string(),
        }
    }

    /// Template text, failing when any placeholder is missing
    pub fn parse(text: &str) -> Result<Self> {
        let missing: Vec<&str> = PLACEHOLDERS
            .iter()
            .copied()
            .filter(|p| !text.contains(p))
            .collect();
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "Query template missing placeholder(s): {}",
                missing.join(", ")
            )));
        }
        Ok(Self {
            text: text.to_string(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read query template {} failed: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    /// Fill the placeholders
    ///
    /// `langs` is a comma list of language codes for the label service.
    pub fn render(&self, langs: &str, limit: u32, surname_pattern: &str, occupation_filter: &str) -> String {
        let langs: Vec<&str> = langs
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty() && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
            .collect();
        let langs = if langs.is_empty() { "en".to_string() } else { langs.join(",") };

        let surname_filter = format!(
            "FILTER ( REGEX(STR(?surnameLabel), {}, \"i\") )",
            string_literal(surname_pattern)
        );

        self.text
            .replace("{LANGS}", &langs)
            .replace("{LIMIT}", &limit.to_string())
            .replace("{SURNAME_FILTER}", &surname_filter)
            .replace("{OCCUPATION_FILTER}", occupation_filter)
    }
}

impl Default for QueryTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}

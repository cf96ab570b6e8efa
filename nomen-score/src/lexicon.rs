//! Static name and profession tables
//!
//! Built once at startup and passed by reference into the etymology deriver
//! and the aligner. Keys are lowercase ASCII (diacritics folded).

use std::collections::{BTreeMap, BTreeSet};

/// Meaning, roots and origin of a known name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexiconEntry {
    pub meaning: &'static str,
    pub roots: &'static [&'static str],
    pub origin: &'static str,
}

const fn entry(
    meaning: &'static str,
    roots: &'static [&'static str],
    origin: &'static str,
) -> LexiconEntry {
    LexiconEntry {
        meaning,
        roots,
        origin,
    }
}

const EARTH_WORKER: LexiconEntry = entry("earth-worker; farmer", &["earth", "work", "farmer"], "Greek");
const WILL_HELMET: LexiconEntry = entry("will-helmet", &["will", "helm"], "Germanic");
const HOME_RULER: LexiconEntry = entry("home-ruler", &["home", "ruler"], "Germanic");

const GIVEN_NAMES: &[(&str, LexiconEntry)] = &[
    ("nikola", entry("victory of the people", &["nike", "laos"], "Greek")),
    ("ada", entry("noble", &["noble"], "Germanic")),
    ("leonardo", entry("lion-strong", &["leo", "hard"], "Germanic+Latin")),
    ("gustav", entry("staff of the Goths", &["goth", "staff"], "Germanic")),
    ("wilhelm", WILL_HELMET),
    ("willi", WILL_HELMET),
    ("willy", WILL_HELMET),
    ("august", entry("venerable", &["venerable"], "Latin")),
    ("rudolf", entry("fame-wolf", &["fame", "wolf"], "Germanic")),
    ("paul", entry("small; humble", &["small", "humble"], "Latin")),
    ("anton", entry("priceless; invaluable", &["priceless", "invaluable"], "Latin")),
    ("albrecht", entry("noble-bright", &["noble", "bright"], "Germanic")),
    ("georg", EARTH_WORKER),
    ("jorg", EARTH_WORKER),
    ("joerg", EARTH_WORKER),
    ("george", EARTH_WORKER),
    ("emil", entry("rival", &["rival"], "Latin")),
    ("heinrich", HOME_RULER),
    ("heinz", HOME_RULER),
    ("arthur", entry("bear-man", &["bear", "man"], "Celtic")),
    ("friedrich", entry("peace-ruler", &["peace", "ruler"], "Germanic")),
    ("jean", entry("God is gracious", &["god", "grace"], "Hebrew→French")),
    ("otto", entry("wealth, prosperity", &["wealth", "prosperity"], "Germanic")),
    ("galileo", entry("from Galilee (place)", &["galilee", "place"], "Hebrew/Latin")),
    ("michelangelo", entry("Michael + messenger", &["michael", "angel"], "Hebrew/Greek")),
];

const SURNAMES: &[(&str, LexiconEntry)] = &[
    ("tesla", entry("adze; carpenter", &["adze", "carpenter"], "Slavic")),
    ("smith", entry("metalworker", &["smith", "metal", "forge"], "English")),
    ("miller", entry("operates a mill", &["mill", "grain"], "English")),
    ("baker", entry("bakes bread", &["bake", "bread", "oven"], "English")),
    ("fisher", entry("fisher", &["fish", "river"], "English")),
    ("carpenter", entry("woodworker", &["wood", "carpenter"], "French/Latin")),
    ("painter", entry("painter", &["paint", "color"], "English")),
    ("da vinci", entry("from Vinci (place)", &["vinci", "place"], "Italian")),
];

/// Spelling variants of occupational surnames → canonical occupation
const OCCUPATIONAL_VARIANTS: &[(&str, &str)] = &[
    ("schmidt", "smith"),
    ("schmitt", "smith"),
    ("schmid", "smith"),
    ("schmied", "smith"),
    ("muller", "miller"),
    ("mueller", "miller"),
    ("miller", "miller"),
    ("backer", "baker"),
    ("baecker", "baker"),
    ("backmann", "baker"),
    ("fischer", "fisher"),
    ("schneider", "tailor"),
    ("zimmermann", "carpenter"),
    ("zimmerman", "carpenter"),
    ("bauer", "farmer"),
];

/// Canonical occupation → root bundle
const OCCUPATION_ROOTS: &[(&str, &[&str])] = &[
    ("miller", &["mill", "grain"]),
    ("baker", &["bake", "bread", "oven"]),
    ("fisher", &["fish", "river"]),
    ("tailor", &["tailor", "cut", "cloth"]),
    ("carpenter", &["carpenter", "wood"]),
    ("smith", &["smith", "metal", "forge"]),
    ("farmer", &["farmer", "field", "earth"]),
];

const LOCATIVE_PREFIXES: &[&str] = &["von", "van", "de", "da", "di"];

/// Name lexicon used by the etymology deriver
#[derive(Debug, Clone)]
pub struct Lexicon {
    given: BTreeMap<&'static str, LexiconEntry>,
    surnames: BTreeMap<&'static str, LexiconEntry>,
    variants: BTreeMap<&'static str, &'static str>,
    occupation_roots: BTreeMap<&'static str, &'static [&'static str]>,
    locative_prefixes: BTreeSet<&'static str>,
}

impl Lexicon {
    pub fn builtin() -> Self {
        Self {
            given: GIVEN_NAMES.iter().copied().collect(),
            surnames: SURNAMES.iter().copied().collect(),
            variants: OCCUPATIONAL_VARIANTS.iter().copied().collect(),
            occupation_roots: OCCUPATION_ROOTS.iter().copied().collect(),
            locative_prefixes: LOCATIVE_PREFIXES.iter().copied().collect(),
        }
    }

    pub fn given(&self, name: &str) -> Option<&LexiconEntry> {
        self.given.get(name)
    }

    pub fn surname(&self, name: &str) -> Option<&LexiconEntry> {
        self.surnames.get(name)
    }

    /// Canonical occupation and its root bundle for a surname variant
    pub fn occupational_variant(&self, surname: &str) -> Option<(&'static str, &'static [&'static str])> {
        let occupation = *self.variants.get(surname)?;
        let roots = self.occupation_roots.get(occupation).copied().unwrap_or(&[]);
        Some((occupation, roots))
    }

    pub fn is_locative_prefix(&self, token: &str) -> bool {
        self.locative_prefixes.contains(token)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

const PROFESSION_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Engineer",
        &["build", "make", "forge", "device", "engine", "machine", "metal", "smith", "carpenter", "adze", "wood", "craft"],
    ),
    (
        "Artist",
        &["art", "paint", "color", "design", "draw", "create", "sculpt", "craft", "lace"],
    ),
    (
        "Mathematician",
        &["number", "count", "measure", "logic", "calc", "think"],
    ),
    ("Baker", &["bread", "bake", "oven", "grain", "loaf", "flour"]),
    (
        "Agriculture",
        &["field", "farm", "earth", "harvest", "plough", "grain", "vine", "vinci"],
    ),
];

/// Profession label → keyword set, matched case-sensitively on the label
#[derive(Debug, Clone)]
pub struct ProfessionKeywords {
    table: BTreeMap<String, BTreeSet<String>>,
}

impl ProfessionKeywords {
    pub fn builtin() -> Self {
        Self::from_pairs(PROFESSION_KEYWORDS.iter().map(|(label, words)| (*label, words.iter().copied())))
    }

    pub fn from_pairs<'a, I, W>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, W)>,
        W: IntoIterator<Item = &'a str>,
    {
        let table = pairs
            .into_iter()
            .map(|(label, words)| {
                (
                    label.to_string(),
                    words.into_iter().map(str::to_string).collect(),
                )
            })
            .collect();
        Self { table }
    }

    pub fn get(&self, label: &str) -> Option<&BTreeSet<String>> {
        self.table.get(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}

impl Default for ProfessionKeywords {
    fn default() -> Self {
        Self::builtin()
    }
}

//! Discovery dictionaries and the default harvest label list
//!
//! Two tables drive discovery:
//! - cluster → occupations (`occupations_by_cluster.json` shape)
//! - occupation → surname prefixes (`surname_variants.json` shape)
//!
//! Both are built in and each can be replaced by a JSON file of the same
//! shape. Lookups are exact on the key.

use nomen_common::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// English occupation labels harvested when no list is given
pub const DEFAULT_PROFESSION_LABELS: &[&str] = &[
    // STEM / medical
    "Engineer", "Electrical engineer", "Mechanical engineer", "Civil engineer",
    "Computer scientist", "Programmer", "Data scientist", "Statistician", "Physicist",
    "Chemist", "Biologist", "Geologist", "Meteorologist", "Astronomer", "Astrophysicist",
    "Oceanographer", "Environmental scientist", "Mathematician", "Doctor", "Physician",
    "Surgeon", "Psychologist", "Psychiatrist", "Pharmacist", "Dentist", "Veterinarian",
    "Nurse",
    // Humanities / social
    "Historian", "Archaeologist", "Anthropologist", "Sociologist", "Economist",
    "Philosopher", "Linguist", "Teacher", "Professor", "Lecturer", "Librarian",
    "Translator", "Interpreter",
    // Law / public
    "Lawyer", "Attorney", "Judge", "Police officer", "Firefighter", "Soldier", "Diplomat",
    "Civil servant", "Politician",
    // Business / trades
    "Businessperson", "Entrepreneur", "Manager", "Accountant", "Salesperson",
    "Marketing professional", "Architect", "Carpenter", "Mason", "Plumber", "Electrician",
    "Mechanic", "Driver", "Pilot", "Sailor", "Farmer", "Fisher", "Chef", "Cook", "Baker",
    "Butcher",
    // Arts / media / sports
    "Artist", "Painter", "Sculptor", "Illustrator", "Designer", "Fashion designer",
    "Photographer", "Actor", "Actress", "Film director", "Screenwriter", "Producer",
    "Journalist", "Editor", "Writer", "Author", "Poet", "Novelist", "Musician", "Singer",
    "Composer", "Pianist", "Violinist", "Guitarist", "Dancer", "Choreographer", "Athlete",
    "Footballer", "Basketball player", "Tennis player",
];

const OCCUPATIONS_BY_CLUSTER: &[(&str, &[&str])] = &[
    (
        "Trades",
        &["smith", "blacksmith", "carpenter", "mason", "cooper", "potter", "weaver", "tailor", "shoemaker"],
    ),
    ("Food", &["baker", "butcher", "cook", "brewer", "miller"]),
    ("Agriculture", &["farmer", "fisher", "hunter", "shepherd", "gardener"]),
    ("Clergy", &["priest", "bishop", "monk"]),
    ("Service", &["judge", "knight", "steward", "marshal"]),
];

const SURNAME_PREFIXES: &[(&str, &[&str])] = &[
    ("smith", &["Smith", "Schmidt", "Schmitt", "Schmid", "Smit", "Kovac", "Kowal", "Ferrari", "Herrero", "Lefebvre"]),
    ("blacksmith", &["Smith", "Schmidt", "Kowalski", "Kovacs", "Ferraro"]),
    ("carpenter", &["Carpenter", "Zimmermann", "Charpentier", "Tischler", "Cieslak"]),
    ("mason", &["Mason", "Maurer", "Massone", "Steinmetz"]),
    ("cooper", &["Cooper", "Fassbinder", "Bednar", "Kupfer"]),
    ("potter", &["Potter", "Töpfer", "Hafner", "Garncarz"]),
    ("weaver", &["Weaver", "Weber", "Webster", "Tkach", "Tessier"]),
    ("tailor", &["Taylor", "Schneider", "Sarto", "Szabo", "Krawczyk", "Portnoy"]),
    ("shoemaker", &["Shoemaker", "Schumacher", "Schuster", "Szewczyk", "Sapozhnikov"]),
    ("baker", &["Baker", "Becker", "Bäcker", "Boulanger", "Piekarz", "Fornari"]),
    ("butcher", &["Butcher", "Metzger", "Fleischer", "Boucher", "Řezník"]),
    ("cook", &["Cook", "Koch", "Cuoco", "Kucharski"]),
    ("brewer", &["Brewer", "Brauer", "Bräuer", "Brouwer"]),
    ("miller", &["Miller", "Müller", "Mueller", "Molnar", "Meunier", "Molinari", "Melnyk"]),
    ("farmer", &["Farmer", "Bauer", "Boer", "Rolnik"]),
    ("fisher", &["Fisher", "Fischer", "Visser", "Pescatore", "Rybak"]),
    ("hunter", &["Hunter", "Jäger", "Jaeger", "Cacciatore", "Lovas"]),
    ("shepherd", &["Shepherd", "Schäfer", "Schaefer", "Pastore", "Juhasz"]),
    ("gardener", &["Gardener", "Gardner", "Gärtner", "Gaertner", "Ogrodnik"]),
    ("priest", &["Priest", "Pfaff", "Pope", "Popov", "Prete"]),
    ("bishop", &["Bishop", "Bischof", "Vescovi", "Biskup"]),
    ("monk", &["Monk", "Mönch", "Monaco", "Mnich"]),
    ("judge", &["Judge", "Richter", "Sudak"]),
    ("knight", &["Knight", "Ritter", "Cavalieri"]),
    ("steward", &["Steward", "Stewart", "Stuart"]),
    ("marshal", &["Marshall", "Marschall", "Marechal"]),
];

/// Immutable discovery lookup tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryDictionaries {
    occupations_by_cluster: BTreeMap<String, Vec<String>>,
    surname_prefixes: BTreeMap<String, Vec<String>>,
}

fn owned_table(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(key, values)| {
            (
                key.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            )
        })
        .collect()
}

fn load_table(path: &Path) -> Result<BTreeMap<String, Vec<String>>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read dictionary {} failed: {}", path.display(), e)))?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Dictionary {} is not a JSON object of string lists: {}",
            path.display(),
            e
        ))
    })
}

impl DiscoveryDictionaries {
    pub fn builtin() -> Self {
        Self {
            occupations_by_cluster: owned_table(OCCUPATIONS_BY_CLUSTER),
            surname_prefixes: owned_table(SURNAME_PREFIXES),
        }
    }

    pub fn from_tables(
        occupations_by_cluster: BTreeMap<String, Vec<String>>,
        surname_prefixes: BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self {
            occupations_by_cluster,
            surname_prefixes,
        }
    }

    /// Built-in tables, each replaced by its JSON file when given
    pub fn load(occupations: Option<&Path>, prefixes: Option<&Path>) -> Result<Self> {
        let mut dicts = Self::builtin();
        if let Some(path) = occupations {
            dicts.occupations_by_cluster = load_table(path)?;
            info!(path = %path.display(), "Loaded occupations by cluster");
        }
        if let Some(path) = prefixes {
            dicts.surname_prefixes = load_table(path)?;
            info!(path = %path.display(), "Loaded surname prefixes");
        }
        Ok(dicts)
    }

    pub fn clusters(&self) -> impl Iterator<Item = &str> {
        self.occupations_by_cluster.keys().map(String::as_str)
    }

    pub fn occupations(&self, cluster: &str) -> Option<&[String]> {
        self.occupations_by_cluster.get(cluster).map(Vec::as_slice)
    }

    /// Surname prefixes for `occupation`; empty when none are known
    pub fn prefixes(&self, occupation: &str) -> &[String] {
        self.surname_prefixes
            .get(occupation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Fail with every requested cluster the dictionary does not know
    pub fn validate_clusters(&self, clusters: &[String]) -> Result<()> {
        let unknown: Vec<&str> = clusters
            .iter()
            .map(String::as_str)
            .filter(|c| !self.occupations_by_cluster.contains_key(*c))
            .collect();

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "Cluster(s) not in dictionary: {} (known: {})",
                unknown.join(", "),
                self.clusters().collect::<Vec<_>>().join(", ")
            )))
        }
    }
}

impl Default for DiscoveryDictionaries {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Split a comma- and/or whitespace-separated cluster list
pub fn parse_cluster_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

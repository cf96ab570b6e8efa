//! Etymology ↔ profession alignment

use crate::lexicon::ProfessionKeywords;
use std::collections::BTreeSet;
use std::fmt;

/// Ordinal bucket for an alignment score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    /// score = 0
    None,
    /// score > 0
    Weak,
    /// score >= 0.33
    Medium,
    /// score >= 0.66
    Strong,
}

impl Tier {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.66 {
            Tier::Strong
        } else if score >= 0.33 {
            Tier::Medium
        } else if score > 0.0 {
            Tier::Weak
        } else {
            Tier::None
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Strong => "Strong",
            Tier::Medium => "Medium",
            Tier::Weak => "Weak",
            Tier::None => "None",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub target: String,
    pub roots: BTreeSet<String>,
    pub hits: BTreeSet<String>,
    /// |hits| / |roots|, in [0, 1]
    pub score: f64,
    pub tier: Tier,
}

impl Alignment {
    /// Score rounded to 2 decimals for storage
    pub fn rounded_score(&self) -> f64 {
        (self.score * 100.0).round() / 100.0
    }

    /// `Rationale: roots=['a', 'b'] → hits=['a'] → target=T → score=0.00 (Tier)`
    pub fn rationale(&self) -> String {
        format!(
            "Rationale: roots={} → hits={} → target={} → score={:.2} ({})",
            quoted_list(&self.roots),
            quoted_list(&self.hits),
            self.target,
            self.score,
            self.tier
        )
    }
}

/// `['a', 'b']`, double-quoting items that contain a single quote
fn quoted_list(set: &BTreeSet<String>) -> String {
    let items: Vec<String> = set
        .iter()
        .map(|item| {
            let escaped = item.replace('\\', "\\\\");
            if escaped.contains('\'') && !escaped.contains('"') {
                format!("\"{}\"", escaped)
            } else {
                format!("'{}'", escaped.replace('\'', "\\'"))
            }
        })
        .collect();
    format!("[{}]", items.join(", "))
}

/// Align `roots` with the keyword set of `target`
///
/// Unknown targets and empty root sets score 0 (tier None).
pub fn align<'a, I>(keywords: &ProfessionKeywords, roots: I, target: &str) -> Alignment
where
    I: IntoIterator<Item = &'a str>,
{
    let roots: BTreeSet<String> = roots
        .into_iter()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();

    let hits: BTreeSet<String> = match keywords.get(target) {
        Some(words) => roots.intersection(words).cloned().collect(),
        None => BTreeSet::new(),
    };

    let score = if roots.is_empty() {
        0.0
    } else {
        hits.len() as f64 / roots.len() as f64
    };

    Alignment {
        target: target.to_string(),
        tier: Tier::from_score(score),
        roots,
        hits,
        score,
    }
}

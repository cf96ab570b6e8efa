//! Per-record label prediction

use crate::pmi::PmiModel;
use crate::tokenizer::TokenSet;
use std::cmp::Ordering;

/// Contributions kept for the explanation
pub const TOP_CONTRIBUTIONS: usize = 5;

/// Predicted label with its margin over the runner-up
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    /// Summed PMI of the best label
    pub score: f64,
    /// best − second best, or the best score itself with a single label
    pub gap: f64,
    /// Strongest non-zero (token, pmi) contributions to the best label
    pub top: Vec<(String, f64)>,
}

impl Prediction {
    /// `best=L, gap=G, top=t:v; ...`
    pub fn explain(&self) -> String {
        let top = if self.top.is_empty() {
            "no strong tokens".to_string()
        } else {
            self.top
                .iter()
                .map(|(t, v)| format!("{}:{:.2}", t, v))
                .collect::<Vec<_>>()
                .join("; ")
        };
        format!("best={}, gap={:.3}, top={}", self.label, self.gap, top)
    }
}

/// Score `tokens` against every label in `model`
///
/// Returns `None` for an empty token set. Exact ties on the summed score go
/// to the lexicographically smallest label.
pub fn score(model: &PmiModel, tokens: &TokenSet) -> Option<Prediction> {
    if tokens.is_empty() {
        return None;
    }

    let mut ranked: Vec<(&str, f64, Vec<(String, f64)>)> = model
        .labels()
        .map(|label| {
            let mut total = 0.0;
            let mut contributions = Vec::new();
            for token in tokens {
                let v = model.pmi(label, token);
                if v != 0.0 {
                    total += v;
                    contributions.push((token.clone(), v));
                }
            }
            (label, total, contributions)
        })
        .collect();

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut ranked = ranked.into_iter();
    let (label, best, mut top) = ranked.next()?;
    let gap = match ranked.next() {
        Some((_, second, _)) => best - second,
        None => best,
    };

    top.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    top.truncate(TOP_CONTRIBUTIONS);

    Some(Prediction {
        label: label.to_string(),
        score: best,
        gap,
        top,
    })
}

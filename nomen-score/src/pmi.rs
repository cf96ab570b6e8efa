//! Token ↔ label PMI learner
//!
//! With add-one smoothing (α = 1) over N labeled examples, label set L and
//! vocabulary V:
//!
//! - P(label) = (n_label + 1) / (N + |L|)
//! - P(token) = (n_token + 1) / (N + |V|)
//! - P(label, token) = (n_label,token + 1) / (N + |V|·|L|)
//! - PMI = log2(P(label, token) / (P(label)·P(token)))
//!
//! Every label × vocabulary pair gets a finite value, including pairs that
//! never co-occur. Tokens outside the vocabulary score 0 at prediction time.

use crate::tokenizer::TokenSet;
use nomen_common::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

const ALPHA: f64 = 1.0;

/// One labeled, tokenized record
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledExample {
    pub label: String,
    pub tokens: TokenSet,
}

impl LabeledExample {
    pub fn new(label: impl Into<String>, tokens: TokenSet) -> Self {
        Self {
            label: label.into(),
            tokens,
        }
    }
}

/// Learned PMI table
#[derive(Debug, Clone, PartialEq)]
pub struct PmiModel {
    /// label → token → PMI
    table: BTreeMap<String, BTreeMap<String, f64>>,
    vocabulary: BTreeSet<String>,
    examples: usize,
}

impl PmiModel {
    /// Learn from `examples`
    ///
    /// Examples with a blank label or no tokens are ignored. Fails with
    /// [`Error::InsufficientData`] when nothing usable remains.
    pub fn learn<'a, I>(examples: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a LabeledExample>,
    {
        let mut label_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut token_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut joint_counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
        let mut n = 0usize;

        for example in examples {
            let label = example.label.trim();
            if label.is_empty() || example.tokens.is_empty() {
                continue;
            }
            n += 1;
            *label_counts.entry(label).or_default() += 1;
            for token in &example.tokens {
                *token_counts.entry(token.as_str()).or_default() += 1;
                *joint_counts.entry((label, token.as_str())).or_default() += 1;
            }
        }

        if n == 0 {
            return Err(Error::InsufficientData(
                "no labeled rows with name tokens to learn from".to_string(),
            ));
        }

        let n_f = n as f64;
        let labels = label_counts.len() as f64;
        let vocab = token_counts.len() as f64;
        let joint_denominator = n_f + ALPHA * vocab * labels;

        let mut table = BTreeMap::new();
        for (&label, &label_n) in &label_counts {
            let p_label = (label_n as f64 + ALPHA) / (n_f + ALPHA * labels);
            let row: BTreeMap<String, f64> = token_counts
                .iter()
                .map(|(&token, &token_n)| {
                    let p_token = (token_n as f64 + ALPHA) / (n_f + ALPHA * vocab);
                    let joint_n = joint_counts.get(&(label, token)).copied().unwrap_or(0);
                    let p_joint = (joint_n as f64 + ALPHA) / joint_denominator;
                    (token.to_string(), (p_joint / (p_label * p_token)).log2())
                })
                .collect();
            table.insert(label.to_string(), row);
        }

        let model = Self {
            table,
            vocabulary: token_counts.keys().map(|t| t.to_string()).collect(),
            examples: n,
        };
        info!(
            examples = n,
            labels = model.table.len(),
            vocabulary = model.vocabulary.len(),
            "Learned PMI table"
        );
        Ok(model)
    }

    /// PMI of `(label, token)`; 0 for unseen tokens or labels
    pub fn pmi(&self, label: &str, token: &str) -> f64 {
        self.table
            .get(label)
            .and_then(|row| row.get(token))
            .copied()
            .unwrap_or(0.0)
    }

    /// Known labels in lexicographic order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    pub fn label_count(&self) -> usize {
        self.table.len()
    }

    pub fn vocabulary(&self) -> &BTreeSet<String> {
        &self.vocabulary
    }

    /// Number of examples the table was learned from
    pub fn examples(&self) -> usize {
        self.examples
    }
}

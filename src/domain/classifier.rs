//! Multinomial Naive Bayes over a fixed label set.
//!
//! Counts only grow. The model is not internally synchronized: `update` needs
//! `&mut self`, so callers must serialize writers against readers (the Reactor
//! holds it behind a single RwLock).

use crate::domain::{DomainError, Label};
use std::collections::{HashMap, HashSet};

/// Per-label accumulators.
#[derive(Debug, Default, Clone)]
struct ClassStats {
    term_counts: HashMap<String, u64>,
    total_terms: u64,
    documents: u64,
}

/// Result of scoring a document: the winning label and every label's log-score.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub label: Label,
    pub scores: HashMap<Label, f64>,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    labels: Vec<Label>,
    index: HashMap<Label, usize>,
    classes: Vec<ClassStats>,
    vocabulary: HashSet<String>,
}

impl Classifier {
    /// Create an empty model over `labels`. Label order is kept and used for tie-breaking.
    pub fn new(labels: Vec<Label>) -> Result<Self, DomainError> {
        if labels.is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "label set is empty".into(),
            ));
        }
        let mut index = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), i).is_some() {
                return Err(DomainError::InvalidConfiguration(format!(
                    "duplicate label '{}'",
                    label
                )));
            }
        }
        let classes = vec![ClassStats::default(); labels.len()];
        Ok(Self {
            labels,
            index,
            classes,
            vocabulary: HashSet::new(),
        })
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Record `doc` as observed `weight` times under `label`.
    pub fn update(&mut self, doc: &[String], label: &Label, weight: u32) -> Result<(), DomainError> {
        let i = self.class_index(label, weight)?;
        let weight = u64::from(weight);
        let class = &mut self.classes[i];
        for term in doc {
            *class.term_counts.entry(term.clone()).or_insert(0) += weight;
            if !self.vocabulary.contains(term) {
                self.vocabulary.insert(term.clone());
            }
        }
        class.total_terms += doc.len() as u64 * weight;
        class.documents += weight;
        Ok(())
    }

    /// Apply several `(label, weight)` observations of the same document.
    ///
    /// All pairs are validated before any count changes, so a bad pair leaves
    /// the model untouched.
    pub fn update_all(
        &mut self,
        doc: &[String],
        observations: &[(Label, u32)],
    ) -> Result<(), DomainError> {
        for (label, weight) in observations {
            self.class_index(label, *weight)?;
        }
        for (label, weight) in observations {
            self.update(doc, label, *weight)?;
        }
        Ok(())
    }

    /// Score `doc` against every label. Ties go to the label configured first.
    pub fn score(&self, doc: &[String]) -> Prediction {
        let total_docs: u64 = self.classes.iter().map(|c| c.documents).sum();
        let uniform_prior = (1.0 / self.labels.len() as f64).ln();
        let vocab = self.vocabulary.len().max(1) as f64;

        let mut scores = HashMap::with_capacity(self.labels.len());
        let mut best: Option<(usize, f64)> = None;

        for (i, class) in self.classes.iter().enumerate() {
            let prior = if total_docs == 0 {
                uniform_prior
            } else {
                // An untrained label gets an infinitely unlikely prior.
                (class.documents as f64 / total_docs as f64).ln()
            };
            let denom = class.total_terms as f64 + vocab;
            let likelihood: f64 = doc
                .iter()
                .map(|t| {
                    let count = class.term_counts.get(t).copied().unwrap_or(0) as f64;
                    ((count + 1.0) / denom).ln()
                })
                .sum();
            let score = prior + likelihood;

            if best.is_none_or(|(_, b)| score > b) {
                best = Some((i, score));
            }
            scores.insert(self.labels[i].clone(), score);
        }

        let winner = best.map(|(i, _)| i).unwrap_or(0);
        Prediction {
            label: self.labels[winner].clone(),
            scores,
        }
    }

    /// Sum of term occurrences recorded under `label`.
    pub fn total_terms(&self, label: &Label) -> Option<u64> {
        self.index.get(label).map(|&i| self.classes[i].total_terms)
    }

    /// Weighted document count recorded under `label`.
    pub fn document_count(&self, label: &Label) -> Option<u64> {
        self.index.get(label).map(|&i| self.classes[i].documents)
    }

    pub fn term_count(&self, label: &Label, term: &str) -> u64 {
        self.index
            .get(label)
            .and_then(|&i| self.classes[i].term_counts.get(term).copied())
            .unwrap_or(0)
    }

    /// Number of distinct terms seen under any label.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    fn class_index(&self, label: &Label, weight: u32) -> Result<usize, DomainError> {
        if weight == 0 {
            return Err(DomainError::InvalidArgument(format!(
                "weight for '{}' must be at least 1",
                label
            )));
        }
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| DomainError::UnknownLabel(label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tokenize;

    fn labels(names: &[&str]) -> Vec<Label> {
        names.iter().map(|n| Label::from(*n)).collect()
    }

    #[test]
    fn test_new_rejects_empty_and_duplicates() {
        assert!(matches!(
            Classifier::new(vec![]),
            Err(DomainError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            Classifier::new(labels(&["a", "b", "a"])),
            Err(DomainError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_update_rejects_unknown_label_and_zero_weight() {
        let mut model = Classifier::new(labels(&["a"])).unwrap();
        let doc = tokenize("hello");
        assert_eq!(
            model.update(&doc, &Label::from("zzz"), 1),
            Err(DomainError::UnknownLabel("zzz".into()))
        );
        assert!(matches!(
            model.update(&doc, &Label::from("a"), 0),
            Err(DomainError::InvalidArgument(_))
        ));
        assert_eq!(model.total_terms(&Label::from("a")), Some(0));
    }

    #[test]
    fn test_counts_are_weighted_and_additive() {
        let mut model = Classifier::new(labels(&["a", "b"])).unwrap();
        let a = Label::from("a");
        model.update(&tokenize("ship it ship"), &a, 3).unwrap();
        model.update(&tokenize("ship"), &a, 1).unwrap();

        assert_eq!(model.term_count(&a, "ship"), 2 * 3 + 1);
        assert_eq!(model.term_count(&a, "it"), 3);
        assert_eq!(model.total_terms(&a), Some(3 * 3 + 1));
        assert_eq!(model.document_count(&a), Some(4));
        assert_eq!(model.total_terms(&Label::from("b")), Some(0));
        assert_eq!(model.vocabulary_size(), 2);
    }

    #[test]
    fn test_weight_equals_repeated_unit_updates() {
        let doc = tokenize("deploy friday again");
        let mut weighted = Classifier::new(labels(&["x", "y"])).unwrap();
        let mut repeated = weighted.clone();
        let x = Label::from("x");

        weighted.update(&doc, &x, 4).unwrap();
        for _ in 0..4 {
            repeated.update(&doc, &x, 1).unwrap();
        }

        let probe = tokenize("friday deploy");
        assert_eq!(weighted.score(&probe).scores, repeated.score(&probe).scores);
    }

    #[test]
    fn test_update_all_is_atomic() {
        let mut model = Classifier::new(labels(&["a", "b"])).unwrap();
        let doc = tokenize("words");
        let result = model.update_all(&doc, &[(Label::from("a"), 1), (Label::from("nope"), 1)]);
        assert!(matches!(result, Err(DomainError::UnknownLabel(_))));
        assert_eq!(model.document_count(&Label::from("a")), Some(0));
    }

    #[test]
    fn test_untrained_model_uses_uniform_prior_and_first_label_wins_ties() {
        let model = Classifier::new(labels(&["first", "second", "third"])).unwrap();
        let prediction = model.score(&tokenize("anything at all"));
        assert_eq!(prediction.label, Label::from("first"));
        assert_eq!(prediction.scores.len(), 3);
        assert!(prediction.scores.values().all(|s| s.is_finite()));
    }

    #[test]
    fn test_picks_label_with_matching_vocabulary() {
        let mut model = Classifier::new(labels(&["a", "b"])).unwrap();
        model
            .update(&tokenize("words all together"), &Label::from("a"), 2)
            .unwrap();
        model
            .update(&tokenize("this is a second string"), &Label::from("b"), 1)
            .unwrap();

        assert_eq!(model.score(&tokenize("words all together")).label, Label::from("a"));
        assert_eq!(model.score(&tokenize("a second string")).label, Label::from("b"));
    }

    #[test]
    fn test_unseen_terms_do_not_zero_out_scores() {
        let mut model = Classifier::new(labels(&["a", "b"])).unwrap();
        model.update(&tokenize("alpha"), &Label::from("a"), 1).unwrap();
        model.update(&tokenize("beta"), &Label::from("b"), 1).unwrap();

        let prediction = model.score(&tokenize("gamma delta"));
        assert!(prediction.scores.values().all(|s| s.is_finite()));
    }

    #[test]
    fn test_empty_document_scores_by_prior() {
        let mut model = Classifier::new(labels(&["rare", "common"])).unwrap();
        model.update(&tokenize("x"), &Label::from("rare"), 1).unwrap();
        model.update(&tokenize("y"), &Label::from("common"), 5).unwrap();
        assert_eq!(model.score(&[]).label, Label::from("common"));
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_score_values_follow_prior_and_smoothed_likelihood() {
        let mut model = Classifier::new(labels(&["a", "b"])).unwrap();
        let (a, b) = (Label::from("a"), Label::from("b"));
        model.update(&tokenize("x y"), &a, 1).unwrap();
        model.update(&tokenize("z"), &b, 3).unwrap();

        let prediction = model.score(&tokenize("x"));

        // docs: a=1, b=3; terms: a=2, b=3; |V|=3
        assert_close(prediction.scores[&a], (1.0f64 / 4.0).ln() + (2.0f64 / 5.0).ln());
        assert_close(prediction.scores[&b], (3.0f64 / 4.0).ln() + (1.0f64 / 6.0).ln());
        assert_eq!(prediction.label, b);
    }

    #[test]
    fn test_untrained_score_is_uniform_prior_plus_unit_likelihoods() {
        let model = Classifier::new(labels(&["a", "b", "c"])).unwrap();
        let prediction = model.score(&tokenize("one two"));

        // No documents: prior 1/3; no vocabulary: each term (0+1)/(0+1).
        for score in prediction.scores.values() {
            assert_close(*score, (1.0f64 / 3.0).ln());
        }
    }
}

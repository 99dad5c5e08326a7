//! Majority-vote ensemble over per-model rankings.
//!
//! Every model casts a ballot: its top-K display titles in rank order.
//! Ballots are concatenated in model order and each title earns one vote
//! per appearance. The winners are the titles with the most votes; equal
//! counts are ordered by where the title first appeared in the
//! concatenated ballots.

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::matrix::{Model, SimilarityMatrixSet};
use crate::rank::{top_k, SelfExclusion};

/// Default length of every ballot and of the final list.
pub const DEFAULT_TOP_K: usize = 5;

/// Vote counts in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteTally {
    counts: Vec<(String, usize)>,
    positions: HashMap<String, usize>,
}

impl VoteTally {
    /// Count the titles of every ballot, in order.
    pub fn from_ballots<'a, B>(ballots: B) -> Self
    where
        B: IntoIterator<Item = &'a [String]>,
    {
        let mut tally = Self::default();
        for title in ballots.into_iter().flatten() {
            tally.record(title);
        }
        tally
    }

    /// Add one vote for `title`.
    pub fn record(&mut self, title: &str) {
        if let Some(&pos) = self.positions.get(title) {
            self.counts[pos].1 += 1;
        } else {
            self.positions.insert(title.to_string(), self.counts.len());
            self.counts.push((title.to_string(), 1));
        }
    }

    /// Votes for `title`, zero if it never appeared.
    pub fn count(&self, title: &str) -> usize {
        self.positions
            .get(title)
            .map_or(0, |&pos| self.counts[pos].1)
    }

    /// The `n` titles with the most votes.
    ///
    /// Ties keep first-appearance order, never alphabetical or score order.
    pub fn most_common(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked = self.counts.clone();
        // Stable: equal counts stay in first-appearance order.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    /// Every title with its count, in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(title, count)| (title.as_str(), *count))
    }

    /// Number of distinct titles.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Tuning for one ensemble run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsembleOptions {
    /// Ballot length for each model.
    pub per_model_k: usize,
    /// Length of the final list.
    pub final_k: usize,
    pub exclusion: SelfExclusion,
}

impl Default for EnsembleOptions {
    fn default() -> Self {
        Self {
            per_model_k: DEFAULT_TOP_K,
            final_k: DEFAULT_TOP_K,
            exclusion: SelfExclusion::default(),
        }
    }
}

/// One model's ballot.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRanking {
    pub model: Model,
    /// Display titles with their scores, best first.
    pub entries: Vec<(String, f32)>,
}

impl ModelRanking {
    pub fn titles(&self) -> Vec<String> {
        self.entries.iter().map(|(title, _)| title.clone()).collect()
    }
}

/// Everything an ensemble run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleOutcome {
    /// Catalog index of the query.
    pub query: usize,
    pub rankings: Vec<ModelRanking>,
    pub tally: VoteTally,
    /// Final display titles with vote counts, best first.
    pub winners: Vec<(String, usize)>,
}

impl EnsembleOutcome {
    /// Final display titles, best first.
    pub fn titles(&self) -> Vec<String> {
        self.winners.iter().map(|(title, _)| title.clone()).collect()
    }
}

/// Runs every model over a catalog item and votes on the results.
#[derive(Debug, Clone, Copy)]
pub struct Ensemble<'a> {
    catalog: &'a Catalog,
    matrices: &'a SimilarityMatrixSet,
    options: EnsembleOptions,
}

impl<'a> Ensemble<'a> {
    pub fn new(
        catalog: &'a Catalog,
        matrices: &'a SimilarityMatrixSet,
        options: EnsembleOptions,
    ) -> Self {
        Self {
            catalog,
            matrices,
            options,
        }
    }

    /// Resolve `title` and vote on its neighbours.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the title is not in the catalog.
    pub fn run(&self, title: &str) -> Result<EnsembleOutcome> {
        let index = self.catalog.resolve(title)?;
        self.run_index(index)
    }

    /// Vote on the neighbours of catalog item `index`.
    pub fn run_index(&self, index: usize) -> Result<EnsembleOutcome> {
        let mut rankings = Vec::with_capacity(self.matrices.len());

        for (model, matrix) in self.matrices.iter() {
            let candidates = top_k(index, matrix, self.options.per_model_k, self.options.exclusion)?;
            let entries = candidates
                .into_iter()
                .map(|c| {
                    self.catalog
                        .display_title_of(c.index)
                        .map(|title| (title, c.score))
                        .ok_or(Error::IndexOutOfRange {
                            index: c.index,
                            len: self.catalog.len(),
                        })
                })
                .collect::<Result<Vec<_>>>()?;

            log::debug!("{} ballot for item {}: {} titles", model, index, entries.len());
            rankings.push(ModelRanking { model, entries });
        }

        let ballots: Vec<Vec<String>> = rankings.iter().map(ModelRanking::titles).collect();
        let tally = VoteTally::from_ballots(ballots.iter().map(Vec::as_slice));
        let winners = tally.most_common(self.options.final_k);

        Ok(EnsembleOutcome {
            query: index,
            rankings,
            tally,
            winners,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DuplicatePolicy;
    use crate::matrix::SimilarityMatrix;

    fn strings(titles: &[&str]) -> Vec<String> {
        titles.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn test_tally_counts_in_first_appearance_order() {
        let ballots = [strings(&["B", "A"]), strings(&["A", "C"]), strings(&["C", "A"])];
        let tally = VoteTally::from_ballots(ballots.iter().map(Vec::as_slice));

        let order: Vec<_> = tally.iter().collect();
        assert_eq!(order, vec![("B", 1), ("A", 3), ("C", 2)]);
        assert_eq!(tally.count("A"), 3);
        assert_eq!(tally.count("Z"), 0);
        assert_eq!(tally.len(), 3);
    }

    #[test]
    fn test_most_common_breaks_ties_by_first_appearance() {
        let ballots = [strings(&["Zodiac", "Alien"]), strings(&["Alien", "Zodiac", "Heat"])];
        let tally = VoteTally::from_ballots(ballots.iter().map(Vec::as_slice));

        assert_eq!(
            tally.most_common(5),
            vec![
                ("Zodiac".to_string(), 2),
                ("Alien".to_string(), 2),
                ("Heat".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_most_common_truncates() {
        let ballots = [strings(&["A", "B", "C"])];
        let tally = VoteTally::from_ballots(ballots.iter().map(Vec::as_slice));
        assert_eq!(tally.most_common(2).len(), 2);
        assert!(VoteTally::default().most_common(5).is_empty());
    }

    fn catalog(titles: &[&str]) -> Catalog {
        Catalog::from_titles(titles.iter().copied(), DuplicatePolicy::KeepFirst).unwrap()
    }

    fn matrix(rows: Vec<Vec<f32>>) -> SimilarityMatrix {
        SimilarityMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_run_votes_across_models() {
        let catalog = catalog(&["alpha", "beta", "gamma", "delta"]);
        let matrices = SimilarityMatrixSet::new(vec![
            (
                Model::Tfidf,
                matrix(vec![
                    vec![1.0, 0.9, 0.1, 0.5],
                    vec![0.0, 1.0, 0.0, 0.0],
                    vec![0.0, 0.0, 1.0, 0.0],
                    vec![0.0, 0.0, 0.0, 1.0],
                ]),
            ),
            (
                Model::Lsi,
                matrix(vec![
                    vec![1.0, 0.2, 0.3, 0.8],
                    vec![0.0, 1.0, 0.0, 0.0],
                    vec![0.0, 0.0, 1.0, 0.0],
                    vec![0.0, 0.0, 0.0, 1.0],
                ]),
            ),
        ])
        .unwrap();

        let options = EnsembleOptions {
            per_model_k: 2,
            final_k: 5,
            exclusion: SelfExclusion::Identity,
        };
        let outcome = Ensemble::new(&catalog, &matrices, options).run("Alpha").unwrap();

        assert_eq!(outcome.query, 0);
        assert_eq!(outcome.rankings[0].titles(), strings(&["Beta", "Delta"]));
        assert_eq!(outcome.rankings[1].titles(), strings(&["Delta", "Gamma"]));
        assert_eq!(outcome.titles(), strings(&["Delta", "Beta", "Gamma"]));
        assert_eq!(outcome.winners[0].1, 2);
    }

    #[test]
    fn test_run_unknown_title() {
        let catalog = catalog(&["alpha"]);
        let matrices =
            SimilarityMatrixSet::new(vec![(Model::Tfidf, matrix(vec![vec![1.0]]))]).unwrap();
        let err = Ensemble::new(&catalog, &matrices, EnsembleOptions::default())
            .run("omega")
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

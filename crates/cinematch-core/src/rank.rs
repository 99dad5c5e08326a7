//! Per-model top-K ranking.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::matrix::SimilarityMatrix;

/// How the query item is kept out of its own ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfExclusion {
    /// Drop the query index wherever it lands in the ranking.
    #[default]
    Identity,
    /// Drop whatever ranks first, assuming it is the query item.
    ///
    /// When another item ties the query at the top score and has a lower
    /// index, that item is dropped instead and the query item appears in
    /// its own results. Kept for output parity with older deployments.
    Positional,
}

/// A ranked candidate from one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub score: f32,
}

/// Rank every item against `index` and return the best `k`.
///
/// Scores sort descending with a stable sort, so equal scores keep
/// ascending index order. NaN scores rank below every number.
pub fn top_k(
    index: usize,
    matrix: &SimilarityMatrix,
    k: usize,
    exclusion: SelfExclusion,
) -> Result<Vec<Candidate>> {
    let row = matrix.row(index)?;

    let mut ranked: Vec<Candidate> = row
        .iter()
        .enumerate()
        .map(|(i, &score)| Candidate { index: i, score })
        .collect();
    ranked.sort_by(|a, b| descending(a.score, b.score));

    let candidates = match exclusion {
        SelfExclusion::Identity => ranked
            .into_iter()
            .filter(|c| c.index != index)
            .take(k)
            .collect(),
        SelfExclusion::Positional => ranked.into_iter().skip(1).take(k).collect(),
    };

    Ok(candidates)
}

fn descending(a: f32, b: f32) -> Ordering {
    sort_key(b).total_cmp(&sort_key(a))
}

fn sort_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn matrix(rows: Vec<Vec<f32>>) -> SimilarityMatrix {
        SimilarityMatrix::from_rows(rows).unwrap()
    }

    fn indices(candidates: &[Candidate]) -> Vec<usize> {
        candidates.iter().map(|c| c.index).collect()
    }

    #[test]
    fn test_orders_by_descending_score() {
        let m = matrix(vec![
            vec![1.0, 0.2, 0.9, 0.5],
            vec![0.2, 1.0, 0.1, 0.3],
            vec![0.9, 0.1, 1.0, 0.4],
            vec![0.5, 0.3, 0.4, 1.0],
        ]);
        let top = top_k(0, &m, 5, SelfExclusion::Identity).unwrap();
        assert_eq!(indices(&top), vec![2, 3, 1]);
        assert_eq!(top[0].score, 0.9);
    }

    #[test]
    fn test_truncates_to_k() {
        let m = matrix(vec![
            vec![1.0, 0.4, 0.3, 0.2],
            vec![0.4, 1.0, 0.3, 0.2],
            vec![0.3, 0.3, 1.0, 0.2],
            vec![0.2, 0.2, 0.2, 1.0],
        ]);
        let top = top_k(0, &m, 2, SelfExclusion::Identity).unwrap();
        assert_eq!(indices(&top), vec![1, 2]);
    }

    #[test]
    fn test_ties_keep_index_order() {
        let m = matrix(vec![
            vec![1.0, 0.5, 0.5, 0.5],
            vec![0.5, 1.0, 0.5, 0.5],
            vec![0.5, 0.5, 1.0, 0.5],
            vec![0.5, 0.5, 0.5, 1.0],
        ]);
        let top = top_k(3, &m, 5, SelfExclusion::Identity).unwrap();
        assert_eq!(indices(&top), vec![0, 1, 2]);
    }

    #[test]
    fn test_identity_exclusion_with_tie_at_top() {
        // Item 0 ties item 1 at the top of row 1 and sorts first.
        let m = matrix(vec![
            vec![1.0, 1.0, 0.1],
            vec![1.0, 1.0, 0.2],
            vec![0.1, 0.2, 1.0],
        ]);
        let top = top_k(1, &m, 5, SelfExclusion::Identity).unwrap();
        assert_eq!(indices(&top), vec![0, 2]);
    }

    #[test]
    fn test_positional_exclusion_with_tie_at_top() {
        let m = matrix(vec![
            vec![1.0, 1.0, 0.1],
            vec![1.0, 1.0, 0.2],
            vec![0.1, 0.2, 1.0],
        ]);
        let top = top_k(1, &m, 5, SelfExclusion::Positional).unwrap();
        assert_eq!(indices(&top), vec![1, 2]);
    }

    #[test]
    fn test_modes_agree_when_self_ranks_first() {
        let m = matrix(vec![
            vec![1.0, 0.3, 0.6],
            vec![0.3, 1.0, 0.2],
            vec![0.6, 0.2, 1.0],
        ]);
        for index in 0..3 {
            assert_eq!(
                top_k(index, &m, 5, SelfExclusion::Identity).unwrap(),
                top_k(index, &m, 5, SelfExclusion::Positional).unwrap()
            );
        }
    }

    #[test]
    fn test_nan_ranks_last() {
        let m = matrix(vec![
            vec![1.0, f32::NAN, 0.1],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ]);
        let top = top_k(0, &m, 5, SelfExclusion::Identity).unwrap();
        assert_eq!(indices(&top), vec![2, 1]);
    }

    #[test]
    fn test_never_returns_query_index() {
        let m = matrix(vec![
            vec![0.1, 0.9, 0.9],
            vec![0.9, 0.1, 0.9],
            vec![0.9, 0.9, 0.1],
        ]);
        for index in 0..3 {
            let top = top_k(index, &m, 5, SelfExclusion::Identity).unwrap();
            assert!(top.len() <= 5);
            assert!(top.iter().all(|c| c.index != index));
        }
    }

    #[test]
    fn test_single_item_catalog() {
        let m = matrix(vec![vec![1.0]]);
        assert!(top_k(0, &m, 5, SelfExclusion::Identity).unwrap().is_empty());
    }

    #[test]
    fn test_index_out_of_range() {
        let m = matrix(vec![vec![1.0]]);
        assert!(matches!(
            top_k(4, &m, 5, SelfExclusion::Identity),
            Err(Error::IndexOutOfRange { index: 4, len: 1 })
        ));
    }
}

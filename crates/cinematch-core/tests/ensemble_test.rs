//! End-to-end checks of catalog lookup, per-model ranking, and voting
//! over hand-built matrix sets.

use std::collections::HashSet;

use cinematch_core::{
    top_k, Catalog, DuplicatePolicy, Ensemble, EnsembleOptions, Model, SelfExclusion,
    SimilarityMatrix, SimilarityMatrixSet,
};

fn matrix(rows: Vec<Vec<f32>>) -> SimilarityMatrix {
    SimilarityMatrix::from_rows(rows).unwrap()
}

/// Three titles; every model ranks both neighbours of "alien", so they
/// tie on five votes each.
fn three_item_fixture() -> (Catalog, SimilarityMatrixSet) {
    let catalog = Catalog::from_titles(
        ["Alien", "Blade Runner", "Contact"],
        DuplicatePolicy::KeepFirst,
    )
    .unwrap();

    let contact_first = || {
        matrix(vec![
            vec![1.0, 0.4, 0.6],
            vec![0.4, 1.0, 0.5],
            vec![0.6, 0.5, 1.0],
        ])
    };
    let blade_runner_first = || {
        matrix(vec![
            vec![1.0, 0.7, 0.2],
            vec![0.7, 1.0, 0.5],
            vec![0.2, 0.5, 1.0],
        ])
    };

    let matrices = SimilarityMatrixSet::new(vec![
        (Model::Tfidf, contact_first()),
        (Model::Lsi, blade_runner_first()),
        (Model::Bm25, blade_runner_first()),
        (Model::Word2Vec, blade_runner_first()),
        (Model::Jaccard, blade_runner_first()),
    ])
    .unwrap();

    (catalog, matrices)
}

/// Ten titles with pseudo-random scores so every model disagrees.
fn ten_item_fixture() -> (Catalog, SimilarityMatrixSet) {
    let titles: Vec<String> = (0..10).map(|i| format!("Movie {i}")).collect();
    let catalog = Catalog::from_titles(&titles, DuplicatePolicy::KeepFirst).unwrap();

    let matrices = Model::ALL
        .iter()
        .enumerate()
        .map(|(m, model)| {
            let rows: Vec<Vec<f32>> = (0..10)
                .map(|i| {
                    (0..10)
                        .map(|j| {
                            if i == j {
                                1.0
                            } else {
                                // Deterministic scatter in [0, 1).
                                ((i * 7 + j * 13 + m * 29) % 97) as f32 / 97.0
                            }
                        })
                        .collect::<Vec<f32>>()
                })
                .collect();
            (*model, matrix(rows))
        })
        .collect();

    (catalog, SimilarityMatrixSet::new(matrices).unwrap())
}

#[test]
fn test_tie_broken_by_first_appearance() {
    let (catalog, matrices) = three_item_fixture();
    let outcome = Ensemble::new(&catalog, &matrices, EnsembleOptions::default())
        .run("alien")
        .unwrap();

    // Both neighbours collect one vote per model.
    assert_eq!(outcome.tally.count("Contact"), 5);
    assert_eq!(outcome.tally.count("Blade Runner"), 5);

    // Contact leads the first ballot, so it wins the tie even though four
    // of five models rank Blade Runner higher.
    assert_eq!(outcome.titles(), vec!["Contact", "Blade Runner"]);
}

#[test]
fn test_results_drawn_from_model_ballots() {
    let (catalog, matrices) = ten_item_fixture();
    let ensemble = Ensemble::new(&catalog, &matrices, EnsembleOptions::default());

    for entry in catalog.entries() {
        let outcome = ensemble.run_index(entry.index).unwrap();
        let query_title = catalog.display_title_of(entry.index).unwrap();

        let ballot_titles: HashSet<String> = outcome
            .rankings
            .iter()
            .flat_map(|r| r.titles())
            .collect();

        assert!(outcome.winners.len() <= 5);
        for title in outcome.titles() {
            assert!(ballot_titles.contains(&title));
            assert_ne!(title, query_title);
        }
    }
}

#[test]
fn test_per_model_lists_exclude_query() {
    let (catalog, matrices) = ten_item_fixture();

    for entry in catalog.entries() {
        for (_, matrix) in matrices.iter() {
            let top = top_k(entry.index, matrix, 5, SelfExclusion::Identity).unwrap();
            assert!(top.len() <= 5);
            assert!(top.iter().all(|c| c.index != entry.index));

            let distinct: HashSet<usize> = top.iter().map(|c| c.index).collect();
            assert_eq!(distinct.len(), top.len());
        }
    }
}

#[test]
fn test_case_insensitive_queries_agree() {
    let (catalog, matrices) = ten_item_fixture();
    let ensemble = Ensemble::new(&catalog, &matrices, EnsembleOptions::default());

    let lower = ensemble.run("movie 3").unwrap();
    let mixed = ensemble.run("Movie 3").unwrap();
    let upper = ensemble.run("MOVIE 3").unwrap();

    assert_eq!(lower.query, mixed.query);
    assert_eq!(lower.titles(), mixed.titles());
    assert_eq!(lower.titles(), upper.titles());
}

#[test]
fn test_deterministic_across_runs() {
    let (catalog, matrices) = ten_item_fixture();
    let ensemble = Ensemble::new(&catalog, &matrices, EnsembleOptions::default());

    let first = ensemble.run("movie 7").unwrap();
    let second = ensemble.run("movie 7").unwrap();
    assert_eq!(first, second);
}

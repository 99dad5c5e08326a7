//! Precomputed similarity matrices.
//!
//! Each model contributes one square score matrix whose rows and columns
//! follow catalog index order. The matrices are opaque inputs: nothing
//! here assumes symmetry or a maximal diagonal.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use ndarray::{Array2, ArrayView1};
use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::{Error, Result};

/// A similarity model, in the fixed order used for voting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    Tfidf,
    Lsi,
    Bm25,
    Word2Vec,
    Jaccard,
}

impl Model {
    /// Every model, in ballot order.
    pub const ALL: [Self; 5] = [
        Self::Tfidf,
        Self::Lsi,
        Self::Bm25,
        Self::Word2Vec,
        Self::Jaccard,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tfidf => "tfidf",
            Self::Lsi => "lsi",
            Self::Bm25 => "bm25",
            Self::Word2Vec => "word2vec",
            Self::Jaccard => "jaccard",
        }
    }

    /// File name of the model's matrix artifact inside the data directory.
    #[must_use]
    pub fn artifact_file_name(self) -> String {
        format!("similarity_{}.bin", self.name())
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Model {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidData(format!("unknown model: {s}")))
    }
}

/// Square matrix of pairwise scores under one model.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    scores: Array2<f32>,
}

impl SimilarityMatrix {
    /// Wrap a score array, rejecting non-square shapes.
    pub fn new(scores: Array2<f32>) -> Result<Self> {
        let (rows, cols) = scores.dim();
        if rows != cols {
            return Err(Error::InvalidData(format!(
                "similarity matrix must be square, got {rows}x{cols}"
            )));
        }
        Ok(Self { scores })
    }

    /// Build a matrix from row vectors.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let n = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(Error::InvalidData(format!(
                "row {i} has {} columns, expected {n}",
                row.len()
            )));
        }

        let flat: Vec<f32> = rows.into_iter().flatten().collect();
        let scores = Array2::from_shape_vec((n, n), flat)
            .map_err(|e| Error::InvalidData(e.to_string()))?;
        Ok(Self { scores })
    }

    /// Load a matrix artifact.
    ///
    /// Files ending in `.json` hold an array of rows; anything else is a
    /// bincode-encoded `Array2<f32>`.
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let matrix = if is_json {
            let rows: Vec<Vec<f32>> = serde_json::from_reader(reader)?;
            Self::from_rows(rows)?
        } else {
            let scores: Array2<f32> = bincode::deserialize_from(reader)?;
            Self::new(scores)?
        };

        log::debug!("Loaded {}x{} matrix from {}", matrix.dim(), matrix.dim(), path.display());
        Ok(matrix)
    }

    /// Number of rows (equal to the number of columns).
    pub fn dim(&self) -> usize {
        self.scores.nrows()
    }

    /// Scores of item `index` against every item.
    pub fn row(&self, index: usize) -> Result<ArrayView1<'_, f32>> {
        if index >= self.dim() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.dim(),
            });
        }
        Ok(self.scores.row(index))
    }
}

/// The models' matrices, aligned to one catalog, in ballot order.
#[derive(Debug, Clone)]
pub struct SimilarityMatrixSet {
    matrices: Vec<(Model, SimilarityMatrix)>,
}

impl SimilarityMatrixSet {
    /// Build a set from distinct models whose matrices share one dimension.
    pub fn new(matrices: Vec<(Model, SimilarityMatrix)>) -> Result<Self> {
        let Some((_, first)) = matrices.first() else {
            return Err(Error::InvalidData("no similarity matrices supplied".to_string()));
        };
        let dim = first.dim();

        for (i, (model, matrix)) in matrices.iter().enumerate() {
            if matrix.dim() != dim {
                return Err(Error::InvalidData(format!(
                    "{model} matrix is {0}x{0}, expected {dim}x{dim}",
                    matrix.dim()
                )));
            }
            if matrices[..i].iter().any(|(m, _)| m == model) {
                return Err(Error::InvalidData(format!("{model} supplied twice")));
            }
        }

        Ok(Self { matrices })
    }

    /// Load every model's artifact from `dir`, in ballot order.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let matrices = Model::ALL
            .into_iter()
            .map(|model| {
                let path = dir.join(model.artifact_file_name());
                SimilarityMatrix::load(&path).map(|m| (model, m))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(matrices)
    }

    /// Check that the matrices cover exactly the catalog's index space.
    pub fn ensure_matches(&self, catalog: &Catalog) -> Result<()> {
        if self.dim() == catalog.len() {
            Ok(())
        } else {
            Err(Error::InvalidData(format!(
                "matrices are {0}x{0} but the catalog has {1} titles",
                self.dim(),
                catalog.len()
            )))
        }
    }

    pub fn dim(&self) -> usize {
        self.matrices.first().map_or(0, |(_, m)| m.dim())
    }

    pub fn models(&self) -> Vec<Model> {
        self.matrices.iter().map(|(model, _)| *model).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Model, &SimilarityMatrix)> {
        self.matrices.iter().map(|(model, matrix)| (*model, matrix))
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }
}
